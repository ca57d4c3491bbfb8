mod util;
use mesh_regrid::prelude::*;
use mesh_regrid::topology::NO_FACE;
use util::*;

const SQUARE_X: [f64; 4] = [0.0, 1.0, 1.0, 0.0];
const SQUARE_Y: [f64; 4] = [0.0, 0.0, 1.0, 1.0];

#[test]
fn out_of_range_vertex_names_face_and_slot() {
    let err = GridTopology::new(&SQUARE_X, &SQUARE_Y, &[vec![0, 1, 2], vec![0, 2, 9]]).unwrap_err();
    assert_eq!(
        err,
        MeshRegridError::NodeIndexOutOfRange {
            face: 1,
            slot: 2,
            node: 9,
            n_nodes: 4
        }
    );
}

#[test]
fn faces_need_three_vertices() {
    let err = GridTopology::new(&SQUARE_X, &SQUARE_Y, &[vec![0, 1]]).unwrap_err();
    assert_eq!(err, MeshRegridError::TooFewVertices { face: 0, found: 2 });
    let err = GridTopology::from_fill_table(&SQUARE_X, &SQUARE_Y, &[0, 1, -1, -1], 4, -1).unwrap_err();
    assert_eq!(err, MeshRegridError::TooFewVertices { face: 0, found: 2 });
}

#[test]
fn clockwise_faces_are_rejected_not_repaired() {
    let err = GridTopology::new(&SQUARE_X, &SQUARE_Y, &[vec![0, 3, 2, 1]]).unwrap_err();
    assert!(matches!(
        err,
        MeshRegridError::InconsistentOrientation { face: 0, signed_area } if signed_area == -1.0
    ));
}

#[test]
fn degenerate_faces_are_rejected() {
    let err = GridTopology::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], &[vec![0, 1, 2]]).unwrap_err();
    assert!(matches!(err, MeshRegridError::DegenerateFace { face: 0, .. }));
}

#[test]
fn degeneracy_is_relative_to_face_size() {
    // A valid triangle at micrometre scale far from the origin.
    let s = 1e-6;
    let g = GridTopology::new(&[1e3, 1e3 + s, 1e3], &[1e3, 1e3, 1e3 + s], &[vec![0, 1, 2]]).unwrap();
    assert!(g.face_areas()[0] > 0.0);
}

#[test]
fn repeated_and_non_finite_input() {
    let err = GridTopology::new(&SQUARE_X, &SQUARE_Y, &[vec![0, 1, 1, 2]]).unwrap_err();
    assert_eq!(err, MeshRegridError::RepeatedVertex { face: 0, node: 1 });
    let err = GridTopology::new(&[0.0, f64::INFINITY, 1.0], &[0.0, 0.0, 1.0], &[vec![0, 1, 2]]).unwrap_err();
    assert_eq!(err, MeshRegridError::NonFiniteCoordinate { node: 1 });
    let err = GridTopology::new(&[0.0, 1.0], &[0.0], &[vec![0, 1, 2]]).unwrap_err();
    assert_eq!(err, MeshRegridError::CoordinateLengthMismatch { x_len: 2, y_len: 1 });
    let empty: [Vec<usize>; 0] = [];
    assert_eq!(
        GridTopology::new(&SQUARE_X, &SQUARE_Y, &empty).unwrap_err(),
        MeshRegridError::EmptyGrid
    );
}

fn fan_sharing_one_edge() -> (Vec<f64>, Vec<f64>, Vec<Vec<usize>>) {
    // Three triangles on the edge (0, 1), one below it and two above.
    (
        vec![0.0, 1.0, 0.5, 0.5, 0.2],
        vec![0.0, 0.0, -1.0, 1.0, 2.0],
        vec![vec![0, 2, 1], vec![0, 1, 3], vec![0, 1, 4]],
    )
}

#[test]
fn non_manifold_policies() {
    let (x, y, faces) = fan_sharing_one_edge();
    let err = GridTopology::new(&x, &y, &faces).unwrap_err();
    assert_eq!(
        err,
        MeshRegridError::NonManifoldEdge {
            node_a: 0,
            node_b: 1,
            faces: 3
        }
    );
    for handling in [NonManifoldHandling::Warn, NonManifoldHandling::Ignore] {
        let options = ValidationOptions {
            non_manifold: handling,
            ..ValidationOptions::default()
        };
        let g = GridTopology::new_with_options(&x, &y, &faces, options).unwrap();
        assert_eq!(g.n_faces(), 3);
    }
    let g = GridTopology::new_with_options(&x, &y, &faces, ValidationOptions::lenient()).unwrap();
    // Edge (0, 1) is the third edge met while scanning face 0.
    assert_eq!(g.derive_edges().non_manifold, vec![(2, 3)]);
}

#[test]
fn edges_are_numbered_by_first_appearance() {
    let g = two_squares();
    // Face 0 = [0, 1, 4, 3], face 1 = [1, 2, 5, 4].
    assert_eq!(
        g.edge_node(),
        &[[0, 1], [1, 4], [3, 4], [0, 3], [1, 2], [2, 5], [4, 5]]
    );
    assert_eq!(g.edge_face()[1], [0, 1]);
    assert_eq!(g.edge_face()[0], [0, NO_FACE]);
    assert_eq!(g.face_edge().row(1), &[4, 5, 6, 1]);
    assert_eq!(g.boundary_edges(), vec![0, 2, 3, 4, 5, 6]);
}

#[test]
fn face_pairs_sharing_two_edges_are_adjacent_once() {
    // Face 1 fills the notch of face 0 and touches it along (3, 4) and (4, 5).
    let g = GridTopology::new(
        &[0.0, 1.0, 2.0, 2.0, 1.0, 0.0, 1.0],
        &[0.0, 0.0, 0.0, 2.0, 0.5, 2.0, 3.0],
        &[vec![0, 1, 2, 3, 4, 5], vec![5, 4, 3, 6]],
    )
    .unwrap();
    assert_eq!(g.face_face_adjacency().row(0), &[1]);
    assert_eq!(g.face_face_adjacency().row(1), &[0]);
    assert_eq!(g.edge_face().iter().filter(|f| **f == [0, 1]).count(), 2);
}

#[test]
fn node_face_is_the_sorted_inverse() {
    let g = unit_raster(3, 2);
    for (node, faces) in g.node_face().rows().enumerate() {
        assert!(faces.windows(2).all(|w| w[0] < w[1]));
        for &f in faces {
            assert!(g.face_nodes(f).contains(&node));
        }
    }
    assert_eq!(g.node_face().row(5), &[0, 1, 3, 4]);
}

#[test]
fn derived_tables_are_deterministic() {
    let a = jittered(4, 4, 0.2, 42);
    let b = jittered(4, 4, 0.2, 42);
    assert_eq!(a.edge_node(), b.edge_node());
    assert_eq!(a.face_face_adjacency(), b.face_face_adjacency());
    assert_eq!(a.fingerprint(), b.fingerprint());
}

#[test]
fn subset_builds_a_new_grid() {
    let g = unit_raster(3, 3);
    let (sub, map) = g.subset(&[8, 4, 0, 4]).unwrap();
    assert_eq!(map, vec![0, 4, 8]);
    assert_eq!(sub.n_faces(), 3);
    assert_eq!(sub.n_nodes(), 10);
    assert!(sub.face_face_adjacency().rows().all(|r| r.is_empty()));
    assert_eq!(g.n_faces(), 9);
}

#[test]
fn fill_table_accepts_mixed_arity() {
    let x = [0.0, 1.0, 1.0, 0.0, 2.0];
    let y = [0.0, 0.0, 1.0, 1.0, 0.0];
    let g = GridTopology::from_fill_table(&x, &y, &[0, 1, 2, 3, 1, 4, 2, i64::MIN], 4, i64::MIN).unwrap();
    assert_eq!(g.face_nodes(0), &[0, 1, 2, 3]);
    assert_eq!(g.face_nodes(1), &[1, 4, 2]);
    assert_eq!(g.n_edges(), 6);
    let err = GridTopology::from_fill_table(&x, &y, &[0, -1, 1, 2], 4, -1).unwrap_err();
    assert_eq!(err, MeshRegridError::InteriorFillValue { face: 0, slot: 1 });
}

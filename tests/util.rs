#![allow(dead_code)]
use mesh_regrid::geometry::Point2;
use mesh_regrid::topology::{GridTopology, RasterGrid};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// `nx` x `ny` raster of `dx` x `dy` cells with lower-left corner `(x0, y0)`.
pub fn raster(nx: usize, ny: usize, x0: f64, y0: f64, dx: f64, dy: f64) -> GridTopology {
    RasterGrid::from_edges(
        (0..=nx).map(|i| x0 + i as f64 * dx).collect(),
        (0..=ny).map(|j| y0 + j as f64 * dy).collect(),
    )
    .unwrap()
    .to_topology()
    .unwrap()
}

/// Unit-cell raster on `[0, nx] x [0, ny]`.
pub fn unit_raster(nx: usize, ny: usize) -> GridTopology {
    raster(nx, ny, 0.0, 0.0, 1.0, 1.0)
}

/// Quadrilateral mesh on `[0, nx] x [0, ny]` whose interior nodes are moved
/// by up to `amplitude` (in cell units) along each axis.
pub fn jittered(nx: usize, ny: usize, amplitude: f64, seed: u64) -> GridTopology {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for j in 0..=ny {
        for i in 0..=nx {
            let interior = i > 0 && i < nx && j > 0 && j < ny;
            let (jx, jy) = if interior {
                (
                    rng.gen_range(-amplitude..=amplitude),
                    rng.gen_range(-amplitude..=amplitude),
                )
            } else {
                (0.0, 0.0)
            };
            xs.push(i as f64 + jx);
            ys.push(j as f64 + jy);
        }
    }
    let stride = nx + 1;
    let faces: Vec<Vec<usize>> = (0..ny)
        .flat_map(|j| {
            (0..nx).map(move |i| {
                let n = j * stride + i;
                vec![n, n + 1, n + 1 + stride, n + stride]
            })
        })
        .collect();
    GridTopology::new(&xs, &ys, &faces).unwrap()
}

/// Two unit squares `[0,1]x[0,1]` and `[1,2]x[0,1]`.
pub fn two_squares() -> GridTopology {
    GridTopology::new(
        &[0.0, 1.0, 2.0, 0.0, 1.0, 2.0],
        &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
        &[vec![0, 1, 4, 3], vec![1, 2, 5, 4]],
    )
    .unwrap()
}

/// Single axis-aligned rectangle.
pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> GridTopology {
    GridTopology::new(&[x0, x1, x1, x0], &[y0, y0, y1, y1], &[vec![0, 1, 2, 3]]).unwrap()
}

/// Random points in `[x0, x1) x [y0, y1)`.
pub fn random_points(n: usize, x0: f64, y0: f64, x1: f64, y1: f64, seed: u64) -> Vec<Point2> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Point2::new(rng.gen_range(x0..x1), rng.gen_range(y0..y1)))
        .collect()
}

pub fn assert_close(got: f64, want: f64, tol: f64) {
    assert!(
        (got - want).abs() <= tol * want.abs().max(1.0),
        "got {got}, want {want} (tol {tol})"
    );
}

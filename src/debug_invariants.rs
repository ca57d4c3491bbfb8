use crate::mesh_error::MeshRegridError;

/// Trait for validating data structure invariants.
pub trait DebugInvariants {
    /// Assert invariants in debug builds or when invariant checking is enabled.
    fn debug_assert_invariants(&self);
    /// Validate invariants and return the first error encountered.
    fn validate_invariants(&self) -> Result<(), MeshRegridError>;
}

/// Helper macro to run a fallible check and panic on error when invariant
/// checking is enabled.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}

impl DebugInvariants for crate::topology::GridTopology {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "GridTopology");
    }

    fn validate_invariants(&self) -> Result<(), MeshRegridError> {
        crate::topology::GridTopology::validate_invariants(self)
    }
}

impl DebugInvariants for crate::weights::WeightMatrix {
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "WeightMatrix");
    }

    fn validate_invariants(&self) -> Result<(), MeshRegridError> {
        crate::weights::WeightMatrix::validate_invariants(self)
    }
}

//! Algebra of joint configuration spaces.
//!
//! Configurations of revolute, spherical or free-floating joints live on
//! [Lie groups](https://en.wikipedia.org/wiki/Lie_group) where adding two configuration vectors is
//! meaningless. Every joint kind is therefore bound to a [LieGroupOperation] that knows how to move
//! along (`integrate`), measure (`difference`, `distance`) and blend (`interpolate`) its configurations.
//!
//! Operations write their results into caller-provided slices. This allows a whole-robot configuration
//! vector to be processed joint by joint without allocating (see [crate::KinematicTree::integrate]).
//!
//! Conventions:
//! * rotations are stored redundantly: `[cos, sin]` for SO(2), a unit quaternion `[x, y, z, w]` for SO(3)
//! * rigid motions store the translation first: `[x, y, cos, sin]` for SE(2), `[x, y, z, qx, qy, qz, qw]`
//!   for SE(3). Their tangent vectors store the linear part first, then the angular part.
//! * `difference(q1, q0)` is the tangent vector that moves `q0` to `q1` (i.e., "`q1 - q0`").

pub mod cartesian_product;
pub mod composite;
pub mod special_euclidean;
pub mod special_orthogonal;
pub mod vector_space;

pub use cartesian_product::CartesianProduct;
pub use composite::{CompositeElement, CompositeOperation};
pub use special_euclidean::{SpecialEuclidean2, SpecialEuclidean3};
pub use special_orthogonal::{SpecialOrthogonal2, SpecialOrthogonal3};
pub use vector_space::VectorSpace;

use crate::{errors::check_size, KinematicsError};
use std::{fmt::Debug, sync::Arc};

/// Shared handle on a (stateless) operation. One instance per joint kind is shared by all joints.
pub type OperationRef = Arc<dyn LieGroupOperation>;

/// Capability object that gives a joint kind its configuration space algebra.
///
/// All methods check the sizes of their slice arguments against [LieGroupOperation::nq] and
/// [LieGroupOperation::nv] and return [KinematicsError::ConfigurationSizeMismatch] otherwise.
pub trait LieGroupOperation: Debug + Send + Sync {
    /// Human-readable name such as `R^3`, `SO(3)` or `R^3*SO(3)`
    fn name(&self) -> String;

    /// Size of a configuration vector
    fn nq(&self) -> usize;

    /// Size of a tangent (velocity) vector
    fn nv(&self) -> usize;

    /// Writes the neutral element (identity) into `out`
    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError>;

    /// Moves `q` along the tangent vector `v`.
    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError>;

    /// Tangent vector `v` such that `integrate(q0, v) == q1`.
    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError>;

    /// Geodesic interpolation: `alpha = 0` yields `q0` and `alpha = 1` yields `q1`.
    fn interpolate(&self, q0: &[f64], q1: &[f64], alpha: f64, out: &mut [f64]) -> Result<(), KinematicsError> {
        let mut v = vec![0.0; self.nv()];
        self.difference(q1, q0, &mut v)?;
        v.iter_mut().for_each(|x| *x *= alpha);
        self.integrate(q0, &v, out)
    }

    /// Length of the geodesic between `q0` and `q1` (norm of their difference).
    fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        let mut v = vec![0.0; self.nv()];
        self.difference(q1, q0, &mut v)?;
        Ok(norm(&v))
    }

    /// Writes the joint limits in `bounds` into `out`. Both slices span this joint's configuration only.
    fn set_bound(&self, bounds: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq(), bounds.len())?;
        check_size(self.nq(), out.len())?;
        out.copy_from_slice(bounds);
        Ok(())
    }

    /// Conventional limits of the configuration coordinates (possibly infinite).
    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError>;

    /// Whether the translation of a rigid motion is moved in the parent frame, independently of its
    /// rotation (e.g., `R^3*SO(3)`). The rigid motion groups move it along the rotated axes.
    fn decouples_translation(&self) -> bool {
        false
    }

    /// Operations of the elements if this operation acts on a composite joint
    fn composite_elements(&self) -> Option<&[CompositeElement]> {
        None
    }
}

/// Euclidean norm of a slice
pub(crate) fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Size checks shared by all implementations of `integrate`.
pub(crate) fn check_integrate<L: LieGroupOperation + ?Sized>(
    op: &L,
    q: &[f64],
    v: &[f64],
    out: &[f64],
) -> Result<(), KinematicsError> {
    check_size(op.nq(), q.len())?;
    check_size(op.nv(), v.len())?;
    check_size(op.nq(), out.len())
}

/// Size checks shared by all implementations of `difference`.
pub(crate) fn check_difference<L: LieGroupOperation + ?Sized>(
    op: &L,
    q1: &[f64],
    q0: &[f64],
    out: &[f64],
) -> Result<(), KinematicsError> {
    check_size(op.nq(), q1.len())?;
    check_size(op.nq(), q0.len())?;
    check_size(op.nv(), out.len())
}

#[cfg(test)]
pub(crate) mod tests {
    //! Contract checks shared by the tests of all operations

    use super::*;
    use approx::assert_abs_diff_eq;

    /// `integrate(q, 0) == q`, `difference(q, q) == 0`, and the interpolation boundaries
    pub(crate) fn check_contracts(op: &dyn LieGroupOperation, q0: &[f64], q1: &[f64]) {
        let zero = vec![0.0; op.nv()];
        let mut out = vec![0.0; op.nq()];

        op.integrate(q0, &zero, &mut out).unwrap();
        assert_abs_diff_eq!(out.as_slice(), q0, epsilon = 1e-12);

        let mut v = vec![1.0; op.nv()];
        op.difference(q0, q0, &mut v).unwrap();
        assert_abs_diff_eq!(norm(&v), 0.0, epsilon = 1e-12);

        op.interpolate(q0, q1, 0.0, &mut out).unwrap();
        assert_abs_diff_eq!(op.distance(&out, q0).unwrap(), 0.0, epsilon = 1e-9);
        op.interpolate(q0, q1, 1.0, &mut out).unwrap();
        assert_abs_diff_eq!(op.distance(&out, q1).unwrap(), 0.0, epsilon = 1e-9);

        // integrate inverts difference
        let mut v = vec![0.0; op.nv()];
        op.difference(q1, q0, &mut v).unwrap();
        op.integrate(q0, &v, &mut out).unwrap();
        assert_abs_diff_eq!(op.distance(&out, q1).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(op.distance(q0, q1).unwrap(), norm(&v), epsilon = 1e-12);
    }

    #[test_log::test]
    fn test_size_mismatch() {
        let op = VectorSpace::new(2, false);
        let mut out = [0.0; 2];
        let result = op.integrate(&[0.0, 1.0, 2.0], &[0.0, 0.0], &mut out);
        assert!(matches!(
            result,
            Err(KinematicsError::ConfigurationSizeMismatch { expected: 2, actual: 3 })
        ));
        let result = op.set_bound(&[1.0, 1.0], &mut [0.0; 3]);
        assert!(matches!(
            result,
            Err(KinematicsError::ConfigurationSizeMismatch { expected: 2, actual: 3 })
        ));
    }
}

//! Rigid-motion groups SE(2) and SE(3).
//!
//! Unlike the product `R^n × SO(n)` (see [super::CartesianProduct]), translation and rotation are
//! coupled through the group exponential: `integrate(q, v) = q * exp(v)` moves along a screw motion
//! expressed in the local frame of `q`.

use super::{
    check_difference, check_integrate,
    special_orthogonal::{so2_from_slice, so3_from_slice, write_so2, write_so3},
    LieGroupOperation,
};
use crate::{errors::check_size, KinematicsError};
use nalgebra::{
    Isometry2, Isometry3, Matrix3, Translation2, Translation3, UnitComplex, UnitQuaternion, Vector2, Vector3, Vector6,
};

/// Below this angle, closed form expressions are replaced by their Taylor expansions
const SMALL_ANGLE: f64 = 1e-6;

/// Reads a rigid motion stored as `[x, y, z, qx, qy, qz, qw]`.
pub(crate) fn se3_from_slice(q: &[f64]) -> Isometry3<f64> {
    Isometry3::from_parts(Translation3::new(q[0], q[1], q[2]), so3_from_slice(&q[3..7]))
}

fn write_se3(m: &Isometry3<f64>, out: &mut [f64]) {
    out[..3].copy_from_slice(m.translation.vector.as_slice());
    write_so3(&m.rotation, &mut out[3..7]);
}

/// Reads a planar rigid motion stored as `[x, y, cos θ, sin θ]`.
pub(crate) fn se2_from_slice(q: &[f64]) -> Isometry2<f64> {
    Isometry2::from_parts(Translation2::new(q[0], q[1]), so2_from_slice(&q[2..4]))
}

fn write_se2(m: &Isometry2<f64>, out: &mut [f64]) {
    out[..2].copy_from_slice(m.translation.vector.as_slice());
    write_so2(&m.rotation, &mut out[2..4]);
}

/// Exponential map of se(3), `v = [linear, angular]`
pub fn exp6(v: &[f64]) -> Isometry3<f64> {
    let linear = Vector3::new(v[0], v[1], v[2]);
    let angular = Vector3::new(v[3], v[4], v[5]);
    let theta = angular.norm();
    let (a, b) = if theta < SMALL_ANGLE {
        let theta2 = theta * theta;
        (0.5 - theta2 / 24.0, 1.0 / 6.0 - theta2 / 120.0)
    } else {
        let theta2 = theta * theta;
        ((1.0 - theta.cos()) / theta2, (theta - theta.sin()) / (theta2 * theta))
    };
    let wx = angular.cross_matrix();
    let jacobian = Matrix3::identity() + a * wx + b * wx * wx;
    Isometry3::from_parts(
        Translation3::from(jacobian * linear),
        UnitQuaternion::from_scaled_axis(angular),
    )
}

/// Logarithm map of SE(3), returns `[linear, angular]`
pub fn log6(m: &Isometry3<f64>) -> Vector6<f64> {
    let angular = m.rotation.scaled_axis();
    let theta = angular.norm();
    let c = if theta < SMALL_ANGLE {
        1.0 / 12.0 + theta * theta / 720.0
    } else {
        (1.0 - theta * theta.sin() / (2.0 * (1.0 - theta.cos()))) / (theta * theta)
    };
    let wx = angular.cross_matrix();
    let inverse_jacobian = Matrix3::identity() - 0.5 * wx + c * wx * wx;
    let linear = inverse_jacobian * m.translation.vector;
    Vector6::new(linear.x, linear.y, linear.z, angular.x, angular.y, angular.z)
}

/// Coefficients `(sin θ / θ, (1 - cos θ) / θ)` of the left Jacobian of SO(2)
fn se2_coefficients(theta: f64) -> (f64, f64) {
    if theta.abs() < SMALL_ANGLE {
        let theta2 = theta * theta;
        (1.0 - theta2 / 6.0, theta / 2.0 - theta * theta2 / 24.0)
    } else {
        (theta.sin() / theta, (1.0 - theta.cos()) / theta)
    }
}

/// Exponential map of se(2), `v = [vx, vy, ω]`
pub fn exp3(v: &[f64]) -> Isometry2<f64> {
    let (a, b) = se2_coefficients(v[2]);
    Isometry2::from_parts(
        Translation2::new(a * v[0] - b * v[1], b * v[0] + a * v[1]),
        UnitComplex::new(v[2]),
    )
}

/// Logarithm map of SE(2), returns `[vx, vy, ω]`
pub fn log3(m: &Isometry2<f64>) -> Vector3<f64> {
    let theta = m.rotation.angle();
    let (a, b) = se2_coefficients(theta);
    let t: Vector2<f64> = m.translation.vector;
    let det = a * a + b * b;
    Vector3::new((a * t.x + b * t.y) / det, (-b * t.x + a * t.y) / det, theta)
}

/// SE(3): free-floating rigid motion `[x, y, z, qx, qy, qz, qw]` with tangent `[v, ω]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialEuclidean3;

impl LieGroupOperation for SpecialEuclidean3 {
    fn name(&self) -> String {
        "SE(3)".to_string()
    }

    fn nq(&self) -> usize {
        7
    }

    fn nv(&self) -> usize {
        6
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(7, out.len())?;
        out.copy_from_slice(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
        Ok(())
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        write_se3(&(se3_from_slice(q) * exp6(v)), out);
        Ok(())
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        let delta = se3_from_slice(q0).inverse() * se3_from_slice(q1);
        out.copy_from_slice(log6(&delta).as_slice());
        Ok(())
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(7, lower.len())?;
        check_size(7, upper.len())?;
        lower[..3].fill(f64::NEG_INFINITY);
        upper[..3].fill(f64::INFINITY);
        lower[3..].fill(-1.0);
        upper[3..].fill(1.0);
        Ok(())
    }
}

/// SE(2): planar rigid motion `[x, y, cos θ, sin θ]` with tangent `[vx, vy, ω]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialEuclidean2;

impl LieGroupOperation for SpecialEuclidean2 {
    fn name(&self) -> String {
        "SE(2)".to_string()
    }

    fn nq(&self) -> usize {
        4
    }

    fn nv(&self) -> usize {
        3
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(4, out.len())?;
        out.copy_from_slice(&[0.0, 0.0, 1.0, 0.0]);
        Ok(())
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        write_se2(&(se2_from_slice(q) * exp3(v)), out);
        Ok(())
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        let delta = se2_from_slice(q0).inverse() * se2_from_slice(q1);
        out.copy_from_slice(log3(&delta).as_slice());
        Ok(())
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(4, lower.len())?;
        check_size(4, upper.len())?;
        lower[..2].fill(f64::NEG_INFINITY);
        upper[..2].fill(f64::INFINITY);
        lower[2..].fill(-1.0);
        upper[2..].fill(1.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liegroup::tests::check_contracts;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn se3(translation: [f64; 3], axis: Vector3<f64>, angle: f64) -> Vec<f64> {
        let mut q = vec![0.0; 7];
        write_se3(
            &Isometry3::from_parts(
                Translation3::from(Vector3::from(translation)),
                UnitQuaternion::from_scaled_axis(axis.normalize() * angle),
            ),
            &mut q,
        );
        q
    }

    #[test_log::test]
    fn test_contracts() {
        let q0 = se3([1.0, -2.0, 0.5], Vector3::new(0.0, 1.0, 1.0), 0.7);
        let q1 = se3([-0.3, 4.0, 2.0], Vector3::new(1.0, -1.0, 0.2), 2.5);
        check_contracts(&SpecialEuclidean3, &q0, &q1);

        let q0 = [1.0, 2.0, 0.4_f64.cos(), 0.4_f64.sin()];
        let q1 = [-3.0, 0.5, (-2.0_f64).cos(), (-2.0_f64).sin()];
        check_contracts(&SpecialEuclidean2, &q0, &q1);
    }

    #[test_log::test]
    fn test_exp_log_inverse() {
        for v in [
            [0.1, -0.2, 0.3, 0.0, 0.0, 0.0],
            [1.0, 2.0, 3.0, 1e-8, -2e-8, 0.0],
            [0.5, -1.0, 0.0, 0.3, 1.2, -0.7],
        ] {
            let log = log6(&exp6(&v));
            assert_abs_diff_eq!(log.as_slice(), v.as_slice(), epsilon = 1e-9);
        }
        for v in [[0.3, 0.2, 0.0], [1.0, -2.0, 1e-9], [1.0, -2.0, 2.5]] {
            let log = log3(&exp3(&v));
            assert_abs_diff_eq!(log.as_slice(), v.as_slice(), epsilon = 1e-9);
        }
    }

    #[test_log::test]
    fn test_screw_motion_couples_translation() {
        // Moving forward along x while turning by π/2 about z ends on a quarter circle
        let mut q = [0.0; 4];
        SpecialEuclidean2.integrate(&[0.0, 0.0, 1.0, 0.0], &[FRAC_PI_2, 0.0, FRAC_PI_2], &mut q).unwrap();
        assert_abs_diff_eq!(q.as_slice(), [1.0, 1.0, 0.0, 1.0].as_slice(), epsilon = 1e-12);

        let mut q = [0.0; 7];
        let q0 = se3([0.0, 0.0, 0.0], Vector3::z(), 0.0);
        SpecialEuclidean3
            .integrate(&q0, &[FRAC_PI_2, 0.0, 0.0, 0.0, 0.0, FRAC_PI_2], &mut q)
            .unwrap();
        assert_abs_diff_eq!(&q[..3], [1.0, 1.0, 0.0].as_slice(), epsilon = 1e-12);
    }
}

//! Rotation groups SO(2) and SO(3) with redundant (singularity free) configurations.

use super::{check_difference, check_integrate, LieGroupOperation};
use crate::{errors::check_size, KinematicsError};
use nalgebra::{Quaternion, UnitComplex, UnitQuaternion, Vector3};

/// Reads a planar rotation stored as `[cos, sin]` (need not be normalized).
pub(crate) fn so2_from_slice(q: &[f64]) -> UnitComplex<f64> {
    UnitComplex::new(q[1].atan2(q[0]))
}

pub(crate) fn write_so2(r: &UnitComplex<f64>, out: &mut [f64]) {
    out[0] = r.cos_angle();
    out[1] = r.sin_angle();
}

/// Reads a rotation stored as quaternion `[x, y, z, w]` (need not be normalized).
pub(crate) fn so3_from_slice(q: &[f64]) -> UnitQuaternion<f64> {
    UnitQuaternion::new_normalize(Quaternion::new(q[3], q[0], q[1], q[2]))
}

pub(crate) fn write_so3(r: &UnitQuaternion<f64>, out: &mut [f64]) {
    out.copy_from_slice(r.quaternion().coords.as_slice());
}

/// SO(2): a rotation angle stored as `[cos θ, sin θ]`. Used for unbounded revolute joints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialOrthogonal2;

impl LieGroupOperation for SpecialOrthogonal2 {
    fn name(&self) -> String {
        "SO(2)".to_string()
    }

    fn nq(&self) -> usize {
        2
    }

    fn nv(&self) -> usize {
        1
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(2, out.len())?;
        out.copy_from_slice(&[1.0, 0.0]);
        Ok(())
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        write_so2(&(so2_from_slice(q) * UnitComplex::new(v[0])), out);
        Ok(())
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        out[0] = so2_from_slice(q0).rotation_to(&so2_from_slice(q1)).angle();
        Ok(())
    }

    fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        check_size(2, q0.len())?;
        check_size(2, q1.len())?;
        Ok(so2_from_slice(q0).angle_to(&so2_from_slice(q1)).abs())
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(2, lower.len())?;
        check_size(2, upper.len())?;
        lower.fill(-1.0);
        upper.fill(1.0);
        Ok(())
    }
}

/// SO(3): a rotation stored as unit quaternion `[x, y, z, w]`. Tangent vectors are rotation vectors
/// expressed in the local (rotated) frame, i.e., `integrate(q, v) = q * exp(v)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpecialOrthogonal3;

impl LieGroupOperation for SpecialOrthogonal3 {
    fn name(&self) -> String {
        "SO(3)".to_string()
    }

    fn nq(&self) -> usize {
        4
    }

    fn nv(&self) -> usize {
        3
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(4, out.len())?;
        out.copy_from_slice(&[0.0, 0.0, 0.0, 1.0]);
        Ok(())
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        let delta = UnitQuaternion::from_scaled_axis(Vector3::from_column_slice(v));
        write_so3(&(so3_from_slice(q) * delta), out);
        Ok(())
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        let log = (so3_from_slice(q0).inverse() * so3_from_slice(q1)).scaled_axis();
        out.copy_from_slice(log.as_slice());
        Ok(())
    }

    fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        check_size(4, q0.len())?;
        check_size(4, q1.len())?;
        Ok(so3_from_slice(q0).angle_to(&so3_from_slice(q1)))
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(4, lower.len())?;
        check_size(4, upper.len())?;
        lower.fill(-1.0);
        upper.fill(1.0);
        Ok(())
    }
}

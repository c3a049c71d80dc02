//! Flat Euclidean configuration spaces (prismatic joints, bounded revolute joints, ...).

use super::{check_difference, check_integrate, LieGroupOperation};
use crate::{errors::check_size, KinematicsError};
use itertools::izip;
use std::f64::consts::PI;

/// The vector space `R^n`. Integration is addition, the difference is subtraction.
///
/// `bounded` marks kinds with conventional finite limits (`[-π, π]`, e.g., a bounded revolute
/// joint) as opposed to intrinsically unbounded coordinates (e.g., a translation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorSpace {
    dim: usize,
    bounded: bool,
}

impl VectorSpace {
    pub fn new(dim: usize, bounded: bool) -> Self {
        Self { dim, bounded }
    }

    pub fn is_bounded(&self) -> bool {
        self.bounded
    }
}

impl LieGroupOperation for VectorSpace {
    fn name(&self) -> String {
        format!("R^{}", self.dim)
    }

    fn nq(&self) -> usize {
        self.dim
    }

    fn nv(&self) -> usize {
        self.dim
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.dim, out.len())?;
        out.fill(0.0);
        Ok(())
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        izip!(out.iter_mut(), q, v).for_each(|(o, q, v)| *o = q + v);
        Ok(())
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        izip!(out.iter_mut(), q1, q0).for_each(|(o, q1, q0)| *o = q1 - q0);
        Ok(())
    }

    fn interpolate(&self, q0: &[f64], q1: &[f64], alpha: f64, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.dim, q0.len())?;
        check_size(self.dim, q1.len())?;
        check_size(self.dim, out.len())?;
        izip!(out.iter_mut(), q0, q1).for_each(|(o, q0, q1)| *o = (1.0 - alpha) * q0 + alpha * q1);
        Ok(())
    }

    fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        check_size(self.dim, q0.len())?;
        check_size(self.dim, q1.len())?;
        Ok(q0.iter().zip(q1).map(|(a, b)| (b - a) * (b - a)).sum::<f64>().sqrt())
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.dim, lower.len())?;
        check_size(self.dim, upper.len())?;
        let limit = if self.bounded { PI } else { f64::INFINITY };
        lower.fill(-limit);
        upper.fill(limit);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::liegroup::tests::check_contracts;
    use approx::assert_abs_diff_eq;

    #[test_log::test]
    fn test_contracts() {
        check_contracts(&VectorSpace::new(1, true), &[0.3], &[-1.2]);
        check_contracts(&VectorSpace::new(3, false), &[0.3, 1.0, -4.0], &[-1.2, 2.0, 0.5]);
    }

    #[test_log::test]
    fn test_arithmetic() {
        let op = VectorSpace::new(2, false);
        let mut out = [0.0; 2];
        op.integrate(&[1.0, 2.0], &[0.5, -1.0], &mut out).unwrap();
        assert_eq!(out, [1.5, 1.0]);
        op.difference(&[1.0, 2.0], &[0.5, -1.0], &mut out).unwrap();
        assert_eq!(out, [0.5, 3.0]);
        op.interpolate(&[0.0, 0.0], &[2.0, 4.0], 0.25, &mut out).unwrap();
        assert_eq!(out, [0.5, 1.0]);
        assert_abs_diff_eq!(op.distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap(), 5.0);
    }

    #[test_log::test]
    fn test_bounds() {
        let (mut lower, mut upper) = ([0.0; 1], [0.0; 1]);
        VectorSpace::new(1, true).default_bounds(&mut lower, &mut upper).unwrap();
        assert_eq!((lower, upper), ([-PI], [PI]));

        VectorSpace::new(1, false).default_bounds(&mut lower, &mut upper).unwrap();
        assert_eq!((lower, upper), ([f64::NEG_INFINITY], [f64::INFINITY]));

        let mut out = [0.0; 2];
        VectorSpace::new(2, true).set_bound(&[-1.0, 1.0], &mut out).unwrap();
        assert_eq!(out, [-1.0, 1.0]);
    }
}

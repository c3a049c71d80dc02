//! Cartesian product of two independent operations.

use super::{check_difference, check_integrate, LieGroupOperation, OperationRef};
use crate::{errors::check_size, KinematicsError};
use std::sync::Arc;

/// The product `A × B` of two operations acting on disjoint, consecutive slices of the
/// configuration (`[A | B]`) and tangent vectors.
///
/// It is used to approximate rigid motions as decoupled translation and rotation (e.g., `R^3 × SO(3)`
/// for a free-floating joint).
///
/// The distance combines the factors like a Euclidean norm: `sqrt(d_A² + d_B²)`. The per-factor
/// distances are available with [CartesianProduct::distances].
#[derive(Debug, Clone)]
pub struct CartesianProduct {
    first: OperationRef,
    second: OperationRef,
}

impl CartesianProduct {
    pub fn new(first: impl LieGroupOperation + 'static, second: impl LieGroupOperation + 'static) -> Self {
        Self::from_refs(Arc::new(first), Arc::new(second))
    }

    pub fn from_refs(first: OperationRef, second: OperationRef) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &OperationRef {
        &self.first
    }

    pub fn second(&self) -> &OperationRef {
        &self.second
    }

    /// Distances within each factor
    pub fn distances(&self, q0: &[f64], q1: &[f64]) -> Result<[f64; 2], KinematicsError> {
        check_size(self.nq(), q0.len())?;
        check_size(self.nq(), q1.len())?;
        let (q0a, q0b) = q0.split_at(self.first.nq());
        let (q1a, q1b) = q1.split_at(self.first.nq());
        Ok([self.first.distance(q0a, q1a)?, self.second.distance(q0b, q1b)?])
    }
}

impl LieGroupOperation for CartesianProduct {
    fn name(&self) -> String {
        format!("{}*{}", self.first.name(), self.second.name())
    }

    fn nq(&self) -> usize {
        self.first.nq() + self.second.nq()
    }

    fn nv(&self) -> usize {
        self.first.nv() + self.second.nv()
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq(), out.len())?;
        let (a, b) = out.split_at_mut(self.first.nq());
        self.first.neutral(a)?;
        self.second.neutral(b)
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        let (nq, nv) = (self.first.nq(), self.first.nv());
        let (out_a, out_b) = out.split_at_mut(nq);
        self.first.integrate(&q[..nq], &v[..nv], out_a)?;
        self.second.integrate(&q[nq..], &v[nv..], out_b)
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        let (nq, nv) = (self.first.nq(), self.first.nv());
        let (out_a, out_b) = out.split_at_mut(nv);
        self.first.difference(&q1[..nq], &q0[..nq], out_a)?;
        self.second.difference(&q1[nq..], &q0[nq..], out_b)
    }

    fn interpolate(&self, q0: &[f64], q1: &[f64], alpha: f64, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq(), q0.len())?;
        check_size(self.nq(), q1.len())?;
        check_size(self.nq(), out.len())?;
        let nq = self.first.nq();
        let (out_a, out_b) = out.split_at_mut(nq);
        self.first.interpolate(&q0[..nq], &q1[..nq], alpha, out_a)?;
        self.second.interpolate(&q0[nq..], &q1[nq..], alpha, out_b)
    }

    fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        let [a, b] = self.distances(q0, q1)?;
        Ok(a.hypot(b))
    }

    fn set_bound(&self, bounds: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq(), bounds.len())?;
        check_size(self.nq(), out.len())?;
        let nq = self.first.nq();
        let (out_a, out_b) = out.split_at_mut(nq);
        self.first.set_bound(&bounds[..nq], out_a)?;
        self.second.set_bound(&bounds[nq..], out_b)
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq(), lower.len())?;
        check_size(self.nq(), upper.len())?;
        let nq = self.first.nq();
        let (lower_a, lower_b) = lower.split_at_mut(nq);
        let (upper_a, upper_b) = upper.split_at_mut(nq);
        self.first.default_bounds(lower_a, upper_a)?;
        self.second.default_bounds(lower_b, upper_b)
    }

    fn decouples_translation(&self) -> bool {
        true
    }
}

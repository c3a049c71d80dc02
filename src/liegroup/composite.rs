//! Operation of a composite joint, i.e., several elementary joints stacked into one.

use super::{check_difference, check_integrate, LieGroupOperation, OperationRef};
use crate::{errors::check_size, KinematicsError};
use itertools::Itertools;
use std::ops::Range;

/// An element of a composite operation and its slices in the composite's vectors.
#[derive(Debug, Clone)]
pub struct CompositeElement {
    pub operation: OperationRef,
    pub q: Range<usize>,
    pub v: Range<usize>,
}

/// Concatenation of an ordered list of operations. Every method dispatches to the elements, each
/// of which reads and writes its own sub-slice only. Like [super::CartesianProduct], distances
/// of the elements are combined as `sqrt(Σ d_i²)`.
#[derive(Debug, Clone, Default)]
pub struct CompositeOperation {
    elements: Vec<CompositeElement>,
    nq: usize,
    nv: usize,
}

impl CompositeOperation {
    pub fn new(operations: impl IntoIterator<Item = OperationRef>) -> Self {
        let mut result = Self::default();
        operations.into_iter().for_each(|op| result.push(op));
        result
    }

    /// Appends an operation behind the current ones
    pub fn push(&mut self, operation: OperationRef) {
        let (nq, nv) = (operation.nq(), operation.nv());
        self.elements.push(CompositeElement {
            operation,
            q: self.nq..self.nq + nq,
            v: self.nv..self.nv + nv,
        });
        self.nq += nq;
        self.nv += nv;
    }

    pub fn elements(&self) -> &[CompositeElement] {
        &self.elements
    }

    /// Distances within each element
    pub fn distances(&self, q0: &[f64], q1: &[f64]) -> Result<Vec<f64>, KinematicsError> {
        check_size(self.nq, q0.len())?;
        check_size(self.nq, q1.len())?;
        self.elements
            .iter()
            .map(|e| e.operation.distance(&q0[e.q.clone()], &q1[e.q.clone()]))
            .collect()
    }
}

impl LieGroupOperation for CompositeOperation {
    fn name(&self) -> String {
        self.elements.iter().map(|e| e.operation.name()).join("*")
    }

    fn nq(&self) -> usize {
        self.nq
    }

    fn nv(&self) -> usize {
        self.nv
    }

    fn neutral(&self, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, out.len())?;
        self.elements
            .iter()
            .try_for_each(|e| e.operation.neutral(&mut out[e.q.clone()]))
    }

    fn integrate(&self, q: &[f64], v: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_integrate(self, q, v, out)?;
        self.elements.iter().try_for_each(|e| {
            e.operation
                .integrate(&q[e.q.clone()], &v[e.v.clone()], &mut out[e.q.clone()])
        })
    }

    fn difference(&self, q1: &[f64], q0: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_difference(self, q1, q0, out)?;
        self.elements.iter().try_for_each(|e| {
            e.operation
                .difference(&q1[e.q.clone()], &q0[e.q.clone()], &mut out[e.v.clone()])
        })
    }

    fn interpolate(&self, q0: &[f64], q1: &[f64], alpha: f64, out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, q0.len())?;
        check_size(self.nq, q1.len())?;
        check_size(self.nq, out.len())?;
        self.elements.iter().try_for_each(|e| {
            e.operation
                .interpolate(&q0[e.q.clone()], &q1[e.q.clone()], alpha, &mut out[e.q.clone()])
        })
    }

    fn distance(&self, q0: &[f64], q1: &[f64]) -> Result<f64, KinematicsError> {
        Ok(self.distances(q0, q1)?.iter().map(|d| d * d).sum::<f64>().sqrt())
    }

    fn set_bound(&self, bounds: &[f64], out: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, bounds.len())?;
        check_size(self.nq, out.len())?;
        self.elements
            .iter()
            .try_for_each(|e| e.operation.set_bound(&bounds[e.q.clone()], &mut out[e.q.clone()]))
    }

    fn default_bounds(&self, lower: &mut [f64], upper: &mut [f64]) -> Result<(), KinematicsError> {
        check_size(self.nq, lower.len())?;
        check_size(self.nq, upper.len())?;
        self.elements
            .iter()
            .try_for_each(|e| e.operation.default_bounds(&mut lower[e.q.clone()], &mut upper[e.q.clone()]))
    }

    fn composite_elements(&self) -> Option<&[CompositeElement]> {
        Some(&self.elements)
    }
}

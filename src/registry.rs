//! Maps joint kinds to the Lie group operations acting on their configurations.

use crate::{
    errors::check_size,
    joint::{JointKind, JointKindTag},
    liegroup::{
        CartesianProduct, CompositeOperation, OperationRef, SpecialEuclidean2, SpecialEuclidean3, SpecialOrthogonal2,
        SpecialOrthogonal3, VectorSpace,
    },
    KinematicsError,
};
use std::{collections::HashMap, sync::Arc};
use tracing::trace;

/// Named policies for free-floating and planar joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LieGroupPolicy {
    /// Rigid motions use SE(3) and SE(2) (translation and rotation are coupled)
    #[default]
    Exact,
    /// Rigid motions use `R^3 × SO(3)` and `R^2 × SO(2)` (translation and rotation are independent)
    Decoupled,
}

/// Runtime table holding one shared operation per joint kind.
///
/// Looking up a kind without an entry fails with [KinematicsError::UnsupportedJointKind]; there is no
/// fallback. Composite kinds never have an entry of their own: they are resolved element by element.
#[derive(Debug, Clone)]
pub struct LieGroupRegistry {
    table: HashMap<JointKindTag, OperationRef>,
}

impl LieGroupRegistry {
    /// Registry without any entries. Use [LieGroupRegistry::register] to fill it.
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    pub fn new(policy: LieGroupPolicy) -> Self {
        let mut registry = Self::empty();
        let bounded: OperationRef = Arc::new(VectorSpace::new(1, true));
        let unbounded: OperationRef = Arc::new(VectorSpace::new(1, false));

        registry.register(JointKindTag::Revolute, bounded.clone());
        registry.register(JointKindTag::RevoluteUnaligned, bounded);
        registry.register(JointKindTag::RevoluteUnbounded, Arc::new(SpecialOrthogonal2));
        registry.register(JointKindTag::Prismatic, unbounded.clone());
        registry.register(JointKindTag::PrismaticUnaligned, unbounded);
        registry.register(JointKindTag::Translation, Arc::new(VectorSpace::new(3, false)));
        registry.register(JointKindTag::Spherical, Arc::new(SpecialOrthogonal3));
        registry.register(JointKindTag::SphericalZyx, Arc::new(VectorSpace::new(3, true)));

        match policy {
            LieGroupPolicy::Exact => {
                registry.register(JointKindTag::FreeFlyer, Arc::new(SpecialEuclidean3));
                registry.register(JointKindTag::Planar, Arc::new(SpecialEuclidean2));
            }
            LieGroupPolicy::Decoupled => {
                registry.register(
                    JointKindTag::FreeFlyer,
                    Arc::new(CartesianProduct::new(VectorSpace::new(3, false), SpecialOrthogonal3)),
                );
                registry.register(
                    JointKindTag::Planar,
                    Arc::new(CartesianProduct::new(VectorSpace::new(2, false), SpecialOrthogonal2)),
                );
            }
        }
        registry
    }

    /// SE(n) for rigid motions
    pub fn exact() -> Self {
        Self::new(LieGroupPolicy::Exact)
    }

    /// `R^n × SO(n)` for rigid motions
    pub fn decoupled() -> Self {
        Self::new(LieGroupPolicy::Decoupled)
    }

    /// Adds or replaces the operation of a joint kind. Returns the replaced operation.
    pub fn register(&mut self, tag: JointKindTag, operation: OperationRef) -> Option<OperationRef> {
        self.table.insert(tag, operation)
    }

    pub fn is_registered(&self, tag: JointKindTag) -> bool {
        self.table.contains_key(&tag)
    }

    /// Resolves the operation of a joint kind. The operation's dimensions must match the joint's
    /// configuration layout.
    pub fn operation(&self, kind: &JointKind) -> Result<OperationRef, KinematicsError> {
        let operation: OperationRef = match kind {
            JointKind::Composite(kinds) => Arc::new(CompositeOperation::new(
                kinds
                    .iter()
                    .map(|kind| self.operation(kind))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
            _ => self
                .table
                .get(&kind.tag())
                .cloned()
                .ok_or(KinematicsError::UnsupportedJointKind(kind.tag()))?,
        };
        check_size(kind.nq(), operation.nq())?;
        check_size(kind.nv(), operation.nv())?;
        trace!("Resolved {:?} to {}", kind.tag(), operation.name());
        Ok(operation)
    }
}

impl Default for LieGroupRegistry {
    fn default() -> Self {
        Self::exact()
    }
}

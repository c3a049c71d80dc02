//! ## About
//!
//! This crate contains the configuration space algebra of articulated rigid bodies (robots, characters)
//! and the computation of the center of mass of selected parts of their kinematic tree.
//!
//! Joint configurations of revolute, spherical and free-floating joints live on Lie groups, not in a
//! vector space. Every [JointKind] is therefore bound to a [liegroup::LieGroupOperation] that integrates,
//! differentiates, interpolates and measures its configurations. A [LieGroupRegistry] maps joint kinds to
//! operations; it either uses the exact rigid motion groups SE(3)/SE(2) or decoupled products of
//! translations and rotations ([LieGroupPolicy]).
//!
//! A [KinematicTree] is assembled with a [JointTreeBuilder] and stored in depth-first order such that every
//! subtree is a contiguous range of joint indices. [CenterOfMassComputation] uses these ranges to
//! accumulate the center of mass and its Jacobian over an arbitrary set of disjoint subtrees.
//! World transforms are computed elsewhere and supplied through the [Forward] trait.
//!
//! See [sample::humanoid_simple] to get started.
//!
//! ## Reading list
//!
//! * [A micro Lie theory for state estimation in robotics](https://arxiv.org/abs/1812.01537)
//! * [Rigid Body Dynamics Algorithms](https://doi.org/10.1007/978-1-4899-7560-7) (Featherstone)
//!
//! ## Naming conventions
//! * Traits – capabilities (e.g., [Forward], [liegroup::LieGroupOperation])
//! * Structs – substantives that indicate entities implementing a behavior
//! * Methods – imperative forms with the exception of getters and factories, which
//!             are uses substantives (i.e., omit a `get_` prefix) much like the standard library.

pub mod com;
pub mod errors;
pub mod forward;
pub mod joint;
pub mod liegroup;
pub mod registry;
pub mod sample;
pub mod tree;

pub use com::{CenterOfMassComputation, ComputeSelection};
pub use errors::KinematicsError;
pub use forward::{Forward, PlacementForward};
pub use joint::{Axis, Inertia, JointKind, JointKindTag, Motion};
pub use registry::{LieGroupPolicy, LieGroupRegistry};
pub use tree::{Joint, JointIndex, JointTreeBuilder, KinematicTree, UNIVERSE};

// Backends
#[cfg(feature = "ndarray")]
pub mod ndarray;

/*! Providers of world transforms.
 *
 * The center of mass computation consumes the world transform of every joint frame for a given
 * configuration. It does not compute these itself: any forward kinematics implementation can supply them
 * through the [Forward] trait. [PlacementForward] is a minimal implementation that only accumulates
 * placements and joint transforms along the tree.
 */

use crate::{errors::check_size, KinematicTree, KinematicsError};
use nalgebra::Isometry3;
use tracing::trace;

/// Trait representing a stateful forward kinematics algorithm. It owns the transforms of the last
/// configuration it solved for.
pub trait Forward {
    /// Computes the world transforms of all joint frames (indexed like the tree) for configuration `q`.
    fn solve(&mut self, tree: &KinematicTree, q: &[f64]) -> Result<(), KinematicsError>;

    /// World transforms of the joint frames. Entry 0 is the universe.
    fn transforms(&self) -> &[Isometry3<f64>];

    /// The configuration the transforms were computed for
    fn configuration(&self) -> &[f64];
}

/// Position-only forward kinematics: `oMj = oM(parent) · placement_j · transform_j(q_j)`
#[derive(Debug, Clone, Default)]
pub struct PlacementForward {
    transforms: Vec<Isometry3<f64>>,
    configuration: Vec<f64>,
}

impl PlacementForward {
    /// Initializes the transforms for the neutral configuration of `tree`.
    pub fn new(tree: &KinematicTree) -> Result<Self, KinematicsError> {
        let mut result = Self::default();
        result.solve(tree, &tree.neutral_configuration()?)?;
        Ok(result)
    }
}

impl Forward for PlacementForward {
    fn solve(&mut self, tree: &KinematicTree, q: &[f64]) -> Result<(), KinematicsError> {
        check_size(tree.nq(), q.len())?;
        self.transforms.clear();
        self.transforms.reserve(tree.len());
        // the universe is the world frame, parents always precede their children
        for joint in tree.joints() {
            let transform = if joint.index() == 0 {
                Isometry3::identity()
            } else {
                self.transforms[joint.parent()] * joint.placement() * joint.kind().transform(&q[joint.config_range()])?
            };
            self.transforms.push(transform);
        }
        self.configuration.clear();
        self.configuration.extend_from_slice(q);
        trace!("Solved forward kinematics for {} joints", tree.len());
        Ok(())
    }

    fn transforms(&self) -> &[Isometry3<f64>] {
        &self.transforms
    }

    fn configuration(&self) -> &[f64] {
        &self.configuration
    }
}

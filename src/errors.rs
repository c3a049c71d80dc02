//! Provides the error type used throughout this crate.

use crate::joint::JointKindTag;
use thiserror::Error;

/// The error type used throughout this crate.
///
/// Build-time errors ([KinematicsError::UnsupportedJointKind], [KinematicsError::NotUnique], ...) and
/// precondition violations ([KinematicsError::ConfigurationSizeMismatch],
/// [KinematicsError::InvalidComputeRequest]) indicate a programming error. Only
/// [KinematicsError::OverlappingSubtreeRoot] is expected at runtime.
#[derive(Error, Debug)]
pub enum KinematicsError {
    // Tree bookkeeping
    #[error("Joint reference {0} is out of bound")]
    ReferenceOutOfBound(usize),
    #[error("Joint not in tree: {0}")]
    UnknownJoint(String),
    #[error("Name not unique: {0}")]
    NotUnique(String),
    #[error("No root joint set")]
    RootNotSet,

    // Manifold operations
    #[error("No Lie group operation registered for joint kind {0:?}")]
    UnsupportedJointKind(JointKindTag),
    #[error("Wrong vector size: expected {expected}, got {actual}")]
    ConfigurationSizeMismatch { expected: usize, actual: usize },

    // Center of mass
    #[error("Joint {name} ({joint}) is already in a subtree [{root}, {last}]")]
    OverlappingSubtreeRoot {
        joint: usize,
        name: String,
        root: usize,
        last: usize,
    },
    #[error("Invalid compute request: {0}")]
    InvalidComputeRequest(String),

    // Errors specific to ndarray
    #[cfg(feature = "ndarray")]
    #[error("Error raised by `ndarray`: {0}")]
    ShapeError(#[from] ndarray::ShapeError),
}

/// Returns a [KinematicsError::ConfigurationSizeMismatch] unless `actual == expected`.
pub(crate) fn check_size(expected: usize, actual: usize) -> Result<(), KinematicsError> {
    if expected == actual {
        Ok(())
    } else {
        Err(KinematicsError::ConfigurationSizeMismatch { expected, actual })
    }
}

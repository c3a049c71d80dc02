//! Module for the [ndarray](https://github.com/rust-ndarray/ndarray) backend. Results are exposed as
//! views of the crate's flat buffers (no copies) and 4x4 homogeneous matrices, as used by
//! `ndarray`-based forward kinematics, can be converted from and to transforms.

use crate::{CenterOfMassComputation, KinematicsError};
use nalgebra::{Isometry3, Matrix3, Translation3, UnitQuaternion};
use ndarray::{prelude::*, ErrorKind::IncompatibleShape, ShapeError};

impl CenterOfMassComputation<'_> {
    /// The Jacobian of the center of mass as a 3 × nv array (column-major layout)
    pub fn jacobian_view(&self) -> Result<ArrayView2<'_, f64>, KinematicsError> {
        let (rows, cols) = self.dims();
        Ok(ArrayView2::from_shape((rows, cols).f(), self.jacobian())?)
    }

    pub fn com_view(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.com().as_slice())
    }
}

/// Converts a homogeneous, 4x4 transformation matrix. The rotational part is projected onto the
/// closest rotation.
pub fn isometry_from_homogeneous(matrix: ArrayView2<f64>) -> Result<Isometry3<f64>, KinematicsError> {
    if matrix.dim() != (4, 4) {
        return Err(ShapeError::from_kind(IncompatibleShape).into());
    }
    let rotation = Matrix3::from_fn(|row, col| matrix[[row, col]]);
    let translation = Translation3::new(matrix[[0, 3]], matrix[[1, 3]], matrix[[2, 3]]);
    Ok(Isometry3::from_parts(translation, UnitQuaternion::from_matrix(&rotation)))
}

/// Creates a homogeneous, 4x4 transformation matrix.
pub fn homogeneous_from_isometry(isometry: &Isometry3<f64>) -> Array2<f64> {
    let matrix = isometry.to_homogeneous();
    Array2::from_shape_fn((4, 4), |(row, col)| matrix[(row, col)])
}

#![cfg(feature = "ndarray")]

use approx::assert_abs_diff_eq;
use kinetree::{
    ndarray::{homogeneous_from_isometry, isometry_from_homogeneous},
    sample::humanoid_simple,
    CenterOfMassComputation, ComputeSelection, Forward, LieGroupRegistry, PlacementForward,
};
use ndarray::prelude::*;

#[test]
fn test_jacobian_view() {
    let tree = humanoid_simple(&LieGroupRegistry::exact(), true).unwrap();
    let mut com = CenterOfMassComputation::new(&tree);
    com.add_subtree_root(tree.joint_by_name("root").unwrap().index())
        .unwrap();
    let forward = PlacementForward::new(&tree).unwrap();
    com.compute(ComputeSelection::ComAndJacobian, forward.configuration(), forward.transforms())
        .unwrap();

    let view = com.jacobian_view().unwrap();
    assert_eq!(view.dim(), (3, tree.nv()));
    let matrix = com.jacobian_matrix();
    for ((row, col), value) in view.indexed_iter() {
        assert_eq!(*value, matrix[(row, col)]);
    }
    // translating the base moves the center of mass along with it
    assert_abs_diff_eq!(view.slice(s![.., ..3]), Array2::<f64>::eye(3), epsilon = 1e-12);
    assert_abs_diff_eq!(com.com_view(), ArrayView1::from(com.com().as_slice()));
}

#[test]
fn test_external_transforms() {
    // transforms computed by an ndarray-based forward kinematics
    let tree = humanoid_simple(&LieGroupRegistry::exact(), true).unwrap();
    let forward = PlacementForward::new(&tree).unwrap();
    let external: Vec<Array2<f64>> = forward.transforms().iter().map(homogeneous_from_isometry).collect();
    let transforms = external
        .iter()
        .map(|matrix| isometry_from_homogeneous(matrix.view()))
        .collect::<Result<Vec<_>, _>>()
        .unwrap();

    let root = tree.joint_by_name("root").unwrap().index();
    let mut com = CenterOfMassComputation::new(&tree);
    com.add_subtree_root(root).unwrap();
    com.compute(ComputeSelection::Com, forward.configuration(), &transforms)
        .unwrap();
    let mut reference = CenterOfMassComputation::new(&tree);
    reference.add_subtree_root(root).unwrap();
    reference
        .compute(ComputeSelection::Com, forward.configuration(), forward.transforms())
        .unwrap();
    assert_abs_diff_eq!(*com.com(), *reference.com(), epsilon = 1e-9);
}

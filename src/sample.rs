//! A simple humanoid to experiment with: a floating base, two legs, a torso with a head and two arms.

use crate::{
    joint::{Axis, Inertia, JointKind},
    tree::UNIVERSE,
    JointTreeBuilder, KinematicTree, KinematicsError, LieGroupRegistry,
};
use nalgebra::{Isometry3, Matrix3, Translation3, UnitQuaternion, Vector3};

fn offset(x: f64, y: f64, z: f64) -> Isometry3<f64> {
    Isometry3::from_parts(Translation3::new(x, y, z), UnitQuaternion::identity())
}

/// A rod-like body of length `length` hanging down along -z from the joint
fn segment(mass: f64, length: f64) -> Inertia {
    let rotational = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, 0.0)) * (mass * length * length / 12.0);
    Inertia::new(mass, Vector3::new(0.0, 0.0, -length / 2.0), rotational)
}

/// Builds a humanoid with 26 joints (and the universe).
///
/// The base is a free flyer, or a composite joint of three prismatic and three unbounded revolute
/// joints if `using_free_flyer` is `false`. Legs have 6 revolute joints, arms 4 and a wrist. The wrists
/// are [JointKind::SphericalZyx] joints and the head is a [JointKind::Spherical] joint. Joint names
/// follow the pattern `lleg1`...`lleg6`, `rarm1`...`rarm4`, `lwrist`, `chest1`, `head`.
pub fn humanoid_simple(registry: &LieGroupRegistry, using_free_flyer: bool) -> Result<KinematicTree, KinematicsError> {
    let mut builder = JointTreeBuilder::new();
    let base = if using_free_flyer {
        JointKind::FreeFlyer
    } else {
        JointKind::Composite(vec![
            JointKind::Prismatic(Axis::X),
            JointKind::Prismatic(Axis::Y),
            JointKind::Prismatic(Axis::Z),
            JointKind::RevoluteUnbounded(Axis::Z),
            JointKind::RevoluteUnbounded(Axis::Y),
            JointKind::RevoluteUnbounded(Axis::X),
        ])
    };
    let root = builder.add(
        "root",
        base,
        offset(0.0, 0.0, 1.0),
        Inertia::point_mass(8.0, Vector3::new(0.0, 0.0, 0.05)),
        UNIVERSE,
    )?;

    for (side, y) in [("l", 0.1), ("r", -0.1)] {
        // hip (3 axes), knee, ankle (2 axes)
        let mut parent = root.clone();
        let leg = [
            (Axis::X, offset(0.0, y, -0.1), Inertia::zero()),
            (Axis::Y, Isometry3::identity(), Inertia::zero()),
            (Axis::Z, Isometry3::identity(), segment(4.0, 0.4)),
            (Axis::Y, offset(0.0, 0.0, -0.4), segment(2.5, 0.4)),
            (Axis::Y, offset(0.0, 0.0, -0.4), Inertia::zero()),
            (Axis::X, Isometry3::identity(), Inertia::point_mass(1.0, Vector3::new(0.05, 0.0, -0.05))),
        ];
        for (i, (axis, placement, inertia)) in leg.into_iter().enumerate() {
            let name = format!("{side}leg{}", i + 1);
            parent = builder.add(&name, JointKind::Revolute(axis), placement, inertia, &parent)?;
        }
    }

    let chest1 = builder.add(
        "chest1",
        JointKind::Revolute(Axis::Y),
        offset(0.0, 0.0, 0.1),
        Inertia::zero(),
        &root,
    )?;
    let chest2 = builder.add(
        "chest2",
        JointKind::Revolute(Axis::X),
        Isometry3::identity(),
        Inertia::point_mass(10.0, Vector3::new(0.0, 0.0, 0.2)),
        &chest1,
    )?;
    builder.add(
        "head",
        JointKind::Spherical,
        offset(0.0, 0.0, 0.45),
        Inertia::point_mass(3.0, Vector3::new(0.02, 0.0, 0.1)),
        &chest2,
    )?;

    for (side, y) in [("l", 0.2), ("r", -0.2)] {
        // shoulder (3 axes), elbow, wrist
        let mut parent = chest2.clone();
        let arm = [
            (Axis::X, offset(0.0, y, 0.35), Inertia::zero()),
            (Axis::Y, Isometry3::identity(), Inertia::zero()),
            (Axis::Z, Isometry3::identity(), segment(2.0, 0.3)),
            (Axis::Y, offset(0.0, 0.0, -0.3), segment(1.5, 0.25)),
        ];
        for (i, (axis, placement, inertia)) in arm.into_iter().enumerate() {
            let name = format!("{side}arm{}", i + 1);
            parent = builder.add(&name, JointKind::Revolute(axis), placement, inertia, &parent)?;
        }
        builder.add(
            &format!("{side}wrist"),
            JointKind::SphericalZyx,
            offset(0.0, 0.0, -0.25),
            Inertia::point_mass(0.5, Vector3::new(0.0, 0.0, -0.08)),
            &parent,
        )?;
    }

    builder.build(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_humanoid() {
        let tree = humanoid_simple(&LieGroupRegistry::exact(), true).unwrap();
        assert_eq!(tree.len(), 1 + 1 + 12 + 3 + 10);
        assert_eq!(tree.nv(), 6 + 12 + 2 + 3 + 2 * (4 + 3));
        assert_eq!(tree.nq(), tree.nv() + 1 + 1);

        let root = tree.joint_by_name("root").unwrap();
        assert_eq!(root.index(), 1);
        assert_eq!(root.last_descendant(), tree.len() - 1);
        let lleg = tree.joint_by_name("lleg1").unwrap();
        assert_eq!(tree.joint_by_name("lleg6").unwrap().index(), lleg.last_descendant());
        let head = tree.joint_by_name("head").unwrap();
        assert_eq!(head.parent(), tree.joint_by_name("chest2").unwrap().index());

        let composite = humanoid_simple(&LieGroupRegistry::decoupled(), false).unwrap();
        assert_eq!(composite.nv(), tree.nv());
        assert_eq!(composite.nq(), tree.nq() - 7 + 9);
    }
}

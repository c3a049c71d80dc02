/*! Joint kinds and the rigid bodies attached to them.
 *
 * A [JointKind] fixes the layout of the joint's configuration and velocity vectors (see
 * [crate::liegroup] for the conventions), how a configuration moves the joint frame relative
 * to its placement ([JointKind::transform]) and which motions a velocity produces
 * ([JointKind::motion_subspace]). The algebra of the configuration space itself is delegated to
 * a [crate::liegroup::LieGroupOperation] chosen by a [crate::LieGroupRegistry].
 */

use crate::{
    errors::check_size,
    liegroup::{special_euclidean::se3_from_slice, special_orthogonal::so3_from_slice, LieGroupOperation},
    KinematicsError,
};
use nalgebra::{Isometry3, Matrix3, Translation3, Unit, UnitQuaternion, Vector3};

/// Coordinate axes of a joint frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn unit(&self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }
}

/// The kinds of joints connecting two bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum JointKind {
    /// Rotation about an axis with finite limits, `q = [θ]`
    Revolute(Axis),
    /// Rotation about an axis without limits, `q = [cos θ, sin θ]`
    RevoluteUnbounded(Axis),
    /// Rotation about an arbitrary axis, `q = [θ]`
    RevoluteUnaligned(Unit<Vector3<f64>>),
    /// Translation along an axis, `q = [d]`
    Prismatic(Axis),
    /// Translation along an arbitrary axis, `q = [d]`
    PrismaticUnaligned(Unit<Vector3<f64>>),
    /// Translation in space, `q = [x, y, z]`
    Translation,
    /// Ball joint, `q = [x, y, z, w]` (unit quaternion)
    Spherical,
    /// Ball joint as three stacked revolute joints, `q = [z, y, x]` (angles)
    SphericalZyx,
    /// Free-floating rigid body, `q = [x, y, z, qx, qy, qz, qw]`
    FreeFlyer,
    /// Planar rigid motion in the xy plane, `q = [x, y, cos θ, sin θ]`
    Planar,
    /// Elementary joints stacked in the given order. Configuration and velocity are concatenated.
    Composite(Vec<JointKind>),
}

/// Fieldless discriminant of a [JointKind]. Used to look up operations in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointKindTag {
    Revolute,
    RevoluteUnbounded,
    RevoluteUnaligned,
    Prismatic,
    PrismaticUnaligned,
    Translation,
    Spherical,
    SphericalZyx,
    FreeFlyer,
    Planar,
    Composite,
}

impl JointKind {
    pub fn tag(&self) -> JointKindTag {
        match self {
            JointKind::Revolute(_) => JointKindTag::Revolute,
            JointKind::RevoluteUnbounded(_) => JointKindTag::RevoluteUnbounded,
            JointKind::RevoluteUnaligned(_) => JointKindTag::RevoluteUnaligned,
            JointKind::Prismatic(_) => JointKindTag::Prismatic,
            JointKind::PrismaticUnaligned(_) => JointKindTag::PrismaticUnaligned,
            JointKind::Translation => JointKindTag::Translation,
            JointKind::Spherical => JointKindTag::Spherical,
            JointKind::SphericalZyx => JointKindTag::SphericalZyx,
            JointKind::FreeFlyer => JointKindTag::FreeFlyer,
            JointKind::Planar => JointKindTag::Planar,
            JointKind::Composite(_) => JointKindTag::Composite,
        }
    }

    /// Size of the configuration vector
    pub fn nq(&self) -> usize {
        match self {
            JointKind::Revolute(_)
            | JointKind::RevoluteUnaligned(_)
            | JointKind::Prismatic(_)
            | JointKind::PrismaticUnaligned(_) => 1,
            JointKind::RevoluteUnbounded(_) => 2,
            JointKind::Translation | JointKind::SphericalZyx => 3,
            JointKind::Spherical | JointKind::Planar => 4,
            JointKind::FreeFlyer => 7,
            JointKind::Composite(kinds) => kinds.iter().map(JointKind::nq).sum(),
        }
    }

    /// Size of the velocity vector (degrees of freedom)
    pub fn nv(&self) -> usize {
        match self {
            JointKind::Revolute(_)
            | JointKind::RevoluteUnbounded(_)
            | JointKind::RevoluteUnaligned(_)
            | JointKind::Prismatic(_)
            | JointKind::PrismaticUnaligned(_) => 1,
            JointKind::Translation | JointKind::Spherical | JointKind::SphericalZyx | JointKind::Planar => 3,
            JointKind::FreeFlyer => 6,
            JointKind::Composite(kinds) => kinds.iter().map(JointKind::nv).sum(),
        }
    }

    /// Transformation of the joint frame relative to its placement for configuration `q`.
    pub fn transform(&self, q: &[f64]) -> Result<Isometry3<f64>, KinematicsError> {
        check_size(self.nq(), q.len())?;
        let rotation = |axis: &Unit<Vector3<f64>>, angle: f64| {
            Isometry3::from_parts(Translation3::identity(), UnitQuaternion::from_axis_angle(axis, angle))
        };
        let translation = |v: Vector3<f64>| Isometry3::from_parts(Translation3::from(v), UnitQuaternion::identity());

        let result = match self {
            JointKind::Revolute(axis) => rotation(&axis.unit(), q[0]),
            JointKind::RevoluteUnbounded(axis) => rotation(&axis.unit(), q[1].atan2(q[0])),
            JointKind::RevoluteUnaligned(axis) => rotation(axis, q[0]),
            JointKind::Prismatic(axis) => translation(axis.unit().into_inner() * q[0]),
            JointKind::PrismaticUnaligned(axis) => translation(axis.into_inner() * q[0]),
            JointKind::Translation => translation(Vector3::new(q[0], q[1], q[2])),
            JointKind::Spherical => Isometry3::from_parts(Translation3::identity(), so3_from_slice(q)),
            JointKind::SphericalZyx => Isometry3::from_parts(
                Translation3::identity(),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), q[0])
                    * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), q[1])
                    * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), q[2]),
            ),
            JointKind::FreeFlyer => se3_from_slice(q),
            JointKind::Planar => Isometry3::from_parts(
                Translation3::new(q[0], q[1], 0.0),
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), q[3].atan2(q[2])),
            ),
            JointKind::Composite(kinds) => {
                let mut offset = 0;
                let mut result = Isometry3::identity();
                for kind in kinds {
                    result *= kind.transform(&q[offset..offset + kind.nq()])?;
                    offset += kind.nq();
                }
                result
            }
        };
        Ok(result)
    }

    /// Writes the joint's motion subspace (one [Motion] per degree of freedom, expressed in the joint
    /// frame) for configuration `q` into `out`.
    ///
    /// The subspace is consistent with the *exact* Lie group operations: moving along the tangent
    /// vector `v` right-multiplies the joint transform by `exp(Σ v_i · out_i)` to first order.
    pub fn motion_subspace(&self, q: &[f64], out: &mut [Motion]) -> Result<(), KinematicsError> {
        self.subspace(q, None, out)
    }

    /// Like [JointKind::motion_subspace] but consistent with `operation`, the operation that
    /// integrates this joint's configuration. Free-flyer and planar translations of operations that
    /// [decouple](LieGroupOperation::decouples_translation) them move along the parent's axes.
    pub fn motion_subspace_for(
        &self,
        operation: &dyn LieGroupOperation,
        q: &[f64],
        out: &mut [Motion],
    ) -> Result<(), KinematicsError> {
        check_size(self.nq(), operation.nq())?;
        check_size(self.nv(), operation.nv())?;
        self.subspace(q, Some(operation), out)
    }

    fn subspace(
        &self,
        q: &[f64],
        operation: Option<&dyn LieGroupOperation>,
        out: &mut [Motion],
    ) -> Result<(), KinematicsError> {
        check_size(self.nq(), q.len())?;
        check_size(self.nv(), out.len())?;
        let decoupled = operation.is_some_and(|op| op.decouples_translation());
        match self {
            JointKind::Revolute(axis) | JointKind::RevoluteUnbounded(axis) => {
                out[0] = Motion::angular(axis.unit().into_inner());
            }
            JointKind::RevoluteUnaligned(axis) => out[0] = Motion::angular(axis.into_inner()),
            JointKind::Prismatic(axis) => out[0] = Motion::linear(axis.unit().into_inner()),
            JointKind::PrismaticUnaligned(axis) => out[0] = Motion::linear(axis.into_inner()),
            JointKind::Translation => {
                out.iter_mut()
                    .zip(unit_vectors())
                    .for_each(|(m, e)| *m = Motion::linear(e));
            }
            JointKind::Spherical => {
                out.iter_mut()
                    .zip(unit_vectors())
                    .for_each(|(m, e)| *m = Motion::angular(e));
            }
            JointKind::SphericalZyx => {
                let (s1, c1) = q[1].sin_cos();
                let (s2, c2) = q[2].sin_cos();
                out[0] = Motion::angular(Vector3::new(-s1, c1 * s2, c1 * c2));
                out[1] = Motion::angular(Vector3::new(0.0, c2, -s2));
                out[2] = Motion::angular(Vector3::x());
            }
            JointKind::FreeFlyer => {
                let (linear, angular) = out.split_at_mut(3);
                linear.iter_mut().zip(unit_vectors()).for_each(|(m, e)| *m = Motion::linear(e));
                angular.iter_mut().zip(unit_vectors()).for_each(|(m, e)| *m = Motion::angular(e));
                if decoupled {
                    self.unrotate_linear(q, linear)?;
                }
            }
            JointKind::Planar => {
                out[0] = Motion::linear(Vector3::x());
                out[1] = Motion::linear(Vector3::y());
                out[2] = Motion::angular(Vector3::z());
                if decoupled {
                    self.unrotate_linear(q, &mut out[..2])?;
                }
            }
            JointKind::Composite(kinds) => {
                let elements = operation.and_then(|op| op.composite_elements());
                // An element's motion is seen through the transforms of the elements stacked after it
                let (mut q_end, mut v_end) = (q.len(), out.len());
                let mut suffix = Isometry3::identity();
                for (k, kind) in kinds.iter().enumerate().rev() {
                    let (q_start, v_start) = (q_end - kind.nq(), v_end - kind.nv());
                    let q_kind = &q[q_start..q_end];
                    let element = elements.and_then(|e| e.get(k)).map(|e| e.operation.as_ref());
                    kind.subspace(q_kind, element, &mut out[v_start..v_end])?;
                    let inverse = suffix.inverse();
                    out[v_start..v_end]
                        .iter_mut()
                        .for_each(|m| *m = m.transformed(&inverse));
                    suffix = kind.transform(q_kind)? * suffix;
                    (q_end, v_end) = (q_start, v_start);
                }
            }
        }
        Ok(())
    }

    /// Expresses translations along the parent's axes in the joint frame
    fn unrotate_linear(&self, q: &[f64], motions: &mut [Motion]) -> Result<(), KinematicsError> {
        let inverse = self.transform(q)?.rotation.inverse();
        motions.iter_mut().for_each(|m| m.linear = inverse * m.linear);
        Ok(())
    }
}

fn unit_vectors() -> [Vector3<f64>; 3] {
    [Vector3::x(), Vector3::y(), Vector3::z()]
}

/// A spatial motion (twist): the linear velocity of the point at the frame origin and the angular
/// velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl Motion {
    pub fn zeros() -> Self {
        Self {
            linear: Vector3::zeros(),
            angular: Vector3::zeros(),
        }
    }

    pub fn linear(linear: Vector3<f64>) -> Self {
        Self {
            linear,
            angular: Vector3::zeros(),
        }
    }

    pub fn angular(angular: Vector3<f64>) -> Self {
        Self {
            linear: Vector3::zeros(),
            angular,
        }
    }

    /// The same motion expressed in the frame `frame` is expressed in (i.e., `frame.act(self)`)
    pub fn transformed(&self, frame: &Isometry3<f64>) -> Self {
        let angular = frame.rotation * self.angular;
        Self {
            linear: frame.rotation * self.linear + frame.translation.vector.cross(&angular),
            angular,
        }
    }
}

/// Inertial parameters of the body rigidly attached to a joint
#[derive(Debug, Clone, PartialEq)]
pub struct Inertia {
    pub mass: f64,
    /// Center of mass in the joint frame
    pub lever: Vector3<f64>,
    /// Rotational inertia about the center of mass
    pub rotational: Matrix3<f64>,
}

impl Inertia {
    pub fn new(mass: f64, lever: Vector3<f64>, rotational: Matrix3<f64>) -> Self {
        Self {
            mass,
            lever,
            rotational,
        }
    }

    pub fn zero() -> Self {
        Self::point_mass(0.0, Vector3::zeros())
    }

    pub fn point_mass(mass: f64, lever: Vector3<f64>) -> Self {
        Self::new(mass, lever, Matrix3::zeros())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    /// Checks the subspace against a finite difference of the transform: `T(q)⁻¹ T(q + ε e_i) ≈ exp(ε S_i)`
    fn check_subspace(kind: &JointKind, q: &[f64], integrate: impl Fn(&[f64], &[f64]) -> Vec<f64>) {
        let mut subspace = vec![Motion::zeros(); kind.nv()];
        kind.motion_subspace(q, &mut subspace).unwrap();
        check_motions(kind, q, &subspace, integrate);
    }

    fn check_motions(kind: &JointKind, q: &[f64], subspace: &[Motion], integrate: impl Fn(&[f64], &[f64]) -> Vec<f64>) {
        let eps = 1e-6;
        let base = kind.transform(q).unwrap();
        for (i, motion) in subspace.iter().enumerate() {
            let mut v = vec![0.0; kind.nv()];
            v[i] = eps;
            let moved = kind.transform(&integrate(q, &v)).unwrap();
            let delta = base.inverse() * moved;
            let linear = delta.translation.vector / eps;
            let angular = delta.rotation.scaled_axis() / eps;
            assert_abs_diff_eq!(linear, motion.linear, epsilon = 1e-5);
            assert_abs_diff_eq!(angular, motion.angular, epsilon = 1e-5);
        }
    }

    fn add(q: &[f64], v: &[f64]) -> Vec<f64> {
        q.iter().zip(v).map(|(a, b)| a + b).collect()
    }

    #[test_log::test]
    fn test_dimensions() {
        let composite = JointKind::Composite(vec![JointKind::Revolute(Axis::X), JointKind::Planar]);
        assert_eq!((composite.nq(), composite.nv()), (5, 4));
        assert_eq!((JointKind::FreeFlyer.nq(), JointKind::FreeFlyer.nv()), (7, 6));
        assert_eq!(composite.tag(), JointKindTag::Composite);
    }

    #[test_log::test]
    fn test_transform() {
        let t = JointKind::Revolute(Axis::Z).transform(&[FRAC_PI_2]).unwrap();
        assert_abs_diff_eq!(t * Vector3::x(), Vector3::y(), epsilon = 1e-12);

        let t = JointKind::RevoluteUnbounded(Axis::Z).transform(&[0.0, 1.0]).unwrap();
        assert_abs_diff_eq!(t * Vector3::x(), Vector3::y(), epsilon = 1e-12);

        let t = JointKind::Prismatic(Axis::Y).transform(&[2.0]).unwrap();
        assert_abs_diff_eq!(t.translation.vector, Vector3::new(0.0, 2.0, 0.0));

        let t = JointKind::Planar.transform(&[1.0, 2.0, 0.0, 1.0]).unwrap();
        assert_abs_diff_eq!(
            t.transform_point(&Vector3::x().into()).coords,
            Vector3::new(1.0, 3.0, 0.0),
            epsilon = 1e-12
        );

        assert!(matches!(
            JointKind::Spherical.transform(&[0.0; 3]),
            Err(KinematicsError::ConfigurationSizeMismatch { expected: 4, actual: 3 })
        ));
    }

    #[test_log::test]
    fn test_subspace_vector_spaces() {
        check_subspace(&JointKind::Revolute(Axis::Y), &[0.3], add);
        check_subspace(&JointKind::PrismaticUnaligned(Unit::new_normalize(Vector3::new(1.0, 1.0, 0.0))), &[0.3], add);
        check_subspace(&JointKind::Translation, &[0.3, -1.0, 2.0], add);
        check_subspace(&JointKind::SphericalZyx, &[0.3, -0.7, 1.1], add);
        let composite = JointKind::Composite(vec![
            JointKind::Revolute(Axis::Z),
            JointKind::Prismatic(Axis::X),
            JointKind::Revolute(Axis::Y),
        ]);
        check_subspace(&composite, &[0.3, 0.5, -0.4], add);
    }

    #[test_log::test]
    fn test_subspace_lie_groups() {
        use crate::liegroup::{LieGroupOperation, SpecialEuclidean2, SpecialEuclidean3, SpecialOrthogonal3};

        let integrate = |op: &'static dyn LieGroupOperation| {
            move |q: &[f64], v: &[f64]| {
                let mut out = vec![0.0; q.len()];
                op.integrate(q, v, &mut out).unwrap();
                out
            }
        };
        let half = 0.35_f64;
        let quaternion = [half.sin() * 0.6, 0.0, half.sin() * 0.8, half.cos()];
        check_subspace(&JointKind::Spherical, &quaternion, integrate(&SpecialOrthogonal3));
        check_subspace(
            &JointKind::FreeFlyer,
            &[1.0, -2.0, 0.5, quaternion[0], quaternion[1], quaternion[2], quaternion[3]],
            integrate(&SpecialEuclidean3),
        );
        check_subspace(&JointKind::Planar, &[1.0, -2.0, 0.8_f64.cos(), 0.8_f64.sin()], integrate(&SpecialEuclidean2));
    }

    #[test_log::test]
    fn test_subspace_decoupled() {
        use crate::LieGroupRegistry;

        let half = 0.35_f64;
        let quaternion = [half.sin() * 0.6, 0.0, half.sin() * 0.8, half.cos()];
        let (c, s) = (0.8_f64.cos(), 0.8_f64.sin());
        let cases = [
            (JointKind::FreeFlyer, vec![1.0, -2.0, 0.5, quaternion[0], quaternion[1], quaternion[2], quaternion[3]]),
            (JointKind::Planar, vec![1.0, -2.0, c, s]),
            (JointKind::Composite(vec![JointKind::Revolute(Axis::X), JointKind::Planar]), vec![0.4, 1.0, -2.0, c, s]),
        ];
        let registry = LieGroupRegistry::decoupled();
        for (kind, q) in &cases {
            let operation = registry.operation(kind).unwrap();
            let mut subspace = vec![Motion::zeros(); kind.nv()];
            kind.motion_subspace_for(operation.as_ref(), q, &mut subspace).unwrap();
            check_motions(kind, q, &subspace, |q: &[f64], v: &[f64]| {
                let mut out = vec![0.0; q.len()];
                operation.integrate(q, v, &mut out).unwrap();
                out
            });
        }

        // the first translation moves along the parent's x axis
        let q = &cases[1].1;
        let mut subspace = vec![Motion::zeros(); 3];
        let operation = registry.operation(&JointKind::Planar).unwrap();
        JointKind::Planar.motion_subspace_for(operation.as_ref(), q, &mut subspace).unwrap();
        assert_abs_diff_eq!(subspace[0].linear, Vector3::new(c, -s, 0.0), epsilon = 1e-12);

        // the exact operations keep the local axes
        let exact = LieGroupRegistry::exact().operation(&JointKind::Planar).unwrap();
        JointKind::Planar.motion_subspace_for(exact.as_ref(), q, &mut subspace).unwrap();
        assert_abs_diff_eq!(subspace[0].linear, Vector3::x(), epsilon = 1e-12);

        let free_flyer = registry.operation(&JointKind::FreeFlyer).unwrap();
        assert!(matches!(
            JointKind::Planar.motion_subspace_for(free_flyer.as_ref(), q, &mut subspace),
            Err(KinematicsError::ConfigurationSizeMismatch { .. })
        ));
    }
}

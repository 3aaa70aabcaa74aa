//! Model transforms.
//!
//! A [`Transform`] turns into the `model` matrix of a shader program's
//! uniform block.

use std::ops::Mul;

use cgmath::{Deg, Matrix4, One, Quaternion, Rotation3, Vector3};

/// Position, rotation and scale of a single object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform: no move, rotate or scale.
    pub fn new() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn with_rotation(mut self, axis: Vector3<f32>, angle: Deg<f32>) -> Self {
        self.rotation = Quaternion::from_axis_angle(axis, angle);
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    /// Rotates further around `axis`, applied after the current rotation.
    pub fn rotate(&mut self, axis: Vector3<f32>, angle: Deg<f32>) {
        self.rotation = Quaternion::from_axis_angle(axis, angle) * self.rotation;
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

/// Applies `rhs` in the local space of `self`.
///
/// The result equals `self.to_matrix() * rhs.to_matrix()` while `self` has a
/// uniform scale or `rhs` has no rotation. Otherwise only the position
/// matches: a [`Transform`] cannot hold the shear that a non-uniformly scaled
/// parent applies to a rotated child.
impl Mul<Transform> for Transform {
    type Output = Self;

    fn mul(self, rhs: Transform) -> Self::Output {
        let scaled_rhs_pos = Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        Transform {
            position: self.position + (self.rotation * scaled_rhs_pos),
            rotation: self.rotation * rhs.rotation,
            scale: Vector3::new(
                self.scale.x * rhs.scale.x,
                self.scale.y * rhs.scale.y,
                self.scale.z * rhs.scale.z,
            ),
        }
    }
}

impl From<Vector3<f32>> for Transform {
    fn from(position: Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, SquareMatrix, Vector4};

    use super::*;

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::default().to_matrix(), Matrix4::identity());
    }

    #[test]
    fn matrix_scales_then_rotates_then_translates() {
        let transform = Transform::from(Vector3::new(1.0, 0.0, 0.0))
            .with_rotation(Vector3::unit_z(), Deg(90.0))
            .with_scale(2.0);
        let p = transform.to_matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // (1,0,0) -> scaled (2,0,0) -> rotated (0,2,0) -> moved (1,2,0)
        assert!((p.truncate() - Vector3::new(1.0, 2.0, 0.0)).magnitude() < 1e-5, "{p:?}");
    }

    #[test]
    fn composition_matches_matrix_product() {
        let parent = Transform::from(Vector3::new(0.0, 1.0, 0.0))
            .with_rotation(Vector3::unit_y(), Deg(45.0))
            .with_scale(2.0);
        let child = Transform::from(Vector3::new(1.0, 0.0, -1.0)).with_rotation(Vector3::unit_x(), Deg(30.0));

        let composed = (parent * child).to_matrix();
        let expected = parent.to_matrix() * child.to_matrix();
        for (a, b) in [composed.x, composed.y, composed.z, composed.w]
            .iter()
            .zip([expected.x, expected.y, expected.z, expected.w].iter())
        {
            assert!((*a - *b).magnitude() < 1e-5, "{composed:?} != {expected:?}");
        }
    }

    fn columns_close(a: Matrix4<f32>, b: Matrix4<f32>) -> bool {
        [a.x - b.x, a.y - b.y, a.z - b.z, a.w - b.w]
            .iter()
            .all(|c| c.magnitude() < 1e-5)
    }

    #[test]
    fn non_uniform_parent_scales_unrotated_children_exactly() {
        let parent = Transform {
            scale: Vector3::new(2.0, 1.0, 0.5),
            ..Transform::from(Vector3::new(0.0, 1.0, 0.0)).with_rotation(Vector3::unit_y(), Deg(45.0))
        };
        let child = Transform {
            scale: Vector3::new(1.0, 3.0, 1.0),
            ..Transform::from(Vector3::new(1.0, 0.0, -1.0))
        };

        assert!(columns_close(
            (parent * child).to_matrix(),
            parent.to_matrix() * child.to_matrix()
        ));
    }

    #[test]
    fn non_uniform_parent_keeps_rotated_child_position_only() {
        let parent = Transform {
            scale: Vector3::new(2.0, 1.0, 1.0),
            ..Transform::from(Vector3::new(0.0, 1.0, 0.0))
        };
        let child =
            Transform::from(Vector3::new(1.0, 0.0, -1.0)).with_rotation(Vector3::unit_z(), Deg(45.0));

        let composed = (parent * child).to_matrix();
        let expected = parent.to_matrix() * child.to_matrix();
        assert!((composed.w - expected.w).magnitude() < 1e-5, "{composed:?} != {expected:?}");
        // The product shears the child's axes; the composed transform stays orthogonal
        assert!(!columns_close(composed, expected));
        assert!(composed.x.truncate().dot(composed.y.truncate()).abs() < 1e-5);
    }

    #[test]
    fn rotations_accumulate() {
        let mut transform = Transform::new();
        transform.rotate(Vector3::unit_y(), Deg(30.0));
        transform.rotate(Vector3::unit_y(), Deg(60.0));
        let forward = transform.to_matrix() * Vector4::new(0.0, 0.0, -1.0, 0.0);
        assert!((forward.truncate() - Vector3::new(-1.0, 0.0, 0.0)).magnitude() < 1e-5, "{forward:?}");
    }
}

//! Perspective camera producing reverse-Z view and projection matrices.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Camera data uploaded once per frame and shared by every pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix, column-major.
    pub view_proj: [[f32; 4]; 4],
    /// World-space eye position (w unused). Needed for view-dependent shading.
    pub camera_pos: [f32; 4],
}

impl CameraUniform {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

/// A perspective camera looking at the scene from `position`.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion. Identity looks down -Z.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Build a camera from the configured field of view (degrees) and clip planes.
    pub fn new(fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        Self {
            fov_y: fov_y_degrees.to_radians(),
            aspect_ratio,
            near,
            far,
            ..Self::default()
        }
    }

    /// Compute the view matrix (inverse of camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    /// Reverse-Z perspective: near maps to z=1, far to z=0.
    pub fn projection_matrix(&self) -> Mat4 {
        // swapped near/far
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Place the camera at `eye` and orient it towards `target` with +Y up.
    ///
    /// Degenerate inputs (eye on target, or looking straight along Y) keep the
    /// previous rotation.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        self.position = eye;
        let Some(forward) = (target - eye).try_normalize() else {
            return;
        };
        let Some(right) = forward.cross(Vec3::Y).try_normalize() else {
            return;
        };
        let up = right.cross(forward);
        self.rotation = Quat::from_mat3(&glam::Mat3::from_cols(right, up, -forward)).normalize();
    }

    /// Update the aspect ratio after a surface resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Convert the camera to a uniform suitable for GPU upload.
    pub fn to_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [self.position.x, self.position.y, self.position.z, 1.0],
        }
    }
}

impl Default for Camera {
    /// 75 degree field of view, five units back along +Z, far plane past the star shell.
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 5.0),
            rotation: Quat::IDENTITY,
            fov_y: 75f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 4000.0,
        }
    }
}

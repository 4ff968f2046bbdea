//! # Rendering Interface
//!
//! The boundary between the terrain core and the GPU collaborator. The core
//! performs the visibility decisions itself - frustum culling against the
//! view-projection matrix and the distance sort - and hands over a snapshot
//! of non-owning draw records. Shaders, pipelines and buffer uploads live on
//! the other side of this boundary.

use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

use crate::meshing::face_point::FacePoint;

/// One plane of a view frustum, in the form `dot(normal, p) + d >= 0` for
/// points inside.
#[derive(Copy, Clone, Debug)]
struct Plane {
    normal: Vector3<f32>,
    d: f32,
}

impl Plane {
    fn from_row(row: Vector4<f32>) -> Self {
        let normal = Vector3::new(row.x, row.y, row.z);
        let len = normal.magnitude();
        Plane {
            normal: normal / len,
            d: row.w / len,
        }
    }

    #[inline]
    fn distance(&self, p: Vector3<f32>) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// The six planes of a view frustum, extracted from a view-projection
/// matrix.
#[derive(Copy, Clone, Debug)]
pub struct Frustum {
    planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the frustum planes from a view-projection matrix
    /// (Gribb-Hartmann row combinations).
    pub fn from_view_projection(vp: &Matrix4<f32>) -> Self {
        let row = |i: usize| Vector4::new(vp.x[i], vp.y[i], vp.z[i], vp.w[i]);
        let (r0, r1, r2, r3) = (row(0), row(1), row(2), row(3));
        Frustum {
            planes: [
                Plane::from_row(r3 + r0), // left
                Plane::from_row(r3 - r0), // right
                Plane::from_row(r3 + r1), // bottom
                Plane::from_row(r3 - r1), // top
                Plane::from_row(r3 + r2), // near
                Plane::from_row(r3 - r2), // far
            ],
        }
    }

    /// Whether the axis-aligned box at `min` with extent `size` intersects
    /// the frustum. Tests each plane against the box corner furthest along
    /// the plane normal (the p-vertex); one fully-outside plane rejects.
    pub fn aabb_visible(&self, min: Vector3<f32>, size: Vector3<f32>) -> bool {
        for plane in &self.planes {
            let p_vertex = Vector3::new(
                if plane.normal.x >= 0.0 { min.x + size.x } else { min.x },
                if plane.normal.y >= 0.0 { min.y + size.y } else { min.y },
                if plane.normal.z >= 0.0 { min.z + size.z } else { min.z },
            );
            if plane.distance(p_vertex) < 0.0 {
                return false;
            }
        }
        true
    }
}

/// A non-owning draw record for one visible chunk. Valid only for the frame
/// it was snapshot in; the chunk store may change on the next update.
pub struct ChunkDraw<'a> {
    /// Model transform: translation to the chunk's world origin.
    pub transform: Matrix4<f32>,
    /// Opaque face points.
    pub opaque: &'a [FacePoint],
    /// Translucent (water) face points.
    pub translucent: &'a [FacePoint],
}

impl ChunkDraw<'_> {
    /// The opaque vertex data as raw bytes, laid out per
    /// [`FacePoint::desc`](crate::meshing::face_point::FacePoint::desc).
    pub fn opaque_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.opaque)
    }

    /// The translucent vertex data as raw bytes.
    pub fn translucent_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.translucent)
    }
}

/// One frame's worth of draws, sorted near-to-far from the viewpoint.
///
/// The opaque pass draws the list in order (early-z friendly); the
/// translucent pass iterates the same list in reverse for back-to-front
/// blending.
pub struct RenderFrame<'a> {
    /// Visible chunk draws, nearest first.
    pub draws: Vec<ChunkDraw<'a>>,
    /// Whether the viewpoint is inside a water voxel; drives the global
    /// underwater screen tint.
    pub underwater: bool,
}

//! # Chunk Module
//!
//! The `Chunk` aggregate: one padded voxel volume, its derived light field,
//! and the two face-point meshes built from them. Chunks are the unit of
//! generation, meshing and streaming.
//!
//! ## Lifecycle
//!
//! ```text
//! created (unmeshed, unlighted)
//!   -> compute_water / compute_light   (order: water first, then light)
//!   -> build_mesh                      (meshed and lighted)
//!   -> rebuild_mesh ...                (any number of times, on cross-chunk
//!                                       light/water updates)
//!   -> evicted                         (when out of range; owner drops it)
//! ```
//!
//! A chunk is never meshed before its light pass has completed at least once:
//! `rebuild_mesh` is a no-op on an unlighted chunk, so the initial
//! water-then-light update pair produces exactly one (lit) mesh build.
//! Every mesh build discards and regenerates both face lists wholesale;
//! nothing is patched incrementally.

use cgmath::{Matrix4, Point3, Vector3};

use crate::meshing::{self, face_point::FacePoint, ChunkMesh};
use crate::voxels::volume::{ChunkSizing, VoxelVolume};

pub mod light;
pub mod water;

use light::LightField;

/// The six face-adjacent neighbors of a chunk, in neighbor-index order
/// (+x, -x, +y, -y, +z, -z). Resolved fresh from the store for every
/// propagation call; never stored - the neighbor set changes as chunks
/// stream in and out.
pub type Neighbours<'a> = [Option<&'a Chunk>; 6];

/// A fixed-size cuboid of voxels with derived light, water and mesh state.
pub struct Chunk {
    key: Point3<i32>,
    transform: Matrix4<f32>,
    volume: VoxelVolume,
    light: LightField,
    mesh: ChunkMesh,
    meshed: bool,
    lighted: bool,
    first_light_pass_done: bool,
    underground: bool,
    out_of_range: bool,
    sides_light_update: u8,
    sides_water_update: u8,
}

impl Chunk {
    /// Creates a chunk from a generator-produced padded block buffer.
    ///
    /// The light field starts fully dark with a fully-lit sky mask; the
    /// first `compute_light` call resolves both.
    ///
    /// # Panics
    /// Panics if `blocks` does not match the padded volume length.
    pub fn new(key: Point3<i32>, sizing: ChunkSizing, blocks: &[u8]) -> Self {
        let origin = Vector3::new(
            (key.x * sizing.size.x) as f32,
            (key.y * sizing.size.y) as f32,
            (key.z * sizing.size.z) as f32,
        );
        Chunk {
            key,
            transform: Matrix4::from_translation(origin),
            volume: VoxelVolume::from_generated(sizing, blocks),
            light: LightField::new(sizing),
            mesh: ChunkMesh::default(),
            meshed: false,
            lighted: false,
            first_light_pass_done: false,
            underground: false,
            out_of_range: false,
            sides_light_update: 0,
            sides_water_update: 0,
        }
    }

    /// The chunk-grid coordinate of this chunk.
    #[inline]
    pub fn key(&self) -> Point3<i32> {
        self.key
    }

    /// World-space position of the chunk's origin voxel.
    #[inline]
    pub fn world_origin(&self) -> Vector3<f32> {
        let s = self.volume.sizing().size;
        Vector3::new(
            (self.key.x * s.x) as f32,
            (self.key.y * s.y) as f32,
            (self.key.z * s.z) as f32,
        )
    }

    /// Model transform (translation to the chunk's world origin) handed to
    /// the renderer with each draw.
    #[inline]
    pub fn transform(&self) -> &Matrix4<f32> {
        &self.transform
    }

    /// The chunk's padded voxel volume.
    #[inline]
    pub fn volume(&self) -> &VoxelVolume {
        &self.volume
    }

    /// The chunk's light field.
    #[inline]
    pub fn light(&self) -> &LightField {
        &self.light
    }

    /// Whether a mesh has been built since the last state change.
    #[inline]
    pub fn is_meshed(&self) -> bool {
        self.meshed
    }

    /// Whether the light pass has completed at least once.
    #[inline]
    pub fn is_lighted(&self) -> bool {
        self.lighted
    }

    /// Whether this chunk receives no sky light at all (all-zero inherited
    /// mask). Underground chunks skip propagation and the grass
    /// substitution.
    #[inline]
    pub fn is_underground(&self) -> bool {
        self.underground
    }

    /// Whether the last range check found this chunk beyond the keep
    /// distance. The scheduler reads this once per frame to decide eviction.
    #[inline]
    pub fn is_out_of_range(&self) -> bool {
        self.out_of_range
    }

    /// Bitmask (neighbor-index order) of the sides whose border light changed
    /// during the last `compute_light` call.
    #[inline]
    pub fn sides_light_update(&self) -> u8 {
        self.sides_light_update
    }

    /// Bitmask (neighbor-index order) of the sides whose border water changed
    /// during the last `compute_water` call.
    #[inline]
    pub fn sides_water_update(&self) -> u8 {
        self.sides_water_update
    }

    /// Face points of the opaque mesh.
    #[inline]
    pub fn opaque_points(&self) -> &[FacePoint] {
        &self.mesh.opaque
    }

    /// Face points of the translucent (water) mesh.
    #[inline]
    pub fn translucent_points(&self) -> &[FacePoint] {
        &self.mesh.translucent
    }

    /// Recomputes the out-of-range flag from the horizontal world distance
    /// between the chunk and the viewpoint. The keep radius is three times
    /// the render distance.
    pub fn update_range_flag(&mut self, viewpoint: Point3<f32>, render_distance: f32) {
        let origin = self.world_origin();
        let dx = origin.x - viewpoint.x;
        let dz = origin.z - viewpoint.z;
        self.out_of_range = (dx * dx + dz * dz).sqrt() > render_distance * 3.0;
    }

    /// Builds both face lists from the current volume and light state.
    pub fn build_mesh(&mut self) {
        self.mesh = meshing::build_mesh(&self.volume, &self.light, self.underground);
        self.meshed = true;
    }

    /// Discards and rebuilds both meshes. No-op until the chunk has been
    /// lighted once, which keeps a freshly created chunk from being meshed
    /// between its initial water and light updates.
    pub fn rebuild_mesh(&mut self) {
        if !self.lighted {
            return;
        }
        self.build_mesh();
    }
}

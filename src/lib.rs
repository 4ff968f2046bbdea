#![warn(missing_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel Terrain
//!
//! A streaming voxel terrain core: it maintains an effectively infinite block
//! world around a moving viewpoint, converts dense voxel volumes into
//! renderable surface meshes, and keeps the derived per-voxel fields (ambient
//! occlusion, flood-filled sky light, flood-filled water) consistent while
//! chunks stream in and out of memory.
//!
//! ## Key Modules
//!
//! * `voxels` - Block semantics, the padded voxel volume and the `Chunk`
//!   aggregate with its light and water propagation passes
//! * `meshing` - Conversion from a voxel volume into packed, GPU-ready face
//!   records with per-corner ambient occlusion and neighbor lighting
//! * `terrain` - The chunk lifecycle scheduler: load queue, cross-chunk update
//!   queue, time-budgeted per-frame stepping and distance eviction
//! * `rendering` - Frustum culling and the per-frame draw snapshot handed to
//!   the renderer
//! * `config` - Runtime tuning knobs with JSON loading
//!
//! ## Architecture
//!
//! The crate is the core of an engine, not the engine itself. Windowing,
//! camera control, shaders and the GPU submission path are external
//! collaborators: the core consumes a view-projection matrix and a viewpoint,
//! and produces vertex buffers with a documented binary layout plus per-chunk
//! model transforms. All scheduling is single-threaded and cooperative; work
//! is time-sliced across frames by wall-clock budgets checked between work
//! items, never inside one.
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::{Matrix4, Point3, SquareMatrix};
//! use voxel_terrain::{NoiseGenerator, Terrain, TerrainConfig};
//!
//! let mut terrain = Terrain::new(
//!     TerrainConfig::default(),
//!     Box::new(NoiseGenerator::new(42)),
//! );
//!
//! // Once per frame:
//! let viewpoint = Point3::new(0.0, 80.0, 0.0);
//! let view_projection = Matrix4::identity(); // from the camera collaborator
//! terrain.update_chunks(viewpoint);
//! let frame = terrain.render_chunks(viewpoint, &view_projection);
//! for draw in &frame.draws {
//!     // hand draw.opaque_bytes() / draw.translucent_bytes() to the GPU
//! }
//! ```

pub mod config;
pub mod meshing;
pub mod rendering;
pub mod terrain;
pub mod voxels;

pub use config::{ConfigError, TerrainConfig};
pub use meshing::face_point::FacePoint;
pub use rendering::{ChunkDraw, Frustum, RenderFrame};
pub use terrain::generation::{NoiseGenerator, TerrainGenerator};
pub use terrain::Terrain;
pub use voxels::chunk::Chunk;
pub use voxels::volume::{ChunkSizing, VoxelVolume};
pub use voxels::{BlockId, Side};

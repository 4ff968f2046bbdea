//! # Terrain Generation
//!
//! The generator seam: the scheduler treats generation as an opaque
//! synchronous call producing one block id per padded voxel. The default
//! implementation is a seeded heightmap; tests substitute their own
//! deterministic fields.

use cgmath::Vector3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::voxels::volume::ChunkSizing;
use crate::voxels::BlockId;

/// A synchronous producer of chunk volumes.
///
/// `generate` fills `out` with one block id per padded voxel in row-major
/// order (x, then z, then y), i.e. the same flattening as
/// [`ChunkSizing::index`]. Because the margin is generated from the same
/// continuous field as the interior, a chunk's margin always agrees with its
/// neighbors' borders without any copying.
pub trait TerrainGenerator {
    /// Fills `out` (length `sizing.volume_len()`) for the chunk whose world
    /// origin voxel is at `origin`.
    fn generate(&self, origin: Vector3<f32>, sizing: &ChunkSizing, out: &mut [u8]);
}

/// Scaling applied to world XZ coordinates before sampling the height noise.
const HEIGHT_NOISE_SCALE: f64 = 0.004;

/// The default generator: fractal-noise heightmap with a dirt/stone layering,
/// sand along the waterline, and still water up to sea level.
pub struct NoiseGenerator {
    height_noise: Fbm<Perlin>,
    /// World height the terrain undulates around.
    base_height: f64,
    /// Peak-to-valley swing of the terrain.
    amplitude: f64,
    /// World height up to which air is replaced with water.
    sea_level: f64,
}

impl NoiseGenerator {
    /// Creates a generator with the default landscape shape for `seed`.
    pub fn new(seed: u32) -> Self {
        NoiseGenerator {
            height_noise: Fbm::<Perlin>::new(seed).set_octaves(4).set_persistence(0.5),
            base_height: 72.0,
            amplitude: 48.0,
            sea_level: 60.0,
        }
    }

    /// Overrides the sea level (world units).
    pub fn with_sea_level(mut self, sea_level: f64) -> Self {
        self.sea_level = sea_level;
        self
    }

    /// Terrain height of the column at world `(x, z)`.
    fn column_height(&self, wx: f64, wz: f64) -> f64 {
        let sample = self
            .height_noise
            .get([wx * HEIGHT_NOISE_SCALE, wz * HEIGHT_NOISE_SCALE]);
        self.base_height + sample * self.amplitude
    }
}

impl TerrainGenerator for NoiseGenerator {
    fn generate(&self, origin: Vector3<f32>, sizing: &ChunkSizing, out: &mut [u8]) {
        debug_assert_eq!(out.len(), sizing.volume_len());
        let m = sizing.half_margin();
        let size = sizing.size;
        for y in -m..size.y + m {
            for z in -m..size.z + m {
                for x in -m..size.x + m {
                    let wx = (origin.x + x as f32) as f64;
                    let wy = (origin.y + y as f32) as f64;
                    let wz = (origin.z + z as f32) as f64;
                    let height = self.column_height(wx, wz);
                    let id = if wy < height {
                        if height - wy <= 4.0 {
                            if height < self.sea_level + 2.0 {
                                BlockId::SAND
                            } else {
                                BlockId::DIRT
                            }
                        } else {
                            BlockId::STONE
                        }
                    } else if wy <= self.sea_level {
                        BlockId::WATER
                    } else {
                        BlockId::AIR
                    };
                    out[sizing.index(x, y, z)] = id as u8;
                }
            }
        }
    }
}

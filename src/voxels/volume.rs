//! # Voxel Volume
//!
//! The padded dense block-id array owned by each chunk, and the neighbor
//! classification primitives the mesher and the propagation passes are built
//! on.
//!
//! ## Padding
//!
//! A volume is sized `chunk_size + margin` per axis; the margin (half on each
//! side) holds the same block ids the adjacent chunks hold at their borders.
//! The generator fills the whole padded extent from one continuous field, so
//! margin cells are correct the moment a chunk is created and every 6-neighbor
//! and 20-neighbor query for an interior voxel is a branch-free in-bounds
//! read.

use cgmath::Vector3;

use super::{is_transparent_id, BLOCK_AIR};

/// The dimensions of a chunk volume: interior size per axis plus the total
/// padding margin (split evenly per side).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChunkSizing {
    /// Interior voxels per axis.
    pub size: Vector3<i32>,
    /// Total padding per axis. Always even; half lies on each side.
    pub margin: i32,
}

impl ChunkSizing {
    /// Creates a cubic sizing of `size` voxels per axis with `margin` total
    /// padding.
    pub fn cubic(size: i32, margin: i32) -> Self {
        debug_assert!(size > 0);
        debug_assert!(margin >= 4 && margin % 2 == 0);
        ChunkSizing {
            size: Vector3::new(size, size, size),
            margin,
        }
    }

    /// Padding on one side of an axis.
    #[inline]
    pub fn half_margin(&self) -> i32 {
        self.margin / 2
    }

    /// Padded extent per axis.
    #[inline]
    pub fn padded(&self) -> Vector3<i32> {
        self.size + Vector3::new(self.margin, self.margin, self.margin)
    }

    /// Flat-index step between voxels one z apart.
    #[inline]
    pub fn z_step(&self) -> i32 {
        self.padded().x
    }

    /// Flat-index step between voxels one y apart (one padded XZ slice).
    #[inline]
    pub fn y_step(&self) -> i32 {
        let p = self.padded();
        p.x * p.z
    }

    /// Number of bytes in the padded volume.
    #[inline]
    pub fn volume_len(&self) -> usize {
        let p = self.padded();
        (p.x * p.y * p.z) as usize
    }

    /// Number of bytes in one padded XZ slice (the light-mask extent).
    #[inline]
    pub fn slice_len(&self) -> usize {
        self.y_step() as usize
    }

    /// Flat index of the voxel at chunk-local `(x, y, z)`.
    ///
    /// Coordinates range over `[-margin/2, size + margin/2)`; `(0, 0, 0)` is
    /// the first interior voxel.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        let m = self.half_margin();
        debug_assert!(self.contains(x, y, z), "voxel ({x}, {y}, {z}) out of padded bounds");
        ((x + m) + (z + m) * self.z_step() + (y + m) * self.y_step()) as usize
    }

    /// Flat index into a padded XZ slice (light mask) for column `(x, z)`.
    #[inline]
    pub fn column_index(&self, x: i32, z: i32) -> usize {
        let m = self.half_margin();
        ((x + m) + (z + m) * self.z_step()) as usize
    }

    /// Whether `(x, y, z)` lies inside the padded extent.
    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        let m = self.half_margin();
        x >= -m && x < self.size.x + m
            && y >= -m && y < self.size.y + m
            && z >= -m && z < self.size.z + m
    }

    /// Whether `(x, y, z)` lies inside the flood-fill working set: the
    /// interior plus a one-voxel ring of margin. Propagation never writes
    /// outside this set, which keeps every neighbor read of a written cell in
    /// bounds (the margin is at least two voxels per side).
    #[inline]
    pub fn in_flood_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        x >= -1 && x <= self.size.x
            && y >= -1 && y <= self.size.y
            && z >= -1 && z <= self.size.z
    }

    /// Bitmask (neighbor-index order) of the chunk sides the cell at
    /// `(x, y, z)` touches: set for a side when the cell lies on the interior
    /// border facing it or in the margin beyond it.
    #[inline]
    pub fn touched_sides(&self, x: i32, y: i32, z: i32) -> u8 {
        let s = self.size;
        let mut bits = 0u8;
        if x >= s.x - 1 {
            bits |= 1 << 0; // +x
        }
        if x <= 0 {
            bits |= 1 << 1; // -x
        }
        if y >= s.y - 1 {
            bits |= 1 << 2; // +y
        }
        if y <= 0 {
            bits |= 1 << 3; // -y
        }
        if z >= s.z - 1 {
            bits |= 1 << 4; // +z
        }
        if z <= 0 {
            bits |= 1 << 5; // -z
        }
        bits
    }
}

/// A chunk's padded block-id volume.
///
/// Owned exclusively by its chunk, populated once at construction from the
/// generator's output and never structurally resized. Water flood-fill is the
/// only mutation and rewrites ids in place.
#[derive(Clone)]
pub struct VoxelVolume {
    sizing: ChunkSizing,
    blocks: Vec<u8>,
}

impl VoxelVolume {
    /// Wraps a generator-produced padded buffer (row-major x, then z, then y).
    ///
    /// # Panics
    /// Panics if `data` does not match the padded volume length.
    pub fn from_generated(sizing: ChunkSizing, data: &[u8]) -> Self {
        assert_eq!(
            data.len(),
            sizing.volume_len(),
            "generated buffer does not match the padded volume size"
        );
        VoxelVolume {
            sizing,
            blocks: data.to_vec(),
        }
    }

    /// Creates an all-air volume (test worlds, empty columns).
    pub fn empty(sizing: ChunkSizing) -> Self {
        VoxelVolume {
            sizing,
            blocks: vec![BLOCK_AIR; sizing.volume_len()],
        }
    }

    /// The dimensions of this volume.
    #[inline]
    pub fn sizing(&self) -> &ChunkSizing {
        &self.sizing
    }

    /// Block id at a flat index.
    #[inline]
    pub fn block(&self, i: usize) -> u8 {
        self.blocks[i]
    }

    /// Block id at chunk-local coordinates (padded range).
    #[inline]
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> u8 {
        self.blocks[self.sizing.index(x, y, z)]
    }

    /// Overwrites the block id at chunk-local coordinates. Used by water
    /// flood-fill and by tests building scenarios.
    #[inline]
    pub fn set_block_at(&mut self, x: i32, y: i32, z: i32, id: u8) {
        let i = self.sizing.index(x, y, z);
        self.blocks[i] = id;
    }

    /// Whether the voxel at flat index `i` is transparent (air or water).
    #[inline]
    pub fn is_transparent(&self, i: usize) -> bool {
        is_transparent_id(self.blocks[i])
    }

    /// Whether the voxel at flat index `i` is fully enclosed: all six axis
    /// neighbors are non-transparent. Such a voxel is never meshed regardless
    /// of its own id.
    #[inline]
    pub fn is_culled(&self, i: usize) -> bool {
        let zs = self.sizing.z_step() as usize;
        let ys = self.sizing.y_step() as usize;
        !self.is_transparent(i + 1)
            && !self.is_transparent(i - 1)
            && !self.is_transparent(i + zs)
            && !self.is_transparent(i - zs)
            && !self.is_transparent(i + ys)
            && !self.is_transparent(i - ys)
    }

    /// The water-specific occlusion test: a water voxel is skipped only when
    /// all six neighbors are non-air. Water against water is culled, water
    /// against air is not.
    #[inline]
    pub fn is_water_culled(&self, i: usize) -> bool {
        let zs = self.sizing.z_step() as usize;
        let ys = self.sizing.y_step() as usize;
        self.blocks[i + 1] != BLOCK_AIR
            && self.blocks[i - 1] != BLOCK_AIR
            && self.blocks[i + zs] != BLOCK_AIR
            && self.blocks[i - zs] != BLOCK_AIR
            && self.blocks[i + ys] != BLOCK_AIR
            && self.blocks[i - ys] != BLOCK_AIR
    }

    /// Visible-face bitmask of the voxel at flat index `i`: a bit is set for
    /// each axis direction whose neighbor is transparent, meaning that face
    /// must be drawn.
    ///
    /// Bit order: `0x20` +x, `0x10` -x, `0x08` +z, `0x04` -z, `0x02` +y,
    /// `0x01` -y.
    #[inline]
    pub fn visible_faces(&self, i: usize) -> u8 {
        let zs = self.sizing.z_step() as usize;
        let ys = self.sizing.y_step() as usize;
        ((self.is_transparent(i + 1) as u8) << 5)
            | ((self.is_transparent(i - 1) as u8) << 4)
            | ((self.is_transparent(i + zs) as u8) << 3)
            | ((self.is_transparent(i - zs) as u8) << 2)
            | ((self.is_transparent(i + ys) as u8) << 1)
            | (self.is_transparent(i - ys) as u8)
    }
}

//! # Voxels Module
//!
//! Block-id semantics and the spatial primitives shared by meshing, lighting
//! and the terrain scheduler.
//!
//! ## Block ids
//!
//! Every voxel is one unsigned byte. Id 0 is air: never meshed, transparent to
//! light and to neighbor-occlusion tests. Id 15 is water: transparent to light
//! and occlusion like air, but rendered as a separate translucent surface and
//! subject to flood propagation. Every other nonzero id is an opaque solid
//! mapped to texture-atlas slot `id - 1` (with the exposed-top dirt-to-grass
//! substitution applied at mesh time).

use cgmath::Vector3;
use num_derive::FromPrimitive;

pub mod chunk;
pub mod volume;

/// Block id of air (empty space).
pub const BLOCK_AIR: u8 = 0;
/// Block id of water, the designated translucent flood-filling block.
pub const BLOCK_WATER: u8 = 15;
/// Maximum light intensity (full sky exposure).
pub const LIGHT_MAX: u8 = 15;

/// Enumerates the block types the default generator places.
///
/// The world itself stores raw bytes; this enum names the ids the crate
/// assigns meaning to. `FromPrimitive` allows recovering the variant from a
/// stored byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u8)]
pub enum BlockId {
    /// Empty space. Transparent, never meshed.
    AIR = 0,
    /// Dirt. Renders as grass on its top face when exposed to the sky.
    DIRT = 1,
    /// Grass. What exposed dirt pretends to be.
    GRASS = 2,
    /// Stone, the bulk of the underground.
    STONE = 3,
    /// Sand, placed along the waterline.
    SAND = 4,
    /// Water. Transparent to light and occlusion, meshed translucent,
    /// flood-fills into adjacent air.
    WATER = 15,
}

impl BlockId {
    /// Recovers a `BlockId` from a stored byte.
    ///
    /// # Panics
    /// Panics if the byte does not name a known block type.
    pub fn from_byte(id: u8) -> Self {
        num::FromPrimitive::from_u8(id).unwrap()
    }
}

/// Returns whether a block id is transparent to light and occlusion tests
/// (air or water).
#[inline]
pub fn is_transparent_id(id: u8) -> bool {
    id == BLOCK_AIR || id == BLOCK_WATER
}

/// The six axis directions of a voxel face.
///
/// Two fixed numbering schemes hang off this enum and must not be conflated:
///
/// * the **neighbor index** (`Side::index`), the order in which neighboring
///   chunks are resolved and the bit order of the `sides_*_update` masks:
///   +x, -x, +y, -y, +z, -z;
/// * the **face-mask bit** (`Side::face_bit`), the order faces are encoded in
///   a face point's `visible_faces` byte: `0x20` +x, `0x10` -x, `0x08` +z,
///   `0x04` -z, `0x02` +y, `0x01` -y.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// +x
    Right,
    /// -x
    Left,
    /// +y
    Top,
    /// -y
    Bottom,
    /// +z
    Front,
    /// -z
    Back,
}

impl Side {
    /// All six sides in neighbor-index order.
    pub const ALL: [Side; 6] = [
        Side::Right,
        Side::Left,
        Side::Top,
        Side::Bottom,
        Side::Front,
        Side::Back,
    ];

    /// The five sides water may flow toward (everything but up).
    pub const WATER_FLOW: [Side; 5] = [
        Side::Right,
        Side::Left,
        Side::Bottom,
        Side::Front,
        Side::Back,
    ];

    /// Neighbor index of this side (bit position in the `sides_*_update`
    /// masks, slot in neighbor arrays).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Side::Right => 0,
            Side::Left => 1,
            Side::Top => 2,
            Side::Bottom => 3,
            Side::Front => 4,
            Side::Back => 5,
        }
    }

    /// Bit of this side in a face point's `visible_faces` byte.
    #[inline]
    pub fn face_bit(self) -> u8 {
        match self {
            Side::Right => 0x20,
            Side::Left => 0x10,
            Side::Front => 0x08,
            Side::Back => 0x04,
            Side::Top => 0x02,
            Side::Bottom => 0x01,
        }
    }

    /// Unit offset toward the neighboring voxel (or chunk) on this side.
    #[inline]
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Side::Right => Vector3::new(1, 0, 0),
            Side::Left => Vector3::new(-1, 0, 0),
            Side::Top => Vector3::new(0, 1, 0),
            Side::Bottom => Vector3::new(0, -1, 0),
            Side::Front => Vector3::new(0, 0, 1),
            Side::Back => Vector3::new(0, 0, -1),
        }
    }

    /// The side facing back toward this one.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Right => Side::Left,
            Side::Left => Side::Right,
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Front => Side::Back,
            Side::Back => Side::Front,
        }
    }
}

//! # Mesher
//!
//! Pure functions that scan a padded voxel volume and its light field and
//! emit two face-point lists: one for opaque solids, one for the translucent
//! water surface. No GPU state is touched here; the chunk owns the resulting
//! buffers.
//!
//! ## Scan
//!
//! Every interior voxel is visited exactly once, y descending, then z, then x
//! (the order is not load-bearing, it matches natural top-down generation).
//! A voxel contributes a face point when it is non-air, not fully enclosed,
//! and - for water - passes the stricter water occlusion test. Ambient
//! occlusion samples up to three of the twenty voxels surrounding each
//! visible face's corners; the light word packs the six axis neighbors'
//! light values.

use crate::voxels::chunk::light::LightField;
use crate::voxels::volume::VoxelVolume;
use crate::voxels::{BlockId, BLOCK_AIR, BLOCK_WATER};

pub mod face_point;

use face_point::FacePoint;
use face_point::{
    AO_SHIFT_BACK, AO_SHIFT_BOTTOM, AO_SHIFT_FLIP, AO_SHIFT_FRONT, AO_SHIFT_LEFT, AO_SHIFT_RIGHT,
    AO_SHIFT_TOP, LIGHT_SHIFTS, LIGHT_SHIFT_WATER_MARKERS,
};

/// Face mask carried by every water face point: top and bottom only. Side
/// faces of a water body are never rendered.
pub const WATER_FACE_MASK: u8 = 0x03;

/// The two face lists produced by one mesh build.
#[derive(Debug, Default)]
pub struct ChunkMesh {
    /// Face points of opaque solid voxels.
    pub opaque: Vec<FacePoint>,
    /// Face points of water voxels, drawn in the translucent pass.
    pub translucent: Vec<FacePoint>,
}

/// Scans `volume` and emits the opaque and translucent face lists.
///
/// `underground` suppresses the exposed-top dirt-to-grass substitution for
/// chunks that receive no sky light at all.
pub fn build_mesh(volume: &VoxelVolume, light: &LightField, underground: bool) -> ChunkMesh {
    let sizing = *volume.sizing();
    let size = sizing.size;
    let y_step = sizing.y_step() as usize;
    let mut mesh = ChunkMesh::default();
    mesh.opaque.reserve((size.x * size.z) as usize);

    for y in (0..size.y).rev() {
        for z in 0..size.z {
            for x in 0..size.x {
                let i = sizing.index(x, y, z);
                let id = volume.block(i);
                if id == BLOCK_AIR {
                    continue;
                }
                if id == BLOCK_WATER {
                    if !volume.is_water_culled(i) {
                        mesh.translucent.push(FacePoint::new(
                            [x as f32, y as f32, z as f32],
                            [0, 0],
                            pack_light(volume, light, i),
                            BLOCK_WATER - 1,
                            WATER_FACE_MASK,
                        ));
                    }
                    continue;
                }
                if volume.is_culled(i) {
                    continue;
                }
                let visible_faces = volume.visible_faces(i);
                let mut atlas_id = id - 1;
                // Exposed dirt renders grass on top, unless nothing down here
                // ever sees the sky.
                if id == BlockId::DIRT as u8 && volume.block(i + y_step) == BLOCK_AIR && !underground
                {
                    atlas_id = BlockId::GRASS as u8 - 1;
                }
                mesh.opaque.push(FacePoint::new(
                    [x as f32, y as f32, z as f32],
                    pack_ao(volume, i, visible_faces),
                    pack_light(volume, light, i),
                    atlas_id,
                    visible_faces,
                ));
            }
        }
    }
    mesh
}

/// Packs the per-corner ambient occlusion of every visible face, plus the
/// per-face diagonal-flip bits, into the two AO words.
///
/// The twenty samples around the voxel are arranged in three rings:
///
/// ```text
///       top                  middle                 bottom
/// +-----+-----+-----+   +-----+/-/-/+-----+   +-----+-----+-----+
/// |  0  |  1  |  2  |   |  8  |/////|  9  |   | 12  | 13  | 14  |
/// +-----+/-/-/+-----+   +/-/-/+/-/-/+/-/-/+   +-----+/-/-/+-----+
/// |  7  |/////|  3  |   |/////|/////|/////|   | 19  |/////| 15  |
/// +-----+/-/-/+-----+   +/-/-/+/-/-/+/-/-/+   +-----+/-/-/+-----+
/// |  6  |  5  |  4  |   | 11  |/////| 10  |   | 18  | 17  | 16  |
/// +-----+-----+-----+   +-----+/-/-/+-----+   +-----+-----+-----+
/// ```
///
/// Each corner combines its two edge-adjacent samples (weight 1.5) and its
/// diagonal sample (weight 1.0), clamped to 3.0, yielding a 2-bit level.
/// Only opaque solids occlude; air and water do not.
pub fn pack_ao(volume: &VoxelVolume, i: usize, visible_faces: u8) -> [u32; 2] {
    let xs = 1usize;
    let zs = volume.sizing().z_step() as usize;
    let ys = volume.sizing().y_step() as usize;
    let occ = |off_x: isize, off_z: isize, off_y: isize| -> f32 {
        let j = (i as isize
            + off_x * xs as isize
            + off_z * zs as isize
            + off_y * ys as isize) as usize;
        (!volume.is_transparent(j)) as u32 as f32
    };
    let p: [f32; 20] = [
        // top ring
        occ(-1, -1, 1),
        occ(0, -1, 1),
        occ(1, -1, 1),
        occ(1, 0, 1),
        occ(1, 1, 1),
        occ(0, 1, 1),
        occ(-1, 1, 1),
        occ(-1, 0, 1),
        // middle ring
        occ(-1, -1, 0),
        occ(1, -1, 0),
        occ(1, 1, 0),
        occ(-1, 1, 0),
        // bottom ring
        occ(-1, -1, -1),
        occ(0, -1, -1),
        occ(1, -1, -1),
        occ(1, 0, -1),
        occ(1, 1, -1),
        occ(0, 1, -1),
        occ(-1, 1, -1),
        occ(-1, 0, -1),
    ];
    let corner = |a: f32, b: f32, c: f32| -> u32 { (a * 1.5 + b + c * 1.5).min(3.0) as u32 };

    let mut faces_ao = [0u32; 6];
    if visible_faces & 0x20 != 0 {
        faces_ao[0] = (corner(p[10], p[4], p[3]) << 2)
            | corner(p[3], p[2], p[9])
            | (corner(p[9], p[14], p[15]) << 4)
            | (corner(p[15], p[16], p[10]) << 6);
    }
    if visible_faces & 0x10 != 0 {
        faces_ao[1] = (corner(p[8], p[0], p[7]) << 6)
            | (corner(p[7], p[6], p[11]) << 2)
            | corner(p[11], p[18], p[19])
            | (corner(p[19], p[12], p[8]) << 4);
    }
    if visible_faces & 0x08 != 0 {
        faces_ao[2] = (corner(p[11], p[6], p[5]) << 6)
            | (corner(p[5], p[4], p[10]) << 2)
            | corner(p[10], p[16], p[17])
            | (corner(p[17], p[18], p[11]) << 4);
    }
    if visible_faces & 0x04 != 0 {
        faces_ao[3] = (corner(p[9], p[2], p[1]) << 2)
            | corner(p[1], p[0], p[8])
            | (corner(p[8], p[12], p[13]) << 4)
            | (corner(p[13], p[14], p[9]) << 6);
    }
    if visible_faces & 0x02 != 0 {
        faces_ao[4] = (corner(p[7], p[0], p[1]) << 4)
            | (corner(p[1], p[2], p[3]) << 6)
            | (corner(p[3], p[4], p[5]) << 2)
            | corner(p[5], p[6], p[7]);
    }
    if visible_faces & 0x01 != 0 {
        faces_ao[5] = (corner(p[19], p[12], p[13]) << 4)
            | corner(p[13], p[14], p[15])
            | (corner(p[15], p[16], p[17]) << 2)
            | (corner(p[17], p[18], p[19]) << 6);
    }

    // A quad is flipped when the middle corner pair (1, 2) is more occluded
    // than the outer pair (0, 3); triangulating along the brighter diagonal
    // avoids a lighting seam.
    let sq = |v: u32| v * v;
    let mut flipped_quads = 0u32;
    for (f, &ao) in faces_ao.iter().enumerate() {
        if visible_faces & (0x20 >> f) != 0
            && sq((ao >> 4) & 0x3) + sq((ao >> 2) & 0x3) > sq((ao >> 6) & 0x3) + sq(ao & 0x3)
        {
            flipped_quads |= 1 << (5 - f);
        }
    }
    [
        (faces_ao[0] << AO_SHIFT_RIGHT)
            | (faces_ao[1] << AO_SHIFT_LEFT)
            | (faces_ao[2] << AO_SHIFT_FRONT)
            | (faces_ao[3] << AO_SHIFT_BACK),
        (flipped_quads << AO_SHIFT_FLIP)
            | (faces_ao[4] << AO_SHIFT_TOP)
            | (faces_ao[5] << AO_SHIFT_BOTTOM),
    ]
}

/// Packs the light values of the six axis neighbors into nibbles, and ORs in
/// a marker bit per face whose neighbor voxel is water.
pub fn pack_light(volume: &VoxelVolume, light: &LightField, i: usize) -> u32 {
    let zs = volume.sizing().z_step() as usize;
    let ys = volume.sizing().y_step() as usize;
    let neighbors = [i + 1, i - 1, i + zs, i - zs, i + ys, i - ys];
    let mut word = 0u32;
    for (f, &n) in neighbors.iter().enumerate() {
        word |= (light.value(n) as u32 & 0xF) << LIGHT_SHIFTS[f];
        if volume.block(n) == BLOCK_WATER {
            word |= 1 << (LIGHT_SHIFT_WATER_MARKERS + f as u32);
        }
    }
    word
}

//! # Light Propagation
//!
//! Sky light as a per-voxel intensity in 0..=15, computed per chunk in three
//! passes and kept consistent across chunk borders by the scheduler's update
//! queue.
//!
//! ## Passes
//!
//! 1. **Column pass** (once per chunk): every padded XZ column walks from the
//!    top of the chunk down, carrying the light mask inherited from the chunk
//!    above. A column stays at full light while it sees air and the mask was
//!    already full; the mask drops to zero the instant an opaque voxel is
//!    met. A water surface ends direct sky exposure but seeds the flood fill
//!    so light dims through the water body by the normal per-step falloff.
//!    When the inherited mask is entirely zero the chunk is marked
//!    underground and the whole computation short-circuits.
//! 2. **Border seeding** (every call): margin cells adopt a neighbor chunk's
//!    border light wherever it is at least two levels brighter, queueing the
//!    cross-chunk gradient for relaxation.
//! 3. **Relaxation**: breadth-first flood fill; a transparent neighbor at
//!    least two levels darker is raised to one below the current cell and
//!    re-queued. All edge costs are uniform, so a FIFO queue reaches the
//!    fixed point without priority ordering.
//!
//! The `+2` gate is what makes the per-step falloff exactly one level: a
//! neighbor already within one level of the current cell is adequately lit
//! and never re-queued.

use std::collections::VecDeque;

use cgmath::Point3;

use super::{Chunk, Neighbours};
use crate::voxels::volume::ChunkSizing;
use crate::voxels::{is_transparent_id, Side, BLOCK_WATER, LIGHT_MAX};

/// A chunk's derived light state: one intensity byte per padded voxel, plus
/// the per-column sky mask handed down to the chunk below.
#[derive(Clone)]
pub struct LightField {
    map: Vec<u8>,
    mask: Vec<u8>,
}

impl LightField {
    /// Creates a dark light map under a fully-lit sky mask.
    pub fn new(sizing: ChunkSizing) -> Self {
        LightField {
            map: vec![0; sizing.volume_len()],
            mask: vec![LIGHT_MAX; sizing.slice_len()],
        }
    }

    /// Light value at a flat voxel index.
    #[inline]
    pub fn value(&self, i: usize) -> u8 {
        self.map[i]
    }

    /// Light value at chunk-local coordinates.
    #[inline]
    pub fn value_at(&self, sizing: &ChunkSizing, x: i32, y: i32, z: i32) -> u8 {
        self.map[sizing.index(x, y, z)]
    }

    /// The per-column sky mask. After the column pass this is the light
    /// arriving at the *bottom* of the chunk, i.e. the mask the chunk below
    /// inherits.
    #[inline]
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Whether no column in the working extent carries any light.
    pub fn mask_is_zero(&self, sizing: &ChunkSizing) -> bool {
        for z in -1..=sizing.size.z {
            for x in -1..=sizing.size.x {
                if self.mask[sizing.column_index(x, z)] != 0 {
                    return false;
                }
            }
        }
        true
    }
}

impl Chunk {
    /// Runs the light passes described in the module docs and records which
    /// border sides changed in `sides_light_update`.
    ///
    /// Absent neighbors contribute nothing (treated as dark); correctness
    /// across that border is deferred to the update the neighbor enqueues
    /// when it is generated.
    pub fn compute_light(&mut self, neighbours: &Neighbours) {
        self.sides_light_update = 0;
        let sizing = *self.volume.sizing();
        let size = sizing.size;
        let mut queue: VecDeque<Point3<i32>> = VecDeque::new();

        if !self.first_light_pass_done {
            self.first_light_pass_done = true;
            if let Some(above) = neighbours[Side::Top.index()] {
                self.light.mask.copy_from_slice(above.light.mask());
                if self.light.mask_is_zero(&sizing) {
                    // Nothing down here ever sees the sky.
                    self.underground = true;
                    self.lighted = true;
                    return;
                }
            }
            // Column pass: one row into the top margin down through the
            // interior, over the interior columns plus a one-cell ring.
            for y in (0..=size.y).rev() {
                for z in -1..=size.z {
                    for x in -1..=size.x {
                        let j = sizing.column_index(x, z);
                        let i = sizing.index(x, y, z);
                        let id = self.volume.block(i);
                        if is_transparent_id(id) && self.light.mask[j] == LIGHT_MAX {
                            self.light.map[i] = LIGHT_MAX;
                            if id == BLOCK_WATER {
                                queue.push_back(Point3::new(x, y, z));
                                self.light.mask[j] = 0;
                            }
                        } else if !is_transparent_id(id) {
                            self.light.mask[j] = 0;
                            self.light.map[i] = 0;
                        } else {
                            self.light.map[i] = self.light.mask[j];
                        }
                    }
                }
            }
            // Seed the lit/shadow transitions: every lit cell with a dimmer
            // transparent neighbor is a relaxation front.
            for y in (0..=size.y).rev() {
                for z in -1..=size.z {
                    for x in -1..=size.x {
                        let i = sizing.index(x, y, z);
                        let cur = self.light.map[i];
                        if cur < 2 {
                            continue;
                        }
                        for side in Side::ALL {
                            let o = side.offset();
                            let (nx, ny, nz) = (x + o.x, y + o.y, z + o.z);
                            if !sizing.in_flood_bounds(nx, ny, nz) {
                                continue;
                            }
                            let ni = sizing.index(nx, ny, nz);
                            if self.volume.is_transparent(ni) && self.light.map[ni] + 2 <= cur {
                                queue.push_back(Point3::new(x, y, z));
                                break;
                            }
                        }
                    }
                }
            }
        }

        // Border seeding from whichever neighbors exist right now.
        for side in Side::ALL {
            if let Some(neighbour) = neighbours[side.index()] {
                self.seed_border_light(neighbour, side, &mut queue);
            }
        }

        // Relaxation to the fixed point.
        while let Some(p) = queue.pop_front() {
            let cur = self.light.map[sizing.index(p.x, p.y, p.z)];
            if cur < 2 {
                continue;
            }
            for side in Side::ALL {
                let o = side.offset();
                let (nx, ny, nz) = (p.x + o.x, p.y + o.y, p.z + o.z);
                if !sizing.in_flood_bounds(nx, ny, nz) {
                    continue;
                }
                let ni = sizing.index(nx, ny, nz);
                if self.volume.is_transparent(ni) && self.light.map[ni] + 2 <= cur {
                    self.light.map[ni] = cur - 1;
                    queue.push_back(Point3::new(nx, ny, nz));
                    self.sides_light_update |= sizing.touched_sides(nx, ny, nz);
                }
            }
        }
        self.lighted = true;
    }

    /// Adopts `neighbour`'s interior border light into this chunk's margin
    /// ring wherever it is at least two levels brighter, queueing those cells
    /// for relaxation.
    fn seed_border_light(
        &mut self,
        neighbour: &Chunk,
        side: Side,
        queue: &mut VecDeque<Point3<i32>>,
    ) {
        let sizing = *self.volume.sizing();
        let size = sizing.size;
        let o = side.offset();
        let nb_sizing = *neighbour.volume.sizing();
        for_each_margin_cell(size, side, |p| {
            // The neighbor's matching interior cell sits one full chunk back
            // along the side's axis.
            let q = Point3::new(p.x - o.x * size.x, p.y - o.y * size.y, p.z - o.z * size.z);
            let v = neighbour.light.value_at(&nb_sizing, q.x, q.y, q.z);
            let i = sizing.index(p.x, p.y, p.z);
            if self.volume.is_transparent(i) && v >= self.light.map[i] + 2 {
                self.light.map[i] = v;
                queue.push_back(p);
            }
        });
    }
}

/// Visits every cell of the one-voxel margin plane beyond the given side.
pub(crate) fn for_each_margin_cell(
    size: cgmath::Vector3<i32>,
    side: Side,
    mut f: impl FnMut(Point3<i32>),
) {
    match side {
        Side::Right => {
            for y in 0..size.y {
                for z in 0..size.z {
                    f(Point3::new(size.x, y, z));
                }
            }
        }
        Side::Left => {
            for y in 0..size.y {
                for z in 0..size.z {
                    f(Point3::new(-1, y, z));
                }
            }
        }
        Side::Top => {
            for z in 0..size.z {
                for x in 0..size.x {
                    f(Point3::new(x, size.y, z));
                }
            }
        }
        Side::Bottom => {
            for z in 0..size.z {
                for x in 0..size.x {
                    f(Point3::new(x, -1, z));
                }
            }
        }
        Side::Front => {
            for y in 0..size.y {
                for x in 0..size.x {
                    f(Point3::new(x, y, size.z));
                }
            }
        }
        Side::Back => {
            for y in 0..size.y {
                for x in 0..size.x {
                    f(Point3::new(x, y, -1));
                }
            }
        }
    }
}

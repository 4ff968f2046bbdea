//! # Water Propagation
//!
//! Flood fill of the water block id into reachable air. Unlike light there is
//! no falloff: any air cell reachable from a water cell through the five
//! non-upward directions becomes water. The field is represented directly in
//! the block-id volume - flooding overwrites air cells in place, which keeps
//! every downstream consumer (mesher, light pass, underwater probe) reading
//! one source of truth.

use std::collections::VecDeque;

use cgmath::Point3;

use super::light::for_each_margin_cell;
use super::{Chunk, Neighbours};
use crate::voxels::{Side, BLOCK_AIR, BLOCK_WATER};

impl Chunk {
    /// Floods water through this chunk and records which border sides gained
    /// water in `sides_water_update`.
    ///
    /// Seeds are (a) margin cells mirroring a neighbor chunk's flooded border
    /// and (b) interior water cells with at least one non-upward air
    /// neighbor. Absent neighbors contribute nothing; the cross-border fill
    /// happens when they arrive and enqueue their own update.
    pub fn compute_water(&mut self, neighbours: &Neighbours) {
        self.sides_water_update = 0;
        let sizing = *self.volume.sizing();
        let size = sizing.size;
        let mut queue: VecDeque<Point3<i32>> = VecDeque::new();

        // Adopt neighbor water at the borders.
        for side in Side::ALL {
            let Some(neighbour) = neighbours[side.index()] else {
                continue;
            };
            let o = side.offset();
            for_each_margin_cell(size, side, |p| {
                let q = Point3::new(p.x - o.x * size.x, p.y - o.y * size.y, p.z - o.z * size.z);
                if neighbour.volume.block_at(q.x, q.y, q.z) == BLOCK_WATER
                    && self.volume.block_at(p.x, p.y, p.z) == BLOCK_AIR
                {
                    self.volume.set_block_at(p.x, p.y, p.z, BLOCK_WATER);
                    queue.push_back(p);
                }
            });
        }

        // Interior water touching air is an open front.
        for y in 0..size.y {
            for z in 0..size.z {
                for x in 0..size.x {
                    if self.volume.block_at(x, y, z) != BLOCK_WATER {
                        continue;
                    }
                    for side in Side::WATER_FLOW {
                        let o = side.offset();
                        if self.volume.block_at(x + o.x, y + o.y, z + o.z) == BLOCK_AIR {
                            queue.push_back(Point3::new(x, y, z));
                            break;
                        }
                    }
                }
            }
        }

        // Flood. Water never flows upward.
        while let Some(p) = queue.pop_front() {
            for side in Side::WATER_FLOW {
                let o = side.offset();
                let (nx, ny, nz) = (p.x + o.x, p.y + o.y, p.z + o.z);
                if !sizing.in_flood_bounds(nx, ny, nz) {
                    continue;
                }
                if self.volume.block_at(nx, ny, nz) == BLOCK_AIR {
                    self.volume.set_block_at(nx, ny, nz, BLOCK_WATER);
                    queue.push_back(Point3::new(nx, ny, nz));
                    self.sides_water_update |= sizing.touched_sides(nx, ny, nz);
                }
            }
        }
    }
}

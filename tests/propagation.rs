//! Chunk-level propagation behavior: sky light falloff, water flood
//! containment, cross-border adoption and mesh rebuild stability.

use cgmath::Point3;
use voxel_terrain::meshing::face_point::AO_SHIFT_FLIP;
use voxel_terrain::voxels::chunk::Neighbours;
use voxel_terrain::voxels::{BLOCK_AIR, BLOCK_WATER};
use voxel_terrain::{BlockId, Chunk, ChunkSizing, Side};

const SIZE: i32 = 8;

fn sizing() -> ChunkSizing {
    ChunkSizing::cubic(SIZE, 4)
}

/// Builds a chunk at `key` from a closure mapping padded-local coordinates to
/// block ids.
fn chunk_from(key: Point3<i32>, f: impl Fn(i32, i32, i32) -> u8) -> Chunk {
    let s = sizing();
    let m = s.half_margin();
    let mut blocks = vec![0u8; s.volume_len()];
    for y in -m..SIZE + m {
        for z in -m..SIZE + m {
            for x in -m..SIZE + m {
                blocks[s.index(x, y, z)] = f(x, y, z);
            }
        }
    }
    Chunk::new(key, s, &blocks)
}

fn no_neighbours<'a>() -> Neighbours<'a> {
    [None; 6]
}

#[test]
fn open_sky_reaches_full_light_down_to_the_floor() {
    let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, z| {
        if y == 0 && (0..SIZE).contains(&x) && (0..SIZE).contains(&z) {
            BlockId::STONE as u8
        } else {
            BLOCK_AIR
        }
    });
    chunk.compute_light(&no_neighbours());

    assert!(chunk.is_lighted());
    assert!(!chunk.is_underground());
    let s = sizing();
    for y in 1..SIZE {
        assert_eq!(chunk.light().value_at(&s, 4, y, 4), 15, "air column at y={y}");
    }
    assert_eq!(chunk.light().value_at(&s, 4, 0, 4), 0, "opaque floor voxel");
}

#[test]
fn light_wraps_around_a_lone_voxel_with_one_step_falloff() {
    let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, z| {
        if (x, y, z) == (4, 4, 4) {
            BlockId::STONE as u8
        } else {
            BLOCK_AIR
        }
    });
    chunk.compute_light(&no_neighbours());
    chunk.compute_water(&no_neighbours());
    chunk.build_mesh();

    // The shadow column under the voxel is re-lit sideways to one below full.
    let s = sizing();
    for y in 0..4 {
        assert_eq!(chunk.light().value_at(&s, 4, y, 4), 14, "shadow at y={y}");
    }

    assert_eq!(chunk.opaque_points().len(), 1);
    let point = &chunk.opaque_points()[0];
    assert_eq!(point.visible_faces, 0x3F);
    for side in [Side::Right, Side::Left, Side::Front, Side::Back, Side::Top] {
        assert_eq!(point.neighbor_light(side.face_bit()), 15);
    }
    assert_eq!(point.neighbor_light(Side::Bottom.face_bit()), 14);
}

#[test]
fn light_under_an_overhang_is_monotone_and_distance_attenuated() {
    // A full-chunk slab at y=6; sky light creeps in under it from the open
    // margin ring.
    let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, z| {
        if y == 6 && (0..SIZE).contains(&x) && (0..SIZE).contains(&z) {
            BlockId::STONE as u8
        } else {
            BLOCK_AIR
        }
    });
    chunk.compute_light(&no_neighbours());

    let s = sizing();
    // Deepest under the slab: four steps from the nearest lit ring cell.
    assert_eq!(chunk.light().value_at(&s, 4, 3, 4), 11);
    // One step in from a corner of the ring.
    assert_eq!(chunk.light().value_at(&s, 0, 5, 0), 14);

    // Adjacent transparent voxels never differ by more than one level.
    for y in 0..SIZE {
        for z in 0..SIZE {
            for x in 0..SIZE {
                let i = s.index(x, y, z);
                let here = chunk.light().value(i);
                if !chunk.volume().is_transparent(i) {
                    continue;
                }
                for side in Side::ALL {
                    let o = side.offset();
                    let ni = s.index(x + o.x, y + o.y, z + o.z);
                    if chunk.volume().is_transparent(ni) {
                        let there = chunk.light().value(ni);
                        assert!(
                            here.abs_diff(there) <= 1,
                            "light jump {here} -> {there} at ({x},{y},{z}) {side:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn quad_diagonal_flips_only_when_the_middle_corner_pair_is_darker() {
    // Two occluders over opposite corners of the top face. When they darken
    // the middle corner pair (1, 2) the quad's triangulation diagonal must
    // flip; the mirrored arrangement darkening (0, 3) keeps it.
    let occluded = |a: (i32, i32, i32), b: (i32, i32, i32)| {
        let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, z| {
            if (x, y, z) == (4, 4, 4) || (x, y, z) == a || (x, y, z) == b {
                BlockId::STONE as u8
            } else {
                BLOCK_AIR
            }
        });
        chunk.build_mesh();
        *chunk
            .opaque_points()
            .iter()
            .find(|p| p.position == [4.0, 4.0, 4.0])
            .unwrap()
    };
    let top = Side::Top.face_bit();
    let top_flip = 0x02; // bit 5 - f for face index 4

    let point = occluded((3, 5, 3), (5, 5, 5));
    assert_eq!(point.corner_ao(top, 1), 1);
    assert_eq!(point.corner_ao(top, 2), 1);
    assert_eq!(point.corner_ao(top, 0), 0);
    assert_eq!(point.corner_ao(top, 3), 0);
    assert_ne!(
        (point.ao[1] >> AO_SHIFT_FLIP) & top_flip,
        0,
        "darker middle pair must flip the diagonal"
    );

    let point = occluded((5, 5, 3), (3, 5, 5));
    assert_eq!(point.corner_ao(top, 0), 1);
    assert_eq!(point.corner_ao(top, 3), 1);
    assert_eq!(point.corner_ao(top, 1), 0);
    assert_eq!(point.corner_ao(top, 2), 0);
    assert_eq!(
        (point.ao[1] >> AO_SHIFT_FLIP) & top_flip,
        0,
        "darker outer pair keeps the diagonal"
    );
}

#[test]
fn all_dark_inherited_mask_short_circuits_as_underground() {
    let mut above = chunk_from(Point3::new(0, 1, 0), |_, _, _| BlockId::STONE as u8);
    above.compute_light(&no_neighbours());

    let mut below = chunk_from(Point3::new(0, 0, 0), |_, _, _| BLOCK_AIR);
    let mut neighbours = no_neighbours();
    neighbours[Side::Top.index()] = Some(&above);
    below.compute_light(&neighbours);

    assert!(below.is_underground());
    assert!(below.is_lighted());
    let s = sizing();
    assert_eq!(below.light().value_at(&s, 4, 7, 4), 0);
}

#[test]
fn water_floods_sideways_and_down_but_never_up() {
    let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, z| {
        if y == 0 && (0..SIZE).contains(&x) && (0..SIZE).contains(&z) {
            BlockId::STONE as u8
        } else if (x, y, z) == (4, 4, 4) {
            BLOCK_WATER
        } else {
            BLOCK_AIR
        }
    });
    chunk.compute_water(&no_neighbours());

    let v = chunk.volume();
    assert_eq!(v.block_at(0, 4, 0), BLOCK_WATER, "same level, far corner");
    assert_eq!(v.block_at(7, 1, 7), BLOCK_WATER, "down to the floor");
    assert_eq!(v.block_at(4, 5, 4), BLOCK_AIR, "water must not rise");
    assert_ne!(chunk.sides_water_update(), 0);
}

#[test]
fn water_crosses_into_a_neighbour_through_its_margin() {
    let source = {
        let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, _| {
            if x == SIZE - 1 && y == 4 {
                BLOCK_WATER
            } else {
                BLOCK_AIR
            }
        });
        chunk.compute_water(&no_neighbours());
        chunk
    };

    let mut right = chunk_from(Point3::new(1, 0, 0), |_, _, _| BLOCK_AIR);
    let mut neighbours = no_neighbours();
    neighbours[Side::Left.index()] = Some(&source);
    right.compute_water(&neighbours);

    let v = right.volume();
    assert_eq!(v.block_at(-1, 4, 4), BLOCK_WATER, "adopted margin cell");
    assert_eq!(v.block_at(0, 4, 4), BLOCK_WATER, "flooded interior border");
    assert_eq!(v.block_at(4, 5, 4), BLOCK_AIR);
    assert_ne!(right.sides_water_update() & (1 << Side::Left.index()), 0);
}

#[test]
fn rebuild_produces_bit_identical_buffers_when_nothing_changed() {
    let mut chunk = chunk_from(Point3::new(0, 0, 0), |x, y, z| {
        if y < 3 {
            BlockId::STONE as u8
        } else if y == 3 && x > 2 && z > 2 {
            BlockId::DIRT as u8
        } else {
            BLOCK_AIR
        }
    });
    chunk.compute_water(&no_neighbours());
    chunk.compute_light(&no_neighbours());
    chunk.build_mesh();

    let opaque = chunk.opaque_points().to_vec();
    let translucent = chunk.translucent_points().to_vec();
    assert!(!opaque.is_empty());

    chunk.rebuild_mesh();
    assert_eq!(opaque.as_slice(), chunk.opaque_points());
    assert_eq!(translucent.as_slice(), chunk.translucent_points());
}

#[test]
fn random_worlds_keep_packed_records_consistent() {
    let mut rng = fastrand::Rng::with_seed(0x0ddba11);
    for _ in 0..8 {
        let s = sizing();
        let mut blocks = vec![0u8; s.volume_len()];
        for b in &mut blocks {
            *b = match rng.u8(0..6) {
                0 | 1 => BLOCK_AIR,
                2 => BLOCK_WATER,
                3 => BlockId::DIRT as u8,
                _ => BlockId::STONE as u8,
            };
        }
        let mut chunk = Chunk::new(Point3::new(0, 0, 0), s, &blocks);
        chunk.compute_water(&no_neighbours());
        chunk.compute_light(&no_neighbours());
        chunk.build_mesh();

        for point in chunk.opaque_points() {
            assert_ne!(point.visible_faces, 0, "culled voxel was meshed");
            for side in Side::ALL {
                let bit = side.face_bit();
                if point.visible_faces & bit == 0 {
                    // Hidden faces carry no occlusion bits.
                    for c in 0..4 {
                        assert_eq!(point.corner_ao(bit, c), 0);
                    }
                }
                assert!(point.neighbor_light(bit) <= 15);
            }
        }
        for point in chunk.translucent_points() {
            assert_eq!(point.visible_faces, 0x03);
            assert_eq!(point.id, BLOCK_WATER - 1);
        }
    }
}

#[test]
fn unlighted_chunks_refuse_to_rebuild() {
    let mut chunk = chunk_from(Point3::new(0, 0, 0), |_, y, _| {
        if y < 3 {
            BlockId::STONE as u8
        } else {
            BLOCK_AIR
        }
    });
    chunk.rebuild_mesh();
    assert!(!chunk.is_meshed());
    assert!(chunk.opaque_points().is_empty());
}

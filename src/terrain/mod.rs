//! # Terrain Scheduler
//!
//! Owns the chunk store and drives the chunk lifecycle: frontier expansion,
//! time-budgeted generation, the cross-chunk water/light update queue, and
//! distance eviction. One `update_chunks` call per frame performs a bounded
//! slice of work; one `render_chunks` call snapshots the visible draws.
//!
//! ## Scheduling model
//!
//! All work is single-threaded and cooperative. Each frame:
//!
//! 1. the frontier walk enqueues missing chunks around the viewpoint;
//! 2. the update queue drains until the update budget elapses (measured from
//!    frame start);
//! 3. the load queue drains until the load budget elapses (same clock, so
//!    update work spends from the load budget too);
//! 4. chunks flagged out of range by the last render pass are dropped.
//!
//! Budgets are checked between work items, never inside one, so a single
//! generation or propagation call can overrun its budget by at most one
//! item's cost.
//!
//! ## Update fan-out
//!
//! Water and light changes cross borders by message, not by shared state:
//! when a pass touches a border side, a same-kind update is enqueued for the
//! neighbor on that side. Each update remembers the chunk that caused it and
//! the fan-out skips that chunk, which stops two neighbors from ping-ponging
//! updates at a settled border.

use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use cgmath::{EuclideanSpace, Matrix4, Point3, Vector3};
use log::debug;
use web_time::Instant;

use crate::config::TerrainConfig;
use crate::rendering::{ChunkDraw, Frustum, RenderFrame};
use crate::voxels::chunk::{Chunk, Neighbours};
use crate::voxels::volume::ChunkSizing;
use crate::voxels::{Side, BLOCK_WATER};

pub mod generation;

pub use generation::{NoiseGenerator, TerrainGenerator};

/// Which propagation pass a queued update runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum UpdateKind {
    Water,
    Light,
}

/// One queued cross-chunk update. `from` is the chunk whose pass caused it;
/// the fan-out never sends an update back to its cause.
#[derive(Copy, Clone, Debug)]
struct ChunkUpdate {
    key: Point3<i32>,
    from: Point3<i32>,
    kind: UpdateKind,
}

/// The streaming terrain: chunk store, work queues and per-frame stepping.
pub struct Terrain {
    config: TerrainConfig,
    sizing: ChunkSizing,
    height_chunks: i32,
    generator: Box<dyn TerrainGenerator>,
    chunks: HashMap<Point3<i32>, Chunk>,
    load_queue: VecDeque<Point3<i32>>,
    /// Keys currently sitting in `load_queue`.
    load_queued: HashSet<Point3<i32>>,
    update_queue: VecDeque<ChunkUpdate>,
    /// Reused generation buffer, one byte per padded voxel.
    scratch: Vec<u8>,
    frame_start: Instant,
}

impl Terrain {
    /// Creates a terrain and generates its seed chunk at the top of the
    /// world above the origin. The frontier walk grows everything else from
    /// that one chunk.
    ///
    /// # Panics
    /// Panics if `config` fails [`TerrainConfig::validate`].
    pub fn new(config: TerrainConfig, generator: Box<dyn TerrainGenerator>) -> Self {
        if let Err(e) = config.validate() {
            panic!("terrain configured with invalid settings: {e}");
        }
        let sizing = config.sizing();
        let height_chunks = config.height_in_chunks();
        let mut terrain = Terrain {
            config,
            sizing,
            height_chunks,
            generator,
            chunks: HashMap::new(),
            load_queue: VecDeque::new(),
            load_queued: HashSet::new(),
            update_queue: VecDeque::new(),
            scratch: vec![0; sizing.volume_len()],
            frame_start: Instant::now(),
        };
        terrain.generate_chunk(Point3::new(0, height_chunks - 1, 0));
        terrain
    }

    /// The chunk-grid coordinate containing the world point `p`, with the
    /// vertical component clamped into the world's chunk layers.
    pub fn chunk_position(&self, p: Point3<f32>) -> Point3<i32> {
        let s = self.sizing.size;
        Point3::new(
            (p.x / s.x as f32).floor() as i32,
            ((p.y / s.y as f32).floor() as i32).clamp(0, self.height_chunks - 1),
            (p.z / s.z as f32).floor() as i32,
        )
    }

    /// Number of chunks currently resident.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// The resident chunk at `key`, if generated.
    pub fn chunk(&self, key: Point3<i32>) -> Option<&Chunk> {
        self.chunks.get(&key)
    }

    /// Pending generation requests.
    pub fn pending_loads(&self) -> usize {
        self.load_queue.len()
    }

    /// Pending cross-chunk updates.
    pub fn pending_updates(&self) -> usize {
        self.update_queue.len()
    }

    /// Enqueues `key` for generation unless it is already resident or
    /// already queued.
    pub fn request_chunk(&mut self, key: Point3<i32>) {
        if key.y < 0 || key.y >= self.height_chunks {
            return;
        }
        if self.chunks.contains_key(&key) || !self.load_queued.insert(key) {
            return;
        }
        self.load_queue.push_back(key);
    }

    /// Performs one frame's worth of terrain work around `viewpoint`.
    pub fn update_chunks(&mut self, viewpoint: Point3<f32>) {
        self.frame_start = Instant::now();
        let center = self.chunk_position(viewpoint);

        self.expand_frontier(center);
        self.drain_updates();
        self.drain_loads(center);

        let before = self.chunks.len();
        self.chunks.retain(|_, chunk| !chunk.is_out_of_range());
        let evicted = before - self.chunks.len();

        debug!(
            "terrain: {} chunks, {} updates queued, {} loads queued, {} evicted",
            self.chunks.len(),
            self.update_queue.len(),
            self.load_queue.len(),
            evicted
        );
    }

    /// Snapshots the visible chunk draws for this frame: range flags are
    /// refreshed, chunks are sorted near to far, frustum-culled against
    /// `view_projection`, and probed for the underwater tint.
    pub fn render_chunks(
        &mut self,
        viewpoint: Point3<f32>,
        view_projection: &Matrix4<f32>,
    ) -> RenderFrame<'_> {
        let render_distance = self.config.render_distance;
        for chunk in self.chunks.values_mut() {
            chunk.update_range_flag(viewpoint, render_distance);
        }

        let underwater = self.probe_underwater(viewpoint);
        let frustum = Frustum::from_view_projection(view_projection);
        let size = self.sizing.size;
        let extent = Vector3::new(size.x as f32, size.y as f32, size.z as f32);
        let half = extent / 2.0;

        let mut visible: Vec<(f32, &Chunk)> = self
            .chunks
            .values()
            .filter(|chunk| chunk.is_meshed())
            .filter(|chunk| {
                !chunk.opaque_points().is_empty() || !chunk.translucent_points().is_empty()
            })
            .filter(|chunk| frustum.aabb_visible(chunk.world_origin(), extent))
            .map(|chunk| {
                let center = chunk.world_origin() + half;
                let d = center - viewpoint.to_vec();
                (d.x * d.x + d.y * d.y + d.z * d.z, chunk)
            })
            .collect();
        visible.sort_by(|a, b| a.0.total_cmp(&b.0));

        RenderFrame {
            draws: visible
                .into_iter()
                .map(|(_, chunk)| ChunkDraw {
                    transform: *chunk.transform(),
                    opaque: chunk.opaque_points(),
                    translucent: chunk.translucent_points(),
                })
                .collect(),
            underwater,
        }
    }

    /// Whether the viewpoint sits inside a water voxel. The probe is biased
    /// half a voxel upward so the tint engages as the eye crosses the
    /// surface, not half a wave later.
    fn probe_underwater(&self, viewpoint: Point3<f32>) -> bool {
        let probe = Point3::new(viewpoint.x, viewpoint.y + 0.5, viewpoint.z);
        let key = self.chunk_position(probe);
        let Some(chunk) = self.chunks.get(&key) else {
            return false;
        };
        let origin = chunk.world_origin();
        let x = (probe.x - origin.x).floor() as i32;
        let y = (probe.y - origin.y).floor() as i32;
        let z = (probe.z - origin.z).floor() as i32;
        let sizing = chunk.volume().sizing();
        if x < 0 || y < 0 || z < 0 || x >= sizing.size.x || y >= sizing.size.y || z >= sizing.size.z
        {
            return false;
        }
        chunk.volume().block_at(x, y, z) == BLOCK_WATER
    }

    /// Horizontal chunk-grid distance at which new top-layer chunks are
    /// still requested.
    fn load_trigger_distance(&self) -> f32 {
        self.config.render_distance / self.sizing.size.x as f32
    }

    /// Grows the loaded region from the chunks already present: every
    /// resident top-layer chunk requests the full column below it, and, when
    /// within the load trigger distance of `center`, its four horizontal
    /// neighbors. Growth is purely local, so the region stays connected and
    /// follows the viewpoint one ring per frame.
    fn expand_frontier(&mut self, center: Point3<i32>) {
        let top = self.height_chunks - 1;
        let trigger = self.load_trigger_distance();
        // After a teleport everything may have been evicted; reseed under the
        // viewpoint so the walk has a chunk to grow from.
        if self.chunks.is_empty() {
            self.request_chunk(Point3::new(center.x, top, center.z));
        }
        let top_keys: Vec<Point3<i32>> = self
            .chunks
            .keys()
            .filter(|k| k.y == top)
            .copied()
            .collect();
        for key in top_keys {
            for y in (0..top).rev() {
                self.request_chunk(Point3::new(key.x, y, key.z));
            }
            if Self::horizontal_distance(key, center) <= trigger {
                for offset in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    self.request_chunk(Point3::new(key.x + offset.0, top, key.z + offset.1));
                }
            }
        }
    }

    fn horizontal_distance(a: Point3<i32>, b: Point3<i32>) -> f32 {
        let dx = (a.x - b.x) as f32;
        let dz = (a.z - b.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }

    /// Drains the update queue until the update budget elapses.
    fn drain_updates(&mut self) {
        let budget = Duration::from_secs_f32(self.config.update_budget_ms / 1000.0);
        while self.frame_start.elapsed() < budget {
            let Some(update) = self.update_queue.pop_front() else {
                break;
            };
            self.process_update(update);
        }
    }

    /// Runs one queued propagation pass and fans out to the neighbors whose
    /// border the pass touched.
    fn process_update(&mut self, update: ChunkUpdate) {
        // The chunk may have been evicted since the update was queued.
        let Some(mut chunk) = self.chunks.remove(&update.key) else {
            return;
        };
        let neighbours = Self::neighbouring(&self.chunks, update.key);
        let touched = match update.kind {
            UpdateKind::Water => {
                chunk.compute_water(&neighbours);
                chunk.sides_water_update()
            }
            UpdateKind::Light => {
                chunk.compute_light(&neighbours);
                chunk.sides_light_update()
            }
        };
        for side in Side::ALL {
            if touched & (1 << side.index()) == 0 {
                continue;
            }
            let o = side.offset();
            let neighbour_key = Point3::new(
                update.key.x + o.x,
                update.key.y + o.y,
                update.key.z + o.z,
            );
            if neighbour_key != update.from && self.chunks.contains_key(&neighbour_key) {
                self.update_queue.push_back(ChunkUpdate {
                    key: neighbour_key,
                    from: update.key,
                    kind: update.kind,
                });
            }
        }
        chunk.rebuild_mesh();
        self.chunks.insert(update.key, chunk);
    }

    /// Drains the load queue until the load budget elapses. Requests that
    /// drifted beyond the trigger distance while queued are discarded.
    fn drain_loads(&mut self, center: Point3<i32>) {
        let budget = Duration::from_secs_f32(self.config.load_budget_ms / 1000.0);
        let trigger = self.load_trigger_distance();
        while self.frame_start.elapsed() < budget {
            let Some(key) = self.load_queue.pop_front() else {
                break;
            };
            self.load_queued.remove(&key);
            if self.chunks.contains_key(&key) {
                continue;
            }
            if Self::horizontal_distance(key, center) > trigger {
                continue;
            }
            self.generate_chunk(key);
        }
    }

    /// Generates the chunk at `key`, inserts it, and queues the propagation
    /// passes: water then light for the new chunk, then the same pair for
    /// each resident neighbor so the new borders flow both ways.
    fn generate_chunk(&mut self, key: Point3<i32>) {
        let s = self.sizing.size;
        let origin = Vector3::new(
            (key.x * s.x) as f32,
            (key.y * s.y) as f32,
            (key.z * s.z) as f32,
        );
        self.generator.generate(origin, &self.sizing, &mut self.scratch);
        self.chunks.insert(key, Chunk::new(key, self.sizing, &self.scratch));

        for kind in [UpdateKind::Water, UpdateKind::Light] {
            self.update_queue.push_back(ChunkUpdate { key, from: key, kind });
        }
        for side in Side::ALL {
            let o = side.offset();
            let neighbour_key = Point3::new(key.x + o.x, key.y + o.y, key.z + o.z);
            if self.chunks.contains_key(&neighbour_key) {
                for kind in [UpdateKind::Water, UpdateKind::Light] {
                    self.update_queue.push_back(ChunkUpdate {
                        key: neighbour_key,
                        from: key,
                        kind,
                    });
                }
            }
        }
    }

    /// Resolves the six face-adjacent neighbors of `key` from the store.
    fn neighbouring(chunks: &HashMap<Point3<i32>, Chunk>, key: Point3<i32>) -> Neighbours<'_> {
        let mut neighbours: Neighbours = [None; 6];
        for side in Side::ALL {
            let o = side.offset();
            neighbours[side.index()] =
                chunks.get(&Point3::new(key.x + o.x, key.y + o.y, key.z + o.z));
        }
        neighbours
    }
}

//! Surface streamer: decides what should be resident, drives background
//! generation, bounds per-frame cost, and evicts stale chunks.
//!
//! The streamer lives on the rendering thread and is `!Send` — geometry
//! builds and draw submission are thread-affine, and keeping the whole
//! orchestrator pinned makes that impossible to violate. Background workers
//! only ever produce immutable heightfield-completion messages; from the
//! moment a message is drained, this type is the sole writer of chunk state.

use std::collections::{HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use glam::Vec3;

use super::config::StreamerConfig;
use super::loader::{GenerationOutcome, GenerationPool};
use super::priority::{desired_keys, LoadRequest, RequestQueue};
use crate::chunk::{Chunk, ChunkKey, CHUNK_WORLD_SIZE};
use crate::core::types::Result;
use crate::generation::placement::PlacementGenerator;
use crate::math::Frustum;
use crate::render::RenderSink;
use crate::terrain::generator::HeightfieldGenerator;
use crate::terrain::profile::Archetype;

/// Elevation reported for positions whose chunk is not resident and built.
/// Callers tolerate transient inaccuracy at chunk-load boundaries.
pub const FALLBACK_HEIGHT: f32 = 0.0;

/// Fraction of a chunk's world size the viewer must move before the desired
/// set is recomputed.
const RECOMPUTE_FRACTION: f32 = 0.25;

/// Residency state of one tracked chunk.
enum ChunkState {
    /// Heightfield generation is in flight on the background pool.
    Loading,
    /// Heightfield arrived; the chunk sits in the build queue awaiting its
    /// geometry build.
    MeshPending,
    /// Geometry built; renderable and height-queryable.
    Loaded(Chunk),
}

/// Streams terrain chunks around a moving viewpoint.
pub struct SurfaceStreamer {
    config: StreamerConfig,
    generator: Arc<HeightfieldGenerator>,
    pool: GenerationPool,

    /// Everything resident or in flight, keyed by packed chunk id.
    chunks: HashMap<ChunkKey, ChunkState>,
    /// Remaining grace seconds for chunks pending unload.
    evictions: HashMap<ChunkKey, f32>,
    /// Outstanding load requests, highest priority first.
    queue: RequestQueue,
    /// Chunks whose heightfield is ready, awaiting a geometry build.
    build_queue: VecDeque<Chunk>,

    vegetation_queue: VecDeque<ChunkKey>,
    structure_queue: VecDeque<ChunkKey>,
    vegetation_generator: Option<Box<dyn PlacementGenerator>>,
    structure_generator: Option<Box<dyn PlacementGenerator>>,

    desired: HashSet<ChunkKey>,
    last_recompute: Option<Vec3>,
    enabled: bool,

    /// Pins the streamer to the thread that created it.
    _render_thread: PhantomData<*const ()>,
}

impl SurfaceStreamer {
    /// Create a streamer for one planet surface.
    pub fn new(seed: u32, archetype: Archetype, config: StreamerConfig) -> Result<Self> {
        config.validate()?;

        let generator = Arc::new(HeightfieldGenerator::new(seed, archetype.profile()));
        let pool = GenerationPool::new(generator.clone(), config.workers)?;

        log::info!(
            "surface streamer up: seed {seed}, archetype {archetype:?}, radius {} chunks, {} workers",
            config.load_radius,
            config.workers
        );

        Ok(Self {
            config,
            generator,
            pool,
            chunks: HashMap::new(),
            evictions: HashMap::new(),
            queue: RequestQueue::new(),
            build_queue: VecDeque::new(),
            vegetation_queue: VecDeque::new(),
            structure_queue: VecDeque::new(),
            vegetation_generator: None,
            structure_generator: None,
            desired: HashSet::new(),
            last_recompute: None,
            enabled: true,
            _render_thread: PhantomData,
        })
    }

    /// Install the vegetation pass invoked once per chunk after its build.
    pub fn set_vegetation_generator(&mut self, generator: Box<dyn PlacementGenerator>) {
        self.vegetation_generator = Some(generator);
    }

    /// Install the structure pass invoked once per chunk after its build.
    pub fn set_structure_generator(&mut self, generator: Box<dyn PlacementGenerator>) {
        self.structure_generator = Some(generator);
    }

    /// Drive scheduling, eviction, and queue draining. Call once per frame
    /// from the rendering thread.
    pub fn update(&mut self, viewer: Vec3, dt: f32) {
        if !self.enabled {
            return;
        }

        self.drain_completed();
        self.maybe_recompute_desired(viewer);
        self.dispatch_requests();
        self.build_pending_meshes();
        self.run_placement_passes();
        self.tick_evictions(dt);
    }

    /// Move completed heightfields out of the pool. A chunk that finished
    /// after leaving the desired set is retired here instead of being built.
    fn drain_completed(&mut self) {
        for outcome in self.pool.poll_completed() {
            match outcome {
                GenerationOutcome::Ready { key, heightfield } => {
                    if !matches!(self.chunks.get(&key), Some(ChunkState::Loading)) {
                        // Disposed (or the streamer was disabled) while in
                        // flight; the result is simply dropped
                        continue;
                    }
                    if self.desired.contains(&key) {
                        self.chunks.insert(key, ChunkState::MeshPending);
                        self.build_queue.push_back(Chunk::new(key, heightfield));
                    } else {
                        self.chunks.remove(&key);
                        self.evictions.remove(&key);
                        log::debug!("{key:?} completed outside the desired set, dropped");
                    }
                }
                GenerationOutcome::Failed { key, error } => {
                    log::error!("heightfield generation failed for {key:?}: {error}");
                    self.chunks.remove(&key);
                    self.evictions.remove(&key);
                }
            }
        }
    }

    /// Recompute the desired set when the viewer has moved far enough (or
    /// nothing is tracked yet).
    fn maybe_recompute_desired(&mut self, viewer: Vec3) {
        let moved = match self.last_recompute {
            Some(previous) => {
                let d = viewer - previous;
                (d.x * d.x + d.z * d.z).sqrt()
            }
            None => f32::INFINITY,
        };

        if self.chunks.is_empty() || moved > CHUNK_WORLD_SIZE * RECOMPUTE_FRACTION {
            self.last_recompute = Some(viewer);
            self.recompute_desired(viewer);
        }
    }

    fn recompute_desired(&mut self, viewer: Vec3) {
        let center = ChunkKey::from_world_pos(viewer);

        self.desired.clear();
        self.queue.clear();

        for (key, distance) in desired_keys(center, self.config.load_radius) {
            self.desired.insert(key);
            // A key is represented either as a resident/in-flight chunk or as
            // a queued request, never both
            if !self.chunks.contains_key(&key) {
                self.queue.push(LoadRequest::new(key, distance));
            }
            // Revisit cancels a pending unload
            self.evictions.remove(&key);
        }

        // Chunks now outside the desired set start their grace timer
        let grace = self.config.eviction_grace;
        for key in self.chunks.keys() {
            if !self.desired.contains(key) {
                self.evictions.entry(*key).or_insert(grace);
            }
        }

        log::trace!(
            "desired set recomputed around {center:?}: {} chunks, {} queued",
            self.desired.len(),
            self.queue.len()
        );
    }

    /// Hand at most `max_dispatch_per_update` queued requests to the pool.
    fn dispatch_requests(&mut self) {
        for _ in 0..self.config.max_dispatch_per_update {
            let Some(request) = self.queue.pop() else { break };
            if self.chunks.contains_key(&request.key) {
                continue;
            }

            match self.pool.request(request.key, request.priority) {
                // Ok(false): an in-flight result from a previous enable cycle
                // still exists; track it as Loading and reuse its completion
                Ok(_) => {
                    self.chunks.insert(request.key, ChunkState::Loading);
                    log::trace!("dispatched {:?} at priority {:.3}", request.key, request.priority);
                }
                Err(e) => {
                    log::error!("failed to dispatch {:?}: {e}", request.key);
                    break;
                }
            }
        }
    }

    /// Build at most `max_builds_per_update` meshes; this bounds the frame
    /// cost no matter how many heightfields finished concurrently.
    fn build_pending_meshes(&mut self) {
        for _ in 0..self.config.max_builds_per_update {
            let Some(mut chunk) = self.build_queue.pop_front() else { break };
            let key = chunk.key();

            // Slot may have been disposed while the chunk sat in the queue
            if !matches!(self.chunks.get(&key), Some(ChunkState::MeshPending)) {
                continue;
            }

            chunk.build_geometry(self.generator.profile(), self.generator.seed());
            self.chunks.insert(key, ChunkState::Loaded(chunk));

            // Exactly one vegetation and one structure pass per built chunk
            self.vegetation_queue.push_back(key);
            self.structure_queue.push_back(key);
        }
    }

    /// Run the rate-limited vegetation and structure passes.
    fn run_placement_passes(&mut self) {
        for _ in 0..self.config.max_placements_per_update {
            let Some(key) = self.vegetation_queue.pop_front() else { break };
            let Some(generator) = self.vegetation_generator.as_deref() else { continue };

            let archetype = self.generator.profile().archetype;
            let placements = {
                let sampler = |x: f32, z: f32| self.height_at(x, z);
                generator.generate(key, CHUNK_WORLD_SIZE, archetype, &sampler)
            };
            if let Some(ChunkState::Loaded(chunk)) = self.chunks.get_mut(&key) {
                chunk.set_vegetation(placements);
            }
        }

        for _ in 0..self.config.max_placements_per_update {
            let Some(key) = self.structure_queue.pop_front() else { break };
            let Some(generator) = self.structure_generator.as_deref() else { continue };

            let archetype = self.generator.profile().archetype;
            let placements = {
                let sampler = |x: f32, z: f32| self.height_at(x, z);
                generator.generate(key, CHUNK_WORLD_SIZE, archetype, &sampler)
            };
            if let Some(ChunkState::Loaded(chunk)) = self.chunks.get_mut(&key) {
                chunk.set_structures(placements);
            }
        }
    }

    /// Count eviction timers down; dispose chunks whose grace elapsed.
    fn tick_evictions(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for (key, remaining) in self.evictions.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*key);
            }
        }

        for key in expired {
            match self.chunks.get(&key) {
                // A heightfield is still in flight; the chunk is retired at
                // the completion drain instead of here
                Some(ChunkState::Loading) => {}
                Some(_) => {
                    self.chunks.remove(&key);
                    self.evictions.remove(&key);
                    log::debug!("evicted {key:?}");
                }
                None => {
                    self.evictions.remove(&key);
                }
            }
        }
    }

    /// Synchronous height query for physics/character logic.
    ///
    /// Returns [`FALLBACK_HEIGHT`] when the owning chunk is not yet resident
    /// and built.
    pub fn height_at(&self, world_x: f32, world_z: f32) -> f32 {
        let key = ChunkKey::from_world_pos(Vec3::new(world_x, 0.0, world_z));
        match self.chunks.get(&key) {
            Some(ChunkState::Loaded(chunk)) => chunk.height_at_world(world_x, world_z),
            _ => FALLBACK_HEIGHT,
        }
    }

    /// Submit draw data for every resident, built chunk that intersects the
    /// view frustum.
    pub fn render(&self, frustum: &Frustum, sink: &mut dyn RenderSink) {
        for state in self.chunks.values() {
            let ChunkState::Loaded(chunk) = state else { continue };
            let Some(mesh) = chunk.mesh() else { continue };
            if !frustum.intersects_aabb(&chunk.bounds()) {
                continue;
            }

            sink.draw_terrain(chunk.key(), mesh);
            if !chunk.features().is_empty() {
                sink.draw_features(chunk.key(), chunk.features());
            }
            if !chunk.vegetation().is_empty() {
                sink.draw_vegetation(chunk.key(), chunk.vegetation());
            }
            if !chunk.structures().is_empty() {
                sink.draw_structures(chunk.key(), chunk.structures());
            }
        }
    }

    /// Number of chunks that are fully built and renderable.
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks
            .values()
            .filter(|s| matches!(s, ChunkState::Loaded(_)))
            .count()
    }

    /// Number of chunks queued, in flight, or awaiting a geometry build.
    pub fn pending_count(&self) -> usize {
        let unbuilt = self
            .chunks
            .values()
            .filter(|s| !matches!(s, ChunkState::Loaded(_)))
            .count();
        self.queue.len() + unbuilt
    }

    /// Resume streaming; viewer tracking restarts from scratch.
    pub fn enable(&mut self) {
        self.enabled = true;
        self.last_recompute = None;
        log::info!("surface streaming enabled");
    }

    /// Halt scheduling and evict everything immediately. In-flight results
    /// are dropped when streaming resumes.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.chunks.clear();
        self.evictions.clear();
        self.queue.clear();
        self.build_queue.clear();
        self.vegetation_queue.clear();
        self.structure_queue.clear();
        self.desired.clear();
        log::info!("surface streaming disabled, all chunks evicted");
    }

    /// Tear down the background pool, waiting up to `grace` before forcing
    /// termination.
    pub fn shutdown(self, grace: Duration) {
        self.pool.shutdown(grace);
        log::info!("surface streamer shut down");
    }
}

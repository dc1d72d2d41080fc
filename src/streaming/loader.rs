//! Background heightfield generation pool.
//!
//! A fixed number of workers compute heightfields off the rendering thread;
//! completed fields come back as immutable messages over a channel. The
//! rendering thread never blocks on the pool — it only drains whatever is
//! ready via [`GenerationPool::poll_completed`]. Ownership of a heightfield
//! transfers exactly once, at the moment its completion message is received.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::chunk::ChunkKey;
use crate::core::error::Error;
use crate::core::types::Result;
use crate::terrain::generator::HeightfieldGenerator;
use crate::terrain::heightfield::Heightfield;

/// Request sent to the worker loop.
#[derive(Debug, Clone, Copy)]
struct GenRequest {
    key: ChunkKey,
    priority: f32,
}

/// Completion message for one chunk's heightfield.
#[derive(Debug)]
pub enum GenerationOutcome {
    /// Generation finished; the heightfield is ready to attach to a chunk.
    Ready { key: ChunkKey, heightfield: Heightfield },
    /// Generation panicked or was aborted; the chunk should be dropped from
    /// tracking and may be re-requested later.
    Failed { key: ChunkKey, error: String },
}

impl GenerationOutcome {
    pub fn key(&self) -> ChunkKey {
        match self {
            GenerationOutcome::Ready { key, .. } => *key,
            GenerationOutcome::Failed { key, .. } => *key,
        }
    }
}

/// Fixed-size background pool for heightfield generation.
pub struct GenerationPool {
    request_tx: mpsc::UnboundedSender<GenRequest>,
    result_rx: mpsc::UnboundedReceiver<GenerationOutcome>,
    /// Keys currently in flight.
    pending: HashSet<ChunkKey>,
    runtime: Option<Runtime>,
}

impl GenerationPool {
    /// Spin up the pool with `workers` concurrent generation slots.
    pub fn new(generator: Arc<HeightfieldGenerator>, workers: usize) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::unbounded_channel::<GenRequest>();
        let (result_tx, result_rx) = mpsc::unbounded_channel::<GenerationOutcome>();

        let runtime = Runtime::new()
            .map_err(|e| Error::Streaming(format!("failed to start generation runtime: {e}")))?;

        runtime.spawn(Self::worker_loop(generator, workers, request_rx, result_tx));

        Ok(Self {
            request_tx,
            result_rx,
            pending: HashSet::new(),
            runtime: Some(runtime),
        })
    }

    /// Worker loop: pulls requests, keeps at most `max_concurrent` generation
    /// tasks running, and forwards every completion to the result channel.
    async fn worker_loop(
        generator: Arc<HeightfieldGenerator>,
        max_concurrent: usize,
        mut request_rx: mpsc::UnboundedReceiver<GenRequest>,
        result_tx: mpsc::UnboundedSender<GenerationOutcome>,
    ) {
        let mut active = JoinSet::new();
        let mut backlog: Vec<GenRequest> = Vec::new();

        loop {
            tokio::select! {
                Some(request) = request_rx.recv() => {
                    backlog.push(request);
                }

                Some(joined) = active.join_next(), if !active.is_empty() => {
                    match joined {
                        Ok(outcome) => {
                            let _ = result_tx.send(outcome);
                        }
                        Err(e) => {
                            // Plumbing task died; the inner panic path already
                            // produces a Failed message, so this is unexpected
                            log::error!("generation task aborted: {e}");
                        }
                    }
                }

                // Both channels idle: exit once all work is drained
                else => {
                    if backlog.is_empty() && active.is_empty() {
                        break;
                    }
                }
            }

            // Fill free slots, highest priority first
            while active.len() < max_concurrent && !backlog.is_empty() {
                backlog.sort_by(|a, b| b.priority.total_cmp(&a.priority));
                let request = backlog.remove(0);
                let generator = generator.clone();

                active.spawn(async move {
                    let key = request.key;
                    match tokio::task::spawn_blocking(move || generator.generate(key)).await {
                        Ok(heightfield) => GenerationOutcome::Ready { key, heightfield },
                        Err(e) => {
                            let error = if e.is_panic() {
                                "panic during heightfield generation".to_string()
                            } else {
                                e.to_string()
                            };
                            GenerationOutcome::Failed { key, error }
                        }
                    }
                });
            }
        }
    }

    /// Request generation of a chunk's heightfield.
    ///
    /// Returns `Ok(false)` if the key is already in flight — a given chunk is
    /// generated by exactly one background task.
    pub fn request(&mut self, key: ChunkKey, priority: f32) -> Result<bool> {
        if self.pending.contains(&key) {
            return Ok(false);
        }

        self.request_tx
            .send(GenRequest { key, priority })
            .map_err(|_| Error::Streaming("generation pool is not running".into()))?;
        self.pending.insert(key);
        Ok(true)
    }

    /// Drain all currently available completion messages (non-blocking).
    pub fn poll_completed(&mut self) -> Vec<GenerationOutcome> {
        let mut results = Vec::new();
        while let Ok(outcome) = self.result_rx.try_recv() {
            self.pending.remove(&outcome.key());
            results.push(outcome);
        }
        results
    }

    /// Number of keys currently in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether a specific key is in flight.
    pub fn is_pending(&self, key: ChunkKey) -> bool {
        self.pending.contains(&key)
    }

    /// Shut the pool down, waiting up to `grace` for in-flight generation to
    /// finish before force-terminating the runtime.
    pub fn shutdown(self, grace: Duration) {
        let GenerationPool { request_tx, runtime, .. } = self;
        // Closing the request channel lets the worker loop drain and exit
        drop(request_tx);

        if let Some(rt) = runtime {
            rt.shutdown_timeout(grace);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::profile::Archetype;

    fn pool(workers: usize) -> GenerationPool {
        let generator = Arc::new(HeightfieldGenerator::new(42, Archetype::EarthLike.profile()));
        GenerationPool::new(generator, workers).unwrap()
    }

    fn drain_until(pool: &mut GenerationPool, count: usize) -> Vec<GenerationOutcome> {
        let mut out = Vec::new();
        for _ in 0..2000 {
            out.extend(pool.poll_completed());
            if out.len() >= count {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        out
    }

    #[test]
    fn test_request_dedup() {
        let mut pool = pool(2);
        let key = ChunkKey::new(3, 4);

        assert!(pool.request(key, 1.0).unwrap());
        assert!(!pool.request(key, 2.0).unwrap());
        assert_eq!(pool.pending_count(), 1);
        assert!(pool.is_pending(key));
    }

    #[test]
    fn test_generation_completes() {
        let mut pool = pool(2);
        let key = ChunkKey::new(1, -2);
        pool.request(key, 1.0).unwrap();

        let results = drain_until(&mut pool, 1);
        assert_eq!(results.len(), 1);
        match &results[0] {
            GenerationOutcome::Ready { key: k, heightfield } => {
                assert_eq!(*k, key);
                assert_eq!(heightfield.resolution(), crate::chunk::CHUNK_RESOLUTION);
            }
            GenerationOutcome::Failed { error, .. } => panic!("generation failed: {error}"),
        }
        assert_eq!(pool.pending_count(), 0);
        assert!(!pool.is_pending(key));
    }

    #[test]
    fn test_many_requests_all_complete() {
        let mut pool = pool(2);
        let mut requested = 0;
        for x in 0..4 {
            for z in 0..4 {
                if pool.request(ChunkKey::new(x, z), 1.0 / (x + z + 1) as f32).unwrap() {
                    requested += 1;
                }
            }
        }
        assert_eq!(requested, 16);

        let results = drain_until(&mut pool, 16);
        assert_eq!(results.len(), 16);
        assert!(results.iter().all(|r| matches!(r, GenerationOutcome::Ready { .. })));
    }

    #[test]
    fn test_results_match_direct_generation() {
        let generator = Arc::new(HeightfieldGenerator::new(7, Archetype::Desert.profile()));
        let mut pool = GenerationPool::new(generator.clone(), 2).unwrap();
        let key = ChunkKey::new(-4, 9);
        pool.request(key, 1.0).unwrap();

        let results = drain_until(&mut pool, 1);
        match &results[0] {
            GenerationOutcome::Ready { heightfield, .. } => {
                assert_eq!(*heightfield, generator.generate(key));
            }
            GenerationOutcome::Failed { error, .. } => panic!("generation failed: {error}"),
        }
    }

    #[test]
    fn test_shutdown_with_work_in_flight() {
        let mut pool = pool(2);
        for x in 0..8 {
            pool.request(ChunkKey::new(x, 0), 1.0).unwrap();
        }
        pool.shutdown(Duration::from_millis(500));
    }
}

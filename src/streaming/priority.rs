//! Load-request priority queue and desired-set computation.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::chunk::ChunkKey;

/// Pending request to generate one chunk.
#[derive(Clone, Copy, Debug)]
pub struct LoadRequest {
    pub key: ChunkKey,
    /// Higher is serviced first: 1 / (distance-in-chunks + 1).
    pub priority: f32,
    /// Distance from the viewer's chunk, in chunk units.
    pub distance: f32,
}

impl LoadRequest {
    pub fn new(key: ChunkKey, distance: f32) -> Self {
        Self {
            key,
            priority: 1.0 / (distance + 1.0),
            distance,
        }
    }
}

impl Eq for LoadRequest {}

impl PartialEq for LoadRequest {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Ord for LoadRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap on priority; total_cmp so NaN cannot poison the heap
        self.priority.total_cmp(&other.priority)
    }
}

impl PartialOrd for LoadRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Priority-ordered queue of outstanding load requests with key dedup.
#[derive(Default)]
pub struct RequestQueue {
    heap: BinaryHeap<LoadRequest>,
    queued: HashSet<ChunkKey>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request unless its key is already queued.
    pub fn push(&mut self, request: LoadRequest) -> bool {
        if !self.queued.insert(request.key) {
            return false;
        }
        self.heap.push(request);
        true
    }

    /// Pop the highest-priority request.
    pub fn pop(&mut self) -> Option<LoadRequest> {
        let request = self.heap.pop()?;
        self.queued.remove(&request.key);
        Some(request)
    }

    pub fn contains(&self, key: ChunkKey) -> bool {
        self.queued.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
        self.queued.clear();
    }

    /// Keys currently queued (test/diagnostic use).
    pub fn keys(&self) -> impl Iterator<Item = ChunkKey> + '_ {
        self.queued.iter().copied()
    }
}

/// All chunk keys within `radius` chunk units (Euclidean) of `center`,
/// with their distances. This is the desired set for one viewer position.
pub fn desired_keys(center: ChunkKey, radius: i32) -> Vec<(ChunkKey, f32)> {
    let mut out = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            let distance = ((dx * dx + dz * dz) as f32).sqrt();
            if distance <= radius as f32 {
                out.push((ChunkKey::new(center.x() + dx, center.z() + dz), distance));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closer_requests_pop_first() {
        let mut queue = RequestQueue::new();
        queue.push(LoadRequest::new(ChunkKey::new(5, 0), 5.0));
        queue.push(LoadRequest::new(ChunkKey::new(1, 0), 1.0));
        queue.push(LoadRequest::new(ChunkKey::new(3, 0), 3.0));

        assert_eq!(queue.pop().unwrap().key, ChunkKey::new(1, 0));
        assert_eq!(queue.pop().unwrap().key, ChunkKey::new(3, 0));
        assert_eq!(queue.pop().unwrap().key, ChunkKey::new(5, 0));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_push_dedups_by_key() {
        let mut queue = RequestQueue::new();
        let key = ChunkKey::new(2, 2);
        assert!(queue.push(LoadRequest::new(key, 2.0)));
        assert!(!queue.push(LoadRequest::new(key, 0.5)));
        assert_eq!(queue.len(), 1);

        queue.pop();
        assert!(!queue.contains(key));
        assert!(queue.push(LoadRequest::new(key, 2.0)));
    }

    #[test]
    fn test_priority_formula() {
        let request = LoadRequest::new(ChunkKey::new(0, 0), 3.0);
        assert_eq!(request.priority, 0.25);
        assert_eq!(LoadRequest::new(ChunkKey::new(0, 0), 0.0).priority, 1.0);
    }

    #[test]
    fn test_desired_keys_radius_two() {
        // Euclidean radius 2 around the origin covers exactly 13 chunks
        let keys = desired_keys(ChunkKey::new(0, 0), 2);
        assert_eq!(keys.len(), 13);
        assert!(keys.iter().any(|(k, d)| *k == ChunkKey::new(0, 0) && *d == 0.0));
        assert!(keys.iter().any(|(k, _)| *k == ChunkKey::new(2, 0)));
        // Corners at distance sqrt(8) are outside
        assert!(!keys.iter().any(|(k, _)| *k == ChunkKey::new(2, 2)));
    }

    #[test]
    fn test_desired_keys_centered_elsewhere() {
        let keys = desired_keys(ChunkKey::new(10, -10), 1);
        assert_eq!(keys.len(), 5);
        assert!(keys.iter().all(|(k, _)| {
            (k.x() - 10).abs() + (k.z() + 10).abs() <= 1
        }));
    }

    #[test]
    fn test_clear() {
        let mut queue = RequestQueue::new();
        queue.push(LoadRequest::new(ChunkKey::new(1, 1), 1.0));
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.contains(ChunkKey::new(1, 1)));
    }
}

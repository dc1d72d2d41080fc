//! Headless streaming soak: walk a viewer across a planet surface and report
//! loaded/pending counts and draw volume every second.
//!
//! Usage: stream_soak [seconds]

use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};

use tellus::core::logging;
use tellus::generation::{StructureScatter, VegetationScatter};
use tellus::math::Frustum;
use tellus::render::DrawStats;
use tellus::streaming::{StreamerConfig, SurfaceStreamer};
use tellus::terrain::Archetype;

const SEED: u32 = 20_260_807;
const WALK_SPEED: f32 = 24.0; // m/s

fn main() {
    logging::init();

    let seconds: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let mut streamer = SurfaceStreamer::new(SEED, Archetype::EarthLike, StreamerConfig::default())
        .expect("streamer construction");
    streamer.set_vegetation_generator(Box::new(VegetationScatter::new(SEED)));
    streamer.set_structure_generator(Box::new(StructureScatter::new(SEED)));

    let start = Instant::now();
    let mut last_frame = start;
    let mut last_report = start;

    while start.elapsed() < Duration::from_secs(seconds) {
        let now = Instant::now();
        let dt = (now - last_frame).as_secs_f32();
        last_frame = now;

        let t = start.elapsed().as_secs_f32();
        let viewer = Vec3::new(t * WALK_SPEED, 40.0, t * WALK_SPEED * 0.5);
        streamer.update(viewer, dt);

        if now - last_report >= Duration::from_secs(1) {
            last_report = now;

            let proj = Mat4::perspective_rh(70.0_f32.to_radians(), 16.0 / 9.0, 0.1, 2000.0);
            let view = Mat4::look_at_rh(viewer, viewer + Vec3::new(1.0, -0.3, 0.5), Vec3::Y);
            let frustum = Frustum::from_view_projection(&(proj * view));

            let mut stats = DrawStats::default();
            streamer.render(&frustum, &mut stats);

            let ground = streamer.height_at(viewer.x, viewer.z);
            log::info!(
                "t={t:5.1}s loaded={:3} pending={:3} drawn={:3} tris={:7} veg={:4} ground={ground:7.2}",
                streamer.loaded_chunk_count(),
                streamer.pending_count(),
                stats.chunks,
                stats.triangles,
                stats.vegetation,
            );
        }

        std::thread::sleep(Duration::from_millis(16));
    }

    streamer.shutdown(Duration::from_secs(2));
}

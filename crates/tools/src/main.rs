use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use features::{
    FeatureConfig, FeatureOptions, FeatureSet, LoadEvent, ReadyState, Symbology, WorldContext,
    ZoomBounds,
};
use foundation::math::GeoPoint;
use gpu::BufferStore;
use runtime::budget::FrameBudget;
use runtime::frame::Frame;
use streaming::{
    DecodeError, DecodeRequest, DecodedFeature, Decoder, FeatureItem, GeoPosition, WorkerPool,
};

fn main() {
    env_logger::init();
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn usage() -> String {
    "usage: feature-demo [--workers N] [--stage-delay-ms MS]".to_string()
}

/// Synthetic decoder: produces a two-item box footprint for any URL, with
/// one progress signal partway through.
struct BoxDecoder;

impl Decoder for BoxDecoder {
    fn decode(
        &self,
        req: &DecodeRequest,
        progress: &mut dyn FnMut(),
    ) -> Result<DecodedFeature, DecodeError> {
        if req.url.is_empty() {
            return Err(DecodeError::Fetch("empty url".into()));
        }
        progress();

        let vertex_counts = [6usize, 6];
        let total: usize = vertex_counts.iter().sum();
        Ok(DecodedFeature {
            position: GeoPosition {
                longitude: 13.4050,
                latitude: 52.5200,
            },
            items: vertex_counts
                .iter()
                .enumerate()
                .map(|(i, &vertex_count)| FeatureItem {
                    id: format!("box-{i}"),
                    properties: serde_json::json!({ "part": i }),
                    vertex_count,
                })
                .collect(),
            vertices: vec![0.0; total * 3],
            normals: vec![0.0; total * 3],
            colors: vec![0.8; total * 3],
            tex_coords: vec![0.0; total * 2],
            heights: vec![12.0; total],
            picking_colors: vec![0.0; total * 3],
        })
    }
}

fn real_main() -> Result<(), String> {
    let mut workers = 2usize;
    let mut config = FeatureConfig::default();

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--workers" => {
                i += 1;
                workers = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| format!("--workers requires a number\n\n{}", usage()))?;
            }
            "--stage-delay-ms" => {
                i += 1;
                let ms: f64 = args
                    .get(i)
                    .and_then(|v| v.parse().ok())
                    .ok_or_else(|| format!("--stage-delay-ms requires a number\n\n{}", usage()))?;
                config.cascade.stage_delay_s = ms / 1000.0;
            }
            s => return Err(format!("unknown arg: {s}\n\n{}", usage())),
        }
        i += 1;
    }

    if workers == 0 {
        return Err(format!("--workers must be at least 1\n\n{}", usage()));
    }

    let mut pool = WorkerPool::new(workers, Arc::new(BoxDecoder));
    let mut store = BufferStore::new();
    let mut set = FeatureSet::new(config);
    let symbology = Symbology::new(
        Box::new(|item| {
            if item.id.ends_with("-1") {
                Some("#ff8000".into())
            } else {
                None
            }
        }),
        Box::new(|_| false),
    );

    let mut ctx = WorldContext::new(GeoPoint::new(13.4050, 52.5200), ZoomBounds::default());
    let id = set.insert(
        "Demo",
        "demo://box",
        FeatureOptions {
            elevation: 5.0,
            scale: 1.0,
            rotation_deg: 30.0,
            ..FeatureOptions::default()
        },
        &ctx,
        &mut pool,
        Some(Box::new(|event: LoadEvent| {
            log::info!("load event: {event:?}")
        })),
    );

    let mut frame = Frame::new(0, 1.0 / 60.0);
    while set.state(id) != Some(ReadyState::Ready) {
        if frame.index > 600 {
            return Err("feature never became ready".to_string());
        }
        set.pump(
            frame,
            &mut pool,
            &mut store,
            &symbology,
            &mut FrameBudget::new(2),
        );
        thread::sleep(Duration::from_millis(2));
        frame = frame.next();
    }

    let feature = set.get(id).ok_or("feature missing")?;
    println!(
        "ready after {} frames: kind={} url={} items={} buffers={}",
        frame.index,
        feature.kind(),
        feature.url(),
        feature.items().len(),
        store.live_count(),
    );

    for _ in 0..4 {
        if let Some(sample) = set.fade_weight(id) {
            println!("fade: value={:.3} animating={}", sample.value, sample.animating);
        }
    }

    if let Some(m) = set.current_matrix(id, &ctx) {
        println!("translation at origin: {:?}", m.translation());
    }
    // Pan the camera a quarter degree east.
    ctx.camera_position = GeoPoint::new(13.6550, 52.5200);
    if let Some(m) = set.current_matrix(id, &ctx) {
        println!("translation after pan: {:?}", m.translation());
    }

    set.destroy(id, &mut store, &mut pool);
    println!("destroyed: live buffers={}", store.live_count());
    Ok(())
}

//! End-to-end lifecycle tests: decode reply routing, the staged buffer
//! cascade, atomic Ready transitions, fade-in, and idempotent teardown.
//!
//! Replies are injected directly so every step is deterministic; the worker
//! pool is only exercised for submission bookkeeping here (its threading is
//! covered by the streaming crate's own tests).

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use features::{
    FeatureConfig, FeatureId, FeatureOptions, FeatureSet, LoadEvent, ReadyState, Symbology,
    WorldContext, ZoomBounds, tint,
};
use foundation::math::GeoPoint;
use gpu::BufferStore;
use runtime::budget::FrameBudget;
use runtime::frame::Frame;
use streaming::{
    DecodeError, DecodeRequest, DecodedFeature, Decoder, FeatureItem, GeoPosition, WorkerPool,
    WorkerReply,
};

struct NullDecoder;

impl Decoder for NullDecoder {
    fn decode(
        &self,
        _req: &DecodeRequest,
        _progress: &mut dyn FnMut(),
    ) -> Result<DecodedFeature, DecodeError> {
        Err(DecodeError::Fetch("not used in these tests".into()))
    }
}

fn pool() -> WorkerPool {
    WorkerPool::new(1, Arc::new(NullDecoder))
}

fn ctx() -> WorldContext {
    WorldContext::new(GeoPoint::new(13.4, 52.5), ZoomBounds::default())
}

fn payload(vertex_counts: &[usize]) -> DecodedFeature {
    let total: usize = vertex_counts.iter().sum();
    DecodedFeature {
        position: GeoPosition {
            longitude: 13.41,
            latitude: 52.51,
        },
        items: vertex_counts
            .iter()
            .enumerate()
            .map(|(i, &vertex_count)| FeatureItem {
                id: format!("item-{i}"),
                properties: serde_json::json!({ "index": i }),
                vertex_count,
            })
            .collect(),
        vertices: vec![0.0; total * 3],
        normals: vec![0.0; total * 3],
        colors: vec![0.0; total * 3],
        tex_coords: vec![0.0; total * 2],
        heights: vec![0.0; total],
        picking_colors: vec![0.0; total * 3],
    }
}

/// Inserts a feature and feeds it a decoded payload at frame 0.
fn decoded_feature(
    set: &mut FeatureSet,
    pool: &mut WorkerPool,
    store: &mut BufferStore,
    vertex_counts: &[usize],
) -> FeatureId {
    let id = set.insert(
        "GeoJSON",
        "https://example.com/f.json",
        FeatureOptions::default(),
        &ctx(),
        pool,
        None,
    );
    let load = set.load_id(id).unwrap();
    set.handle_reply(
        load,
        WorkerReply::Decoded(payload(vertex_counts)),
        Frame::new(0, 0.02),
        store,
    );
    id
}

/// Steps frames until the feature is Ready, asserting the all-or-nothing
/// buffer invariant at every tick.
fn run_to_ready(
    set: &mut FeatureSet,
    store: &mut BufferStore,
    symbology: &Symbology,
    id: FeatureId,
) -> u64 {
    let mut frame = Frame::new(0, 0.02);
    for _ in 0..100 {
        frame = frame.next();
        set.advance_builds(frame, store, symbology, &mut FrameBudget::unlimited());

        let registered = set.registry().contains(id);
        let buffers = set.buffers(id);
        assert_eq!(registered, buffers.is_some(), "partial exposure at {frame:?}");
        if let Some(buffers) = buffers {
            for handle in buffers.all() {
                assert!(store.is_live(handle));
            }
        }

        if set.state(id) == Some(ReadyState::Ready) {
            return frame.index;
        }
    }
    panic!("feature never became ready");
}

#[test]
fn buffers_appear_atomically_with_ready() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();
    let symbology = Symbology::default();

    let id = decoded_feature(&mut set, &mut pool, &mut store, &[3, 3]);
    assert_eq!(set.state(id), Some(ReadyState::BuildingBuffers));
    assert!(set.buffers(id).is_none());
    // The vertex buffer exists internally, but is not exposed.
    assert_eq!(store.live_count(), 1);

    run_to_ready(&mut set, &mut store, &symbology, id);

    assert!(set.registry().contains(id));
    assert_eq!(store.live_count(), 8);
    let buffers = set.buffers(id).unwrap();
    assert_eq!(store.info(buffers.tint).unwrap().len, 2 * 3 * 4);
    assert_eq!(store.info(buffers.z_scale).unwrap().len, 3);
}

#[test]
fn cascade_respects_the_frame_budget() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();
    let symbology = Symbology::default();

    let a = decoded_feature(&mut set, &mut pool, &mut store, &[3]);
    let b = decoded_feature(&mut set, &mut pool, &mut store, &[3]);
    assert_eq!(store.live_count(), 2); // one vertex buffer each

    // One unit per frame: only one of the two cascades advances.
    let frame = Frame::new(1, 0.02);
    let mut budget = FrameBudget::new(1);
    set.advance_builds(frame, &mut store, &symbology, &mut budget);
    assert_eq!(store.live_count(), 3);
    assert!(budget.is_exhausted());

    // With room for both, each builds exactly one stage.
    let frame = frame.next();
    let mut budget = FrameBudget::new(2);
    set.advance_builds(frame, &mut store, &symbology, &mut budget);
    assert_eq!(store.live_count(), 5);

    // Both eventually finish.
    run_to_ready(&mut set, &mut store, &symbology, a);
    run_to_ready(&mut set, &mut store, &symbology, b);
    assert_eq!(store.live_count(), 16);
}

#[test]
fn error_reply_destroys_without_registering() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();

    let failures = Rc::new(Cell::new(0u32));
    let progressed = Rc::new(Cell::new(0u32));
    let callback = {
        let failures = Rc::clone(&failures);
        let progressed = Rc::clone(&progressed);
        Box::new(move |event: LoadEvent| match event {
            LoadEvent::Failed => failures.set(failures.get() + 1),
            LoadEvent::Progress => progressed.set(progressed.get() + 1),
        })
    };

    let id = set.insert(
        "GeoJSON",
        "https://example.com/missing.json",
        FeatureOptions {
            scale: 2.0,
            rotation_deg: 90.0,
            elevation: 5.0,
            ..FeatureOptions::default()
        },
        &ctx(),
        &mut pool,
        Some(callback),
    );
    let load = set.load_id(id).unwrap();

    let frame = Frame::new(0, 0.02);
    set.handle_reply(load, WorkerReply::Progress, frame, &mut store);
    assert_eq!(progressed.get(), 1);

    set.handle_reply(
        load,
        WorkerReply::Error {
            message: "fetch failed: 404".into(),
        },
        frame,
        &mut store,
    );

    assert_eq!(failures.get(), 1);
    assert_eq!(set.state(id), Some(ReadyState::Destroyed));
    assert!(!set.registry().contains(id));
    assert_eq!(store.live_count(), 0);

    // A straggler reply for the same load changes nothing.
    set.handle_reply(
        load,
        WorkerReply::Error {
            message: "again".into(),
        },
        frame,
        &mut store,
    );
    assert_eq!(failures.get(), 1);
}

#[test]
fn tint_and_z_scale_reflect_the_visibility_callback() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();
    let symbology = Symbology::new(
        Box::new(|_| Some("#ff0000".into())),
        Box::new(|item| item.id == "item-1"),
    );

    let id = decoded_feature(&mut set, &mut pool, &mut store, &[3, 3]);
    run_to_ready(&mut set, &mut store, &symbology, id);

    let buffers = set.buffers(id).unwrap();
    assert_eq!(store.info(buffers.tint).unwrap().len, 2 * 3 * 4);
    assert_eq!(store.info(buffers.tint).unwrap().component_width, 4);
    assert_eq!(store.info(buffers.z_scale).unwrap().len, 3);
    assert_eq!(store.info(buffers.z_scale).unwrap().component_width, 1);

    // Slot values: both items share slots 0..3, the hidden second item
    // writes last.
    let layers = tint::apply(set.get(id).unwrap().items(), &symbology);
    assert_eq!(layers.z_scale, vec![0.0, 0.0, 0.0]);
    assert_eq!(&layers.tint[0..4], &[1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn destroy_is_idempotent() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();
    let symbology = Symbology::default();

    let id = decoded_feature(&mut set, &mut pool, &mut store, &[3]);
    run_to_ready(&mut set, &mut store, &symbology, id);
    assert_eq!(store.live_count(), 8);

    set.destroy(id, &mut store, &mut pool);
    assert_eq!(set.state(id), Some(ReadyState::Destroyed));
    assert!(!set.registry().contains(id));
    assert_eq!(store.live_count(), 0);
    assert!(set.get(id).unwrap().items().is_empty());

    set.destroy(id, &mut store, &mut pool);
    assert_eq!(set.state(id), Some(ReadyState::Destroyed));
    assert_eq!(store.live_count(), 0);
}

#[test]
fn destroy_mid_cascade_releases_partial_buffers() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();
    let symbology = Symbology::default();

    let id = decoded_feature(&mut set, &mut pool, &mut store, &[3]);

    // Build two more stages, then tear down mid-flight.
    let mut frame = Frame::new(0, 0.02);
    for _ in 0..2 {
        frame = frame.next();
        set.advance_builds(frame, &mut store, &symbology, &mut FrameBudget::unlimited());
    }
    assert_eq!(store.live_count(), 3);

    set.destroy(id, &mut store, &mut pool);
    assert_eq!(store.live_count(), 0);
    assert_eq!(set.state(id), Some(ReadyState::Destroyed));

    // No further stage ever runs.
    for _ in 0..10 {
        frame = frame.next();
        set.advance_builds(frame, &mut store, &symbology, &mut FrameBudget::unlimited());
    }
    assert_eq!(store.live_count(), 0);
    assert!(!set.registry().contains(id));
}

#[test]
fn destroy_while_loading_discards_the_late_decode() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();

    let id = set.insert(
        "GeoJSON",
        "https://example.com/slow.json",
        FeatureOptions::default(),
        &ctx(),
        &mut pool,
        None,
    );
    let load = set.load_id(id).unwrap();

    set.destroy(id, &mut store, &mut pool);
    assert_eq!(set.state(id), Some(ReadyState::Destroyed));

    // The decode completes anyway; its reply is discarded.
    set.handle_reply(
        load,
        WorkerReply::Decoded(payload(&[3])),
        Frame::new(1, 0.02),
        &mut store,
    );
    assert_eq!(set.state(id), Some(ReadyState::Destroyed));
    assert_eq!(store.live_count(), 0);
    assert!(!set.registry().contains(id));
}

#[test]
fn fade_runs_once_after_ready() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::new(FeatureConfig::default());
    let symbology = Symbology::default();

    let id = decoded_feature(&mut set, &mut pool, &mut store, &[3]);
    run_to_ready(&mut set, &mut store, &symbology, id);

    let first = set.fade_weight(id).unwrap();
    assert_eq!(first.value, 0.0);
    assert!(first.animating);

    let mut previous = first.value;
    for _ in 0..120 {
        let sample = set.fade_weight(id).unwrap();
        assert!(sample.value >= previous);
        previous = sample.value;
    }
    let saturated = set.fade_weight(id).unwrap();
    assert_eq!(saturated.value, 1.0);
    assert!(!saturated.animating);
}

#[test]
fn retint_replaces_only_the_styling_buffers() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();
    let symbology = Symbology::default();

    let id = decoded_feature(&mut set, &mut pool, &mut store, &[3]);
    run_to_ready(&mut set, &mut store, &symbology, id);

    let before = *set.buffers(id).unwrap();
    let highlight = Symbology::new(Box::new(|_| Some("blue".into())), Box::new(|_| true));
    set.retint(id, &mut store, &highlight);

    let after = *set.buffers(id).unwrap();
    assert_eq!(store.live_count(), 8);
    assert_eq!(before.vertex, after.vertex);
    assert_eq!(before.picking, after.picking);
    assert_ne!(before.tint, after.tint);
    assert_ne!(before.z_scale, after.z_scale);
    assert!(!store.is_live(before.tint));
    assert!(store.is_live(after.tint));
}

#[test]
fn queued_load_is_cancelled_on_destroy() {
    let mut pool = pool();
    let mut store = BufferStore::new();
    let mut set = FeatureSet::default();

    // One worker: the first insert occupies it, the second stays queued.
    let _first = set.insert(
        "GeoJSON",
        "https://example.com/a.json",
        FeatureOptions::default(),
        &ctx(),
        &mut pool,
        None,
    );
    let second = set.insert(
        "GeoJSON",
        "https://example.com/b.json",
        FeatureOptions::default(),
        &ctx(),
        &mut pool,
        None,
    );
    assert_eq!(pool.queued_len(), 1);

    set.destroy(second, &mut store, &mut pool);
    assert_eq!(pool.queued_len(), 0);
    assert_eq!(set.state(second), Some(ReadyState::Destroyed));
}

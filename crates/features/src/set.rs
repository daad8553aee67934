use std::collections::BTreeMap;

use foundation::math::{GeoPoint, Mat4};
use gpu::BufferStore;
use runtime::budget::FrameBudget;
use runtime::frame::Frame;
use streaming::{DecodeRequest, LoadId, WorkerPool, WorkerReply};

use crate::cascade::{BufferCascade, CascadeConfig, CascadeStatus};
use crate::context::WorldContext;
use crate::feature::{
    FadeConfig, FadeWeight, Feature, FeatureBuffers, LoadCallback, LoadEvent, ReadyState,
};
use crate::options::FeatureOptions;
use crate::registry::{FeatureId, FeatureRegistry};
use crate::tint::{self, Symbology};
use crate::visibility::ZoomRange;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct FeatureConfig {
    pub cascade: CascadeConfig,
    pub fade: FadeConfig,
}

/// Owner and per-frame driver of all features.
///
/// All mutation happens on the main/update thread: worker replies are pulled
/// in with `pump`, cascade stages are advanced under a frame budget, and the
/// registry flips atomically with each feature's Ready transition. Decode
/// workers never touch this state.
pub struct FeatureSet {
    config: FeatureConfig,
    next_id: u64,
    features: BTreeMap<FeatureId, Feature>,
    registry: FeatureRegistry,
    pending_loads: BTreeMap<LoadId, FeatureId>,
}

impl FeatureSet {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            next_id: 0,
            features: BTreeMap::new(),
            registry: FeatureRegistry::new(),
            pending_loads: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> FeatureConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Constructs a feature and submits its decode request.
    ///
    /// The transform is composed once here (elevation, scale, negated
    /// rotation) and the zoom range is resolved against the context's
    /// bounds; both never get recomputed. The options are forwarded to the
    /// worker verbatim.
    pub fn insert(
        &mut self,
        kind: impl Into<String>,
        url: impl Into<String>,
        options: FeatureOptions,
        ctx: &WorldContext,
        pool: &mut WorkerPool,
        callback: Option<LoadCallback>,
    ) -> FeatureId {
        let kind = kind.into();
        let url = url.into();
        let id = FeatureId(self.next_id);
        self.next_id += 1;

        let mut feature = Feature::new(kind.clone(), url.clone(), options, ctx, callback);
        let request = DecodeRequest {
            kind,
            url,
            options: serde_json::to_value(&feature.options).unwrap_or(serde_json::Value::Null),
        };
        let load = pool.submit(request);
        feature.load = Some(load);
        self.pending_loads.insert(load, id);
        self.features.insert(id, feature);
        log::debug!("feature {id:?} loading via {load:?}");
        id
    }

    /// Per-frame driver: routes worker replies, then advances cascades.
    pub fn pump(
        &mut self,
        frame: Frame,
        pool: &mut WorkerPool,
        store: &mut BufferStore,
        symbology: &Symbology,
        budget: &mut FrameBudget,
    ) {
        for (load, reply) in pool.poll() {
            self.handle_reply(load, reply, frame, store);
        }
        self.advance_builds(frame, store, symbology, budget);
    }

    /// Routes one worker reply to its feature.
    ///
    /// Replies for unknown loads (cancelled, or the feature was destroyed
    /// while the decode was in flight) are discarded; nothing was allocated
    /// on their behalf.
    pub fn handle_reply(
        &mut self,
        load: LoadId,
        reply: WorkerReply,
        frame: Frame,
        store: &mut BufferStore,
    ) {
        let Some(&id) = self.pending_loads.get(&load) else {
            log::debug!("discarding reply for unknown {load:?}");
            return;
        };
        let Some(feature) = self.features.get_mut(&id) else {
            self.pending_loads.remove(&load);
            return;
        };

        match reply {
            WorkerReply::Progress => {
                if let Some(callback) = feature.callback.as_mut() {
                    callback(LoadEvent::Progress);
                }
            }
            WorkerReply::Error { message } => {
                self.pending_loads.remove(&load);
                feature.load = None;
                log::warn!("feature {id:?} failed to load: {message}");
                // Terminal: no buffers were ever created, no retry.
                if let Some(mut callback) = feature.callback.take() {
                    callback(LoadEvent::Failed);
                }
                feature.state = ReadyState::Destroyed;
            }
            WorkerReply::Decoded(mut payload) => {
                self.pending_loads.remove(&load);
                feature.load = None;
                if feature.state != ReadyState::Loading {
                    // Destroyed while the decode was in flight.
                    return;
                }
                feature.position = Some(GeoPoint::new(
                    payload.position.longitude,
                    payload.position.latitude,
                ));
                feature.items = std::mem::take(&mut payload.items);
                feature.cascade = Some(BufferCascade::begin(
                    payload,
                    frame.time,
                    self.config.cascade,
                    store,
                ));
                feature.state = ReadyState::BuildingBuffers;
                log::debug!("feature {id:?} building buffers");
            }
        }
    }

    /// Advances every in-progress cascade within the frame budget.
    ///
    /// One stage per feature per frame at most; a stage (or the finalize
    /// step) costs one budget unit.
    pub fn advance_builds(
        &mut self,
        frame: Frame,
        store: &mut BufferStore,
        symbology: &Symbology,
        budget: &mut FrameBudget,
    ) {
        let building: Vec<FeatureId> = self
            .features
            .iter()
            .filter(|(_, f)| f.state == ReadyState::BuildingBuffers)
            .map(|(&id, _)| id)
            .collect();

        for id in building {
            let Some(feature) = self.features.get_mut(&id) else {
                continue;
            };
            let Some(cascade) = feature.cascade.as_mut() else {
                continue;
            };
            if !cascade.ready(frame.time) {
                continue;
            }
            if !budget.try_consume(1) {
                break;
            }

            match cascade.tick(frame.time, store) {
                CascadeStatus::Waiting | CascadeStatus::BuiltStage => {}
                CascadeStatus::Complete(geometry) => {
                    feature.cascade = None;

                    let layers = tint::apply(&feature.items, symbology);
                    let tint = store.create(4, &layers.tint);
                    let z_scale = store.create(1, &layers.z_scale);

                    // The full buffer set becomes visible in the same step
                    // as the registry insert: no partial state is ever
                    // observable.
                    feature.buffers = Some(FeatureBuffers::from_parts(geometry, tint, z_scale));
                    feature.fade = 0.0;
                    feature.state = ReadyState::Ready;
                    self.registry.add(id);
                    log::debug!("feature {id:?} ready");
                }
            }
        }
    }

    /// Rebuilds the tint and z-scale buffers from the current callbacks.
    ///
    /// Geometry buffers are untouched; only meaningful for Ready features.
    pub fn retint(&mut self, id: FeatureId, store: &mut BufferStore, symbology: &Symbology) {
        let Some(feature) = self.features.get_mut(&id) else {
            return;
        };
        let Some(buffers) = feature.buffers.as_mut() else {
            return;
        };

        let layers = tint::apply(&feature.items, symbology);
        store.release(buffers.tint);
        store.release(buffers.z_scale);
        buffers.tint = store.create(4, &layers.tint);
        buffers.z_scale = store.create(1, &layers.z_scale);
    }

    /// Tears a feature down. Idempotent: a second call is a no-op.
    ///
    /// Order matters: the registry entry goes first, then a queued load is
    /// cancelled, any in-progress cascade is aborted (partial buffers
    /// released), and finally the full buffer set is released exactly once.
    pub fn destroy(&mut self, id: FeatureId, store: &mut BufferStore, pool: &mut WorkerPool) {
        let Some(feature) = self.features.get_mut(&id) else {
            return;
        };
        if feature.state == ReadyState::Destroyed {
            return;
        }

        self.registry.remove(id);

        if let Some(load) = feature.load.take() {
            pool.cancel(load);
            self.pending_loads.remove(&load);
        }

        feature.items.clear();

        if let Some(cascade) = feature.cascade.take() {
            cascade.abort(store);
        }
        if let Some(buffers) = feature.buffers.take() {
            for handle in buffers.all() {
                store.release(handle);
            }
        }

        feature.state = ReadyState::Destroyed;
        log::debug!("feature {id:?} destroyed");
    }

    pub fn get(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn state(&self, id: FeatureId) -> Option<ReadyState> {
        self.features.get(&id).map(|f| f.state)
    }

    pub fn buffers(&self, id: FeatureId) -> Option<&FeatureBuffers> {
        self.features.get(&id).and_then(|f| f.buffers())
    }

    pub fn zoom_range(&self, id: FeatureId) -> Option<ZoomRange> {
        self.features.get(&id).map(|f| f.zoom_range)
    }

    pub fn load_id(&self, id: FeatureId) -> Option<LoadId> {
        self.features.get(&id).and_then(|f| f.load)
    }

    /// See [`Feature::current_matrix`].
    pub fn current_matrix(&mut self, id: FeatureId, ctx: &WorldContext) -> Option<&Mat4> {
        self.features.get_mut(&id)?.current_matrix(ctx)
    }

    /// See [`Feature::fade_weight`].
    pub fn fade_weight(&mut self, id: FeatureId) -> Option<FadeWeight> {
        let config = self.config.fade;
        self.features.get_mut(&id).map(|f| f.fade_weight(&config))
    }
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

use foundation::time::Time;
use gpu::{BufferHandle, BufferStore};
use streaming::DecodedFeature;

/// Tunables for the staged buffer build.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CascadeConfig {
    /// Pause between consecutive buffer builds, in update-loop seconds.
    pub stage_delay_s: f64,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self { stage_delay_s: 0.02 }
    }
}

/// The six geometry buffers of a ready feature, handed over atomically.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GeometryBuffers {
    pub vertex: BufferHandle,
    pub normal: BufferHandle,
    pub color: BufferHandle,
    pub tex_coord: BufferHandle,
    pub height: BufferHandle,
    pub picking: BufferHandle,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CascadeStatus {
    /// The stage delay has not elapsed yet.
    Waiting,
    /// One more buffer was built; the delay was re-armed.
    BuiltStage,
    /// All six buffers exist and the final delay elapsed.
    Complete(GeometryBuffers),
}

/// Incremental GPU upload of a decoded payload.
///
/// Building all buffers for a newly arrived feature in one synchronous burst
/// causes a visible frame hitch, so the build is spread across update-loop
/// turns: the vertex buffer is created at `begin`, then each eligible `tick`
/// builds exactly one more buffer and re-arms the delay. The caller checks
/// feature liveness before every tick; `abort` releases whatever stages were
/// already built, so destruction mid-cascade never leaks.
#[derive(Debug)]
pub struct BufferCascade {
    payload: DecodedFeature,
    built: Vec<BufferHandle>,
    resume_at: Time,
    stage_delay_s: f64,
}

/// Component widths of the geometry buffers, in build order:
/// vertex, normal, color, texCoord, height, picking.
const STAGE_WIDTHS: [u32; 6] = [3, 3, 3, 2, 1, 3];

impl BufferCascade {
    /// Builds the vertex buffer immediately and schedules the rest.
    ///
    /// The payload's `items` are expected to have been taken by the feature
    /// already; only the flat attribute arrays are consumed here.
    pub fn begin(
        payload: DecodedFeature,
        now: Time,
        config: CascadeConfig,
        store: &mut BufferStore,
    ) -> Self {
        let vertex = store.create(STAGE_WIDTHS[0], &payload.vertices);
        Self {
            payload,
            built: vec![vertex],
            resume_at: now.offset(config.stage_delay_s),
            stage_delay_s: config.stage_delay_s,
        }
    }

    /// True once the current stage delay has elapsed.
    pub fn ready(&self, now: Time) -> bool {
        now >= self.resume_at
    }

    pub fn stages_built(&self) -> usize {
        self.built.len()
    }

    pub fn tick(&mut self, now: Time, store: &mut BufferStore) -> CascadeStatus {
        if !self.ready(now) {
            return CascadeStatus::Waiting;
        }

        if self.built.len() == STAGE_WIDTHS.len() {
            return CascadeStatus::Complete(GeometryBuffers {
                vertex: self.built[0],
                normal: self.built[1],
                color: self.built[2],
                tex_coord: self.built[3],
                height: self.built[4],
                picking: self.built[5],
            });
        }

        let stage = self.built.len();
        let data: &[f32] = match stage {
            1 => &self.payload.normals,
            2 => &self.payload.colors,
            3 => &self.payload.tex_coords,
            4 => &self.payload.heights,
            _ => &self.payload.picking_colors,
        };
        self.built.push(store.create(STAGE_WIDTHS[stage], data));
        self.resume_at = now.offset(self.stage_delay_s);
        CascadeStatus::BuiltStage
    }

    /// Releases every buffer built so far. Terminal.
    pub fn abort(self, store: &mut BufferStore) {
        for handle in self.built {
            store.release(handle);
        }
    }
}

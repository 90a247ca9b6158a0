use crate::{
    angle::angle,
    phase::PhaseThresholds,
    pose::Keypoints,
    state::{MovementState, TrackedEntityState},
    store::{EntityId, StateStore},
};
use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};

/// Per-detection label container.
///
/// Arrays of strings or of numeric class ids are understood. Anything else,
/// mixed arrays included, passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Labels {
    Text(Vec<String>),
    Numeric(Vec<f64>),
    Opaque(serde_json::Value),
}

impl Labels {
    /// Number of detections, if this is a recognized label array.
    fn len(&self) -> Option<usize> {
        match self {
            Self::Text(labels) => Some(labels.len()),
            Self::Numeric(labels) => Some(labels.len()),
            Self::Opaque(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_id: Option<String>,
}

/// One frame worth of detections from the pose model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    #[serde(default)]
    pub class_name: Option<Labels>,

    /// Keypoint coordinates with shape `[detections, keypoints, 2]`.
    #[serde(default)]
    pub keypoints_xy: Option<Array3<f64>>,

    /// Joint names, parallel to the second axis of `keypoints_xy`.
    #[serde(default)]
    pub keypoints_class_name: Option<Vec<Vec<String>>>,

    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateRecord {
    pub entity_id: EntityId,
    pub previous_state: MovementState,
    pub current_state: MovementState,
    pub rep_count: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFrame {
    pub batch: DetectionBatch,
    pub states: Vec<StateRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessorConfig {
    pub thresholds: PhaseThresholds,
    /// Evict entities unseen for more than this many frames.
    pub evict_after: Option<u64>,
}

/// Drives the squat state machines of every detection in a frame.
#[derive(Debug, Default)]
pub struct FrameProcessor {
    store: StateStore,
    config: ProcessorConfig,
    frame_num: u64,
}

impl FrameProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            store: StateStore::new(),
            config,
            frame_num: 0,
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn frame_num(&self) -> u64 {
        self.frame_num
    }

    pub fn reset(&mut self, id: Option<&EntityId>) {
        self.store.reset(id)
    }

    pub fn get_state(&self, id: &EntityId) -> Option<TrackedEntityState> {
        self.store.get(id)
    }

    fn entity_id(batch: &DetectionBatch, i: usize) -> EntityId {
        batch
            .predictions
            .get(i)
            .and_then(|prediction| prediction.detection_id.as_deref())
            .map_or_else(|| EntityId::from_index(i), EntityId::new)
    }

    fn left_knee_angle(batch: &DetectionBatch, i: usize) -> Option<f64> {
        let xy = batch.keypoints_xy.as_ref()?;
        let names = batch.keypoints_class_name.as_ref()?.get(i)?;
        if i >= xy.len_of(Axis(0)) {
            return None;
        }

        let keypoints = match Keypoints::from_named(names, xy.index_axis(Axis(0), i)) {
            Ok(keypoints) => keypoints,
            Err(e) => {
                tracing::warn!(message = "failed to build keypoints", detection = i, error = %e);
                return None;
            }
        };
        let (hip, knee, ankle) = keypoints.left_knee_joints()?;
        if !(hip.is_finite() && knee.is_finite() && ankle.is_finite()) {
            tracing::trace!(message = "non-finite left knee joint", detection = i);
            return None;
        }
        Some(angle(hip, knee, ankle))
    }

    /// Relabel every detection in `batch` with its squat state and rep count.
    ///
    /// A batch without a recognizable label array is returned as is.
    pub fn process(&mut self, mut batch: DetectionBatch) -> ProcessedFrame {
        let num_detections = match batch.class_name.as_ref().and_then(Labels::len) {
            Some(num_detections) => num_detections,
            None => {
                tracing::warn!("detection batch has no label array, passing through");
                return ProcessedFrame {
                    batch,
                    states: Vec::new(),
                };
            }
        };

        self.frame_num += 1;
        self.store.tick();

        let mut labels = Vec::with_capacity(num_detections);
        let mut states = Vec::with_capacity(num_detections);

        for i in 0..num_detections {
            let entity_id = Self::entity_id(&batch, i);
            let knee_angle = Self::left_knee_angle(&batch, i);
            let phase = self.config.thresholds.classify(knee_angle);

            let state = self.store.get_or_create(entity_id.clone());
            let rep_count_before = state.rep_count;
            let transition = state.advance(phase);
            if transition.rep_count > rep_count_before {
                tracing::info!(
                    entity = %entity_id,
                    reps = transition.rep_count,
                    "completed squat"
                );
            }

            labels.push(format!(
                "{}: Reps {}",
                transition.current.glyph(),
                transition.rep_count
            ));
            states.push(StateRecord {
                entity_id,
                previous_state: state.previous,
                current_state: state.current,
                rep_count: state.rep_count,
            });
        }

        batch.class_name = Some(Labels::Text(labels));

        if let Some(max_idle) = self.config.evict_after {
            self.store.evict_idle(max_idle);
        }

        ProcessedFrame { batch, states }
    }
}

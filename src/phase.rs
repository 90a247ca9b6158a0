const DEFAULT_STANDING_THRESHOLD: &str = "170";
const DEFAULT_DEEP_SQUAT_THRESHOLD: &str = "73";

/// Instantaneous classification of the left knee angle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    Unknown,
    Standing,
    HalfSquat,
    DeepSquat,
}

/// Knee angle thresholds, in degrees, separating the squat phases.
#[derive(Debug, Clone, Copy, PartialEq, structopt::StructOpt)]
pub struct PhaseThresholds {
    /// Knee angles strictly above this are standing.
    #[structopt(long, default_value = DEFAULT_STANDING_THRESHOLD)]
    pub standing: f64,

    /// Knee angles at or below this are a deep squat.
    #[structopt(long, default_value = DEFAULT_DEEP_SQUAT_THRESHOLD)]
    pub deep_squat: f64,
}

impl Default for PhaseThresholds {
    fn default() -> Self {
        Self {
            standing: 170.0,
            deep_squat: 73.0,
        }
    }
}

impl PhaseThresholds {
    pub fn classify(&self, angle: Option<f64>) -> Phase {
        match angle {
            None => Phase::Unknown,
            Some(angle) if angle > self.standing => Phase::Standing,
            Some(angle) if angle > self.deep_squat => Phase::HalfSquat,
            Some(_) => Phase::DeepSquat,
        }
    }
}

/// Classify a knee angle with the default thresholds.
pub fn classify(angle: Option<f64>) -> Phase {
    PhaseThresholds::default().classify(angle)
}

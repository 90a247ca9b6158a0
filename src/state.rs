use crate::phase::Phase;
use serde::Serialize;

/// Position of a tracked subject within the repetition cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementState {
    Start,
    Standing,
    Descending,
    Squatting,
    Ascending,
}

impl Default for MovementState {
    fn default() -> Self {
        Self::Start
    }
}

impl MovementState {
    /// Short label drawn next to a detection.
    ///
    /// Squatting and Ascending share a glyph.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Standing => "Up",
            Self::Descending => "Dsc",
            Self::Squatting | Self::Ascending => "Asc",
        }
    }
}

/// Result of feeding one phase to a [`TrackedEntityState`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Transition {
    pub previous: MovementState,
    pub current: MovementState,
    pub rep_count: u64,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct TrackedEntityState {
    pub current: MovementState,
    pub previous: MovementState,
    pub rep_count: u64,
}

impl TrackedEntityState {
    /// Advance the repetition state machine by one observed phase.
    ///
    /// The counter only moves on Ascending -> Standing, so a rep requires a
    /// full Descending -> Squatting -> Ascending pass since the last one.
    pub fn advance(&mut self, phase: Phase) -> Transition {
        use MovementState::*;

        let previous = self.current;

        let current = match (previous, phase) {
            (_, Phase::Unknown) => {
                return Transition {
                    previous,
                    current: previous,
                    rep_count: self.rep_count,
                }
            }
            (Start, Phase::Standing) => Standing,
            (Standing, Phase::HalfSquat) => Descending,
            (Descending, Phase::DeepSquat) => Squatting,
            (Squatting, Phase::HalfSquat) => Ascending,
            (Ascending, Phase::Standing) => {
                self.rep_count += 1;
                Standing
            }
            (Start, Phase::HalfSquat | Phase::DeepSquat)
            | (Standing, Phase::Standing | Phase::DeepSquat)
            | (Descending, Phase::Standing | Phase::HalfSquat)
            | (Squatting, Phase::Standing | Phase::DeepSquat)
            | (Ascending, Phase::HalfSquat | Phase::DeepSquat) => previous,
        };

        if current != previous {
            tracing::debug!(from = ?previous, to = ?current, ?phase, "movement state changed");
        }

        self.previous = previous;
        self.current = current;

        Transition {
            previous,
            current,
            rep_count: self.rep_count,
        }
    }
}

//! Pipeline state machine.

use serde::Serialize;

/// Where a run is. Stages advance strictly in declaration order; any stage
/// may fall into [`PipelineStage::Failed`], which is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Nothing started yet
    Idle,
    /// Resolving the project root and parsing its units
    Loading,
    /// Finding handlers and actions per unit
    Classifying,
    /// Inserting modifiers and persisting changed units
    Rewriting,
    /// Merging classifications and building the companion document
    Synthesizing,
    /// Writing the companion document
    Emitting,
    Done,
    Failed,
}

impl PipelineStage {
    /// The stage that follows a successful `self`.
    pub fn next(self) -> Self {
        match self {
            Self::Idle => Self::Loading,
            Self::Loading => Self::Classifying,
            Self::Classifying => Self::Rewriting,
            Self::Rewriting => Self::Synthesizing,
            Self::Synthesizing => Self::Emitting,
            Self::Emitting => Self::Done,
            Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Stages that touch files on disk.
    pub fn writes_sources(self) -> bool {
        matches!(self, Self::Rewriting | Self::Emitting)
    }
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Loading => write!(f, "loading"),
            Self::Classifying => write!(f, "classifying"),
            Self::Rewriting => write!(f, "rewriting"),
            Self::Synthesizing => write!(f, "synthesizing"),
            Self::Emitting => write!(f, "emitting"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_advance_in_order() {
        let mut stage = PipelineStage::Idle;
        let mut seen = vec![stage];
        while !stage.is_terminal() {
            stage = stage.next();
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                PipelineStage::Idle,
                PipelineStage::Loading,
                PipelineStage::Classifying,
                PipelineStage::Rewriting,
                PipelineStage::Synthesizing,
                PipelineStage::Emitting,
                PipelineStage::Done,
            ]
        );
    }

    #[test]
    fn test_failed_is_terminal() {
        assert!(PipelineStage::Failed.is_terminal());
        assert_eq!(PipelineStage::Failed.next(), PipelineStage::Failed);
    }

    #[test]
    fn test_display_is_snake_case() {
        assert_eq!(PipelineStage::Synthesizing.to_string(), "synthesizing");
        assert!(PipelineStage::Rewriting.writes_sources());
        assert!(!PipelineStage::Classifying.writes_sources());
    }
}

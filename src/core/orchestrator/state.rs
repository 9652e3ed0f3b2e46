/// Where the current question cycle is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    Classifying,
    ExplainingOnly,
    ExplainingAndAnimating,
    /// Subject selection and backend reset are in flight.
    StartingSession,
}

/// Status flags a front-end renders (spinner, "generating animation" hint).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct OrchestrationState {
    pub phase: Phase,
    /// A cycle is running; new submissions are rejected.
    pub busy: bool,
    /// An animation has been requested and has not settled yet.
    pub video_pending: bool,
}

impl OrchestrationState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub(crate) fn claimed(phase: Phase) -> Self {
        Self {
            phase,
            busy: true,
            video_pending: false,
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.busy
    }
}

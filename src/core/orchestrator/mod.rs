//! Per-question pipeline: classify, branch, explain ∥ animate, merge.
//!
//! A cycle runs as one spawned task. When an animation is wanted, the
//! explanation and animation requests are polled together on that task with
//! `tokio::join!`; whichever settles first updates the transcript or the video
//! slot immediately, and the cycle stays busy until both have settled.

pub mod state;

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::core::classification::Plan;
use crate::core::constants::{
    FALLBACK_REPLY, NOTICE_CHAT_FAILED, NOTICE_SESSION_FAILED, NOTICE_VIDEO_FAILED,
    NOTICE_VIDEO_READY, NOTICE_VIDEO_STARTED,
};
use crate::core::message::Turn;
use crate::core::notice::{Notice, NoticeSender};
use crate::core::subject::Subject;
use crate::core::transcript::ConversationStore;
use crate::core::transport::{TransportError, TutorBackend};
use crate::core::video::VideoSlot;

pub use state::{OrchestrationState, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// A cycle is already running. Nothing was recorded or sent.
    Busy,
    EmptyQuestion,
    /// The orchestrator was shut down.
    ShutDown,
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Busy => write!(f, "still working on the previous question"),
            SubmitError::EmptyQuestion => write!(f, "question is empty"),
            SubmitError::ShutDown => write!(f, "tutor session has been shut down"),
        }
    }
}

impl StdError for SubmitError {}

#[derive(Debug)]
pub enum SessionError {
    Busy,
    ShutDown,
    Transport(TransportError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Busy => write!(f, "cannot start a session while a question is running"),
            SessionError::ShutDown => write!(f, "tutor session has been shut down"),
            SessionError::Transport(err) => write!(f, "failed to start session: {err}"),
        }
    }
}

impl StdError for SessionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SessionError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Completion handle for one submitted question.
#[must_use = "dropping the handle detaches the cycle; call wait() to block on it"]
pub struct CycleHandle {
    task: JoinHandle<()>,
}

impl CycleHandle {
    /// Resolve once both branches of the cycle have settled.
    pub async fn wait(self) {
        if let Err(err) = self.task.await {
            warn!(error = %err, "question cycle task ended abnormally");
        }
    }
}

struct Inner {
    backend: Arc<dyn TutorBackend>,
    store: ConversationStore,
    slot: VideoSlot,
    state: watch::Sender<OrchestrationState>,
    notices: NoticeSender,
    detached: CancellationToken,
}

/// Owns the transcript, the video slot and the busy/pending flags, and is the
/// only thing that mutates them.
///
/// Cloning is cheap and shares the same session. When the last clone is
/// dropped, any cycle still in flight finishes its network calls but its
/// results are discarded.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
    _teardown: Arc<DropGuard>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn TutorBackend>, notices: NoticeSender) -> Self {
        let detached = CancellationToken::new();
        let (state, _rx) = watch::channel(OrchestrationState::idle());
        let inner = Inner {
            backend,
            store: ConversationStore::new(),
            slot: VideoSlot::new(),
            state,
            notices,
            detached: detached.clone(),
        };

        Self {
            inner: Arc::new(inner),
            _teardown: Arc::new(detached.drop_guard()),
        }
    }

    pub fn transcript(&self) -> &ConversationStore {
        &self.inner.store
    }

    pub fn video(&self) -> &VideoSlot {
        &self.inner.slot
    }

    pub fn state(&self) -> OrchestrationState {
        *self.inner.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<OrchestrationState> {
        self.inner.state.subscribe()
    }

    /// Stop applying results. In-flight requests are not aborted; whatever
    /// they return afterwards is dropped.
    pub fn shutdown(&self) {
        if !self.inner.detached.is_cancelled() {
            info!("orchestrator shut down");
            self.inner.detached.cancel();
        }
    }

    /// Record the question and start its cycle in the background.
    ///
    /// The user turn is appended and the orchestrator marked busy before this
    /// returns. Must be called from within a tokio runtime.
    pub fn submit(&self, question: impl Into<String>) -> Result<CycleHandle, SubmitError> {
        let question = self.inner.begin_cycle(question.into())?;
        let mut guard = CycleGuard {
            inner: Arc::clone(&self.inner),
            settled: false,
        };
        let task = tokio::spawn(async move {
            guard.inner.run_cycle(question).await;
            guard.settled = true;
        });
        Ok(CycleHandle { task })
    }

    /// Submit and wait for the whole cycle, animation included.
    pub async fn ask(&self, question: impl Into<String>) -> Result<(), SubmitError> {
        self.submit(question)?.wait().await;
        Ok(())
    }

    /// Select a subject and clear backend history for a fresh session.
    ///
    /// Both calls are issued together. On success the video slot is emptied;
    /// the transcript is left alone.
    pub async fn begin_session(&self, subject: Subject) -> Result<(), SessionError> {
        self.inner.begin_session(subject).await
    }
}

/// Lives inside the cycle task. If the task unwinds before `run_cycle`
/// returns, the question still gets a reply and the busy flag is cleared.
struct CycleGuard {
    inner: Arc<Inner>,
    settled: bool,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        if self.settled || self.inner.is_detached() {
            return;
        }

        warn!("question cycle ended abnormally; releasing");
        if self.inner.store.last().is_some_and(|turn| turn.is_user()) {
            self.inner.store.append(Turn::assistant(FALLBACK_REPLY));
        }
        self.inner.notices.send(Notice::error(NOTICE_CHAT_FAILED));
        self.inner.release();
    }
}

impl Inner {
    fn is_detached(&self) -> bool {
        self.detached.is_cancelled()
    }

    fn claim(&self, phase: Phase) -> bool {
        self.state.send_if_modified(|state| {
            if state.busy {
                false
            } else {
                *state = OrchestrationState::claimed(phase);
                true
            }
        })
    }

    fn set_phase(&self, phase: Phase) {
        self.state.send_modify(|state| state.phase = phase);
    }

    fn release(&self) {
        self.state.send_replace(OrchestrationState::idle());
    }

    fn begin_cycle(&self, question: String) -> Result<String, SubmitError> {
        if self.is_detached() {
            return Err(SubmitError::ShutDown);
        }

        let question = question.trim();
        if question.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }

        if !self.claim(Phase::Submitting) {
            debug!("submission rejected: cycle in progress");
            return Err(SubmitError::Busy);
        }

        self.store.append(Turn::user(question));
        Ok(question.to_string())
    }

    async fn run_cycle(&self, question: String) {
        self.set_phase(Phase::Classifying);
        let classification = self.backend.classify(&question).await;
        if self.is_detached() {
            debug!("classification settled after shutdown; ignoring");
            return;
        }

        let plan = match classification {
            Ok(result) => result.into_plan(),
            Err(err) => {
                warn!(error = %err, "classification failed");
                self.store.append(Turn::assistant(FALLBACK_REPLY));
                self.notices.send(Notice::error(NOTICE_CHAT_FAILED));
                self.release();
                return;
            }
        };
        debug!(?plan, "question classified");
        if plan == Plan::NoAction {
            debug!("classifier asked for nothing; explaining anyway");
        }

        match plan {
            Plan::NoAction | Plan::ExplainOnly => {
                self.set_phase(Phase::ExplainingOnly);
                self.explain(&question).await;
            }
            Plan::ExplainAndAnimate(spec) => {
                self.state.send_modify(|state| {
                    state.phase = Phase::ExplainingAndAnimating;
                    state.video_pending = true;
                });
                self.notices.send(Notice::info(NOTICE_VIDEO_STARTED));
                tokio::join!(self.explain(&question), self.animate(&spec));
            }
        }

        if !self.is_detached() {
            self.release();
        }
    }

    /// Settle the explanation branch: exactly one assistant turn.
    async fn explain(&self, question: &str) {
        let outcome = self.backend.explain(question).await;
        if self.is_detached() {
            debug!("explanation settled after shutdown; ignoring");
            return;
        }

        let text = match outcome {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "explanation failed");
                self.notices.send(Notice::error(NOTICE_CHAT_FAILED));
                FALLBACK_REPLY.to_string()
            }
        };
        self.store.append(Turn::assistant(text));
    }

    /// Settle the animation branch. Only success touches the slot.
    async fn animate(&self, spec: &str) {
        let outcome = self.backend.animate(spec).await;
        if self.is_detached() {
            debug!("animation settled after shutdown; ignoring");
            return;
        }

        match outcome {
            Ok(asset) => {
                info!(asset = asset.id(), bytes = asset.size(), "visualization ready");
                self.slot.set(asset);
                self.notices.send(Notice::success(NOTICE_VIDEO_READY));
            }
            Err(err) => {
                warn!(error = %err, "animation failed; keeping current video");
                self.notices.send(Notice::error(NOTICE_VIDEO_FAILED));
            }
        }
        self.state.send_modify(|state| state.video_pending = false);
    }

    async fn begin_session(&self, subject: Subject) -> Result<(), SessionError> {
        if self.is_detached() {
            return Err(SessionError::ShutDown);
        }
        if !self.claim(Phase::StartingSession) {
            return Err(SessionError::Busy);
        }

        let (subject_result, reset_result) =
            tokio::join!(self.backend.set_subject(subject), self.backend.reset_session());
        if self.is_detached() {
            return Err(SessionError::ShutDown);
        }

        let outcome = subject_result.and(reset_result);
        match &outcome {
            Ok(()) => {
                self.slot.clear();
                self.notices
                    .send(Notice::success(format!("Subject set to {subject}")));
            }
            Err(err) => {
                warn!(error = %err, %subject, "session start failed");
                self.notices.send(Notice::error(NOTICE_SESSION_FAILED));
            }
        }
        self.release();
        outcome.map_err(SessionError::Transport)
    }
}

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::Semaphore;

use crate::core::classification::ClassificationResult;
use crate::core::notice::{Notice, NoticeSender};
use crate::core::orchestrator::Orchestrator;
use crate::core::subject::Subject;
use crate::core::transport::{TransportError, TutorBackend};
use crate::core::video::VideoAsset;

/// Holds a backend call until the test lets it through.
struct Gate {
    enabled: bool,
    permits: Semaphore,
}

impl Gate {
    fn open() -> Self {
        Self {
            enabled: false,
            permits: Semaphore::new(0),
        }
    }

    fn closed() -> Self {
        Self {
            enabled: true,
            permits: Semaphore::new(0),
        }
    }

    async fn pass(&self) {
        if self.enabled {
            self.permits
                .acquire()
                .await
                .expect("gate semaphore closed")
                .forget();
        }
    }
}

/// In-process [`TutorBackend`] with canned replies, call recording and
/// optional gates on `explain` / `animate` for controlling settle order.
pub struct ScriptedBackend {
    classification: Option<ClassificationResult>,
    explanation: Option<String>,
    explain_panics: bool,
    animation: Option<Vec<u8>>,
    session_ok: bool,
    explain_gate: Gate,
    animate_gate: Gate,
    calls: Mutex<Vec<String>>,
    video_dir: TempDir,
}

fn scripted_failure(operation: &'static str) -> TransportError {
    TransportError::Status {
        operation,
        status: 500,
        body: "scripted failure".to_string(),
    }
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            classification: Some(explain_only()),
            explanation: Some("Here is the explanation.".to_string()),
            explain_panics: false,
            animation: Some(b"fake-mp4".to_vec()),
            session_ok: true,
            explain_gate: Gate::open(),
            animate_gate: Gate::open(),
            calls: Mutex::new(Vec::new()),
            video_dir: TempDir::new().expect("temp dir"),
        }
    }

    pub fn with_classification(mut self, result: ClassificationResult) -> Self {
        self.classification = Some(result);
        self
    }

    pub fn failing_classify(mut self) -> Self {
        self.classification = None;
        self
    }

    pub fn with_explanation(mut self, text: &str) -> Self {
        self.explanation = Some(text.to_string());
        self
    }

    pub fn failing_explain(mut self) -> Self {
        self.explanation = None;
        self
    }

    /// Make `explain` panic instead of returning, as a buggy backend might.
    pub fn panicking_explain(mut self) -> Self {
        self.explain_panics = true;
        self
    }

    pub fn with_animation(mut self, bytes: &[u8]) -> Self {
        self.animation = Some(bytes.to_vec());
        self
    }

    pub fn failing_animate(mut self) -> Self {
        self.animation = None;
        self
    }

    pub fn failing_session(mut self) -> Self {
        self.session_ok = false;
        self
    }

    pub fn gate_explain(mut self) -> Self {
        self.explain_gate = Gate::closed();
        self
    }

    pub fn gate_animate(mut self) -> Self {
        self.animate_gate = Gate::closed();
        self
    }

    pub fn release_explain(&self) {
        self.explain_gate.permits.add_permits(1);
    }

    pub fn release_animate(&self) {
        self.animate_gate.permits.add_permits(1);
    }

    pub fn video_dir(&self) -> &std::path::Path {
        self.video_dir.path()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.as_str() == operation)
            .count()
    }

    fn record(&self, operation: &str) {
        self.calls.lock().unwrap().push(operation.to_string());
    }

    /// Yield to the runtime until `operation` has been called `count` times.
    pub async fn wait_for_calls(&self, operation: &str, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.calls_to(operation) < count {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {count} call(s) to {operation}"));
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TutorBackend for ScriptedBackend {
    async fn reset_session(&self) -> Result<(), TransportError> {
        self.record("reset_session");
        if self.session_ok {
            Ok(())
        } else {
            Err(scripted_failure("reset_session"))
        }
    }

    async fn set_subject(&self, subject: Subject) -> Result<(), TransportError> {
        self.record(&format!("set_subject:{subject}"));
        Ok(())
    }

    async fn classify(&self, _question: &str) -> Result<ClassificationResult, TransportError> {
        self.record("classify");
        self.classification
            .clone()
            .ok_or_else(|| scripted_failure("classify"))
    }

    async fn explain(&self, _question: &str) -> Result<String, TransportError> {
        self.record("explain");
        self.explain_gate.pass().await;
        if self.explain_panics {
            panic!("scripted explain panic");
        }
        self.explanation
            .clone()
            .ok_or_else(|| scripted_failure("explain"))
    }

    async fn animate(&self, _animation_spec: &str) -> Result<VideoAsset, TransportError> {
        self.record("animate");
        self.animate_gate.pass().await;
        match &self.animation {
            Some(bytes) => VideoAsset::from_bytes(self.video_dir.path(), bytes).map_err(
                |source| TransportError::Io {
                    operation: "animate",
                    source,
                },
            ),
            None => Err(scripted_failure("animate")),
        }
    }
}

pub fn explain_only() -> ClassificationResult {
    ClassificationResult {
        explanation_needed: true,
        visualization_needed: false,
        animation_spec: None,
    }
}

pub fn explain_and_animate(spec: &str) -> ClassificationResult {
    ClassificationResult {
        explanation_needed: true,
        visualization_needed: true,
        animation_spec: Some(spec.to_string()),
    }
}

/// Orchestrator wired to `backend`, plus the receiving end of its notices.
pub fn orchestrator_with(
    backend: &Arc<ScriptedBackend>,
) -> (Orchestrator, tokio::sync::mpsc::UnboundedReceiver<Notice>) {
    let (notices, rx) = NoticeSender::channel();
    let orchestrator = Orchestrator::new(backend.clone(), notices);
    (orchestrator, rx)
}

pub fn drain_notices(rx: &mut tokio::sync::mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}

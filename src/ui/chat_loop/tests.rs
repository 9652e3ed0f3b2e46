use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use super::*;
use crate::core::orchestrator::SubmitError;
use crate::utils::test_utils::{explain_and_animate, orchestrator_with, ScriptedBackend};

/// Cloneable sink so the test can read what the loop printed.
#[derive(Clone, Default)]
struct SharedOutput(Arc<Mutex<Vec<u8>>>);

impl SharedOutput {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn end_of_input_waits_for_the_pending_answer() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_explanation("SHM is periodic motion.")
            .gate_explain(),
    );
    let (orchestrator, notices) = orchestrator_with(&backend);
    let output = SharedOutput::default();

    let releaser = {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            backend.wait_for_calls("explain", 1).await;
            backend.release_explain();
        })
    };

    ChatLoop::new(orchestrator.clone(), notices, None)
        .with_output(output.clone())
        .run_with_input(Subject::Physics, "What is SHM?\n".as_bytes())
        .await
        .unwrap();
    releaser.await.unwrap();

    let printed = output.contents();
    assert!(printed.contains("⏳ Thinking..."));
    assert!(printed.contains("Tutor:\n  SHM is periodic motion."));
    assert_eq!(orchestrator.transcript().len(), 2);
    assert!(orchestrator.state().is_idle());
    assert_eq!(orchestrator.submit("later").err(), Some(SubmitError::ShutDown));
}

#[tokio::test]
async fn end_of_input_reports_the_finished_animation() {
    let backend = Arc::new(
        ScriptedBackend::new()
            .with_classification(explain_and_animate("draw a spring"))
            .gate_animate(),
    );
    let (orchestrator, notices) = orchestrator_with(&backend);
    let output = SharedOutput::default();

    let releaser = {
        let backend = Arc::clone(&backend);
        tokio::spawn(async move {
            backend.wait_for_calls("animate", 1).await;
            backend.release_animate();
        })
    };

    ChatLoop::new(orchestrator.clone(), notices, None)
        .with_output(output.clone())
        .run_with_input(Subject::Physics, "Show a spring\n".as_bytes())
        .await
        .unwrap();
    releaser.await.unwrap();

    let printed = output.contents();
    assert!(printed.contains("Tutor:\n  Here is the explanation."));
    assert!(printed.contains("🎬 Animation ready:"));
    assert!(orchestrator.video().get().is_some());
}

#[tokio::test]
async fn commands_write_to_the_configured_output() {
    let backend = Arc::new(ScriptedBackend::new());
    let (orchestrator, notices) = orchestrator_with(&backend);
    let output = SharedOutput::default();

    ChatLoop::new(orchestrator.clone(), notices, None)
        .with_output(output.clone())
        .run_with_input(Subject::Mathematics, "/status\n/save clip.mp4\n/quit\n".as_bytes())
        .await
        .unwrap();

    let printed = output.contents();
    assert!(printed.contains("ask a mathematics question"));
    assert!(printed.contains("Subject set to mathematics"));
    assert!(printed.contains("Status: idle"));
    assert!(printed.contains("No video to save yet."));
    assert_eq!(backend.calls_to("classify"), 0);
}

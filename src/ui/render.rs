use crate::core::message::Turn;
use crate::core::notice::{Notice, NoticeKind};
use crate::core::orchestrator::{OrchestrationState, Phase};
use crate::core::video::VideoAsset;

const INDENT: &str = "  ";

/// Render an assistant or user turn as printed in the terminal.
pub fn format_turn(turn: &Turn) -> String {
    let mut out = format!("{}:\n", turn.role.display_label());
    for line in turn.text.lines() {
        if line.trim().is_empty() {
            out.push('\n');
        } else {
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

pub fn format_notice(notice: &Notice) -> String {
    let icon = match notice.kind {
        NoticeKind::Info => "ℹ️ ",
        NoticeKind::Success => "✅",
        NoticeKind::Error => "❌",
    };
    format!("{icon} {}", notice.text)
}

pub fn format_video(asset: &VideoAsset) -> String {
    format!(
        "🎬 Animation ready: {} ({} KiB)",
        asset.path().display(),
        asset.size().div_ceil(1024)
    )
}

pub fn format_status(state: &OrchestrationState, video: Option<&VideoAsset>) -> String {
    let activity = match state.phase {
        Phase::Idle => "idle",
        Phase::Submitting | Phase::Classifying => "reading your question",
        Phase::ExplainingOnly => "writing an explanation",
        Phase::ExplainingAndAnimating if state.video_pending => "explaining and animating",
        Phase::ExplainingAndAnimating => "finishing the explanation",
        Phase::StartingSession => "starting a new session",
    };
    let video = match video {
        Some(asset) => asset.path().display().to_string(),
        None => "none".to_string(),
    };
    format!("Status: {activity}\nCurrent video: {video}")
}

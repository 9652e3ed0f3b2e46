use std::borrow::Cow;

use tokio::sync::mpsc;

/// Severity of a transient notification. Notices are shown next to the
/// conversation but never become part of the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: Cow<'static, str>,
}

impl Notice {
    pub fn new(kind: NoticeKind, text: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(NoticeKind::Info, text)
    }

    pub fn success(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(NoticeKind::Success, text)
    }

    pub fn error(text: impl Into<Cow<'static, str>>) -> Self {
        Self::new(NoticeKind::Error, text)
    }
}

/// Sending half of the notice side channel. Sending after the receiver is
/// gone is silently ignored.
#[derive(Clone, Debug)]
pub struct NoticeSender {
    tx: mpsc::UnboundedSender<Notice>,
}

impl NoticeSender {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn send(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }
}

//! Desktop notifications for moves and failures
//!
//! Both kinds are off by default and gated by settings; sending is
//! fire-and-forget.

use notify_rust::{Notification, Timeout};
use tracing::warn;

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// A note was moved
    Moved,
    /// Evaluation or move failed
    Debug,
}

impl NotificationKind {
    fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Moved => "folder-move",
            NotificationKind::Debug => "dialog-warning",
        }
    }

    fn prefix(&self) -> &'static str {
        match self {
            NotificationKind::Moved => "Note moved",
            NotificationKind::Debug => "Debug",
        }
    }
}

/// Which notifications are wanted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoticeSettings {
    pub on_move: bool,
    pub on_debug: bool,
}

impl NoticeSettings {
    pub fn allows(&self, kind: NotificationKind) -> bool {
        match kind {
            NotificationKind::Moved => self.on_move,
            NotificationKind::Debug => self.on_debug,
        }
    }
}

/// Something that can show a message to the user
pub trait Notifier {
    fn notify(&self, kind: NotificationKind, message: &str);
}

/// Notifier that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Notifier for Silent {
    fn notify(&self, _kind: NotificationKind, _message: &str) {}
}

/// Desktop notifications via the platform notification service
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    fn show(kind: NotificationKind, message: &str) {
        let result = Notification::new()
            .appname("vaultsort")
            .summary(&format!("vaultsort: {}", kind.prefix()))
            .body(message)
            .icon(kind.icon())
            .timeout(Timeout::Milliseconds(5000))
            .show();

        if let Err(e) = result {
            warn!("Failed to send notification: {}", e);
        }
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        dispatch(kind, message, Self::show);
    }
}

/// Fire and forget: inside a tokio runtime `send` runs on the blocking pool
/// and this returns at once.
fn dispatch(kind: NotificationKind, message: &str, send: fn(NotificationKind, &str)) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let message = message.to_string();
            handle.spawn_blocking(move || send(kind, &message));
        }
        Err(_) => send(kind, message),
    }
}

/// Notifier that keeps every message, for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingNotifier {
    messages: std::sync::Mutex<Vec<(NotificationKind, String)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(NotificationKind, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((kind, message.to_string()));
    }
}

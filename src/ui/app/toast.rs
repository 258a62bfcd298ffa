//! Toast queue for brief feedback messages.
//!
//! Toasts are non-blocking notices that stay visible for a few seconds.
//! The queue is shared with the sync layer, which pushes notices from
//! background tasks, so it guards its contents with a mutex.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::services::notification::{Notice, NoticeLevel, Notifier};

/// A single toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: NoticeLevel,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
        let duration = match level {
            NoticeLevel::Error => Duration::from_secs(6),
            _ => Duration::from_secs(3),
        };
        Self {
            message: message.into(),
            level,
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }

    /// Icon shown before the message in text output.
    pub fn icon(&self) -> &'static str {
        match self.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Info => "ℹ",
            NoticeLevel::Warning => "⚠",
            NoticeLevel::Error => "✗",
        }
    }
}

impl From<Notice> for Toast {
    fn from(notice: Notice) -> Self {
        Toast::new(notice.message, notice.level)
    }
}

#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Toast>> {
        // A panic while holding the lock leaves a plain Vec behind.
        self.toasts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add(&self, toast: Toast) {
        self.lock().push(toast);
    }

    /// Remove expired toasts
    pub fn cleanup(&self) {
        self.lock().retain(|toast| !toast.is_expired());
    }

    /// Toasts that have not expired yet, oldest first.
    pub fn active(&self) -> Vec<Toast> {
        self.cleanup();
        self.lock().clone()
    }

    pub fn latest(&self) -> Option<Toast> {
        self.lock().last().cloned()
    }

    /// Take every queued toast, expired or not.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.lock())
    }

    pub fn has_toasts(&self) -> bool {
        !self.lock().is_empty()
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, notice: Notice) {
        self.add(notice.into());
    }
}

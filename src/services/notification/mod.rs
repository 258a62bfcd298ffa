use anyhow::Result;
use notify_rust::{Notification, Timeout};

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A short-lived message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

/// Where transient notices go. Injected into the board and the sync layer.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Service for displaying notices as system notifications
pub struct DesktopNotifier {
    enabled: bool,
}

impl DesktopNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn show(&self, notice: &Notice) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let timeout = match notice.level {
            NoticeLevel::Error => Timeout::Milliseconds(10000),
            _ => Timeout::Milliseconds(5000),
        };

        Notification::new()
            .summary("Schedule board")
            .body(&notice.message)
            .timeout(timeout)
            .show()
            .map_err(|e| anyhow::anyhow!("Failed to show notification: {}", e))?;

        Ok(())
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(err) = self.show(&notice) {
            log::warn!("{} (notice was: {})", err, notice.message);
        }
    }
}

/// Sends every notice to several notifiers.
#[derive(Default)]
pub struct FanoutNotifier {
    targets: Vec<std::sync::Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, target: std::sync::Arc<dyn Notifier>) -> Self {
        self.targets.push(target);
        self
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, notice: Notice) {
        for target in &self.targets {
            target.notify(notice.clone());
        }
    }
}

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLogEventKind {
    SettingsSaved,
    SettingsSaveFailed,
    SettingsRestored,
    SettingsExpired,
    SettingsUnreadable,
    ProjectionCompleted,
    ProjectionRejected,
}

impl RunLogEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SettingsSaved => "settings_saved",
            Self::SettingsSaveFailed => "settings_save_failed",
            Self::SettingsRestored => "settings_restored",
            Self::SettingsExpired => "settings_expired",
            Self::SettingsUnreadable => "settings_unreadable",
            Self::ProjectionCompleted => "projection_completed",
            Self::ProjectionRejected => "projection_rejected",
        }
    }

    fn is_warning(self) -> bool {
        matches!(
            self,
            Self::SettingsSaveFailed | Self::SettingsUnreadable | Self::ProjectionRejected
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLogEvent {
    /// `None` for store activity outside a projection run.
    pub run_id: Option<u64>,
    pub kind: RunLogEventKind,
    pub detail: String,
}

impl RunLogEvent {
    pub fn new(run_id: Option<u64>, kind: RunLogEventKind, detail: impl Into<String>) -> Self {
        Self {
            run_id,
            kind,
            detail: detail.into(),
        }
    }
}

pub trait RunLogWriter {
    fn write(&mut self, event: RunLogEvent);
}

#[derive(Debug, Default)]
pub struct InMemoryRunLogWriter {
    events: Vec<RunLogEvent>,
}

impl InMemoryRunLogWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunLogEvent] {
        &self.events
    }

    pub fn kinds(&self) -> Vec<RunLogEventKind> {
        self.events.iter().map(|event| event.kind).collect()
    }
}

impl RunLogWriter for InMemoryRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        self.events.push(event);
    }
}

/// Forwards run log events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingRunLogWriter;

impl RunLogWriter for TracingRunLogWriter {
    fn write(&mut self, event: RunLogEvent) {
        let kind = event.kind.as_str();
        if event.kind.is_warning() {
            warn!(run_id = ?event.run_id, kind, detail = %event.detail, "run log");
        } else {
            info!(run_id = ?event.run_id, kind, detail = %event.detail, "run log");
        }
    }
}

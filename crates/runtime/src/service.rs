use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::{
    inputs::{InputError, RawInputs},
    logging::{RunLogEvent, RunLogEventKind, RunLogWriter},
    projector::{project, Projection, ProjectionError},
    store::{load_settings, save_settings, KeyValueStore, LoadOutcome, RestoredSettings},
};

/// What asked for the projection. Only explicit runs persist the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    Explicit,
    Automatic,
}

impl TriggerMode {
    pub fn persists_settings(self) -> bool {
        matches!(self, Self::Explicit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRun {
    pub run_id: u64,
    pub mode: TriggerMode,
    #[serde(flatten)]
    pub projection: Projection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    Input(InputError),
    Projection(ProjectionError),
    RunIdOverflow,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(err) => write!(f, "{err}"),
            Self::Projection(err) => write!(f, "{err}"),
            Self::RunIdOverflow => write!(f, "projection run ids are exhausted"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::Projection(err) => Some(err),
            Self::RunIdOverflow => None,
        }
    }
}

impl From<InputError> for RunError {
    fn from(err: InputError) -> Self {
        Self::Input(err)
    }
}

impl From<ProjectionError> for RunError {
    fn from(err: ProjectionError) -> Self {
        Self::Projection(err)
    }
}

pub struct ProjectionService {
    store: Arc<dyn KeyValueStore>,
    next_run_id: AtomicU64,
}

impl ProjectionService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            next_run_id: AtomicU64::new(0),
        }
    }

    fn start_run(&self) -> Result<u64, RunError> {
        let previous = self
            .next_run_id
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current.checked_add(1)
            })
            .map_err(|_| RunError::RunIdOverflow)?;

        Ok(previous + 1)
    }

    /// One complete projection. `now` must already be in the exchange's local offset.
    pub fn run(
        &self,
        inputs: &RawInputs,
        mode: TriggerMode,
        now: OffsetDateTime,
        log: &mut dyn RunLogWriter,
    ) -> Result<ProjectionRun, RunError> {
        let run_id = self.start_run()?;

        // Saved before validation, so a rejected form is still remembered.
        if mode.persists_settings() {
            match save_settings(self.store.as_ref(), inputs, now) {
                Ok(timestamp) => log.write(RunLogEvent::new(
                    Some(run_id),
                    RunLogEventKind::SettingsSaved,
                    format!("timestamp={timestamp}"),
                )),
                Err(err) => log.write(RunLogEvent::new(
                    Some(run_id),
                    RunLogEventKind::SettingsSaveFailed,
                    err.to_string(),
                )),
            }
        }

        let projection = inputs
            .to_config()
            .map_err(RunError::from)
            .and_then(|config| {
                project(&config, PrimitiveDateTime::new(now.date(), now.time()))
                    .map_err(RunError::from)
            });

        match projection {
            Ok(projection) => {
                log.write(RunLogEvent::new(
                    Some(run_id),
                    RunLogEventKind::ProjectionCompleted,
                    format!(
                        "sessions={} final_capital={}",
                        projection.sessions.len(),
                        projection.summary.final_capital
                    ),
                ));
                Ok(ProjectionRun {
                    run_id,
                    mode,
                    projection,
                })
            }
            Err(err) => {
                log.write(RunLogEvent::new(
                    Some(run_id),
                    RunLogEventKind::ProjectionRejected,
                    err.to_string(),
                ));
                Err(err)
            }
        }
    }

    pub fn restore(
        &self,
        now: OffsetDateTime,
        log: &mut dyn RunLogWriter,
    ) -> Option<RestoredSettings> {
        match load_settings(self.store.as_ref(), now) {
            LoadOutcome::Absent => None,
            LoadOutcome::Expired { saved_at_ms } => {
                log.write(RunLogEvent::new(
                    None,
                    RunLogEventKind::SettingsExpired,
                    format!("saved_at_ms={saved_at_ms}"),
                ));
                None
            }
            LoadOutcome::Unreadable(reason) => {
                log.write(RunLogEvent::new(
                    None,
                    RunLogEventKind::SettingsUnreadable,
                    reason,
                ));
                None
            }
            LoadOutcome::Restored(restored) => {
                log.write(RunLogEvent::new(
                    None,
                    RunLogEventKind::SettingsRestored,
                    format!("remaining_days={}", restored.expiry.remaining_days),
                ));
                Some(restored)
            }
        }
    }

    /// Load-time replay: reruns the stored inputs without refreshing their timestamp.
    pub fn replay_saved(
        &self,
        now: OffsetDateTime,
        log: &mut dyn RunLogWriter,
    ) -> Option<Result<ProjectionRun, RunError>> {
        let restored = self.restore(now, log)?;
        Some(self.run(&restored.settings, TriggerMode::Automatic, now, log))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{atomic::Ordering, Arc};

    use time::{macros::datetime, Duration};

    use super::{ProjectionService, RunError, TriggerMode};
    use crate::{
        inputs::{sample_inputs, InputError},
        logging::{InMemoryRunLogWriter, RunLogEventKind},
        store::{
            load_settings, InMemoryStore, KeyValueStore, LoadOutcome, StoreError, SETTINGS_KEY,
        },
    };

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Poisoned)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }

        fn remove(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    fn service_with_store() -> (ProjectionService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (ProjectionService::new(store.clone()), store)
    }

    #[test]
    fn explicit_run_persists_then_projects() {
        let (service, store) = service_with_store();
        let mut log = InMemoryRunLogWriter::new();
        let now = datetime!(2024 - 03 - 04 09:00 +8);

        let run = service
            .run(&sample_inputs(), TriggerMode::Explicit, now, &mut log)
            .unwrap();

        assert_eq!(run.run_id, 1);
        assert_eq!(run.projection.sessions.len(), 40);
        assert!(matches!(
            load_settings(store.as_ref(), now),
            LoadOutcome::Restored(_)
        ));
        assert_eq!(
            log.kinds(),
            vec![
                RunLogEventKind::SettingsSaved,
                RunLogEventKind::ProjectionCompleted
            ]
        );
    }

    #[test]
    fn automatic_run_never_touches_the_store() {
        let (service, store) = service_with_store();
        let mut log = InMemoryRunLogWriter::new();

        service
            .run(
                &sample_inputs(),
                TriggerMode::Automatic,
                datetime!(2024 - 03 - 04 09:00 +8),
                &mut log,
            )
            .unwrap();

        assert_eq!(store.get(SETTINGS_KEY).unwrap(), None);
        assert_eq!(log.kinds(), vec![RunLogEventKind::ProjectionCompleted]);
    }

    #[test]
    fn rejected_explicit_run_still_saves_inputs() {
        let (service, store) = service_with_store();
        let mut log = InMemoryRunLogWriter::new();
        let mut inputs = sample_inputs();
        inputs.select_big = false;

        let err = service
            .run(
                &inputs,
                TriggerMode::Explicit,
                datetime!(2024 - 03 - 04 09:00 +8),
                &mut log,
            )
            .unwrap_err();

        assert_eq!(err, RunError::Input(InputError::NoContractSelected));
        assert!(store.get(SETTINGS_KEY).unwrap().is_some());
        assert_eq!(
            log.kinds(),
            vec![
                RunLogEventKind::SettingsSaved,
                RunLogEventKind::ProjectionRejected
            ]
        );
    }

    #[test]
    fn store_failure_does_not_abort_projection() {
        let service = ProjectionService::new(Arc::new(FailingStore));
        let mut log = InMemoryRunLogWriter::new();

        let run = service.run(
            &sample_inputs(),
            TriggerMode::Explicit,
            datetime!(2024 - 03 - 04 09:00 +8),
            &mut log,
        );

        assert!(run.is_ok());
        assert_eq!(log.kinds()[0], RunLogEventKind::SettingsSaveFailed);
    }

    #[test]
    fn replay_runs_stored_inputs_automatically() {
        let (service, _store) = service_with_store();
        let mut log = InMemoryRunLogWriter::new();
        let saved_at = datetime!(2024 - 03 - 04 09:00 +8);
        service
            .run(&sample_inputs(), TriggerMode::Explicit, saved_at, &mut log)
            .unwrap();

        let replayed = service
            .replay_saved(saved_at + Duration::days(2), &mut log)
            .expect("snapshot should replay")
            .unwrap();

        assert_eq!(replayed.mode, TriggerMode::Automatic);
        assert_eq!(replayed.run_id, 2);
        let restored = service
            .restore(saved_at + Duration::days(3), &mut InMemoryRunLogWriter::new())
            .unwrap();
        assert_eq!(restored.saved_at_ms, saved_at.unix_timestamp() * 1_000);
    }

    #[test]
    fn replay_without_snapshot_does_nothing() {
        let (service, _store) = service_with_store();
        let mut log = InMemoryRunLogWriter::new();

        let replayed = service.replay_saved(datetime!(2024 - 03 - 04 09:00 +8), &mut log);

        assert!(replayed.is_none());
        assert!(log.events().is_empty());
    }

    #[test]
    fn unreadable_store_is_logged_not_raised() {
        let service = ProjectionService::new(Arc::new(FailingStore));
        let mut log = InMemoryRunLogWriter::new();

        let restored = service.restore(datetime!(2024 - 03 - 04 09:00 +8), &mut log);

        assert!(restored.is_none());
        assert_eq!(log.kinds(), vec![RunLogEventKind::SettingsUnreadable]);
    }

    #[test]
    fn run_id_overflow_is_an_error() {
        let (service, _store) = service_with_store();
        service.next_run_id.store(u64::MAX, Ordering::Relaxed);

        let err = service
            .run(
                &sample_inputs(),
                TriggerMode::Automatic,
                datetime!(2024 - 03 - 04 09:00 +8),
                &mut InMemoryRunLogWriter::new(),
            )
            .unwrap_err();

        assert_eq!(err, RunError::RunIdOverflow);
    }
}

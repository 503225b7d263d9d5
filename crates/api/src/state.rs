use std::sync::Arc;

use runtime::{
    logging::TracingRunLogWriter,
    store::{InMemoryStore, KeyValueStore, RestoredSettings},
    Clock, ProjectionRun, ProjectionService, RawInputs, RunError, TriggerMode,
};

#[derive(Clone)]
pub struct AppState {
    service: Arc<ProjectionService>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            service: Arc::new(ProjectionService::new(store)),
            clock,
        }
    }

    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(InMemoryStore::new()), clock)
    }

    pub fn run_projection(
        &self,
        inputs: &RawInputs,
        mode: TriggerMode,
    ) -> Result<ProjectionRun, RunError> {
        self.service
            .run(inputs, mode, self.clock.now(), &mut TracingRunLogWriter)
    }

    pub fn saved_settings(&self) -> Option<RestoredSettings> {
        self.service
            .restore(self.clock.now(), &mut TracingRunLogWriter)
    }

    pub fn replay_saved(&self) -> Option<Result<ProjectionRun, RunError>> {
        self.service
            .replay_saved(self.clock.now(), &mut TracingRunLogWriter)
    }

    #[cfg(test)]
    pub(crate) fn for_test() -> Self {
        use runtime::FixedClock;
        use time::macros::datetime;

        Self::in_memory(Arc::new(FixedClock(datetime!(2024 - 03 - 06 10:00 +8))))
    }
}

pub mod clock;
pub mod export;
pub mod inputs;
pub mod logging;
pub mod projector;
pub mod service;
pub mod session;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use inputs::{InputError, RawInputs};
pub use projector::{project, HighlightTarget, Projection, ProjectionError, ProjectionSummary};
pub use service::{ProjectionRun, ProjectionService, RunError, TriggerMode};
pub use session::{simulate_session, SessionRequest, SessionResult};

pub mod calendar;
mod config;
mod contract;
mod session;
pub mod tax;

pub use config::{ConfigError, SimulationConfig, DEFAULT_ASSUMED_INDEX, HORIZON_DAYS};
pub use contract::{
    ContractSize, ContractSpec, BIG_POINT_VALUE, MICRO_POINT_VALUE, MINI_POINT_VALUE,
};
pub use session::SessionLabel;

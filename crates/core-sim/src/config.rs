use std::fmt;

use time::Date;

use crate::contract::{ContractSize, ContractSpec};

pub const HORIZON_DAYS: u32 = 20;
pub const DEFAULT_ASSUMED_INDEX: u64 = 27_740;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    pub initial_capital: i64,
    pub assumed_index_level: u64,
    pub selected_contracts: Vec<ContractSpec>,
    pub points_per_trade: u32,
    pub morning_trade_count: u32,
    pub night_trade_count: u32,
    pub start_date: Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NoContractSelected,
    DuplicateContract(ContractSize),
    NegativeInitialCapital,
    NonPositiveIndexLevel,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContractSelected => {
                write!(f, "select at least one contract size to project")
            }
            Self::DuplicateContract(size) => {
                write!(f, "contract size {} is selected more than once", size.as_str())
            }
            Self::NegativeInitialCapital => write!(f, "initial capital must not be negative"),
            Self::NonPositiveIndexLevel => write!(f, "assumed index level must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.selected_contracts.is_empty() {
            return Err(ConfigError::NoContractSelected);
        }
        for (position, spec) in self.selected_contracts.iter().enumerate() {
            if self.selected_contracts[..position]
                .iter()
                .any(|earlier| earlier.size == spec.size)
            {
                return Err(ConfigError::DuplicateContract(spec.size));
            }
        }
        if self.initial_capital < 0 {
            return Err(ConfigError::NegativeInitialCapital);
        }
        if self.assumed_index_level == 0 {
            return Err(ConfigError::NonPositiveIndexLevel);
        }

        Ok(())
    }

    /// Selected contracts in tie-break order, independent of how they were supplied.
    pub fn contracts_in_tie_break_order(&self) -> Vec<ContractSpec> {
        let mut contracts = self.selected_contracts.clone();
        contracts.sort_by_key(|spec| spec.size);
        contracts
    }
}

use std::fmt;

use core_sim::{ContractSize, ContractSpec, SimulationConfig, DEFAULT_ASSUMED_INDEX};
use serde::{Deserialize, Serialize};
use time::{macros::format_description, Date};

/// Form values exactly as entered. Also the persisted settings payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RawInputs {
    pub initial_capital: String,
    pub assumed_index: String,
    pub big_margin: String,
    pub big_commission: String,
    pub mini_margin: String,
    pub mini_commission: String,
    pub micro_margin: String,
    pub micro_commission: String,
    pub start_date: String,
    pub points_per_trade: String,
    pub morning_trades: String,
    pub night_trades: String,
    pub select_big: bool,
    pub select_mini: bool,
    pub select_micro: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    NoContractSelected,
    MissingStartDate,
    InvalidStartDate(String),
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoContractSelected => {
                write!(f, "select at least one contract size to project")
            }
            Self::MissingStartDate => write!(f, "choose a start date for the projection"),
            Self::InvalidStartDate(value) => {
                write!(f, "start date {value:?} is not a YYYY-MM-DD date")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Drops thousands separators and anything else that is not an ASCII digit.
pub fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

fn digits_or_zero<T>(value: &str) -> T
where
    T: std::str::FromStr + Default,
{
    only_digits(value).parse().unwrap_or_default()
}

/// Plan counts keep only their whole part; a negative entry plans nothing.
fn whole_count_or_zero(value: &str) -> u32 {
    let trimmed = value.trim();
    if trimmed.starts_with('-') {
        return 0;
    }
    let whole = trimmed.split_once('.').map_or(trimmed, |(whole, _)| whole);
    digits_or_zero(whole)
}

fn parse_start_date(value: &str) -> Result<Date, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingStartDate);
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| InputError::InvalidStartDate(trimmed.to_owned()))
}

impl RawInputs {
    pub fn any_contract_selected(&self) -> bool {
        self.select_big || self.select_mini || self.select_micro
    }

    fn selected_contracts(&self) -> Vec<ContractSpec> {
        let mut contracts = Vec::with_capacity(ContractSize::ALL.len());
        if self.select_big {
            contracts.push(ContractSpec::new(
                ContractSize::Big,
                digits_or_zero(&self.big_margin),
                digits_or_zero(&self.big_commission),
            ));
        }
        if self.select_mini {
            contracts.push(ContractSpec::new(
                ContractSize::Mini,
                digits_or_zero(&self.mini_margin),
                digits_or_zero(&self.mini_commission),
            ));
        }
        if self.select_micro {
            contracts.push(ContractSpec::new(
                ContractSize::Micro,
                digits_or_zero(&self.micro_margin),
                digits_or_zero(&self.micro_commission),
            ));
        }
        contracts
    }

    /// Malformed numbers degrade to zero (the assumed index to its default); only a missing
    /// contract selection or start date aborts.
    pub fn to_config(&self) -> Result<SimulationConfig, InputError> {
        if !self.any_contract_selected() {
            return Err(InputError::NoContractSelected);
        }
        let start_date = parse_start_date(&self.start_date)?;

        let assumed_index_level = match digits_or_zero::<u64>(&self.assumed_index) {
            0 => DEFAULT_ASSUMED_INDEX,
            level => level,
        };

        Ok(SimulationConfig {
            initial_capital: digits_or_zero(&self.initial_capital),
            assumed_index_level,
            selected_contracts: self.selected_contracts(),
            points_per_trade: whole_count_or_zero(&self.points_per_trade),
            morning_trade_count: whole_count_or_zero(&self.morning_trades),
            night_trade_count: whole_count_or_zero(&self.night_trades),
            start_date,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_inputs() -> RawInputs {
    RawInputs {
        initial_capital: "500,000".to_owned(),
        assumed_index: "27,740".to_owned(),
        big_margin: "184,000".to_owned(),
        big_commission: "50".to_owned(),
        mini_margin: "46,000".to_owned(),
        mini_commission: "25".to_owned(),
        micro_margin: "9,200".to_owned(),
        micro_commission: "10".to_owned(),
        start_date: "2024-03-04".to_owned(),
        points_per_trade: "10".to_owned(),
        morning_trades: "2".to_owned(),
        night_trades: "0".to_owned(),
        select_big: true,
        select_mini: false,
        select_micro: false,
    }
}

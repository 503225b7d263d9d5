use serde::{Deserialize, Serialize};

pub const BIG_POINT_VALUE: i64 = 200;
pub const MINI_POINT_VALUE: i64 = 50;
pub const MICRO_POINT_VALUE: i64 = 10;

/// Contract sizes in tie-break order: on equal net profit the earlier size wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractSize {
    Big,
    Mini,
    Micro,
}

impl ContractSize {
    pub const ALL: [ContractSize; 3] = [Self::Big, Self::Mini, Self::Micro];

    pub fn point_value(self) -> i64 {
        match self {
            Self::Big => BIG_POINT_VALUE,
            Self::Mini => MINI_POINT_VALUE,
            Self::Micro => MICRO_POINT_VALUE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Big => "big",
            Self::Mini => "mini",
            Self::Micro => "micro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContractSpec {
    pub size: ContractSize,
    pub margin_per_unit: i64,
    pub commission_per_unit: i64,
    pub point_value: i64,
}

impl ContractSpec {
    pub fn new(size: ContractSize, margin_per_unit: i64, commission_per_unit: i64) -> Self {
        Self {
            size,
            margin_per_unit,
            commission_per_unit,
            point_value: size.point_value(),
        }
    }

    /// Whole units the capital can margin. A non-positive margin buys nothing.
    pub fn affordable_units(&self, capital: i64) -> i64 {
        if self.margin_per_unit <= 0 || capital <= 0 {
            return 0;
        }
        capital / self.margin_per_unit
    }
}

use core_sim::{tax::round_trip_tax, ContractSize, ContractSpec};
use serde::{Serialize, Serializer};

/// What a session ends up trading, or why it trades nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractChoice {
    Traded(ContractSize),
    /// Nothing planned: zero target points or zero trades.
    Idle,
    InsufficientCapital,
    UnprofitableSkipped,
}

impl ContractChoice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Traded(size) => size.as_str(),
            Self::Idle => "idle",
            Self::InsufficientCapital => "insufficient-capital",
            Self::UnprofitableSkipped => "unprofitable-skipped",
        }
    }

    pub fn is_trade(self) -> bool {
        matches!(self, Self::Traded(_))
    }
}

impl Serialize for ContractChoice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest<'a> {
    pub starting_capital: i64,
    pub index_level: u64,
    /// Candidates in tie-break order (big, mini, micro).
    pub contracts: &'a [ContractSpec],
    pub target_points: i64,
    pub trade_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub choice: ContractChoice,
    pub units: i64,
    pub tax: i64,
    pub commission: i64,
    pub net_profit: i64,
}

impl Selection {
    fn no_trade(choice: ContractChoice) -> Self {
        Self {
            choice,
            units: 0,
            tax: 0,
            commission: 0,
            net_profit: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateOutcome {
    pub size: ContractSize,
    pub units: i64,
    pub gross_profit: i64,
    pub commission: i64,
    pub tax: i64,
    pub net_profit: i64,
}

pub fn evaluate_candidate(
    spec: &ContractSpec,
    starting_capital: i64,
    index_level: u64,
    target_points: i64,
    trade_count: u32,
) -> Option<CandidateOutcome> {
    let units = spec.affordable_units(starting_capital);
    if units <= 0 {
        return None;
    }

    let gross_profit = units
        .saturating_mul(target_points)
        .saturating_mul(spec.point_value);
    let commission = units
        .saturating_mul(spec.commission_per_unit)
        .saturating_mul(i64::from(trade_count));
    let tax = round_trip_tax(index_level, spec.point_value, units, trade_count);
    let net_profit = gross_profit.saturating_sub(commission).saturating_sub(tax);

    Some(CandidateOutcome {
        size: spec.size,
        units,
        gross_profit,
        commission,
        tax,
        net_profit,
    })
}

pub fn select_contract(request: &SelectionRequest<'_>) -> Selection {
    if request.target_points == 0 || request.trade_count == 0 {
        return Selection::no_trade(ContractChoice::Idle);
    }

    let mut best: Option<CandidateOutcome> = None;
    for spec in request.contracts {
        let Some(candidate) = evaluate_candidate(
            spec,
            request.starting_capital,
            request.index_level,
            request.target_points,
            request.trade_count,
        ) else {
            continue;
        };

        // Strictly greater, so an equal net keeps the earlier size.
        let improves = best.map_or(true, |current| candidate.net_profit > current.net_profit);
        if improves {
            best = Some(candidate);
        }
    }

    match best {
        None => Selection::no_trade(ContractChoice::InsufficientCapital),
        Some(best) if best.net_profit <= 0 => {
            Selection::no_trade(ContractChoice::UnprofitableSkipped)
        }
        Some(best) => Selection {
            choice: ContractChoice::Traded(best.size),
            units: best.units,
            tax: best.tax,
            commission: best.commission,
            net_profit: best.net_profit,
        },
    }
}

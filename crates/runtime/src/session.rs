use core_sim::{ContractSpec, SessionLabel};
use serde::Serialize;
use strategy::{select_contract, ContractChoice, SelectionRequest};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRequest<'a> {
    pub date: Date,
    pub day_index: u32,
    pub session: SessionLabel,
    pub starting_capital: i64,
    pub index_level: u64,
    pub contracts: &'a [ContractSpec],
    pub points_per_trade: u32,
    pub trade_count: u32,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionResult {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub day_index: u32,
    pub session: SessionLabel,
    pub starting_capital: i64,
    pub chosen_contract: ContractChoice,
    pub units_traded: i64,
    pub target_points: i64,
    pub tax: i64,
    pub commission: i64,
    pub net_profit: i64,
    pub ending_capital: i64,
    pub highlighted: bool,
}

impl SessionRequest<'_> {
    pub fn target_points(&self) -> i64 {
        i64::from(self.points_per_trade).saturating_mul(i64::from(self.trade_count))
    }
}

pub fn simulate_session(request: &SessionRequest<'_>) -> SessionResult {
    let target_points = request.target_points();
    let selection = select_contract(&SelectionRequest {
        starting_capital: request.starting_capital,
        index_level: request.index_level,
        contracts: request.contracts,
        target_points,
        trade_count: request.trade_count,
    });

    let reported_points = match selection.choice {
        ContractChoice::Idle => 0,
        _ => target_points,
    };

    SessionResult {
        date: request.date,
        day_index: request.day_index,
        session: request.session,
        starting_capital: request.starting_capital,
        chosen_contract: selection.choice,
        units_traded: selection.units,
        target_points: reported_points,
        tax: selection.tax,
        commission: selection.commission,
        net_profit: selection.net_profit,
        ending_capital: request.starting_capital.saturating_add(selection.net_profit),
        highlighted: request.highlighted,
    }
}

#[cfg(test)]
mod tests {
    use core_sim::{ContractSize, ContractSpec, SessionLabel};
    use strategy::ContractChoice;
    use time::macros::date;

    use super::{simulate_session, SessionRequest};

    fn morning_request(
        contracts: &[ContractSpec],
        capital: i64,
        trades: u32,
    ) -> SessionRequest<'_> {
        SessionRequest {
            date: date!(2024 - 03 - 04),
            day_index: 1,
            session: SessionLabel::Morning,
            starting_capital: capital,
            index_level: 27_740,
            contracts,
            points_per_trade: 10,
            trade_count: trades,
            highlighted: false,
        }
    }

    #[test]
    fn traded_session_compounds_net_profit() {
        let contracts = [ContractSpec::new(ContractSize::Big, 184_000, 50)];

        let result = simulate_session(&morning_request(&contracts, 500_000, 2));

        assert_eq!(result.chosen_contract, ContractChoice::Traded(ContractSize::Big));
        assert_eq!(result.units_traded, 2);
        assert_eq!(result.target_points, 20);
        assert_eq!(result.tax, 888);
        assert_eq!(result.commission, 200);
        assert_eq!(result.net_profit, 6_912);
        assert_eq!(result.ending_capital, 506_912);
    }

    #[test]
    fn idle_session_keeps_capital_and_reports_zero_points() {
        let contracts = [ContractSpec::new(ContractSize::Big, 184_000, 50)];

        let result = simulate_session(&morning_request(&contracts, 500_000, 0));

        assert_eq!(result.chosen_contract, ContractChoice::Idle);
        assert_eq!(result.target_points, 0);
        assert_eq!(result.ending_capital, 500_000);
    }

    #[test]
    fn insufficient_capital_session_keeps_target_and_capital() {
        let contracts = [ContractSpec::new(ContractSize::Big, 184_000, 50)];

        let result = simulate_session(&morning_request(&contracts, 100_000, 2));

        assert_eq!(result.chosen_contract, ContractChoice::InsufficientCapital);
        assert_eq!(result.target_points, 20);
        assert_eq!(result.units_traded, 0);
        assert_eq!(result.ending_capital, 100_000);
    }

    #[test]
    fn highlight_flag_is_passed_through_untouched() {
        let contracts = [ContractSpec::new(ContractSize::Big, 184_000, 50)];
        let mut request = morning_request(&contracts, 500_000, 2);
        let plain = simulate_session(&request);
        request.highlighted = true;
        let highlighted = simulate_session(&request);

        assert!(highlighted.highlighted);
        assert_eq!(plain.ending_capital, highlighted.ending_capital);
    }

    #[test]
    fn result_serializes_date_as_iso_day() {
        let contracts = [ContractSpec::new(ContractSize::Big, 184_000, 50)];

        let result = simulate_session(&morning_request(&contracts, 500_000, 2));
        let json = serde_json::to_value(result).unwrap();

        assert_eq!(json["date"], "2024-03-04");
        assert_eq!(json["session"], "morning");
        assert_eq!(json["chosen_contract"], "big");
    }

    #[test]
    fn oversized_session_caps_capital_instead_of_wrapping() {
        let contracts = [ContractSpec::new(ContractSize::Big, 1_000, 0)];
        let request = SessionRequest {
            points_per_trade: u32::MAX,
            trade_count: 1,
            ..morning_request(&contracts, i64::MAX - 1, 1)
        };

        let result = simulate_session(&request);

        assert_eq!(result.chosen_contract, ContractChoice::Traded(ContractSize::Big));
        assert!(result.net_profit > 0);
        assert_eq!(result.ending_capital, i64::MAX);
    }
}

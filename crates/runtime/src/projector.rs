use std::fmt;

use core_sim::{
    calendar::{
        first_trading_day_on_or_after, next_trading_day, previous_trading_day,
        same_calendar_date,
    },
    ConfigError, SessionLabel, SimulationConfig, HORIZON_DAYS,
};
use serde::Serialize;
use time::{Date, PrimitiveDateTime};

use crate::session::{simulate_session, SessionRequest, SessionResult};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Local hour at which the morning session becomes the current one.
pub const MORNING_SESSION_HOUR: u8 = 7;
/// Local hour at which the night session becomes the current one.
pub const NIGHT_SESSION_HOUR: u8 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightTarget {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub session: SessionLabel,
}

impl HighlightTarget {
    pub fn matches(&self, date: Date, session: SessionLabel) -> bool {
        same_calendar_date(self.date, date) && self.session == session
    }
}

/// Session a reader at `now` (local wall clock) is living through.
pub fn highlight_target(now: PrimitiveDateTime) -> HighlightTarget {
    let today = now.date();
    let hour = now.hour();

    if hour < MORNING_SESSION_HOUR {
        HighlightTarget {
            // Only the first representable day has no predecessor.
            date: previous_trading_day(today).unwrap_or(today),
            session: SessionLabel::Night,
        }
    } else if hour < NIGHT_SESSION_HOUR {
        HighlightTarget {
            date: today,
            session: SessionLabel::Morning,
        }
    } else {
        HighlightTarget {
            date: today,
            session: SessionLabel::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionSummary {
    pub initial_capital: i64,
    pub final_capital: i64,
    pub total_profit: i64,
    pub roi_percent: f64,
}

impl ProjectionSummary {
    pub fn from_sessions(initial_capital: i64, sessions: &[SessionResult]) -> Self {
        let final_capital = sessions
            .last()
            .map_or(initial_capital, |session| session.ending_capital);
        let total_profit = final_capital.saturating_sub(initial_capital);
        let roi_percent = if initial_capital == 0 {
            0.0
        } else {
            total_profit as f64 / initial_capital as f64 * 100.0
        };

        Self {
            initial_capital,
            final_capital,
            total_profit,
            roi_percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Projection {
    pub sessions: Vec<SessionResult>,
    pub summary: ProjectionSummary,
    pub highlight: HighlightTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionError {
    InvalidConfig(ConfigError),
    /// The horizon runs past the last date the calendar can represent.
    DateOutOfRange { start_date: Date },
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "projection refused: {err}"),
            Self::DateOutOfRange { start_date } => write!(
                f,
                "a {HORIZON_DAYS}-trading-day horizon from {start_date} runs past the supported calendar"
            ),
        }
    }
}

impl std::error::Error for ProjectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            Self::DateOutOfRange { .. } => None,
        }
    }
}

impl From<ConfigError> for ProjectionError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

/// Runs the full horizon: morning then night on each trading day, capital carried forward.
pub fn project(
    config: &SimulationConfig,
    now: PrimitiveDateTime,
) -> Result<Projection, ProjectionError> {
    config.validate()?;

    let contracts = config.contracts_in_tie_break_order();
    let highlight = highlight_target(now);
    let mut sessions =
        Vec::with_capacity(HORIZON_DAYS as usize * SessionLabel::IN_DAY_ORDER.len());
    let mut capital = config.initial_capital;
    let out_of_range = ProjectionError::DateOutOfRange {
        start_date: config.start_date,
    };
    let mut date = first_trading_day_on_or_after(config.start_date).ok_or(out_of_range)?;

    for day_index in 1..=HORIZON_DAYS {
        for session in SessionLabel::IN_DAY_ORDER {
            let trade_count = match session {
                SessionLabel::Morning => config.morning_trade_count,
                SessionLabel::Night => config.night_trade_count,
            };
            let result = simulate_session(&SessionRequest {
                date,
                day_index,
                session,
                starting_capital: capital,
                index_level: config.assumed_index_level,
                contracts: &contracts,
                points_per_trade: config.points_per_trade,
                trade_count,
                highlighted: highlight.matches(date, session),
            });
            capital = result.ending_capital;
            sessions.push(result);
        }
        if day_index < HORIZON_DAYS {
            date = next_trading_day(date).ok_or(out_of_range)?;
        }
    }

    let summary = ProjectionSummary::from_sessions(config.initial_capital, &sessions);
    Ok(Projection {
        sessions,
        summary,
        highlight,
    })
}

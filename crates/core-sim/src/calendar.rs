use time::{Date, Weekday};

pub fn is_trading_day(date: Date) -> bool {
    !matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday)
}

/// `None` once the walk would leave the representable date range.
pub fn next_trading_day(date: Date) -> Option<Date> {
    let mut next = date.next_day()?;
    while !is_trading_day(next) {
        next = next.next_day()?;
    }
    Some(next)
}

pub fn previous_trading_day(date: Date) -> Option<Date> {
    let mut previous = date.previous_day()?;
    while !is_trading_day(previous) {
        previous = previous.previous_day()?;
    }
    Some(previous)
}

/// Rolls a weekend date forward; trading days are returned unchanged.
pub fn first_trading_day_on_or_after(date: Date) -> Option<Date> {
    if is_trading_day(date) {
        Some(date)
    } else {
        next_trading_day(date)
    }
}

pub fn same_calendar_date(left: Date, right: Date) -> bool {
    left.year() == right.year() && left.month() == right.month() && left.day() == right.day()
}

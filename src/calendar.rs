//! Calendar arithmetic for the appointment views.
//!
//! Pure date math, Sunday-first. The month view spans the Sunday on or
//! before the 1st through the Saturday on or after the last day of the
//! month; the week view is the Sunday-through-Saturday span containing
//! the reference date; the day view is the single date. Everything else
//! in scheduling (slot computation, conflicts) is the backend's job.

use time::{Date, Duration, Month, OffsetDateTime};

/// The current local date, falling back to UTC when the local offset is
/// unavailable (e.g. some containers).
pub fn today() -> Date {
    OffsetDateTime::now_local()
        .map(|t| t.date())
        .unwrap_or_else(|_| OffsetDateTime::now_utc().date())
}

/// Which calendar layout is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Month,
    Week,
    Day,
}

impl CalendarView {
    pub fn label(&self) -> &'static str {
        match self {
            CalendarView::Month => "Month",
            CalendarView::Week => "Week",
            CalendarView::Day => "Day",
        }
    }
}

fn days_from_sunday(date: Date) -> i64 {
    date.weekday().number_days_from_sunday() as i64
}

/// First day of the month containing `date`.
pub fn first_of_month(date: Date) -> Date {
    date.replace_day(1).expect("day 1 is valid in every month")
}

/// Last day of the month containing `date`.
pub fn last_of_month(date: Date) -> Date {
    let last = date.month().length(date.year());
    date.replace_day(last).expect("last day is valid")
}

/// Sunday-on-or-before through Saturday-on-or-after span of `date`'s
/// month.
pub fn month_range(date: Date) -> (Date, Date) {
    let first = first_of_month(date);
    let last = last_of_month(date);
    let start = first - Duration::days(days_from_sunday(first));
    let end = last + Duration::days(6 - days_from_sunday(last));
    (start, end)
}

/// The Sunday–Saturday week containing `date`.
pub fn week_range(date: Date) -> (Date, Date) {
    let start = date - Duration::days(days_from_sunday(date));
    (start, start + Duration::days(6))
}

/// The fetch range for a view anchored at `date`.
pub fn visible_range(view: CalendarView, date: Date) -> (Date, Date) {
    match view {
        CalendarView::Month => month_range(date),
        CalendarView::Week => week_range(date),
        CalendarView::Day => (date, date),
    }
}

/// Moves the anchor date one step forward or backward for the view.
pub fn step(view: CalendarView, date: Date, forward: bool) -> Date {
    match view {
        CalendarView::Month => {
            let (year, month) = if forward {
                match date.month() {
                    Month::December => (date.year() + 1, Month::January),
                    m => (date.year(), m.next()),
                }
            } else {
                match date.month() {
                    Month::January => (date.year() - 1, Month::December),
                    m => (date.year(), m.previous()),
                }
            };
            let day = date.day().min(month.length(year));
            Date::from_calendar_date(year, month, day).expect("clamped day is valid")
        }
        CalendarView::Week => date + Duration::days(if forward { 7 } else { -7 }),
        CalendarView::Day => date + Duration::days(if forward { 1 } else { -1 }),
    }
}

/// Header text, e.g. "September 2026".
pub fn month_title(date: Date) -> String {
    format!("{} {}", date.month(), date.year())
}

/// All days of the week view, Sunday through Saturday.
pub fn week_days(date: Date) -> [Date; 7] {
    let (start, _) = week_range(date);
    std::array::from_fn(|i| start + Duration::days(i as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::Weekday;

    #[test]
    fn month_range_starts_sunday_ends_saturday() {
        for anchor in [
            date!(2026 - 01 - 15),
            date!(2026 - 02 - 10),
            date!(2026 - 08 - 30),
            date!(2024 - 02 - 29),
            date!(2025 - 12 - 31),
        ] {
            let (start, end) = month_range(anchor);
            assert_eq!(start.weekday(), Weekday::Sunday, "anchor {anchor}");
            assert_eq!(end.weekday(), Weekday::Saturday, "anchor {anchor}");
            assert!(start <= first_of_month(anchor));
            assert!(end >= last_of_month(anchor));
            // Never more than six days of padding on either side.
            assert!(first_of_month(anchor) - start < Duration::days(7));
            assert!(end - last_of_month(anchor) < Duration::days(7));
        }
    }

    #[test]
    fn month_range_is_exact_when_month_aligns() {
        // February 2026 runs Sunday the 1st through Saturday the 28th.
        let (start, end) = month_range(date!(2026 - 02 - 14));
        assert_eq!(start, date!(2026 - 02 - 01));
        assert_eq!(end, date!(2026 - 02 - 28));
    }

    #[test]
    fn month_range_pads_into_neighboring_months() {
        let (start, end) = month_range(date!(2026 - 01 - 15));
        assert_eq!(start, date!(2025 - 12 - 28));
        assert_eq!(end, date!(2026 - 01 - 31));
    }

    #[test]
    fn week_range_contains_date_sunday_to_saturday() {
        for anchor in [
            date!(2026 - 08 - 30), // itself a Sunday
            date!(2026 - 09 - 02),
            date!(2026 - 09 - 05), // a Saturday
            date!(2024 - 01 - 01),
        ] {
            let (start, end) = week_range(anchor);
            assert_eq!(start.weekday(), Weekday::Sunday);
            assert_eq!(end.weekday(), Weekday::Saturday);
            assert!(start <= anchor && anchor <= end);
            assert_eq!(end - start, Duration::days(6));
        }
    }

    #[test]
    fn day_view_is_a_single_date() {
        let d = date!(2026 - 08 - 30);
        assert_eq!(visible_range(CalendarView::Day, d), (d, d));
    }

    #[test]
    fn month_step_clamps_the_day() {
        // Jan 31 forward lands on the last day of February.
        assert_eq!(
            step(CalendarView::Month, date!(2026 - 01 - 31), true),
            date!(2026 - 02 - 28)
        );
        assert_eq!(
            step(CalendarView::Month, date!(2024 - 01 - 31), true),
            date!(2024 - 02 - 29)
        );
        // Year boundaries both directions.
        assert_eq!(
            step(CalendarView::Month, date!(2025 - 12 - 15), true),
            date!(2026 - 01 - 15)
        );
        assert_eq!(
            step(CalendarView::Month, date!(2026 - 01 - 15), false),
            date!(2025 - 12 - 15)
        );
    }

    #[test]
    fn week_and_day_steps() {
        assert_eq!(
            step(CalendarView::Week, date!(2026 - 08 - 30), true),
            date!(2026 - 09 - 06)
        );
        assert_eq!(
            step(CalendarView::Day, date!(2026 - 09 - 01), false),
            date!(2026 - 08 - 31)
        );
    }

    #[test]
    fn week_days_are_consecutive() {
        let days = week_days(date!(2026 - 09 - 02));
        assert_eq!(days[0], date!(2026 - 08 - 30));
        assert_eq!(days[6], date!(2026 - 09 - 05));
    }
}

//! Week and day arithmetic parameterized by a first-day-of-week setting.
//!
//! Everything here is pure. A "day identity" is the calendar date of an
//! instant with the time of day discarded; two instants count as the same
//! day iff their identities are equal.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// Weekday label lengths, from single letter to full name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekdayStyle {
    /// S, M, T, W, T, F, S
    VeryShort,
    /// Sun, Mon, Tue, Wed, Thu, Fri, Sat
    Short,
    /// Sunday through Saturday
    Full,
}

const VERY_SHORT_SYMBOLS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];
const SHORT_SYMBOLS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const FULL_SYMBOLS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Calendar used for all week-boundary math.
///
/// A week is the half-open span `[start, start + 7 days)` where `start` is
/// the most recent occurrence of `first_weekday` on or before the reference
/// date. The span is a function of the week alone, never of which day
/// inside it was asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekCalendar {
    first_weekday: Weekday,
}

impl Default for WeekCalendar {
    fn default() -> Self {
        Self::new(Weekday::Mon)
    }
}

impl WeekCalendar {
    pub fn new(first_weekday: Weekday) -> Self {
        Self { first_weekday }
    }

    pub fn first_weekday(&self) -> Weekday {
        self.first_weekday
    }

    /// The day identity of an instant: its date, time of day discarded.
    pub fn day_identity(&self, instant: NaiveDateTime) -> NaiveDate {
        instant.date()
    }

    /// Offset of `date`'s weekday from the first weekday, in [0, 6].
    pub fn day_index(&self, date: NaiveDate) -> usize {
        let day = date.weekday().num_days_from_monday();
        let first = self.first_weekday.num_days_from_monday();
        ((day + 7 - first) % 7) as usize
    }

    /// Half-open `[start, end)` bounds of the week containing `date`.
    /// `end - start` is always exactly 7 days.
    pub fn week_range(&self, date: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = date - Duration::days(self.day_index(date) as i64);
        (start, start + Duration::days(7))
    }

    /// The 7 days of the week containing `date`, first weekday first.
    pub fn dates_in_week(&self, date: NaiveDate) -> [NaiveDate; 7] {
        let (start, _) = self.week_range(date);
        std::array::from_fn(|offset| start + Duration::days(offset as i64))
    }

    /// Weekday labels rotated so index 0 is the first weekday.
    pub fn ordered_weekday_labels(&self, style: WeekdayStyle) -> [&'static str; 7] {
        let symbols = match style {
            WeekdayStyle::VeryShort => VERY_SHORT_SYMBOLS,
            WeekdayStyle::Short => SHORT_SYMBOLS,
            WeekdayStyle::Full => FULL_SYMBOLS,
        };

        let first = self.first_weekday.num_days_from_sunday() as usize;
        std::array::from_fn(|i| symbols[(first + i) % 7])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_range_monday_start() {
        let calendar = WeekCalendar::new(Weekday::Mon);
        // 2024-01-10 is a Wednesday; its week runs Mon Jan 8 .. Mon Jan 15.
        let wednesday = date(2024, 1, 10);

        let (start, end) = calendar.week_range(wednesday);
        assert_eq!(start, date(2024, 1, 8));
        assert_eq!(end, date(2024, 1, 15));
        assert_eq!(calendar.day_index(wednesday), 2);
    }

    #[test]
    fn test_week_range_sunday_start() {
        let calendar = WeekCalendar::new(Weekday::Sun);
        let wednesday = date(2024, 1, 10);

        let (start, end) = calendar.week_range(wednesday);
        assert_eq!(start, date(2024, 1, 7));
        assert_eq!(end, date(2024, 1, 14));
        assert_eq!(calendar.day_index(wednesday), 3);
    }

    #[test]
    fn test_week_range_stable_across_the_week() {
        let calendar = WeekCalendar::new(Weekday::Mon);
        let reference = date(2024, 1, 10);
        let expected = calendar.week_range(reference);

        for day in calendar.dates_in_week(reference) {
            assert_eq!(calendar.week_range(day), expected);
            assert!(day >= expected.0 && day < expected.1);
        }
    }

    #[test]
    fn test_dates_in_week_are_consecutive() {
        let calendar = WeekCalendar::new(Weekday::Mon);
        let days = calendar.dates_in_week(date(2024, 1, 10));

        assert_eq!(days[0], date(2024, 1, 8));
        assert_eq!(days[6], date(2024, 1, 14));
        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn test_day_index_of_first_weekday_is_zero() {
        for first in [Weekday::Mon, Weekday::Sun, Weekday::Sat] {
            let calendar = WeekCalendar::new(first);
            let (start, _) = calendar.week_range(date(2024, 3, 15));
            assert_eq!(calendar.day_index(start), 0);
            assert_eq!(start.weekday(), first);
        }
    }

    #[test]
    fn test_day_identity_discards_time() {
        let calendar = WeekCalendar::default();
        let day = date(2024, 1, 10);

        let morning = day.and_hms_opt(8, 30, 0).unwrap();
        let night = day.and_hms_opt(23, 59, 59).unwrap();

        assert_eq!(calendar.day_identity(morning), day);
        assert_eq!(calendar.day_identity(night), day);
        // Normalizing twice changes nothing.
        let identity = calendar.day_identity(morning);
        assert_eq!(
            calendar.day_identity(identity.and_hms_opt(0, 0, 0).unwrap()),
            identity
        );
    }

    #[test]
    fn test_ordered_weekday_labels_rotation() {
        let monday_first = WeekCalendar::new(Weekday::Mon);
        assert_eq!(
            monday_first.ordered_weekday_labels(WeekdayStyle::Short),
            ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        );

        let sunday_first = WeekCalendar::new(Weekday::Sun);
        assert_eq!(
            sunday_first.ordered_weekday_labels(WeekdayStyle::Short),
            ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
        );
        assert_eq!(
            sunday_first.ordered_weekday_labels(WeekdayStyle::VeryShort),
            ["S", "M", "T", "W", "T", "F", "S"]
        );

        let saturday_first = WeekCalendar::new(Weekday::Sat);
        assert_eq!(
            saturday_first.ordered_weekday_labels(WeekdayStyle::Full)[0],
            "Saturday"
        );
        assert_eq!(
            saturday_first.ordered_weekday_labels(WeekdayStyle::Full)[6],
            "Friday"
        );
    }
}

//! The calendar navigation cursor.
//!
//! Tracks which month is displayed and which day (if any) is selected.
//! Stepping to another month always clears the selection so the detail
//! panel can never show a day that belongs to a month no longer on screen,
//! and days in the future can never be selected.

use time::{Date, Month, util::days_in_year_month};

use crate::Error;

/// The displayed month and the selected day within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarCursor {
    /// The displayed calendar year.
    pub year: i32,
    /// The displayed calendar month.
    pub month: Month,
    /// The selected day of the month, if any.
    pub selected_day: Option<u8>,
}

impl CalendarCursor {
    /// Create a cursor from a 1-12 month number with nothing selected.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] for month numbers outside 1-12.
    pub fn new(year: i32, month: u8) -> Result<Self, Error> {
        let month = Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?;

        Ok(Self {
            year,
            month,
            selected_day: None,
        })
    }

    /// Create a cursor showing the month a date falls in.
    pub fn for_date(date: Date) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            selected_day: None,
        }
    }

    /// The number of days in the displayed month.
    pub fn days_in_month(&self) -> u8 {
        days_in_year_month(self.year, self.month)
    }

    /// Step to the previous month, clearing the selection.
    pub fn step_back(&mut self) {
        if self.month == Month::January {
            self.year -= 1;
        }
        self.month = self.month.previous();
        self.selected_day = None;
    }

    /// Step to the next month, clearing the selection.
    pub fn step_forward(&mut self) {
        if self.month == Month::December {
            self.year += 1;
        }
        self.month = self.month.next();
        self.selected_day = None;
    }

    /// Whether a day of the displayed month is after `today`.
    pub fn is_future_day(&self, day: u8, today: Date) -> bool {
        if self.year != today.year() {
            return self.year > today.year();
        }
        if self.month != today.month() {
            return u8::from(self.month) > u8::from(today.month());
        }

        day > today.day()
    }

    /// Select a day of the displayed month.
    ///
    /// # Errors
    /// Returns [Error::DayOutOfRange] when the day does not exist in the
    /// displayed month, or [Error::FutureDaySelection] when the day is
    /// after `today`.
    pub fn select_day(&mut self, day: u8, today: Date) -> Result<(), Error> {
        if day == 0 || day > self.days_in_month() {
            return Err(Error::DayOutOfRange(day));
        }
        if self.is_future_day(day, today) {
            return Err(Error::FutureDaySelection(day));
        }

        self.selected_day = Some(day);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::Error;

    #[test]
    fn new_rejects_invalid_month_numbers() {
        assert_eq!(
            CalendarCursor::new(2025, 0).unwrap_err(),
            Error::InvalidMonth(0)
        );
        assert_eq!(
            CalendarCursor::new(2025, 13).unwrap_err(),
            Error::InvalidMonth(13)
        );
    }

    #[test]
    fn stepping_rolls_over_year_boundaries() {
        let mut cursor = CalendarCursor::new(2025, 1).unwrap();
        cursor.step_back();
        assert_eq!((cursor.year, cursor.month), (2024, Month::December));

        let mut cursor = CalendarCursor::new(2025, 12).unwrap();
        cursor.step_forward();
        assert_eq!((cursor.year, cursor.month), (2026, Month::January));
    }

    #[test]
    fn stepping_clears_the_selection() {
        let mut cursor = CalendarCursor::new(2025, 6).unwrap();
        cursor.select_day(13, date!(2025 - 06 - 20)).unwrap();
        assert_eq!(cursor.selected_day, Some(13));

        cursor.step_forward();

        assert_eq!(cursor.selected_day, None);
    }

    #[test]
    fn selecting_a_future_day_is_rejected() {
        let mut cursor = CalendarCursor::new(2025, 6).unwrap();
        let today = date!(2025 - 06 - 20);

        assert_eq!(
            cursor.select_day(21, today).unwrap_err(),
            Error::FutureDaySelection(21)
        );
        // Today itself is selectable.
        assert!(cursor.select_day(20, today).is_ok());
    }

    #[test]
    fn every_day_of_a_future_month_is_future() {
        let cursor = CalendarCursor::new(2025, 7).unwrap();
        let today = date!(2025 - 06 - 20);

        assert!(cursor.is_future_day(1, today));
    }

    #[test]
    fn no_day_of_a_past_month_is_future() {
        let cursor = CalendarCursor::new(2025, 5).unwrap();
        let today = date!(2025 - 06 - 20);

        assert!(!cursor.is_future_day(31, today));
    }

    #[test]
    fn selecting_a_nonexistent_day_is_rejected() {
        let mut cursor = CalendarCursor::new(2025, 6).unwrap();
        let today = date!(2025 - 07 - 01);

        assert_eq!(
            cursor.select_day(31, today).unwrap_err(),
            Error::DayOutOfRange(31)
        );
        assert_eq!(
            cursor.select_day(0, today).unwrap_err(),
            Error::DayOutOfRange(0)
        );
    }
}

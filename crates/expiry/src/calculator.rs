use serde::{Deserialize, Serialize};

use shelfwatch_core::CalendarDate;

use crate::status::{ExpiryStatus, classify};

/// Last day the batch is in date is the day before this; on this day it is
/// expired.
pub fn expiry_date(production_date: CalendarDate, shelf_life_days: u32) -> CalendarDate {
    production_date.add_days(i64::from(shelf_life_days))
}

/// First day on which the batch enters the warning window.
pub fn reminder_date(expiry_date: CalendarDate, reminder_days: u32) -> CalendarDate {
    expiry_date.add_days(-i64::from(reminder_days))
}

/// Whole calendar days from `today` to `expiry_date`.
///
/// Zero on the expiry day itself, negative afterwards.
pub fn remaining_days(expiry_date: CalendarDate, today: CalendarDate) -> i64 {
    today.days_until(expiry_date)
}

/// All date-derived facts about one batch for one "today".
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryWindow {
    pub expiry_date: CalendarDate,
    pub reminder_date: CalendarDate,
    pub remaining_days: i64,
    pub status: ExpiryStatus,
}

impl ExpiryWindow {
    pub fn evaluate(
        production_date: CalendarDate,
        shelf_life_days: u32,
        reminder_days: u32,
        today: CalendarDate,
    ) -> Self {
        let expiry = expiry_date(production_date, shelf_life_days);
        let remaining = remaining_days(expiry, today);
        Self {
            expiry_date: expiry,
            reminder_date: reminder_date(expiry, reminder_days),
            remaining_days: remaining,
            status: classify(remaining, reminder_days),
        }
    }
}

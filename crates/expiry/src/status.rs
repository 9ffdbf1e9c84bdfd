use serde::{Deserialize, Serialize};

/// Three-state expiry status of a batch.
///
/// Declaration order is the listing order: expired batches first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryStatus {
    Expired,
    Warning,
    Normal,
}

impl ExpiryStatus {
    /// Rank used by listings (lower sorts first).
    pub fn ordinal(self) -> u8 {
        match self {
            ExpiryStatus::Expired => 0,
            ExpiryStatus::Warning => 1,
            ExpiryStatus::Normal => 2,
        }
    }

    /// Expired or warning.
    pub fn needs_attention(self) -> bool {
        !matches!(self, ExpiryStatus::Normal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExpiryStatus::Expired => "expired",
            ExpiryStatus::Warning => "warning",
            ExpiryStatus::Normal => "normal",
        }
    }
}

impl core::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a batch from its remaining days and its reminder threshold.
///
/// - `remaining_days <= 0` is expired
/// - `0 < remaining_days <= reminder_days` is a warning
/// - anything else is normal
pub fn classify(remaining_days: i64, reminder_days: u32) -> ExpiryStatus {
    if remaining_days <= 0 {
        ExpiryStatus::Expired
    } else if remaining_days <= i64::from(reminder_days) {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Normal
    }
}

/// Primary listing key: status rank, then soonest-to-expire first.
///
/// Callers append their own deterministic tie-break (see the inventory crate).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub status_rank: u8,
    pub remaining_days: i64,
}

impl SortKey {
    pub fn new(status: ExpiryStatus, remaining_days: i64) -> Self {
        Self {
            status_rank: status.ordinal(),
            remaining_days,
        }
    }
}

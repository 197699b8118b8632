//! Month-granularity billing over a query window.
//!
//! A subscription is billed for every calendar month in which it is active,
//! counting both boundary months. Days and times are ignored: all bounds are
//! truncated to the first instant of their month before comparison.

use chrono::{DateTime, Utc};
use std::cmp::{max, min};
use subtrack_models::{months_inclusive, truncate_to_month, Subscription};

/// Intersection of a query range and a subscription's active range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl OverlapWindow {
    pub fn months(&self) -> i64 {
        months_inclusive(&self.start, &self.end)
    }

    /// `price` charged for every month of the window.
    pub fn cost(&self, price: i32) -> i64 {
        self.months() * i64::from(price)
    }
}

/// Months of `sub` that fall inside `[range_start, range_end]`, or `None`
/// when the two ranges do not meet.
pub fn overlap_window(
    sub: &Subscription,
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
) -> Option<OverlapWindow> {
    let start = max(truncate_to_month(range_start), truncate_to_month(sub.start_date));
    let end = match sub.end_date {
        Some(sub_end) => min(truncate_to_month(range_end), truncate_to_month(sub_end)),
        None => truncate_to_month(range_end),
    };

    if start > end {
        return None;
    }
    Some(OverlapWindow { start, end })
}

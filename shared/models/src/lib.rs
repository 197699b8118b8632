//! Shared domain types for the subscription tracking service.
//!
//! - [`subscription`]: the `Subscription` entity, its field validation and the
//!   JSON shapes exchanged over HTTP
//! - [`month`]: `MM-YYYY` parsing and month-granularity arithmetic

pub mod month;
pub mod subscription;

pub use month::{
    format_month_year, months_inclusive, parse_month_year, truncate_to_month, zero_month,
    MonthParseError,
};
pub use subscription::*;

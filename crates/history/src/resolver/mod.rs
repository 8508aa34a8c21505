//! Symbol metadata and trading-hours resolution.
//!
//! The planner never interprets a [`Symbol`](crate::models::Symbol) itself.
//! It asks two injected collaborators:
//!
//! ```text
//! ┌──────────────────────┐      security type, time zones, listing date
//! │   SecurityLookup     │ ───────────────────────────────────────────▶
//! └──────────────────────┘
//! ┌──────────────────────┐      is_open / is_open_during / previous_close
//! │ MarketHoursCalendar  │ ───────────────────────────────────────────▶
//! └──────────────────────┘
//! ```
//!
//! [`SecurityDatabase`] implements both from in-memory tables.

mod database;
mod traits;

pub use database::SecurityDatabase;
pub use traits::{MarketHoursCalendar, SecurityLookup};

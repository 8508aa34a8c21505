//! History provider abstractions.
//!
//! This module contains:
//! - The `HistoryProvider` trait, the fetch port every data source implements
//! - `InMemoryProvider`, which serves observations held in memory
//!
//! Providers receive fully planned [`ConcreteRequest`](crate::models::ConcreteRequest)s.
//! Validation, tick-type expansion and defaulting happen in the planner,
//! never in the providers themselves.

mod memory;
mod traits;

pub use memory::InMemoryProvider;
pub use traits::HistoryProvider;

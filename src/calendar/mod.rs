//! Calendar event extraction.
//!
//! Calendar exports are read line by line into raw events, then normalized
//! into [`CalendarRecord`]s: parsed start/end, duration, the responsible
//! person, the counterpart and free-text notes.

mod assembler;
mod builder;
mod resolver;
pub mod temporal;
mod unfold;

pub use assembler::{assemble_events, RawEvent};
pub use builder::*;
pub use resolver::*;
pub use temporal::{DurationUnit, TemporalInstant};
pub use unfold::{common_name, parse_property, unfold, Property, Unfold};

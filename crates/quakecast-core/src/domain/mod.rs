//! # Domain Models
//!
//! Record types for the two quakecast domains.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SeismicEvent`] | Seismic event with magnitude, depth, location, date |
//! | [`WeatherObservation`] | Weather observation for a city |
//! | [`Condition`] | Weather condition from a fixed set |
//! | [`RecordId`] | Identifier validated against its domain prefix |
//! | [`RecordDate`] | Calendar date formatted `YYYY-MM-DD` |
//! | [`Stored`] | A record plus its store-generated `_id` |
//!
//! Records validate every invariant on construction, so a deserialized
//! record is always a valid one.

mod date;
mod kind;
mod record_id;
mod records;

pub use date::RecordDate;
pub use kind::RecordKind;
pub use record_id::{validate, RecordId};
pub use records::{Condition, Record, SeismicEvent, Stored, WeatherObservation};

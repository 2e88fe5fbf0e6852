//! Domain types for the station registry.
//!
//! All types enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod station;

pub use station::{InvalidStationName, Station, StationId, StationName};

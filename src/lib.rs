//! halte: a local-first engine for live public-transport departures.
//!
//! The crate resolves free-text stop queries against a bundled GTFS stop
//! list (with a manual override layer and a versioned on-disk cache) and
//! flattens the operator's nested real-time payloads into one sorted list
//! of upcoming passes with derived delay and countdown values.

pub mod directory;
pub mod gtfs;
pub mod realtime;
pub mod shared;

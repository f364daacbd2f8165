mod board;
mod departures;
mod search;

pub use board::*;
pub use departures::*;
pub use search::*;

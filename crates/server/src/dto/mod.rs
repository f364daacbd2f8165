mod pass;
mod stop;

pub use pass::*;
pub use stop::*;

//! Domain models for the Agri Advisor platform

mod crop;
mod location;
mod solution;

pub use crop::*;
pub use location::*;
pub use solution::*;

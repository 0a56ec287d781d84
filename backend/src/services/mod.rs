//! Business logic services for the Agri Advisor platform

pub mod crop;
pub mod location;
pub mod solution;

pub use crop::CropRecommender;
pub use location::LocationStore;
pub use solution::{SolutionService, TextGenerator};

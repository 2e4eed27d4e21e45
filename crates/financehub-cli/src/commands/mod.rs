pub mod investing;
pub mod lending;
pub mod portfolio;

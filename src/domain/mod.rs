pub mod artifact;
pub mod fetch_outcome;
pub mod target;

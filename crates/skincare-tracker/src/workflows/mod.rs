pub mod analysis;
pub mod concerns;
pub mod routine;
pub mod tracking;

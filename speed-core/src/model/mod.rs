// Core data models for raw location fixes and normalized speed samples.

mod sample;
mod update;

pub use sample::{normalize_speed, Sample};
pub use update::LocationUpdate;

// Shared speed tracking, unit conversion, and settings logic.

pub mod buffers;
pub mod cycle;
pub mod display;
pub mod error;
pub mod model;
pub mod settings;
pub mod stats;
pub mod theme;
pub mod tracker;
pub mod units;


pub use cycle::Cyclic;
pub use display::DisplayMode;
pub use error::LocationError;
pub use model::{LocationUpdate, Sample};
pub use settings::Settings;
pub use theme::Theme;
pub use tracker::{ObserveEvents, SpeedTracker};
pub use units::SpeedUnit;

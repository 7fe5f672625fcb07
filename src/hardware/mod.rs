pub mod clock;
pub mod indicator;
pub mod sensor;

pub use clock::{Clock, MonotonicClock};
pub use indicator::{FileIndicator, Indicator, LogIndicator};
pub use sensor::{AdcFileSensor, Sensor};

pub mod averager;
pub mod blink;
pub mod drowsiness;
pub mod ring_buffer;
pub mod stats;
pub mod threshold;

pub use averager::PeriodAverager;
pub use blink::{BlinkDetector, Calibration, CalibrationStep};
pub use drowsiness::{AlertState, DrowsinessEvaluator, RECENT_BLINKS};
pub use ring_buffer::RingBuffer;
pub use threshold::AdaptiveThreshold;

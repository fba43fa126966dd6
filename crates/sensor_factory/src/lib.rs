//! # Sensor Factory
//!
//! `RgbdSensor` implementations that stand in for hardware, plus the
//! registry that constructs a source from a subdevice specification.
//!
//! Two sources are provided:
//! - [`MockRgbdSensor`]: fully scripted (statuses, frames, parameter bags),
//!   used by tests and scenario harnesses.
//! - [`SyntheticRgbdSensor`]: free-running test-pattern generator, used as
//!   the self-owned subdevice and for development without hardware.

mod error;
mod factory;
mod mock_sensor;
mod synthetic;

pub use error::FactoryError;
pub use factory::create_source;
pub use mock_sensor::{plumb_bob_params, MockRgbdSensor};
pub use synthetic::{SyntheticConfig, SyntheticRgbdSensor};

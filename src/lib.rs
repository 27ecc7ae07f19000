//! Typed, invariant-checked GPIO and PWM pin abstraction for the NVIDIA
//! Orin Nano 40-pin header.
//!
//! The crate wraps an external native GPIO driver (sysfs, libgpiod, vendor
//! library) behind the [`HalDriver`] trait and layers ownership and state
//! checking on top of it:
//!
//! * one process-wide numbering mode, physical BOARD positions, set once;
//! * at most one active claim per pin, enforced by the [`PinModeRegistry`];
//! * [`DigitalPin`] handles with direction-checked read/write/toggle and a
//!   cached last-known level;
//! * [`PwmPin`] handles with bounded duty cycle, mutable frequency and an
//!   explicit running/stopped state machine;
//! * a static per-board capability table with a conservative fallback for
//!   unknown models.
//!
//! Handles release their claim on drop, so cleanup happens on every exit
//! path; explicit `release` is available where the caller wants to observe
//! teardown failures. Edge detection, pinmux configuration and the driver
//! itself are out of scope.
//!
//! # Example
//!
//! ```rust
//! use orin_gpio::{Gpio, Level, MockDriver};
//!
//! let gpio = Gpio::open(MockDriver::default()).unwrap();
//!
//! let mut led = gpio.digital_output(18, Some(Level::Low)).unwrap();
//! led.write(Level::High).unwrap();
//!
//! let mut servo = gpio.pwm(33, 1000.0).unwrap();
//! servo.start(50.0).unwrap();
//! servo.stop().unwrap();
//!
//! gpio.release_all().unwrap();
//! ```

pub mod board;
pub mod digital;
pub mod driver;
pub mod error;
pub mod gpio;
pub mod mock;
pub mod pwm;
pub mod registry;

pub use board::{capabilities_for, BoardCapabilities, BoardModel};
pub use digital::DigitalPin;
pub use driver::{HalDriver, Level};
pub use error::{GpioError, Result};
pub use gpio::Gpio;
pub use mock::MockDriver;
pub use pwm::PwmPin;
pub use registry::{PinClaim, PinDirection, PinModeRegistry, PinNumberingMode};

//! Contract expected of the underlying native GPIO/PWM driver.
//!
//! The driver is an external collaborator: the actual register or
//! file-descriptor access (sysfs, libgpiod, vendor library) lives behind the
//! [`HalDriver`] trait and is not reimplemented here. Any method may fail;
//! failures surface to callers as [`GpioError::Hardware`](crate::GpioError)
//! with the driver's error attached as the cause.

use anyhow::Result;

use crate::registry::PinNumberingMode;

/// Digital level of a GPIO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// The opposite level.
    pub fn invert(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Low-level driver the HAL forwards to.
///
/// Methods take `&self`: handles for two different claimed pins own disjoint
/// hardware resources and may operate concurrently, so drivers must either be
/// stateless per call or synchronize internally. Pin numbers are physical
/// (BOARD) positions, 1..=40.
pub trait HalDriver: Send + Sync {
    /// Board model string as reported by the hardware, e.g.
    /// `"JETSON_ORIN_NANO"`. Queried once when the HAL entry point opens.
    fn model(&self) -> Result<String>;

    /// Announces the numbering mode every subsequent pin number is expressed
    /// in. Called once, before the first pin is configured.
    fn set_numbering_mode(&self, mode: PinNumberingMode) -> Result<()>;

    /// Configures a pin as a digital input.
    fn setup_input(&self, pin: u8) -> Result<()>;

    /// Configures a pin as a digital output and drives it to `initial`
    /// immediately, so the line is never left floating.
    fn setup_output(&self, pin: u8, initial: Level) -> Result<()>;

    /// Drives an output pin.
    fn write_level(&self, pin: u8, level: Level) -> Result<()>;

    /// Samples the current level of a pin.
    fn read_level(&self, pin: u8) -> Result<Level>;

    /// Configures a hardware PWM channel on `pin`. The channel starts idle.
    fn pwm_setup(&self, pin: u8, frequency_hz: f64) -> Result<()>;

    /// Starts signal generation at the configured frequency and the given
    /// duty cycle (percent, already validated by the caller).
    fn pwm_start(&self, pin: u8, duty_cycle_percent: f64) -> Result<()>;

    /// Adjusts the duty cycle of a running channel without interrupting it.
    fn pwm_set_duty_cycle(&self, pin: u8, duty_cycle_percent: f64) -> Result<()>;

    /// Retargets a running channel to a new frequency without a stop/start
    /// cycle.
    fn pwm_set_frequency(&self, pin: u8, frequency_hz: f64) -> Result<()>;

    /// Stops signal generation on a channel.
    fn pwm_stop(&self, pin: u8) -> Result<()>;

    /// Releases whatever driver-side state `pin` holds (unexport, close).
    fn release_pin(&self, pin: u8) -> Result<()>;
}

use std::fmt;
use std::sync::Arc;

use crate::board::BoardCapabilities;
use crate::driver::{HalDriver, Level};
use crate::error::{GpioError, Result};
use crate::registry::{PinClaim, PinDirection, PinModeRegistry};

/// Typed handle over a hardware PWM channel.
///
/// Acquired through [`Gpio::pwm`](crate::Gpio::pwm), which claims the pin as
/// an output, drives it low and configures the channel. The handle starts
/// stopped with a duty cycle of 0%.
///
/// The duty cycle is bounded to `[0, 100]` percent and the frequency must be
/// positive; a mutation outside those bounds fails with
/// [`GpioError::OutOfRange`] and leaves both the handle and the hardware
/// unchanged. Parameter changes while stopped are stored and take effect on
/// the next [`start`](PwmPin::start); while running they are pushed to the
/// hardware immediately without interrupting the signal.
///
/// Dropping the handle stops the channel and releases the claim.
///
/// # Example
///
/// ```rust
/// use orin_gpio::{Gpio, MockDriver};
///
/// let gpio = Gpio::open(MockDriver::default()).unwrap();
/// let mut pwm = gpio.pwm(33, 1000.0).unwrap();
/// pwm.start(50.0).unwrap();
/// pwm.change_duty_cycle(75.0).unwrap();
/// pwm.stop().unwrap();
/// ```
pub struct PwmPin<D: HalDriver> {
    driver: Arc<D>,
    registry: Arc<PinModeRegistry>,
    claim: PinClaim,
    frequency_hz: f64,
    duty_cycle_percent: f64,
    running: bool,
    released: bool,
}

fn check_duty_cycle(duty_cycle_percent: f64) -> Result<()> {
    if !(0.0..=100.0).contains(&duty_cycle_percent) {
        return Err(GpioError::OutOfRange {
            what: "duty cycle (percent)",
            value: duty_cycle_percent,
        });
    }
    Ok(())
}

fn check_frequency(frequency_hz: f64) -> Result<()> {
    if !(frequency_hz > 0.0) {
        return Err(GpioError::OutOfRange {
            what: "frequency (Hz)",
            value: frequency_hz,
        });
    }
    Ok(())
}

impl<D: HalDriver> PwmPin<D> {
    pub(crate) fn acquire(
        driver: Arc<D>,
        registry: Arc<PinModeRegistry>,
        capabilities: &BoardCapabilities,
        pin: u8,
        frequency_hz: f64,
    ) -> Result<Self> {
        check_frequency(frequency_hz)?;

        // Advisory only: the table cannot see the pinmux, so the driver may
        // still refuse a pin that passes this check.
        if !capabilities.supports_pwm(pin) {
            return Err(GpioError::UnsupportedCapability {
                pin,
                model: capabilities.model,
            });
        }

        let claim = registry.claim(pin, PinDirection::Output)?;

        let configured = driver
            .setup_output(pin, Level::Low)
            .and_then(|_| driver.pwm_setup(pin, frequency_hz));
        if let Err(e) = configured {
            registry.release(&claim);
            return Err(GpioError::Hardware(e));
        }

        Ok(PwmPin {
            driver,
            registry,
            claim,
            frequency_hz,
            duty_cycle_percent: 0.0,
            running: false,
            released: false,
        })
    }

    /// Physical pin number on the header.
    pub fn pin(&self) -> u8 {
        self.claim.pin()
    }

    pub fn frequency(&self) -> f64 {
        self.frequency_hz
    }

    pub fn duty_cycle(&self) -> f64 {
        self.duty_cycle_percent
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn check_usable(&self) -> Result<()> {
        if self.released {
            return Err(GpioError::HandleReleased(self.claim.pin()));
        }
        Ok(())
    }

    /// Begins signal generation at the configured frequency and the given
    /// duty cycle.
    pub fn start(&mut self, duty_cycle_percent: f64) -> Result<()> {
        self.check_usable()?;
        check_duty_cycle(duty_cycle_percent)?;
        self.driver.pwm_start(self.claim.pin(), duty_cycle_percent)?;
        self.duty_cycle_percent = duty_cycle_percent;
        self.running = true;
        Ok(())
    }

    /// Updates the duty cycle. While running the change takes effect
    /// immediately without interrupting the signal; while stopped it is
    /// stored for the next [`start`](PwmPin::start).
    pub fn change_duty_cycle(&mut self, duty_cycle_percent: f64) -> Result<()> {
        self.check_usable()?;
        check_duty_cycle(duty_cycle_percent)?;
        if self.running {
            self.driver
                .pwm_set_duty_cycle(self.claim.pin(), duty_cycle_percent)?;
        }
        self.duty_cycle_percent = duty_cycle_percent;
        Ok(())
    }

    /// Updates the frequency. The hardware is only touched while running;
    /// a running channel is retargeted without a stop/start cycle.
    pub fn change_frequency(&mut self, frequency_hz: f64) -> Result<()> {
        self.check_usable()?;
        check_frequency(frequency_hz)?;
        if self.running {
            self.driver
                .pwm_set_frequency(self.claim.pin(), frequency_hz)?;
        }
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    /// Stops signal generation. Calling on an already-stopped channel is a
    /// no-op.
    pub fn stop(&mut self) -> Result<()> {
        self.check_usable()?;
        if !self.running {
            return Ok(());
        }
        self.driver.pwm_stop(self.claim.pin())?;
        self.running = false;
        Ok(())
    }

    /// Releases the channel: forces a stop, tears down driver-side state and
    /// relinquishes the claim.
    ///
    /// Idempotent. The claim is freed even when the hardware teardown fails;
    /// the first failure encountered is reported.
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let mut first_err: Option<anyhow::Error> = None;
        if self.running {
            self.running = false;
            if let Err(e) = self.driver.pwm_stop(self.claim.pin()) {
                first_err = Some(e);
            }
        }
        if let Err(e) = self.driver.release_pin(self.claim.pin()) {
            first_err.get_or_insert(e);
        }
        self.registry.release(&self.claim);

        match first_err {
            None => Ok(()),
            Some(e) => Err(GpioError::Hardware(e)),
        }
    }
}

// Manual impl: the driver itself has no useful rendering, the handle state
// does.
impl<D: HalDriver> fmt::Debug for PwmPin<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PwmPin")
            .field("pin", &self.claim.pin())
            .field("frequency_hz", &self.frequency_hz)
            .field("duty_cycle_percent", &self.duty_cycle_percent)
            .field("running", &self.running)
            .field("released", &self.released)
            .finish()
    }
}

impl<D: HalDriver> Drop for PwmPin<D> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!(
                "failed to release PWM pin {} on drop: {}",
                self.claim.pin(),
                e
            );
        }
    }
}

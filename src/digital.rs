use std::fmt;
use std::sync::Arc;

use crate::driver::{HalDriver, Level};
use crate::error::{GpioError, Result};
use crate::registry::{PinClaim, PinDirection, PinModeRegistry};

/// Typed handle over a claimed digital GPIO line.
///
/// Acquired through [`Gpio::digital_output`](crate::Gpio::digital_output) or
/// [`Gpio::digital_input`](crate::Gpio::digital_input); the handle owns the
/// pin's claim for its whole life. Write operations are refused on input
/// handles (and vice versa for direction-specific calls) with
/// [`GpioError::Direction`].
///
/// The handle caches the last known level: every write updates it, and every
/// successful read on an input handle updates it. The cache is advisory:
/// reads always query the hardware, and writes always reach the hardware even
/// when the new value equals the cached one.
///
/// Dropping the handle releases the claim on every exit path; call
/// [`release`](DigitalPin::release) to observe cleanup errors explicitly.
///
/// # Example
///
/// ```rust
/// use orin_gpio::{Gpio, Level, MockDriver};
///
/// let gpio = Gpio::open(MockDriver::default()).unwrap();
/// let mut led = gpio.digital_output(18, Some(Level::Low)).unwrap();
/// led.write(Level::High).unwrap();
/// led.toggle().unwrap();
/// assert_eq!(led.last_value(), Some(Level::Low));
/// ```
pub struct DigitalPin<D: HalDriver> {
    driver: Arc<D>,
    registry: Arc<PinModeRegistry>,
    claim: PinClaim,
    last_known: Option<Level>,
    released: bool,
}

impl<D: HalDriver> DigitalPin<D> {
    pub(crate) fn acquire(
        driver: Arc<D>,
        registry: Arc<PinModeRegistry>,
        pin: u8,
        direction: PinDirection,
        initial: Option<Level>,
    ) -> Result<Self> {
        let claim = registry.claim(pin, direction)?;

        // Configure the line; a driver failure rolls the claim back so the
        // pin stays acquirable.
        let last_known = match direction {
            PinDirection::Output => {
                // Outputs are driven immediately, never left floating.
                let initial = initial.unwrap_or(Level::Low);
                if let Err(e) = driver.setup_output(pin, initial) {
                    registry.release(&claim);
                    return Err(GpioError::Hardware(e));
                }
                Some(initial)
            }
            PinDirection::Input => {
                if let Err(e) = driver.setup_input(pin) {
                    registry.release(&claim);
                    return Err(GpioError::Hardware(e));
                }
                None
            }
        };

        Ok(DigitalPin {
            driver,
            registry,
            claim,
            last_known,
            released: false,
        })
    }

    /// Physical pin number on the header.
    pub fn pin(&self) -> u8 {
        self.claim.pin()
    }

    /// Direction the pin was claimed for.
    pub fn direction(&self) -> PinDirection {
        self.claim.direction()
    }

    fn check_usable(&self) -> Result<()> {
        if self.released {
            return Err(GpioError::HandleReleased(self.claim.pin()));
        }
        Ok(())
    }

    fn check_output(&self) -> Result<()> {
        if self.claim.direction() != PinDirection::Output {
            return Err(GpioError::Direction {
                pin: self.claim.pin(),
                required: PinDirection::Output,
                actual: self.claim.direction(),
            });
        }
        Ok(())
    }

    /// Drives the line to `level` and updates the cached value.
    ///
    /// The physical write always happens, even if `level` equals the cached
    /// value. Fails with [`GpioError::Direction`] on input handles.
    pub fn write(&mut self, level: Level) -> Result<()> {
        self.check_usable()?;
        self.check_output()?;
        self.driver.write_level(self.claim.pin(), level)?;
        self.last_known = Some(level);
        Ok(())
    }

    /// Drives the line to the inverse of the cached value.
    ///
    /// An unset cache (which cannot occur for a properly acquired output) is
    /// treated as `Low`, so the first toggle drives `High`.
    pub fn toggle(&mut self) -> Result<()> {
        self.check_usable()?;
        self.check_output()?;
        let next = self.last_known.unwrap_or(Level::Low).invert();
        self.write(next)
    }

    /// Samples the current level from the hardware.
    ///
    /// Input handles update their cached value from the sample. Output
    /// handles may read too, since reading back a self-driven line is a
    /// legitimate hardware pattern, but there the read is a passthrough that
    /// leaves the cache untouched.
    pub fn read(&mut self) -> Result<Level> {
        self.check_usable()?;
        let level = self.driver.read_level(self.claim.pin())?;
        if self.claim.direction() == PinDirection::Input {
            self.last_known = Some(level);
        }
        Ok(level)
    }

    /// Last known level without touching the hardware.
    ///
    /// `None` for an input handle that has not been read yet.
    pub fn last_value(&self) -> Option<Level> {
        self.last_known
    }

    /// Releases the pin: driver-side state is torn down and the claim is
    /// relinquished so the pin can be re-acquired.
    ///
    /// Idempotent. The claim is freed even when the driver-side teardown
    /// fails; the failure is still reported. After release every other
    /// operation fails with [`GpioError::HandleReleased`].
    pub fn release(&mut self) -> Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        let result = self.driver.release_pin(self.claim.pin());
        self.registry.release(&self.claim);
        result.map_err(GpioError::Hardware)
    }
}

// Manual impl: the driver itself has no useful rendering, the handle state
// does.
impl<D: HalDriver> fmt::Debug for DigitalPin<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigitalPin")
            .field("pin", &self.claim.pin())
            .field("direction", &self.claim.direction())
            .field("last_known", &self.last_known)
            .field("released", &self.released)
            .finish()
    }
}

impl<D: HalDriver> Drop for DigitalPin<D> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            log::warn!("failed to release pin {} on drop: {}", self.claim.pin(), e);
        }
    }
}

use std::sync::Arc;

use crate::board::{capabilities_for, BoardCapabilities, BoardModel};
use crate::digital::DigitalPin;
use crate::driver::{HalDriver, Level};
use crate::error::{GpioError, Result};
use crate::pwm::PwmPin;
use crate::registry::{PinDirection, PinModeRegistry, PinNumberingMode};

/// Entry point of the GPIO abstraction layer.
///
/// Opening detects the board model through the driver and resolves its
/// capability table. The `Gpio` owns the [`PinModeRegistry`] (the single
/// claim table every handle goes through) and shares it with the handles it
/// hands out, so there is no implicit process global.
///
/// All pin numbers are physical (BOARD) positions on the 40-pin header; the
/// numbering mode is fixed on the first acquisition and cannot change for
/// the rest of the process (until [`release_all`](Gpio::release_all)).
///
/// # Example
///
/// ```rust
/// use orin_gpio::{BoardModel, Gpio, Level, MockDriver};
///
/// let gpio = Gpio::open(MockDriver::default()).unwrap();
/// assert_eq!(gpio.model(), BoardModel::OrinNano);
///
/// let mut led = gpio.digital_output(18, None).unwrap();
/// led.write(Level::High).unwrap();
/// led.release().unwrap();
/// ```
pub struct Gpio<D: HalDriver> {
    driver: Arc<D>,
    registry: Arc<PinModeRegistry>,
    model: BoardModel,
    capabilities: &'static BoardCapabilities,
}

impl<D: HalDriver> Gpio<D> {
    /// Opens the HAL on top of a driver: detects the board model and looks
    /// up its capabilities. Unrecognized models are usable for digital I/O
    /// with a conservative capability set.
    pub fn open(driver: D) -> Result<Self> {
        let name = driver.model()?;
        let model = BoardModel::from_name(&name);
        if model == BoardModel::Unknown {
            log::warn!("unrecognized board model {:?}, using fallback capabilities", name);
        } else {
            log::debug!("GPIO initialized for {}", model);
        }

        Ok(Gpio {
            driver: Arc::new(driver),
            registry: Arc::new(PinModeRegistry::new()),
            model,
            capabilities: capabilities_for(model),
        })
    }

    /// Board model detected at open.
    pub fn model(&self) -> BoardModel {
        self.model
    }

    /// Capability table for the detected board.
    pub fn capabilities(&self) -> &'static BoardCapabilities {
        self.capabilities
    }

    /// The claim table shared with every handle.
    pub fn registry(&self) -> &PinModeRegistry {
        &self.registry
    }

    /// The underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Fixes the numbering mode on the first acquisition and announces it to
    /// the driver. Subsequent acquisitions see the mode already set.
    fn ensure_board_mode(&self) -> Result<()> {
        if self.registry.numbering_mode() == PinNumberingMode::PhysicalBoard {
            return Ok(());
        }
        self.registry
            .set_numbering_mode(PinNumberingMode::PhysicalBoard)?;
        self.driver
            .set_numbering_mode(PinNumberingMode::PhysicalBoard)?;
        Ok(())
    }

    fn digital(
        &self,
        pin: u8,
        direction: PinDirection,
        initial: Option<Level>,
    ) -> Result<DigitalPin<D>> {
        if !self.capabilities.is_digital(pin) {
            // Advisory, like the capability table itself: power/ground
            // positions and special-function pins end up here.
            log::warn!(
                "pin {} is not listed for digital I/O on {}, continuing anyway",
                pin,
                self.model
            );
        }
        self.ensure_board_mode()?;
        DigitalPin::acquire(
            Arc::clone(&self.driver),
            Arc::clone(&self.registry),
            pin,
            direction,
            initial,
        )
    }

    /// Acquires a pin as a digital output.
    ///
    /// The line is driven to `initial` (default `Low`) as part of
    /// acquisition, never left floating.
    pub fn digital_output(&self, pin: u8, initial: Option<Level>) -> Result<DigitalPin<D>> {
        self.digital(pin, PinDirection::Output, initial)
    }

    /// Acquires a pin as a digital input.
    pub fn digital_input(&self, pin: u8) -> Result<DigitalPin<D>> {
        self.digital(pin, PinDirection::Input, None)
    }

    /// Acquires a pin as a hardware PWM channel at the given frequency.
    ///
    /// Fails with [`GpioError::UnsupportedCapability`] when the board table
    /// does not list the pin as PWM-capable. The check is advisory: physical
    /// PWM support also depends on the pinmux, so a driver-level failure is
    /// still possible on a pin that passes it.
    pub fn pwm(&self, pin: u8, frequency_hz: f64) -> Result<PwmPin<D>> {
        self.ensure_board_mode()?;
        PwmPin::acquire(
            Arc::clone(&self.driver),
            Arc::clone(&self.registry),
            self.capabilities,
            pin,
            frequency_hz,
        )
    }

    /// Releases every claimed pin, for shutdown and signal paths.
    ///
    /// Best-effort: each pin's driver-side release is attempted even when an
    /// earlier one fails, and the failures are aggregated into
    /// [`GpioError::Cleanup`]. The claim table and numbering mode are reset
    /// regardless, so a single stuck pin cannot hold the rest hostage.
    ///
    /// Outstanding handles are not tracked here; callers must not run this
    /// concurrently with operations on live handles for the same pins.
    pub fn release_all(&self) -> Result<()> {
        let mut failures = Vec::new();
        for pin in self.registry.claimed_pins() {
            if let Err(e) = self.driver.release_pin(pin) {
                log::warn!("release_all: pin {} failed to release: {}", pin, e);
                failures.push(GpioError::Hardware(e));
            }
        }
        self.registry.release_all();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GpioError::Cleanup(failures))
        }
    }
}

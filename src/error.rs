use thiserror::Error;

use crate::board::BoardModel;
use crate::registry::{PinDirection, PinNumberingMode};

/// Errors produced by the GPIO abstraction layer.
///
/// Every failure is surfaced to the caller; the only operations that silently
/// accept a repeat call are `release` and `stop`, which are idempotent by
/// design. Hardware failures reported by the underlying driver are never
/// retried and carry the driver's own error as their cause.
#[derive(Debug, Error)]
pub enum GpioError {
    /// The pin numbering mode was set twice with different values.
    #[error("pin numbering mode is already {current}, refusing to switch to {requested}")]
    ConfigurationConflict {
        current: PinNumberingMode,
        requested: PinNumberingMode,
    },

    /// Pin number outside the physical 40-pin header.
    #[error("pin {0} is outside the physical header range 1..=40")]
    PinRange(u8),

    /// An active claim already exists for this pin.
    #[error("pin {0} is already claimed; release it before claiming again")]
    PinAlreadyClaimed(u8),

    /// Operation invoked against a handle whose direction forbids it.
    #[error("pin {pin} is configured as {actual}, operation requires {required}")]
    Direction {
        pin: u8,
        required: PinDirection,
        actual: PinDirection,
    },

    /// Duty cycle or frequency outside its valid bounds. The handle's state
    /// is left unchanged.
    #[error("{what} {value} is out of range")]
    OutOfRange { what: &'static str, value: f64 },

    /// PWM requested on a pin the board capability table does not list as
    /// PWM-capable. Advisory: the table cannot see pinmux configuration.
    #[error("pin {pin} is not listed as PWM-capable on {model}")]
    UnsupportedCapability { pin: u8, model: BoardModel },

    /// Operation on a handle that has already been released.
    #[error("handle for pin {0} has been released")]
    HandleReleased(u8),

    /// Failure reported by the underlying HAL driver, surfaced verbatim.
    #[error("hardware fault: {0}")]
    Hardware(#[from] anyhow::Error),

    /// One or more per-pin releases failed during `release_all`. Remaining
    /// pins were still released.
    #[error("release_all: {} pin release(s) failed", .0.len())]
    Cleanup(Vec<GpioError>),
}

pub type Result<T> = std::result::Result<T, GpioError>;

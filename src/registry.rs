//! Process-wide pin claim table and numbering-mode state.
//!
//! The registry is the single shared mutable resource of the HAL: it records
//! which numbering mode the process agreed on and which pins are currently
//! claimed. All mutation goes through one mutex so that two concurrent
//! acquisitions of the same pin can never both succeed.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::error::{GpioError, Result};

/// First usable physical pin on the 40-pin header.
pub const FIRST_HEADER_PIN: u8 = 1;
/// Last usable physical pin on the 40-pin header.
pub const LAST_HEADER_PIN: u8 = 40;

/// Pin numbering scheme.
///
/// Only physical (BOARD) numbering is supported; the mode exists so the
/// whole process can be checked against it. Once set to `PhysicalBoard` it
/// stays set until [`PinModeRegistry::release_all`] resets the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinNumberingMode {
    Unset,
    PhysicalBoard,
}

impl fmt::Display for PinNumberingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinNumberingMode::Unset => f.write_str("unset"),
            PinNumberingMode::PhysicalBoard => f.write_str("BOARD"),
        }
    }
}

/// Direction a pin was claimed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

impl fmt::Display for PinDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDirection::Input => f.write_str("input"),
            PinDirection::Output => f.write_str("output"),
        }
    }
}

/// Exclusive logical ownership of one physical pin.
///
/// A claim is handed out by [`PinModeRegistry::claim`] and owned by exactly
/// one pin handle. The `owner` id makes releases precise: a stale claim
/// released after the pin was re-claimed by someone else is a no-op.
#[derive(Debug)]
pub struct PinClaim {
    pin: u8,
    direction: PinDirection,
    owner: u64,
}

impl PinClaim {
    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn direction(&self) -> PinDirection {
        self.direction
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveClaim {
    direction: PinDirection,
    owner: u64,
}

struct RegistryState {
    mode: PinNumberingMode,
    claims: HashMap<u8, ActiveClaim>,
}

/// Claim table shared by every handle the HAL hands out.
///
/// Owned by the [`Gpio`](crate::gpio::Gpio) entry point rather than living in
/// a process global; handles keep an `Arc` to it so release works on every
/// exit path.
pub struct PinModeRegistry {
    state: Mutex<RegistryState>,
    next_owner: AtomicU64,
}

impl PinModeRegistry {
    pub fn new() -> Self {
        PinModeRegistry {
            state: Mutex::new(RegistryState {
                mode: PinNumberingMode::Unset,
                claims: HashMap::new(),
            }),
            next_owner: AtomicU64::new(1),
        }
    }

    /// Currently agreed numbering mode.
    pub fn numbering_mode(&self) -> PinNumberingMode {
        self.state.lock().unwrap().mode
    }

    /// Sets the process-wide numbering mode. The first call wins; repeating
    /// the same mode is a no-op, a different mode fails with
    /// [`GpioError::ConfigurationConflict`].
    pub fn set_numbering_mode(&self, mode: PinNumberingMode) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.mode == mode {
            return Ok(());
        }
        if state.mode != PinNumberingMode::Unset {
            return Err(GpioError::ConfigurationConflict {
                current: state.mode,
                requested: mode,
            });
        }
        state.mode = mode;
        Ok(())
    }

    /// Claims a pin for exclusive use in the given direction.
    ///
    /// Fails with [`GpioError::PinRange`] outside the physical header and
    /// with [`GpioError::PinAlreadyClaimed`] if an active claim exists.
    pub fn claim(&self, pin: u8, direction: PinDirection) -> Result<PinClaim> {
        if !(FIRST_HEADER_PIN..=LAST_HEADER_PIN).contains(&pin) {
            return Err(GpioError::PinRange(pin));
        }

        let mut state = self.state.lock().unwrap();
        if state.claims.contains_key(&pin) {
            return Err(GpioError::PinAlreadyClaimed(pin));
        }

        let owner = self.next_owner.fetch_add(1, Ordering::Relaxed);
        state.claims.insert(pin, ActiveClaim { direction, owner });
        log::debug!("claimed pin {} as {}", pin, direction);

        Ok(PinClaim {
            pin,
            direction,
            owner,
        })
    }

    /// Releases a claim. Idempotent: releasing a claim that is no longer
    /// active, or whose pin has since been re-claimed by another owner, is a
    /// no-op so that cleanup-on-exit paths never fail here.
    pub fn release(&self, claim: &PinClaim) {
        let mut state = self.state.lock().unwrap();
        if let Some(active) = state.claims.get(&claim.pin) {
            if active.owner == claim.owner {
                state.claims.remove(&claim.pin);
                log::debug!("released pin {}", claim.pin);
            }
        }
    }

    /// Releases every active claim and resets the numbering mode, so a
    /// fresh program phase can re-initialize. Safe to call with no claims.
    pub fn release_all(&self) {
        let mut state = self.state.lock().unwrap();
        state.claims.clear();
        state.mode = PinNumberingMode::Unset;
    }

    pub fn is_claimed(&self, pin: u8) -> bool {
        self.state.lock().unwrap().claims.contains_key(&pin)
    }

    /// Pins with an active claim, in ascending order.
    pub fn claimed_pins(&self) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        let mut pins: Vec<u8> = state.claims.keys().copied().collect();
        pins.sort_unstable();
        pins
    }
}

impl Default for PinModeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

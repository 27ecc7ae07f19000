//! Board models and their 40-pin header capabilities.
//!
//! The capability table is advisory: it tells callers which header pins are
//! usable for digital I/O and which are routed to hardware PWM channels on a
//! given board. Whether a PWM pin actually generates a signal still depends
//! on the pinmux configuration, which is outside this crate's reach.

use std::fmt;

/// Board model reported by the HAL driver, detected once when the HAL entry
/// point is opened.
///
/// Model strings the driver may report are matched against a closed set;
/// anything else maps to `Unknown` so that digital I/O can still be attempted
/// on unrecognized boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardModel {
    OrinNano,
    OrinNx,
    Orin,
    Unknown,
}

impl BoardModel {
    /// Maps a driver-reported model string to a `BoardModel`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "JETSON_ORIN_NANO" => BoardModel::OrinNano,
            "JETSON_ORIN_NX" => BoardModel::OrinNx,
            "JETSON_ORIN" => BoardModel::Orin,
            _ => BoardModel::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoardModel::OrinNano => "JETSON_ORIN_NANO",
            BoardModel::OrinNx => "JETSON_ORIN_NX",
            BoardModel::Orin => "JETSON_ORIN",
            BoardModel::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BoardModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header pins usable for digital I/O and hardware PWM on one board model.
///
/// Immutable; looked up with [`capabilities_for`].
#[derive(Debug)]
pub struct BoardCapabilities {
    pub model: BoardModel,
    digital_pins: &'static [u8],
    pwm_pins: &'static [u8],
    notes: &'static [(u8, &'static str)],
}

impl BoardCapabilities {
    /// Physical pins usable for digital I/O (power and ground pins excluded).
    pub fn digital_pins(&self) -> &[u8] {
        self.digital_pins
    }

    /// Physical pins routed to hardware PWM channels. Empty for unknown
    /// boards.
    pub fn pwm_pins(&self) -> &[u8] {
        self.pwm_pins
    }

    pub fn is_digital(&self, pin: u8) -> bool {
        self.digital_pins.contains(&pin)
    }

    pub fn supports_pwm(&self, pin: u8) -> bool {
        self.pwm_pins.contains(&pin)
    }

    /// Per-pin annotations (pinmux caveats, carrier-board quirks).
    pub fn notes(&self) -> &[(u8, &'static str)] {
        self.notes
    }

    pub fn note_for(&self, pin: u8) -> Option<&'static str> {
        self.notes
            .iter()
            .find(|(p, _)| *p == pin)
            .map(|(_, note)| *note)
    }
}

// All Orin family boards expose the same digital set on the 40-pin header.
const ORIN_DIGITAL_PINS: &[u8] = &[
    7, 11, 12, 13, 15, 16, 18, 19, 21, 22, 23, 24, 26, 29, 31, 32, 33, 35, 36, 37, 38, 40,
];

const PINMUX_NOTE: &str = "PWM capable - may need pinmux configuration";

static ORIN_NANO: BoardCapabilities = BoardCapabilities {
    model: BoardModel::OrinNano,
    digital_pins: ORIN_DIGITAL_PINS,
    pwm_pins: &[15, 33],
    notes: &[
        (15, PINMUX_NOTE),
        (33, PINMUX_NOTE),
        (36, "May be input-only depending on base board"),
    ],
};

static ORIN_NX: BoardCapabilities = BoardCapabilities {
    model: BoardModel::OrinNx,
    digital_pins: ORIN_DIGITAL_PINS,
    pwm_pins: &[15, 33],
    notes: &[(15, PINMUX_NOTE), (33, PINMUX_NOTE)],
};

static ORIN: BoardCapabilities = BoardCapabilities {
    model: BoardModel::Orin,
    digital_pins: ORIN_DIGITAL_PINS,
    pwm_pins: &[15, 18],
    notes: &[(15, PINMUX_NOTE), (18, PINMUX_NOTE)],
};

// Conservative fallback: the shared digital set, no PWM claims.
static UNKNOWN: BoardCapabilities = BoardCapabilities {
    model: BoardModel::Unknown,
    digital_pins: ORIN_DIGITAL_PINS,
    pwm_pins: &[],
    notes: &[],
};

/// Returns the capability table for a board model.
///
/// Unknown models never fail: they fall back to a conservative set with the
/// full digital header and no PWM pins, so callers can still attempt digital
/// I/O on an unrecognized board.
pub fn capabilities_for(model: BoardModel) -> &'static BoardCapabilities {
    match model {
        BoardModel::OrinNano => &ORIN_NANO,
        BoardModel::OrinNx => &ORIN_NX,
        BoardModel::Orin => &ORIN,
        BoardModel::Unknown => &UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_from_name_matches_known_boards() {
        assert_eq!(BoardModel::from_name("JETSON_ORIN_NANO"), BoardModel::OrinNano);
        assert_eq!(BoardModel::from_name("JETSON_ORIN_NX"), BoardModel::OrinNx);
        assert_eq!(BoardModel::from_name("JETSON_ORIN"), BoardModel::Orin);
        assert_eq!(BoardModel::from_name("FOO_BOARD"), BoardModel::Unknown);
    }

    #[test]
    fn orin_nano_table() {
        let caps = capabilities_for(BoardModel::OrinNano);
        assert!(caps.is_digital(18));
        assert!(!caps.is_digital(2)); // 5V pin
        assert_eq!(caps.pwm_pins(), &[15, 33]);
        assert!(caps.supports_pwm(33));
        assert!(!caps.supports_pwm(18));
        assert!(caps.note_for(36).is_some());
    }

    #[test]
    fn orin_uses_pin_18_for_pwm() {
        let caps = capabilities_for(BoardModel::Orin);
        assert_eq!(caps.pwm_pins(), &[15, 18]);
    }

    #[test]
    fn unknown_model_falls_back_to_digital_only() {
        let caps = capabilities_for(BoardModel::from_name("FOO_BOARD"));
        assert!(!caps.digital_pins().is_empty());
        assert!(caps.pwm_pins().is_empty());
    }
}

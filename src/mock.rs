//! In-memory [`HalDriver`] for tests and examples.
//!
//! Keeps per-pin levels and PWM channel state in a mutex-guarded map,
//! counts physical writes, and can inject a single hardware fault into the
//! next driver call. No hardware is touched.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::driver::{HalDriver, Level};
use crate::registry::{PinDirection, PinNumberingMode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockPwmState {
    pub frequency_hz: f64,
    pub duty_cycle_percent: f64,
    pub running: bool,
}

#[derive(Default)]
struct MockState {
    mode: Option<PinNumberingMode>,
    directions: HashMap<u8, PinDirection>,
    levels: HashMap<u8, Level>,
    write_counts: HashMap<u8, u32>,
    pwm: HashMap<u8, MockPwmState>,
    fail_next: bool,
}

/// Scriptable driver double.
///
/// `Default` reports a Jetson Orin Nano; use [`MockDriver::new`] to pretend
/// to be any other board.
pub struct MockDriver {
    model: String,
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new(model: &str) -> Self {
        MockDriver {
            model: model.to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Makes the next driver call fail with an injected fault.
    pub fn fail_next_call(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    /// Forces the level a subsequent `read_level` will observe, as if an
    /// external signal drove the line.
    pub fn set_input_level(&self, pin: u8, level: Level) {
        self.state.lock().unwrap().levels.insert(pin, level);
    }

    /// Level last driven on (or scripted for) a pin.
    pub fn level(&self, pin: u8) -> Option<Level> {
        self.state.lock().unwrap().levels.get(&pin).copied()
    }

    /// Number of physical writes a pin has seen, the initial drive during
    /// output setup excluded.
    pub fn write_count(&self, pin: u8) -> u32 {
        self.state
            .lock()
            .unwrap()
            .write_counts
            .get(&pin)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_setup(&self, pin: u8) -> bool {
        self.state.lock().unwrap().directions.contains_key(&pin)
    }

    pub fn pwm_state(&self, pin: u8) -> Option<MockPwmState> {
        self.state.lock().unwrap().pwm.get(&pin).copied()
    }

    pub fn numbering_mode(&self) -> Option<PinNumberingMode> {
        self.state.lock().unwrap().mode
    }

    fn check_fault(state: &mut MockState, op: &str) -> Result<()> {
        if state.fail_next {
            state.fail_next = false;
            return Err(anyhow!("injected fault during {}", op));
        }
        Ok(())
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        MockDriver::new("JETSON_ORIN_NANO")
    }
}

impl HalDriver for MockDriver {
    fn model(&self) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "model")?;
        Ok(self.model.clone())
    }

    fn set_numbering_mode(&self, mode: PinNumberingMode) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "set_numbering_mode")?;
        state.mode = Some(mode);
        Ok(())
    }

    fn setup_input(&self, pin: u8) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "setup_input")?;
        state.directions.insert(pin, PinDirection::Input);
        Ok(())
    }

    fn setup_output(&self, pin: u8, initial: Level) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "setup_output")?;
        state.directions.insert(pin, PinDirection::Output);
        state.levels.insert(pin, initial);
        Ok(())
    }

    fn write_level(&self, pin: u8, level: Level) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "write_level")?;
        state.levels.insert(pin, level);
        *state.write_counts.entry(pin).or_insert(0) += 1;
        Ok(())
    }

    fn read_level(&self, pin: u8) -> Result<Level> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "read_level")?;
        Ok(state.levels.get(&pin).copied().unwrap_or(Level::Low))
    }

    fn pwm_setup(&self, pin: u8, frequency_hz: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "pwm_setup")?;
        state.pwm.insert(
            pin,
            MockPwmState {
                frequency_hz,
                duty_cycle_percent: 0.0,
                running: false,
            },
        );
        Ok(())
    }

    fn pwm_start(&self, pin: u8, duty_cycle_percent: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "pwm_start")?;
        let channel = state
            .pwm
            .get_mut(&pin)
            .ok_or_else(|| anyhow!("pwm channel {} not configured", pin))?;
        channel.duty_cycle_percent = duty_cycle_percent;
        channel.running = true;
        Ok(())
    }

    fn pwm_set_duty_cycle(&self, pin: u8, duty_cycle_percent: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "pwm_set_duty_cycle")?;
        let channel = state
            .pwm
            .get_mut(&pin)
            .ok_or_else(|| anyhow!("pwm channel {} not configured", pin))?;
        channel.duty_cycle_percent = duty_cycle_percent;
        Ok(())
    }

    fn pwm_set_frequency(&self, pin: u8, frequency_hz: f64) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "pwm_set_frequency")?;
        let channel = state
            .pwm
            .get_mut(&pin)
            .ok_or_else(|| anyhow!("pwm channel {} not configured", pin))?;
        channel.frequency_hz = frequency_hz;
        Ok(())
    }

    fn pwm_stop(&self, pin: u8) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "pwm_stop")?;
        if let Some(channel) = state.pwm.get_mut(&pin) {
            channel.running = false;
        }
        Ok(())
    }

    fn release_pin(&self, pin: u8) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        Self::check_fault(&mut state, "release_pin")?;
        state.directions.remove(&pin);
        state.pwm.remove(&pin);
        Ok(())
    }
}

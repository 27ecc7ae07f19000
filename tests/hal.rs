use std::mem;

use orin_gpio::{
    BoardModel, Gpio, GpioError, Level, MockDriver, PinDirection, PinNumberingMode,
};

fn open_orin_nano() -> Gpio<MockDriver> {
    Gpio::open(MockDriver::default()).unwrap()
}

#[test]
fn output_write_updates_hardware_and_cache() {
    // Scenario A: acquire pin 18 as output low, drive high, check the cache.
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_output(18, Some(Level::Low)).unwrap();
    assert_eq!(pin.last_value(), Some(Level::Low));

    pin.write(Level::High).unwrap();
    assert_eq!(pin.last_value(), Some(Level::High));
    assert_eq!(gpio.driver().level(18), Some(Level::High));
}

#[test]
fn output_is_driven_during_acquisition() {
    let gpio = open_orin_nano();
    let pin = gpio.digital_output(18, None).unwrap();
    // Unspecified initial defaults to low and reaches the hardware.
    assert_eq!(pin.last_value(), Some(Level::Low));
    assert_eq!(gpio.driver().level(18), Some(Level::Low));
}

#[test]
fn writes_are_never_skipped_on_cache_hit() {
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_output(18, None).unwrap();

    pin.write(Level::High).unwrap();
    pin.write(Level::High).unwrap();
    assert_eq!(gpio.driver().write_count(18), 2);
}

#[test]
fn toggle_is_its_own_inverse() {
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_output(18, Some(Level::High)).unwrap();

    pin.toggle().unwrap();
    assert_eq!(pin.last_value(), Some(Level::Low));
    pin.toggle().unwrap();
    assert_eq!(pin.last_value(), Some(Level::High));
    assert_eq!(gpio.driver().level(18), Some(Level::High));
}

#[test]
fn write_and_toggle_require_an_output_handle() {
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_input(16).unwrap();

    let err = pin.write(Level::High).unwrap_err();
    assert!(matches!(
        err,
        GpioError::Direction {
            pin: 16,
            required: PinDirection::Output,
            actual: PinDirection::Input,
        }
    ));
    assert!(matches!(
        pin.toggle().unwrap_err(),
        GpioError::Direction { .. }
    ));
}

#[test]
fn input_read_queries_hardware_and_updates_cache() {
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_input(16).unwrap();
    assert_eq!(pin.last_value(), None);

    gpio.driver().set_input_level(16, Level::High);
    assert_eq!(pin.read().unwrap(), Level::High);
    assert_eq!(pin.last_value(), Some(Level::High));
}

#[test]
fn output_read_back_is_a_passthrough() {
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_output(18, Some(Level::Low)).unwrap();

    // An external observer sees whatever is on the line, but the cache only
    // tracks what this handle drove.
    gpio.driver().set_input_level(18, Level::High);
    assert_eq!(pin.read().unwrap(), Level::High);
    assert_eq!(pin.last_value(), Some(Level::Low));
}

#[test]
fn second_claim_on_a_pin_fails_until_release() {
    // Scenario C: pin 16 claimed as input, then requested as output.
    let gpio = open_orin_nano();
    let mut input = gpio.digital_input(16).unwrap();

    let err = gpio.digital_output(16, None).unwrap_err();
    assert!(matches!(err, GpioError::PinAlreadyClaimed(16)));

    input.release().unwrap();
    assert!(gpio.digital_output(16, None).is_ok());
}

#[test]
fn released_handle_rejects_every_operation() {
    // Scenario E.
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_output(15, None).unwrap();
    pin.release().unwrap();
    // Repeat release stays a no-op.
    pin.release().unwrap();

    assert!(matches!(
        pin.write(Level::High).unwrap_err(),
        GpioError::HandleReleased(15)
    ));
    assert!(matches!(pin.read().unwrap_err(), GpioError::HandleReleased(15)));
    assert!(matches!(
        pin.toggle().unwrap_err(),
        GpioError::HandleReleased(15)
    ));
}

#[test]
fn dropping_a_handle_frees_the_claim() {
    let gpio = open_orin_nano();
    {
        let _pin = gpio.digital_output(15, None).unwrap();
        assert!(gpio.registry().is_claimed(15));
    }
    assert!(!gpio.registry().is_claimed(15));
    assert!(gpio.digital_input(15).is_ok());
}

#[test]
fn pin_numbers_outside_the_header_are_rejected() {
    let gpio = open_orin_nano();
    for pin in [0u8, 41] {
        let err = gpio.digital_input(pin).unwrap_err();
        assert!(matches!(err, GpioError::PinRange(p) if p == pin));
    }
}

#[test]
fn first_acquisition_fixes_board_numbering() {
    let gpio = open_orin_nano();
    assert_eq!(gpio.registry().numbering_mode(), PinNumberingMode::Unset);

    let _pin = gpio.digital_input(16).unwrap();
    assert_eq!(
        gpio.registry().numbering_mode(),
        PinNumberingMode::PhysicalBoard
    );
    assert_eq!(
        gpio.driver().numbering_mode(),
        Some(PinNumberingMode::PhysicalBoard)
    );
}

#[test]
fn failed_acquisition_rolls_the_claim_back() {
    let gpio = open_orin_nano();
    {
        // Fix the numbering mode first so the fault lands on the pin setup.
        let mut probe = gpio.digital_input(16).unwrap();
        probe.release().unwrap();
    }
    gpio.driver().fail_next_call();

    assert!(matches!(
        gpio.digital_output(18, None).unwrap_err(),
        GpioError::Hardware(_)
    ));
    assert!(!gpio.registry().is_claimed(18));
    assert!(gpio.digital_output(18, None).is_ok());
}

#[test]
fn hardware_faults_surface_without_touching_state() {
    let gpio = open_orin_nano();
    let mut pin = gpio.digital_output(18, Some(Level::Low)).unwrap();

    gpio.driver().fail_next_call();
    assert!(matches!(
        pin.write(Level::High).unwrap_err(),
        GpioError::Hardware(_)
    ));
    assert_eq!(pin.last_value(), Some(Level::Low));
}

#[test]
fn pwm_rejects_out_of_range_duty_cycle() {
    // Scenario B: a rejected mutation leaves handle and hardware unchanged.
    let gpio = open_orin_nano();
    let mut pwm = gpio.pwm(33, 1000.0).unwrap();
    pwm.start(50.0).unwrap();

    let err = pwm.change_duty_cycle(150.0).unwrap_err();
    assert!(matches!(err, GpioError::OutOfRange { .. }));
    assert_eq!(pwm.duty_cycle(), 50.0);
    assert!(pwm.is_running());

    let hw = gpio.driver().pwm_state(33).unwrap();
    assert_eq!(hw.duty_cycle_percent, 50.0);
    assert!(hw.running);
}

#[test]
fn pwm_start_validates_duty_cycle() {
    let gpio = open_orin_nano();
    let mut pwm = gpio.pwm(33, 1000.0).unwrap();

    assert!(matches!(
        pwm.start(-1.0).unwrap_err(),
        GpioError::OutOfRange { .. }
    ));
    assert!(!pwm.is_running());
    assert_eq!(pwm.duty_cycle(), 0.0);

    pwm.start(100.0).unwrap();
    assert!(pwm.is_running());
}

#[test]
fn pwm_requires_a_capable_pin() {
    let gpio = open_orin_nano();
    let err = gpio.pwm(18, 1000.0).unwrap_err();
    assert!(matches!(
        err,
        GpioError::UnsupportedCapability {
            pin: 18,
            model: BoardModel::OrinNano,
        }
    ));
}

#[test]
fn pwm_requires_a_positive_frequency() {
    let gpio = open_orin_nano();
    assert!(matches!(
        gpio.pwm(33, 0.0).unwrap_err(),
        GpioError::OutOfRange { .. }
    ));

    let mut pwm = gpio.pwm(33, 1000.0).unwrap();
    assert!(matches!(
        pwm.change_frequency(-5.0).unwrap_err(),
        GpioError::OutOfRange { .. }
    ));
    assert_eq!(pwm.frequency(), 1000.0);
}

#[test]
fn pwm_parameter_changes_while_stopped_are_stored_only() {
    let gpio = open_orin_nano();
    let mut pwm = gpio.pwm(33, 1000.0).unwrap();

    pwm.change_duty_cycle(30.0).unwrap();
    pwm.change_frequency(2000.0).unwrap();
    assert_eq!(pwm.duty_cycle(), 30.0);
    assert_eq!(pwm.frequency(), 2000.0);

    // Hardware still shows the configured-at-acquire state.
    let hw = gpio.driver().pwm_state(33).unwrap();
    assert_eq!(hw.duty_cycle_percent, 0.0);
    assert_eq!(hw.frequency_hz, 1000.0);
    assert!(!hw.running);
}

#[test]
fn pwm_changes_while_running_reach_hardware_without_restart() {
    let gpio = open_orin_nano();
    let mut pwm = gpio.pwm(33, 1000.0).unwrap();
    pwm.start(25.0).unwrap();

    pwm.change_duty_cycle(60.0).unwrap();
    pwm.change_frequency(500.0).unwrap();

    let hw = gpio.driver().pwm_state(33).unwrap();
    assert_eq!(hw.duty_cycle_percent, 60.0);
    assert_eq!(hw.frequency_hz, 500.0);
    assert!(hw.running);
    assert!(pwm.is_running());
}

#[test]
fn pwm_stop_is_idempotent() {
    let gpio = open_orin_nano();
    let mut pwm = gpio.pwm(33, 1000.0).unwrap();

    // Stopping a never-started channel is already a no-op.
    pwm.stop().unwrap();

    pwm.start(40.0).unwrap();
    pwm.stop().unwrap();
    pwm.stop().unwrap();
    assert!(!pwm.is_running());
}

#[test]
fn pwm_release_forces_a_stop_and_frees_the_pin() {
    let gpio = open_orin_nano();
    let mut pwm = gpio.pwm(33, 1000.0).unwrap();
    pwm.start(50.0).unwrap();

    pwm.release().unwrap();
    pwm.release().unwrap();
    assert!(!gpio.registry().is_claimed(33));

    assert!(matches!(
        pwm.start(10.0).unwrap_err(),
        GpioError::HandleReleased(33)
    ));
    assert!(matches!(
        pwm.stop().unwrap_err(),
        GpioError::HandleReleased(33)
    ));
}

#[test]
fn dropping_a_running_pwm_stops_the_channel() {
    let gpio = open_orin_nano();
    {
        let mut pwm = gpio.pwm(33, 1000.0).unwrap();
        pwm.start(80.0).unwrap();
    }
    assert!(!gpio.registry().is_claimed(33));
    // Driver-side channel state was torn down with the pin.
    assert!(gpio.driver().pwm_state(33).is_none());
}

#[test]
fn release_all_frees_every_claim_and_resets_the_mode() {
    let gpio = open_orin_nano();
    let out = gpio.digital_output(7, None).unwrap();
    let inp = gpio.digital_input(16).unwrap();
    // Leak the handles: release_all is the shutdown path for exactly this.
    mem::forget(out);
    mem::forget(inp);

    gpio.release_all().unwrap();
    assert!(gpio.registry().claimed_pins().is_empty());
    assert_eq!(gpio.registry().numbering_mode(), PinNumberingMode::Unset);

    // Everything is reclaimable afterwards.
    assert!(gpio.digital_output(7, None).is_ok());
    assert!(gpio.digital_output(16, None).is_ok());

    // Safe to call again with nothing claimed.
    gpio.release_all().unwrap();
}

#[test]
fn release_all_aggregates_failures_and_keeps_going() {
    let gpio = open_orin_nano();
    mem::forget(gpio.digital_output(7, None).unwrap());
    mem::forget(gpio.digital_input(16).unwrap());

    // Fails the first per-pin release; the second still runs.
    gpio.driver().fail_next_call();
    let err = gpio.release_all().unwrap_err();
    match err {
        GpioError::Cleanup(failures) => assert_eq!(failures.len(), 1),
        other => panic!("expected Cleanup, got {}", other),
    }

    // The claim table was cleared regardless of the stuck pin.
    assert!(gpio.registry().claimed_pins().is_empty());
    assert!(gpio.digital_output(7, None).is_ok());
}

#[test]
fn handles_render_their_state_for_debugging() {
    let gpio = open_orin_nano();

    let pin = gpio.digital_output(18, Some(Level::High)).unwrap();
    let rendered = format!("{:?}", pin);
    assert!(rendered.contains("pin: 18"), "got: {}", rendered);
    assert!(rendered.contains("Output"), "got: {}", rendered);
    assert!(rendered.contains("High"), "got: {}", rendered);

    let mut pwm = gpio.pwm(33, 1000.0).unwrap();
    pwm.start(50.0).unwrap();
    let rendered = format!("{:?}", pwm);
    assert!(rendered.contains("pin: 33"), "got: {}", rendered);
    assert!(rendered.contains("frequency_hz: 1000.0"), "got: {}", rendered);
    assert!(rendered.contains("duty_cycle_percent: 50.0"), "got: {}", rendered);
    assert!(rendered.contains("running: true"), "got: {}", rendered);

    // Debug is also what lets a Result over a handle be unwrapped either
    // way in tests.
    assert!(matches!(
        gpio.digital_input(18).unwrap_err(),
        GpioError::PinAlreadyClaimed(18)
    ));
}

#[test]
fn unknown_board_still_allows_digital_io() {
    // Scenario D.
    let gpio = Gpio::open(MockDriver::new("FOO_BOARD")).unwrap();
    assert_eq!(gpio.model(), BoardModel::Unknown);
    assert!(!gpio.capabilities().digital_pins().is_empty());
    assert!(gpio.capabilities().pwm_pins().is_empty());

    assert!(gpio.digital_output(18, None).is_ok());
    assert!(matches!(
        gpio.pwm(33, 1000.0).unwrap_err(),
        GpioError::UnsupportedCapability { .. }
    ));
}

use input_shaper::{ConfigError, Configurator, ShaperType};

const STEP_RATE: f32 = 750_000.0;

#[test]
fn custom_type_round_trips_amplitudes_and_durations() {
    let mut c = Configurator::new(STEP_RATE, true);
    c.apply_command("Pcustom H0.3,0.6,1.0 T0.01,0.012,0.011", &mut ()).unwrap();
    assert_eq!(c.params().shaper_type, ShaperType::Custom);
    assert_eq!(c.params().num_extra_impulses, 3);
    assert_eq!(c.params().coefficients[..3], [0.3, 0.6, 1.0]);
}

#[test]
fn custom_rejects_non_increasing_amplitudes() {
    let mut c = Configurator::new(STEP_RATE, true);
    let err = c.apply_command("Pcustom H0.6,0.3,1.0 T0.01,0.01,0.01", &mut ()).unwrap_err();
    assert_eq!(err, ConfigError::InvalidAmplitudes);
}

#[test]
fn query_with_no_fields_is_a_no_op() {
    let mut c = Configurator::new(STEP_RATE, true);
    c.apply_command("Pzvd F40", &mut ()).unwrap();
    let before = c.report();
    c.apply_command("", &mut ()).unwrap();
    assert_eq!(c.report(), before);
}

#[test]
fn subsequent_commands_reuse_previously_set_type() {
    let mut c = Configurator::new(STEP_RATE, true);
    c.apply_command("Pzvdd F40", &mut ()).unwrap();
    // No P this time: the previously configured type is retained.
    c.apply_command("F60", &mut ()).unwrap();
    assert_eq!(c.params().shaper_type, ShaperType::Zvdd);
    assert_eq!(c.params().frequency, 60.0);
}

struct CountingSink {
    updates: u32,
}

impl input_shaper::MoveUpdateSink for CountingSink {
    fn move_updated(&mut self) {
        self.updates += 1;
    }
}

#[test]
fn successful_apply_notifies_the_sink_exactly_once() {
    let mut c = Configurator::new(STEP_RATE, true);
    let mut sink = CountingSink { updates: 0 };
    c.apply_command("Pzvd F40 S0.1", &mut sink).unwrap();
    assert_eq!(sink.updates, 1);
    let _ = c.apply_command("Pwobble", &mut sink);
    assert_eq!(sink.updates, 1);
}

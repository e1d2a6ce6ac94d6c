//! Validates configuration commands and synthesizes [`ShaperParams`]
//! (spec component B).
//!
//! The command surface is the free-form textual one of spec.md §6: tokens
//! are whitespace-separated, each token's first character names the field
//! (`F`, `L`, `S`, `P`, `H`, `T`) and the remainder is its value — the same
//! shape as the teacher workspace's `parse_gcode` (see
//! `klipper-host/src/gcode.rs`), minus the G-code command-name prefix this
//! crate has no business parsing.

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(feature = "alloc")]
use alloc::{format, string::String, vec::Vec};

use crate::error::ConfigError;
use crate::params::{CustomImpulses, ShaperParams, ShaperType, MAX_EXTRA_IMPULSES};

/// Models spec.md §5's `reprap.MoveUpdated()` signal: notified once a
/// configuration change has been fully applied and is safe for planning to
/// read. `()` is a no-op sink for tests and headless synthesis.
pub trait MoveUpdateSink {
    fn move_updated(&mut self);
}

impl MoveUpdateSink for () {
    fn move_updated(&mut self) {}
}

/// Owns the process-wide [`ShaperParams`] and the small amount of state
/// needed to apply spec.md §6 commands against it.
pub struct Configurator {
    params: ShaperParams,
    step_rate: f32,
    /// Whether this build can run DAA (some MCU timer resolutions can't);
    /// governs the no-type-ever-set default of spec.md §4.B.
    daa_capable: bool,
    type_ever_set: bool,
}

impl Configurator {
    pub fn new(step_rate: f32, daa_capable: bool) -> Self {
        Configurator { params: ShaperParams::default(), step_rate, daa_capable, type_ever_set: false }
    }

    pub fn params(&self) -> &ShaperParams {
        &self.params
    }

    /// Parses and applies one configuration command, synthesizing a new
    /// [`ShaperParams`] on success and notifying `sink`. On failure, leaves
    /// `self.params` as spec.md §4.B dictates (unchanged for most errors;
    /// reverted to `none` for a custom arity mismatch).
    pub fn apply_command(&mut self, command: &str, sink: &mut dyn MoveUpdateSink) -> Result<(), ConfigError> {
        let fields = Fields::parse(command);

        if fields.is_empty() {
            return Ok(());
        }

        let frequency = match fields.frequency {
            Some(f) => {
                let low = self.step_rate / (2.0 * 65535.0);
                if !(low..=1000.0).contains(&f) {
                    #[cfg(feature = "logging")]
                    tracing::warn!(value = f, "frequency out of range");
                    return Err(ConfigError::OutOfRange { field: "F", value: f, low, high: 1000.0 });
                }
                f
            }
            None => self.params.frequency,
        };

        let damping = match fields.damping {
            Some(s) => {
                if !(0.0..=0.99).contains(&s) {
                    #[cfg(feature = "logging")]
                    tracing::warn!(value = s, "damping ratio out of range");
                    return Err(ConfigError::OutOfRange { field: "S", value: s, low: 0.0, high: 0.99 });
                }
                s
            }
            None => self.params.damping,
        };

        let min_acceleration = fields.min_acceleration.unwrap_or(self.params.min_acceleration);

        let shaper_type = match fields.shaper_type {
            Some(name) => {
                let parsed = parse_shaper_type(name);
                match parsed {
                    #[cfg(feature = "alloc")]
                    None => return Err(ConfigError::UnsupportedType(String::from(name))),
                    #[cfg(not(feature = "alloc"))]
                    None => return Err(ConfigError::UnsupportedType),
                    Some(t) => {
                        self.type_ever_set = true;
                        t
                    }
                }
            }
            None if !self.type_ever_set => {
                self.type_ever_set = true;
                if self.daa_capable {
                    ShaperType::Daa
                } else {
                    ShaperType::Zvd
                }
            }
            None => self.params.shaper_type,
        };

        if shaper_type == ShaperType::Custom {
            if let (Some(h), Some(t)) = (&fields.amplitudes, &fields.durations) {
                if h.len() != t.len() {
                    self.params = ShaperParams::synthesize(ShaperType::None, frequency, damping, min_acceleration, self.step_rate, None);
                    return Err(ConfigError::ArityMismatch);
                }
            }
            if let Some(h) = &fields.amplitudes {
                if !is_valid_amplitude_table(h) {
                    return Err(ConfigError::InvalidAmplitudes);
                }
            }
        }

        let owned_amplitudes;
        let owned_durations;
        let custom = if shaper_type == ShaperType::Custom {
            owned_amplitudes = fields.amplitudes.clone().unwrap_or_default();
            owned_durations = fields.durations.clone();
            Some(CustomImpulses { amplitudes: &owned_amplitudes, durations: owned_durations.as_deref() })
        } else {
            None
        };

        self.params = ShaperParams::synthesize(shaper_type, frequency, damping, min_acceleration, self.step_rate, custom);
        #[cfg(feature = "logging")]
        tracing::info!(?shaper_type, frequency, damping, "input shaper configuration applied");
        sink.move_updated();
        Ok(())
    }

    /// The report string of spec.md §6.
    #[cfg(feature = "alloc")]
    pub fn report(&self) -> String {
        if self.params.shaper_type == ShaperType::None {
            return String::from("Input shaping is disabled");
        }
        let mut coeffs = String::new();
        let mut durations_ms = String::new();
        for i in 0..self.params.num_extra_impulses {
            if i > 0 {
                coeffs.push(' ');
                durations_ms.push(' ');
            }
            coeffs.push_str(&format!("{:.5}", self.params.coefficients[i]));
            durations_ms.push_str(&format!("{:.4}", self.params.durations[i] * 1000.0));
        }
        format!(
            "Input shaping '{}' at {}Hz damping factor {}, min. acceleration {}, impulses {} with durations (ms) {}",
            type_name(self.params.shaper_type),
            self.params.frequency,
            self.params.damping,
            self.params.min_acceleration,
            coeffs,
            durations_ms,
        )
    }
}

fn type_name(t: ShaperType) -> &'static str {
    match t {
        ShaperType::None => "none",
        ShaperType::Daa => "daa",
        ShaperType::Zvd => "zvd",
        ShaperType::Zvdd => "zvdd",
        ShaperType::Ei2 => "ei2",
        ShaperType::Ei3 => "ei3",
        ShaperType::Custom => "custom",
    }
}

fn parse_shaper_type(name: &str) -> Option<ShaperType> {
    match name {
        "none" => Some(ShaperType::None),
        "daa" => Some(ShaperType::Daa),
        "zvd" => Some(ShaperType::Zvd),
        "zvdd" => Some(ShaperType::Zvdd),
        "ei2" => Some(ShaperType::Ei2),
        "ei3" => Some(ShaperType::Ei3),
        "custom" => Some(ShaperType::Custom),
        _ => None,
    }
}

fn is_valid_amplitude_table(amplitudes: &[f32]) -> bool {
    if amplitudes.len() > MAX_EXTRA_IMPULSES {
        return false;
    }
    let mut prev = 0.0f32;
    for &a in amplitudes {
        if !(a > 0.0 && a <= 1.0 && a > prev) {
            return false;
        }
        prev = a;
    }
    true
}

/// A scratch parse of one command's tokens (spec.md §6 field table).
#[cfg(feature = "alloc")]
#[derive(Default)]
struct Fields<'a> {
    frequency: Option<f32>,
    min_acceleration: Option<f32>,
    damping: Option<f32>,
    shaper_type: Option<&'a str>,
    amplitudes: Option<Vec<f32>>,
    durations: Option<Vec<f32>>,
}

#[cfg(feature = "alloc")]
impl<'a> Fields<'a> {
    fn parse(command: &'a str) -> Self {
        let mut fields = Fields::default();
        for token in command.split_whitespace() {
            let mut chars = token.chars();
            let letter = match chars.next() {
                Some(c) => c.to_ascii_uppercase(),
                None => continue,
            };
            let value = chars.as_str();
            match letter {
                'F' => fields.frequency = value.parse().ok(),
                'L' => fields.min_acceleration = value.parse().ok(),
                'S' => fields.damping = value.parse().ok(),
                'P' => fields.shaper_type = Some(value),
                'H' => fields.amplitudes = Some(parse_float_list(value)),
                'T' => fields.durations = Some(parse_float_list(value)),
                _ => {}
            }
        }
        fields
    }

    fn is_empty(&self) -> bool {
        self.frequency.is_none()
            && self.min_acceleration.is_none()
            && self.damping.is_none()
            && self.shaper_type.is_none()
            && self.amplitudes.is_none()
            && self.durations.is_none()
    }
}

#[cfg(feature = "alloc")]
fn parse_float_list(value: &str) -> Vec<f32> {
    value.split(',').filter_map(|s| s.trim().parse::<f32>().ok()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP_RATE: f32 = 750_000.0;

    #[test]
    fn applies_zvd_configuration() {
        let mut c = Configurator::new(STEP_RATE, true);
        c.apply_command("Pzvd F40 S0.1", &mut ()).unwrap();
        assert_eq!(c.params().shaper_type, ShaperType::Zvd);
        assert_eq!(c.params().num_extra_impulses, 2);
    }

    #[test]
    fn rejects_unknown_type() {
        let mut c = Configurator::new(STEP_RATE, true);
        let err = c.apply_command("Pwobble", &mut ()).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedType(String::from("wobble")));
    }

    #[test]
    fn rejects_out_of_range_frequency() {
        let mut c = Configurator::new(STEP_RATE, true);
        let err = c.apply_command("Pzvd F2000", &mut ()).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { field: "F", .. }));
    }

    #[test]
    fn clamps_min_acceleration_instead_of_rejecting() {
        let mut c = Configurator::new(STEP_RATE, true);
        c.apply_command("Pzvd F40 L0.1", &mut ()).unwrap();
        assert_eq!(c.params().min_acceleration, 1.0);
    }

    #[test]
    fn custom_arity_mismatch_reverts_to_none() {
        let mut c = Configurator::new(STEP_RATE, true);
        let err = c.apply_command("Pcustom H0.3,0.6,1.0 T0.01,0.01", &mut ()).unwrap_err();
        assert_eq!(err, ConfigError::ArityMismatch);
        assert_eq!(c.params().shaper_type, ShaperType::None);
    }

    #[test]
    fn defaults_to_daa_when_no_type_ever_set_on_daa_capable_build() {
        let mut c = Configurator::new(STEP_RATE, true);
        c.apply_command("F40", &mut ()).unwrap();
        assert_eq!(c.params().shaper_type, ShaperType::Daa);
    }

    #[test]
    fn defaults_to_zvd_when_no_type_ever_set_without_daa() {
        let mut c = Configurator::new(STEP_RATE, false);
        c.apply_command("F40", &mut ()).unwrap();
        assert_eq!(c.params().shaper_type, ShaperType::Zvd);
    }

    #[test]
    fn report_strings_match_spec() {
        let mut c = Configurator::new(STEP_RATE, true);
        assert_eq!(c.report(), "Input shaping is disabled");
        c.apply_command("Pzvd F40 S0.1", &mut ()).unwrap();
        assert!(c.report().starts_with("Input shaping 'zvd' at 40Hz"));
    }
}

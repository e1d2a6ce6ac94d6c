use input_shaper::{ShaperParams, ShaperType};

const STEP_RATE: f32 = 750_000.0;

#[test]
fn ei2_matches_worked_example() {
    // spec.md §8 scenario 2: F=50, zeta=0.0.
    let p = ShaperParams::synthesize(ShaperType::Ei2, 50.0, 0.0, 1.0, STEP_RATE, None);
    assert_eq!(p.num_extra_impulses, 3);
    assert!((p.coefficients[0] - 0.16054).abs() < 1e-4);
    assert!((p.coefficients[1] - 0.49965).abs() < 1e-4);
    assert!((p.coefficients[2] - 0.84054).abs() < 1e-4);
    assert!((p.durations[0] - 0.0099780).abs() < 1e-5);
    assert!((p.durations[1] - 0.0099716).abs() < 1e-5);
    assert!((p.durations[2] - 0.0100344).abs() < 1e-5);
}

#[test]
fn ei2_has_three_strictly_increasing_impulses() {
    let p = ShaperParams::synthesize(ShaperType::Ei2, 50.0, 0.05, 1.0, STEP_RATE, None);
    assert_eq!(p.num_extra_impulses, 3);
    assert!(p.coefficients[0] > 0.0 && p.coefficients[0] < p.coefficients[1]);
    assert!(p.coefficients[1] < p.coefficients[2]);
    assert!(p.coefficients[2] < 1.0);
}

#[test]
fn ei3_has_four_strictly_increasing_impulses() {
    let p = ShaperParams::synthesize(ShaperType::Ei3, 50.0, 0.05, 1.0, STEP_RATE, None);
    assert_eq!(p.num_extra_impulses, 4);
    for i in 1..4 {
        assert!(p.coefficients[i] > p.coefficients[i - 1]);
    }
}

#[test]
fn overlapped_average_acceleration_retains_documented_formula() {
    let p = ShaperParams::synthesize(ShaperType::Zvd, 40.0, 0.1, 1.0, STEP_RATE, None);
    let n = p.num_extra_impulses as f32;
    let sum: f32 = p.overlapped.iter().take(p.num_extra_impulses * 2).map(|e| e.value).sum();
    let expected = sum / n + n;
    assert!((p.overlapped_average_acceleration - expected).abs() < 1e-5);
}

#[test]
fn total_duration_excludes_the_last_impulse_duration() {
    // spec.md §9 preserved open question: the lost-time loop sums only
    // `0..n-1`, so total_duration is one impulse short of the full sum.
    let p = ShaperParams::synthesize(ShaperType::Zvdd, 40.0, 0.2, 1.0, STEP_RATE, None);
    let full_sum: f32 = p.durations[..p.num_extra_impulses].iter().sum();
    assert!(p.total_duration < full_sum - 1e-6);
    assert!((p.total_duration - (full_sum - p.durations[p.num_extra_impulses - 1])).abs() < 1e-6);
}

#[test]
fn custom_respects_explicit_durations() {
    let amps = [0.25f32, 0.5, 0.75, 1.0];
    let durs = [0.01f32, 0.02, 0.015, 0.012];
    let p = ShaperParams::synthesize(
        ShaperType::Custom,
        40.0,
        0.0,
        1.0,
        STEP_RATE,
        Some(input_shaper::CustomImpulses { amplitudes: &amps, durations: Some(&durs) }),
    );
    assert_eq!(p.num_extra_impulses, 4);
    assert_eq!(p.durations[..4], durs);
}

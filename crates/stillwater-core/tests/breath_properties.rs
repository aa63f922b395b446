//! Property tests for the breath engine: phase order, progress bounds,
//! ratio normalization and calibration bounds.

use std::time::Duration;

use proptest::prelude::*;
use stillwater_core::breath::{
    calibrate, durations_from_cycle, ratios_from_durations, BreathDurations, BreathPacer,
    BreathPhase, NoopCues, PhaseBounds, Profile, Ratios, TapCalibrator, TapOutcome,
};
use stillwater_core::storage::clamp_level;
use stillwater_core::Event;

fn phase_len() -> impl Strategy<Value = f64> {
    0.1f64..8.0
}

fn positive_ratios() -> impl Strategy<Value = Ratios> {
    (0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0)
        .prop_filter("non-zero sum", |(a, b, c, d)| a + b + c + d > 1e-6)
        .prop_map(|(a, b, c, d)| Ratios::new(a, b, c, d))
}

proptest! {
    #[test]
    fn phases_follow_fixed_order(
        inhale in phase_len(),
        hold_high in phase_len(),
        exhale in phase_len(),
        hold_low in phase_len(),
        frames in prop::collection::vec(1u64..500, 1..400),
    ) {
        let durations = BreathDurations::new(inhale, hold_high, exhale, hold_low).unwrap();
        let mut pacer = BreathPacer::new();
        pacer.start(durations, &mut NoopCues);

        let mut expected = BreathPhase::Inhale;
        for ms in frames {
            if let Some(Event::PhaseEntered { phase, .. }) =
                pacer.tick(Duration::from_millis(ms), &mut NoopCues)
            {
                expected = expected.next();
                prop_assert_eq!(phase, expected);
            }
            prop_assert_eq!(pacer.phase(), expected);
        }
    }

    #[test]
    fn progress_stays_in_unit_range(
        inhale in phase_len(),
        frames in prop::collection::vec(0u64..3_000, 1..100),
    ) {
        let durations = BreathDurations::new(inhale, 1.0, 1.0, 1.0).unwrap();
        let mut pacer = BreathPacer::new();
        pacer.start(durations, &mut NoopCues);
        for ms in frames {
            pacer.tick(Duration::from_millis(ms), &mut NoopCues);
            let p = pacer.progress();
            prop_assert!((0.0..=1.0).contains(&p), "progress {p}");
            let s = pacer.scale();
            prop_assert!((0.6 - 1e-9..=1.0 + 1e-9).contains(&s), "scale {s}");
        }
    }

    #[test]
    fn normalize_is_idempotent(r in positive_ratios()) {
        let once = r.normalize();
        let twice = once.normalize();
        prop_assert!((once.sum() - 1.0).abs() < 1e-9);
        prop_assert!((once.inhale - twice.inhale).abs() < 1e-12);
        prop_assert!((once.hold_high - twice.hold_high).abs() < 1e-12);
        prop_assert!((once.exhale - twice.exhale).abs() < 1e-12);
        prop_assert!((once.hold_low - twice.hold_low).abs() < 1e-12);
    }

    #[test]
    fn calibrated_phases_stay_in_bounds(
        cycle in 6.0f64..=24.0,
        r in positive_ratios(),
        min in 0.1f64..2.0,
        span in 0.0f64..30.0,
    ) {
        let bounds = PhaseBounds::new(min, min + span).unwrap();
        let d = durations_from_cycle(cycle, r.normalize(), bounds);
        for phase in BreathPhase::ALL {
            let v = d.for_phase(phase);
            prop_assert!((bounds.min..=bounds.max).contains(&v), "{phase} = {v}");
        }
    }

    #[test]
    fn profile_durations_are_valid(cycle in 6.0f64..=24.0, idx in 0usize..Profile::ALL.len()) {
        let current = ratios_from_durations(&BreathDurations::default());
        let d = calibrate(cycle, Profile::ALL[idx], current, PhaseBounds::default());
        prop_assert!(d.validate().is_ok());
        prop_assert!(d.total() > 0.0);
    }

    #[test]
    fn mixer_levels_clamp(v in -10.0f64..10.0) {
        let c = clamp_level(v);
        prop_assert!((0.0..=1.0).contains(&c));
        if (0.0..=1.0).contains(&v) {
            prop_assert_eq!(c, v);
        }
    }
}

fn taps(first: f64, second: f64) -> TapOutcome {
    let mut cal = TapCalibrator::default();
    cal.tap(Duration::from_secs_f64(first));
    cal.tap(Duration::from_secs_f64(second))
}

#[test]
fn calibration_band_is_inclusive() {
    assert!(matches!(taps(10.0, 15.9), TapOutcome::Rejected { .. }));
    assert!(matches!(taps(10.0, 16.0), TapOutcome::Accepted { .. }));
    assert!(matches!(taps(10.0, 34.0), TapOutcome::Accepted { .. }));
    assert!(matches!(taps(10.0, 34.1), TapOutcome::Rejected { .. }));
}

#[test]
fn rejected_calibration_restarts_from_first_tap() {
    let mut cal = TapCalibrator::default();
    cal.tap(Duration::from_secs(0));
    assert!(matches!(
        cal.tap(Duration::from_secs(2)),
        TapOutcome::Rejected { .. }
    ));
    assert!(!cal.awaiting_second_tap());
    assert!(matches!(
        cal.tap(Duration::from_secs(20)),
        TapOutcome::AwaitingSecondTap { .. }
    ));
    assert_eq!(
        cal.tap(Duration::from_secs(30)),
        TapOutcome::Accepted {
            cycle_sec: 10.0,
            haptic: vec![8, 24, 8],
        }
    );
}

#[test]
fn stop_halts_all_transitions() {
    let mut pacer = BreathPacer::new();
    pacer.start(BreathDurations::default(), &mut NoopCues);
    assert!(pacer.stop().is_some());
    assert!(pacer.stop().is_none());
    for _ in 0..10 {
        assert!(pacer.tick(Duration::from_secs(30), &mut NoopCues).is_none());
    }
    assert_eq!(pacer.phase(), BreathPhase::Inhale);
}

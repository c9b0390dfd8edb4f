//! Unit tests for pw-model.

use pw_core::{Circuit, SimConstants, TireCompound, TrialRng};

use crate::{Caution, LapInputs};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn c3() -> TireCompound {
    TireCompound::preset("C3").unwrap()
}

fn circuit() -> Circuit {
    Circuit::new("Test", 5.0, 60, 90.0)
}

/// Constants with no lap-to-lap noise so terms can be asserted exactly.
fn quiet() -> SimConstants {
    SimConstants { lap_time_variation: 0.0, ..SimConstants::without_cautions() }
}

fn inputs<'a>(circuit: &'a Circuit, compound: &'a TireCompound) -> LapInputs<'a> {
    LapInputs {
        circuit,
        compound,
        tire_age_laps: 0,
        fuel_load_kg:  0.0,
        track_temp:    25.0,
        caution:       Caution::None,
        warming_up:    false,
    }
}

// ── TyreModel ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tyre {
    use super::*;
    use crate::{degradation, grip_multiplier, is_dry_capable, is_suitable};

    #[test]
    fn linear_before_cliff() {
        let c = c3();
        assert_eq!(degradation(&c, 0, 1.0), 0.0);
        assert!((degradation(&c, 10, 1.0) - 0.30).abs() < 1e-12);
        assert!((degradation(&c, 10, 2.0) - 0.60).abs() < 1e-12);
        assert!((degradation(&c, 30, 1.0) - 0.90).abs() < 1e-12);
    }

    #[test]
    fn accelerates_past_cliff() {
        let c = c3();
        let at_cliff = degradation(&c, c.cliff_lap, 1.0);
        for lap in (c.cliff_lap + 1)..(c.cliff_lap + 25) {
            let extra = degradation(&c, lap, 1.0) - at_cliff;
            let linear = c.degradation_rate * (lap - c.cliff_lap) as f64;
            assert!(extra > linear, "lap {lap}: {extra} <= {linear}");
        }
        // Cliff term: 0.03 * 10 * 0.5 on top of 0.03 * 40.
        assert!((degradation(&c, 40, 1.0) - (1.2 + 0.15)).abs() < 1e-12);
    }

    #[test]
    fn continuous_and_monotone() {
        let c = c3();
        let mut prev = -1.0;
        for lap in 0..80 {
            let d = degradation(&c, lap, 1.3);
            assert!(d >= prev, "lap {lap}");
            prev = d;
        }
        let before = degradation(&c, c.cliff_lap, 1.0);
        let after = degradation(&c, c.cliff_lap + 1, 1.0);
        assert!(after - before < 2.0 * c.degradation_rate, "no jump at the cliff");
    }

    #[test]
    fn grip_exact_inside_window() {
        let c = c3();
        assert_eq!(grip_multiplier(&c, 80.0), 1.0);
        assert_eq!(grip_multiplier(&c, 95.0), 1.0);
        assert_eq!(grip_multiplier(&c, 110.0), 1.0);
    }

    #[test]
    fn grip_penalty_is_asymmetric() {
        let c = c3();
        assert!((grip_multiplier(&c, 70.0) - 0.90).abs() < 1e-12);
        assert!((grip_multiplier(&c, 120.0) - 0.85).abs() < 1e-12);
    }

    #[test]
    fn grip_non_increasing_away_from_window_and_floored() {
        let c = c3();
        let mut prev = c.base_grip;
        for t in (0..80).rev() {
            let g = grip_multiplier(&c, t as f64);
            assert!(g <= prev && g >= 0.7, "cold {t}: {g}");
            prev = g;
        }
        let mut prev = c.base_grip;
        for t in 110..250 {
            let g = grip_multiplier(&c, t as f64);
            assert!(g <= prev && g >= 0.6, "hot {t}: {g}");
            prev = g;
        }
        assert_eq!(grip_multiplier(&c, -100.0), 0.7);
        assert_eq!(grip_multiplier(&c, 400.0), 0.6);
    }

    #[test]
    fn suitability_rules() {
        let slick = c3();
        let wet = TireCompound::preset("WET").unwrap();
        assert!(is_suitable(&slick, 95.0, false));
        assert!(!is_suitable(&slick, 95.0, true), "slick in the wet");
        assert!(is_suitable(&wet, 80.0, true));
        assert!(!is_suitable(&wet, 80.0, false), "wet tyre on a dry track");
        assert!(!is_suitable(&slick, 60.0, false), "below working range");
        assert!(!is_suitable(&slick, 130.0, false), "above working range");
        assert!(is_dry_capable(&slick));
        assert!(!is_dry_capable(&wet));
    }
}

// ── LapTimeModel ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod lap_time {
    use super::*;
    use crate::{ModelError, lap_time};

    #[test]
    fn fresh_tyre_at_optimal_temp_is_base_minus_drs() {
        let (circuit, c) = (circuit(), c3());
        let mut rng = TrialRng::new(1, 0);
        let b = lap_time(&inputs(&circuit, &c), &quiet(), &mut rng).unwrap();
        assert_eq!(b.grip, 1.0);
        assert_eq!(b.degradation, 0.0);
        assert!((b.total - (90.0 - 0.3)).abs() < 1e-9, "got {}", b.total);
    }

    #[test]
    fn terms_add_up() {
        let (circuit, c) = (circuit(), c3());
        let lap = LapInputs { tire_age_laps: 10, fuel_load_kg: 100.0, track_temp: 35.0, ..inputs(&circuit, &c) };
        let mut rng = TrialRng::new(1, 0);
        let b = lap_time(&lap, &quiet(), &mut rng).unwrap();
        assert!((b.degradation - 0.30).abs() < 1e-12);
        assert!((b.fuel - 3.0).abs() < 1e-12);
        assert!((b.temperature - 0.02).abs() < 1e-12);
        assert!((b.total - (90.0 + 0.30 + 3.0 + 0.02 - 0.3)).abs() < 1e-9);
    }

    #[test]
    fn higher_grip_is_faster() {
        let circuit = circuit();
        let soft = TireCompound::preset("C5").unwrap();
        let hard = TireCompound::preset("C1").unwrap();
        let mut rng = TrialRng::new(1, 0);
        let fast = lap_time(&inputs(&circuit, &soft), &quiet(), &mut rng).unwrap();
        let slow = lap_time(&inputs(&circuit, &hard), &quiet(), &mut rng).unwrap();
        assert!(fast.total < slow.total);
    }

    #[test]
    fn safety_car_scales_whole_lap() {
        let (circuit, c) = (circuit(), c3());
        let constants = quiet();
        let green = LapInputs { tire_age_laps: 20, fuel_load_kg: 50.0, ..inputs(&circuit, &c) };
        let sc = LapInputs { caution: Caution::SafetyCar, ..green.clone() };
        let mut rng = TrialRng::new(1, 0);
        let g = lap_time(&green, &constants, &mut rng).unwrap();
        let s = lap_time(&sc, &constants, &mut rng).unwrap();
        // DRS is neutralised under caution, everything else is scaled.
        let expected = (g.additive() + g.drs) * constants.safety_car_factor;
        assert!((s.total - expected).abs() < 1e-9);
        assert_eq!(s.drs, 0.0);
    }

    #[test]
    fn vsc_is_milder_than_safety_car() {
        let (circuit, c) = (circuit(), c3());
        let mut rng = TrialRng::new(1, 0);
        let vsc = lap_time(&LapInputs { caution: Caution::Vsc, ..inputs(&circuit, &c) }, &quiet(), &mut rng).unwrap();
        let sc = lap_time(&LapInputs { caution: Caution::SafetyCar, ..inputs(&circuit, &c) }, &quiet(), &mut rng).unwrap();
        assert!(vsc.total < sc.total);
        assert!(vsc.total > 90.0);
    }

    #[test]
    fn no_drs_without_zones() {
        let mut circuit = circuit();
        circuit.drs_zones = 0;
        let c = c3();
        let mut rng = TrialRng::new(1, 0);
        let b = lap_time(&inputs(&circuit, &c), &quiet(), &mut rng).unwrap();
        assert_eq!(b.drs, 0.0);
        assert!((b.total - 90.0).abs() < 1e-9);
    }

    #[test]
    fn warm_up_penalty_applies_when_flagged() {
        let (circuit, c) = (circuit(), c3());
        let mut rng = TrialRng::new(1, 0);
        let b = lap_time(&LapInputs { warming_up: true, ..inputs(&circuit, &c) }, &quiet(), &mut rng).unwrap();
        assert_eq!(b.warm_up, c.warm_up_penalty);
    }

    #[test]
    fn variation_stays_within_band_and_is_seeded() {
        let (circuit, c) = (circuit(), c3());
        let constants = SimConstants::without_cautions();
        let band = constants.lap_time_variation * circuit.base_lap_time;
        let mut a = TrialRng::new(9, 3);
        let mut b = TrialRng::new(9, 3);
        for _ in 0..200 {
            let x = lap_time(&inputs(&circuit, &c), &constants, &mut a).unwrap();
            let y = lap_time(&inputs(&circuit, &c), &constants, &mut b).unwrap();
            assert!(x.variation.abs() <= band);
            assert_eq!(x.total.to_bits(), y.total.to_bits());
        }
    }

    #[test]
    fn non_finite_wear_is_reported() {
        let circuit = circuit();
        let mut c = c3();
        c.cliff_factor = f64::INFINITY;
        let lap = LapInputs { tire_age_laps: c.cliff_lap + 2, ..inputs(&circuit, &c) };
        let mut rng = TrialRng::new(1, 0);
        let err = lap_time(&lap, &quiet(), &mut rng).unwrap_err();
        assert!(matches!(err, ModelError::NonFinite { term: "tyre degradation", .. }), "{err}");
    }
}

// ── PitStopModel ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod pit_stop {
    use super::*;
    use crate::pit_stop_cost;

    #[test]
    fn cost_within_bounds() {
        let constants = SimConstants::default();
        let mut rng = TrialRng::new(5, 0);
        for _ in 0..500 {
            let cost = pit_stop_cost(&constants, &mut rng);
            assert_eq!(cost.lane_s, 20.0);
            assert!((22.0..=23.5).contains(&cost.total()), "{}", cost.total());
        }
    }
}

// ── Weather ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod weather {
    use super::*;
    use crate::{TrialWeather, draw_weather};

    #[test]
    fn dry_circuit_stays_near_typical() {
        let mut circuit = circuit();
        circuit.rain_probability = 0.0;
        let constants = SimConstants::default();
        let mut rng = TrialRng::new(3, 0);
        for _ in 0..200 {
            let w = draw_weather(&circuit, &constants, &mut rng);
            assert!(!w.rain);
            assert!((w.track_temp - 25.0).abs() <= constants.temp_spread);
        }
    }

    #[test]
    fn certain_rain_cools_the_track() {
        let mut circuit = circuit();
        circuit.rain_probability = 1.0;
        let constants = SimConstants::default();
        let mut rng = TrialRng::new(3, 0);
        let w = draw_weather(&circuit, &constants, &mut rng);
        assert!(w.rain);
        assert!(w.track_temp <= 25.0 - constants.rain_cooling + 2.0 * constants.temp_spread);
    }

    #[test]
    fn tyre_temp_adds_offset() {
        let w = TrialWeather::typical(&circuit());
        assert_eq!(w.tyre_temp(&SimConstants::default()), 95.0);
    }
}

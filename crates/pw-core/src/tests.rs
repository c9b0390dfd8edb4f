//! Unit tests for pw-core primitives.

#[cfg(test)]
mod ids {
    use crate::{JobId, StrategyId};

    #[test]
    fn ordering_and_next() {
        assert!(StrategyId(0) < StrategyId(1));
        assert_eq!(JobId(7).next(), JobId(8));
    }

    #[test]
    fn display() {
        assert_eq!(StrategyId(3).to_string(), "StrategyId(3)");
        assert_eq!(JobId::from(12).to_string(), "JobId(12)");
    }
}

#[cfg(test)]
mod records {
    use crate::{Circuit, CompoundTable, CoreError, TireCompound};

    #[test]
    fn circuit_derived_metrics() {
        let c = Circuit::new("Test", 5.0, 60, 90.0);
        assert!((c.total_distance() - 300.0).abs() < 1e-9);
        assert!((c.average_speed_kph() - 200.0).abs() < 1e-9);
        assert!((c.total_race_time_estimate() - 5_400.0).abs() < 1e-9);
    }

    #[test]
    fn circuit_rejects_non_positive_lengths() {
        assert!(Circuit::new("a", 0.0, 60, 90.0).validate().is_err());
        assert!(Circuit::new("b", 5.0, 0, 90.0).validate().is_err());
        assert!(Circuit::new("c", 5.0, 60, -1.0).validate().is_err());
        assert!(Circuit::new("d", f64::NAN, 60, 90.0).validate().is_err());
        assert!(Circuit::new("ok", 5.0, 60, 90.0).validate().is_ok());
    }

    #[test]
    fn compound_rejects_empty_working_range() {
        let mut c = TireCompound::new("X", 1.0, 0.03, 30);
        c.working_range_min = 120.0;
        c.working_range_max = 120.0;
        let err = c.validate().unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { record: "compound", .. }), "{err}");
    }

    #[test]
    fn compound_rejects_non_positive_grip_and_negative_rate() {
        assert!(TireCompound::new("g", 0.0, 0.03, 30).validate().is_err());
        assert!(TireCompound::new("r", 1.0, -0.01, 30).validate().is_err());
    }

    #[test]
    fn compound_rejects_negative_or_nan_cliff_factor() {
        for bad in [-0.5, f64::NAN] {
            let mut c = TireCompound::new("X", 1.0, 0.03, 30);
            c.cliff_factor = bad;
            assert!(c.validate().is_err(), "cliff_factor {bad} accepted");
        }
        let mut c = TireCompound::new("X", 1.0, 0.03, 30);
        c.cliff_factor = 0.0;
        c.validate().unwrap();
    }

    #[test]
    fn presets_match_reference_values() {
        let c3 = TireCompound::preset("C3").unwrap();
        assert_eq!(c3.degradation_rate, 0.030);
        assert_eq!(c3.optimal_life, 30);
        assert_eq!(c3.cliff_lap, 30);
        assert_eq!(c3.base_grip, 1.00);

        let wet = TireCompound::preset("WET").unwrap();
        assert!(wet.wet_performance > 0.5);
        assert!(wet.dry_performance <= 0.5);
        assert!(TireCompound::preset("C9").is_none());
    }

    #[test]
    fn standard_table_is_valid_and_ordered() {
        let table = CompoundTable::standard();
        assert_eq!(table.len(), 7);
        for c in table.iter() {
            c.validate().unwrap();
        }
        let names: Vec<&str> = table.iter().map(|c| c.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn table_rejects_duplicates_and_reports_unknown() {
        let mut table = CompoundTable::new();
        table.insert(TireCompound::new("A", 1.0, 0.02, 30)).unwrap();
        let dup = table.insert(TireCompound::new("A", 1.0, 0.02, 30));
        assert!(matches!(dup, Err(CoreError::DuplicateCompound(_))));
        assert!(matches!(table.resolve("B"), Err(CoreError::UnknownCompound(_))));
        assert!(table.resolve("A").is_ok());
    }
}

#[cfg(test)]
mod config {
    use crate::config::per_lap_hazard;
    use crate::{CautionModel, EngineConfig, SimConstants};

    #[test]
    fn defaults_validate() {
        SimConstants::default().validate().unwrap();
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn per_lap_hazard_compounds_back_to_race_probability() {
        let laps = 60;
        let h = per_lap_hazard(0.15, laps);
        let race = 1.0 - (1.0 - h).powi(laps as i32);
        assert!((race - 0.15).abs() < 1e-12, "got {race}");
        assert_eq!(per_lap_hazard(0.0, laps), 0.0);
        assert_eq!(per_lap_hazard(1.0, laps), 1.0);
    }

    #[test]
    fn without_cautions_zeroes_hazards() {
        let c = SimConstants::without_cautions();
        assert_eq!(c.safety_car_hazard(60), 0.0);
        assert_eq!(c.vsc_hazard(60), 0.0);
    }

    #[test]
    fn caution_probabilities_are_per_lap_by_default() {
        let c = SimConstants::default();
        assert_eq!(c.caution_model, CautionModel::PerLap);
        assert_eq!(c.safety_car_hazard(60), c.safety_car_probability);
        assert_eq!(c.vsc_hazard(60), c.vsc_probability);

        let race = SimConstants { caution_model: CautionModel::PerRace, ..c };
        assert_eq!(race.safety_car_hazard(60), per_lap_hazard(0.15, 60));
        assert!(race.safety_car_hazard(60) < 0.15);
    }

    #[test]
    fn rejects_non_finite_constants() {
        let base = SimConstants::default();
        let cases = [
            SimConstants { pit_stop_time_max: f64::INFINITY, ..base.clone() },
            SimConstants { safety_car_factor: f64::INFINITY, ..base.clone() },
            SimConstants { vsc_factor: f64::INFINITY, safety_car_factor: f64::INFINITY, ..base.clone() },
            SimConstants { temp_optimal: f64::NAN, ..base.clone() },
            SimConstants { tyre_temp_offset: f64::NEG_INFINITY, ..base.clone() },
        ];
        for c in cases {
            assert!(c.validate().is_err(), "accepted {c:?}");
        }
    }

    #[test]
    fn rejects_inverted_caution_factors() {
        let c = SimConstants { vsc_factor: 1.5, safety_car_factor: 1.2, ..SimConstants::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_engine_fields() {
        let cfg = EngineConfig { trials: 0, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = EngineConfig { max_stops: 4, ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = EngineConfig { queue_limit: Some(0), ..EngineConfig::default() };
        assert!(cfg.validate().is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{TrialRng, derive_seed};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = TrialRng::new(12345, 0);
        let mut r2 = TrialRng::new(12345, 0);
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn different_trials_differ() {
        let mut r0 = TrialRng::new(1, 0);
        let mut r1 = TrialRng::new(1, 1);
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent trials should diverge");
    }

    #[test]
    fn uniform_in_bounds_and_degenerate() {
        let mut rng = TrialRng::new(0, 0);
        for _ in 0..1000 {
            let v = rng.uniform(2.0, 3.5);
            assert!((2.0..=3.5).contains(&v));
        }
        assert_eq!(rng.uniform(1.0, 1.0), 1.0);
        assert_eq!(rng.uniform_u32(4, 2), 4);
    }

    #[test]
    fn uniform_with_unbounded_interval_returns_low() {
        let mut rng = TrialRng::new(0, 0);
        assert_eq!(rng.uniform(2.0, f64::INFINITY), 2.0);
        assert_eq!(rng.uniform(f64::MIN, f64::MAX), f64::MIN);
        assert_eq!(rng.uniform(0.0, f64::NAN), 0.0);
    }

    #[test]
    fn gen_bool_extremes() {
        let mut rng = TrialRng::new(0, 0);
        assert!(!rng.gen_bool(0.0));
        assert!(rng.gen_bool(1.0));
        assert!(!rng.gen_bool(f64::NAN));
    }

    #[test]
    fn derive_seed_spreads_streams() {
        assert_ne!(derive_seed(42, 0), 42);
        assert_ne!(derive_seed(42, 0), derive_seed(42, 1));
        assert_eq!(derive_seed(42, 9), derive_seed(42, 9));
    }
}

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use crate::{CoreError, TrackType, load_circuits_reader, load_compounds_reader};

    const COMPOUNDS_CSV: &str = "\
name,base_grip,degradation_rate,optimal_life,cliff_lap,cliff_factor,dry_performance,wet_performance\n\
C3,1.00,0.030,30,30,0.5,1.0,0.0\n\
INTERMEDIATE,0.85,0.025,30,,,0.4,0.8\n\
";

    #[test]
    fn loads_compounds_with_defaults() {
        let table = load_compounds_reader(Cursor::new(COMPOUNDS_CSV)).unwrap();
        assert_eq!(table.len(), 2);
        let inter = table.get("INTERMEDIATE").unwrap();
        assert_eq!(inter.cliff_lap, 30, "cliff defaults to optimal life");
        assert_eq!(inter.cliff_factor, 0.5);
        assert_eq!(inter.wet_performance, 0.8);
    }

    #[test]
    fn invalid_compound_row_aborts_load() {
        let csv = "name,base_grip,degradation_rate,optimal_life\nBAD,0.0,0.03,30\n";
        let err = load_compounds_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecord { .. }), "{err}");
    }

    #[test]
    fn malformed_number_is_parse_error() {
        let csv = "name,base_grip,degradation_rate,optimal_life\nC1,abc,0.03,30\n";
        let err = load_compounds_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)), "{err}");
    }

    #[test]
    fn loads_circuits() {
        let csv = "\
name,lap_distance,total_laps,base_lap_time,typical_temp,rain_probability,track_type\n\
Monza,5.793,53,81.0,32,0.1,permanent\n\
Monaco,3.337,78,72.0,28,0.2,street\n\
";
        let circuits = load_circuits_reader(Cursor::new(csv)).unwrap();
        assert_eq!(circuits.len(), 2);
        assert_eq!(circuits[1].track_type, TrackType::Street);
        assert_eq!(circuits[0].total_laps, 53);
        assert_eq!(circuits[0].drs_zones, 2, "default DRS zones");
    }

    #[test]
    fn unknown_track_type_is_parse_error() {
        let csv = "name,lap_distance,total_laps,base_lap_time,track_type\nX,5.0,50,90.0,oval\n";
        assert!(matches!(load_circuits_reader(Cursor::new(csv)), Err(CoreError::Parse(_))));
    }
}

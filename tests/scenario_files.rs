//! The shipped scenario files parse, validate, and run.

use std::path::Path;

use claro_sim::config::ScenarioConfig;
use claro_sim::run_simulation;
use claro_sim::signals::AcademicPeriod;

fn load(name: &str) -> ScenarioConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name);
    ScenarioConfig::from_toml_file(&path).unwrap_or_else(|e| panic!("{name}: {e}"))
}

#[test]
fn shipped_scenarios_are_valid() {
    for name in ["baseline.toml", "exam_season.toml", "winter_break.toml"] {
        let cfg = load(name);
        let errors = cfg.validate();
        assert!(errors.is_empty(), "{name} should validate: {errors:?}");
    }
}

#[test]
fn baseline_file_matches_builtin_preset() {
    let file = load("baseline.toml");
    let preset = ScenarioConfig::baseline();
    assert_eq!(file.simulation.n_days, preset.simulation.n_days);
    assert_eq!(file.simulation.freq_minutes, preset.simulation.freq_minutes);
    assert_eq!(file.simulation.seed, preset.simulation.seed);
    assert_eq!(file.simulation.start, preset.simulation.start);
    assert_eq!(file.features.y_lags, preset.features.y_lags);
}

#[test]
fn exam_season_file_runs_with_event_and_holiday() {
    let mut cfg = load("exam_season.toml");
    cfg.simulation.n_days = 21;
    let out = run_simulation(&cfg).unwrap();
    assert_eq!(out.table.len(), 21 * 48);
    assert_eq!(out.table.lags(), &[1, 48]);
    assert!(out.records.iter().any(|r| r.calendar.period == AcademicPeriod::Exam));
    assert!(out.records.iter().any(|r| r.regime.special_event));
    assert!(out.records.iter().any(|r| r.regime.extended_hours));

    // 2025-06-02 is both an exam day and a holiday; the holiday wins.
    let holiday: Vec<_> = out
        .records
        .iter()
        .filter(|r| r.timestamp.date().to_string() == "2025-06-02")
        .collect();
    assert_eq!(holiday.len(), 48);
    assert!(holiday.iter().all(|r| !r.regime.open));
    assert!(holiday.iter().all(|r| r.calendar.period == AcademicPeriod::Holiday));
}

#[test]
fn unknown_keys_are_rejected() {
    let err = ScenarioConfig::from_toml_str("[simulation]\nn_dayz = 3\n").unwrap_err();
    assert_eq!(err.field, "toml");
}

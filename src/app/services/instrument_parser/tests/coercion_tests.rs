//! Tests for result coercion and unit disambiguation

use crate::app::services::instrument_parser::coercion::{
    ResultCoercer, UnitFailure, disambiguate_units,
};
use crate::profiles::{CoercionRules, Unit};

fn coerce(raw: &str) -> Option<f64> {
    let rules = CoercionRules::default();
    ResultCoercer::new(&rules).coerce(raw)
}

#[test]
fn test_zero_sentinels() {
    assert_eq!(coerce(""), Some(0.0));
    assert_eq!(coerce("ND"), Some(0.0));
    assert_eq!(coerce("--"), Some(0.0));
    assert_eq!(coerce("-- below range"), Some(0.0));
    assert_eq!(coerce("  ND  "), Some(0.0));
}

#[test]
fn test_sentinels_are_case_sensitive() {
    assert_eq!(coerce("nd"), None);
}

#[test]
fn test_numeric_values_clamp_to_zero() {
    assert_eq!(coerce("12.25"), Some(12.25));
    assert_eq!(coerce("-3.5"), Some(0.0));
    assert_eq!(coerce("0"), Some(0.0));
    assert_eq!(coerce("1e3"), Some(1000.0));
    assert_eq!(coerce(" 4.5 "), Some(4.5));
}

#[test]
fn test_non_numeric_values_rejected() {
    assert_eq!(coerce("abc"), None);
    assert_eq!(coerce("12,5"), None);
    assert_eq!(coerce("NaN"), None);
    assert_eq!(coerce("inf"), None);
}

#[test]
fn test_custom_rules() {
    let rules = CoercionRules {
        zero_prefix: String::new(),
        zero_values: vec!["<LOD".to_string()],
    };
    let coercer = ResultCoercer::new(&rules);

    assert_eq!(coercer.coerce("<LOD"), Some(0.0));
    assert_eq!(coercer.coerce(""), None);
    assert_eq!(coercer.coerce("--"), None);
}

#[test]
fn test_ppm_reading_to_percent() {
    let reading = disambiguate_units("12.3 ppm").unwrap();
    assert!((reading.ppm - 12.3).abs() < 1e-12);
    assert!((reading.primary(Unit::Pct) - 0.00123).abs() < 1e-12);
}

#[test]
fn test_ppm_marker_case_insensitive() {
    let reading = disambiguate_units("7 PPM").unwrap();
    assert!((reading.ppm - 7.0).abs() < 1e-12);
}

#[test]
fn test_percent_reading_to_ppm() {
    let reading = disambiguate_units("45%").unwrap();
    assert!((reading.pct - 45.0).abs() < 1e-12);
    assert!((reading.primary(Unit::Ppm) - 450000.0).abs() < 1e-6);
}

#[test]
fn test_units_undecided() {
    assert_eq!(disambiguate_units("12.3"), Err(UnitFailure::Undecided));
}

#[test]
fn test_units_without_number() {
    assert_eq!(disambiguate_units("n/a %"), Err(UnitFailure::NoNumber));
    assert_eq!(disambiguate_units("1.2.3 ppm"), Err(UnitFailure::NoNumber));
}

#[test]
fn test_negative_readings_clamp_to_zero() {
    let percent = disambiguate_units("-0.5 %").unwrap();
    assert_eq!(percent.pct, 0.0);
    assert_eq!(percent.ppm, 0.0);

    let ppm = disambiguate_units("-5 ppm").unwrap();
    assert_eq!(ppm.ppm, 0.0);
    assert_eq!(ppm.pct, 0.0);
}

#[test]
fn test_exponent_readings() {
    let percent = disambiguate_units("1.5E-3 %").unwrap();
    assert!((percent.pct - 0.0015).abs() < 1e-12);
    assert!((percent.ppm - 15.0).abs() < 1e-9);

    let ppm = disambiguate_units("2e2 ppm").unwrap();
    assert!((ppm.ppm - 200.0).abs() < 1e-12);
    assert!((ppm.pct - 0.02).abs() < 1e-12);
}

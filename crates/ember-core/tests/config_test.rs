//! Tests for the Ember configuration system.

use std::sync::Mutex;

use ember_core::config::EmberConfig;
use ember_core::errors::{ConfigError, EmberErrorCode};
use ember_core::types::{EnergyRating, InstallationType};

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all EMBER_ env vars to prevent cross-test contamination.
fn clear_ember_env_vars() {
    for key in [
        "EMBER_DELIVERY_INSTALLATION_TYPE",
        "EMBER_DELIVERY_PWM_PERIOD_SECS",
        "EMBER_DELIVERY_VALVE_ACTUATION_SECS",
        "EMBER_DELIVERY_TRANSPORT_DELAY_SECS",
        "EMBER_LEARNING_DIMINISHING_RATE",
        "EMBER_BUILDING_ENERGY_RATING",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_without_any_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_ember_env_vars();

    let dir = tempdir();
    let config = EmberConfig::load(dir.path()).unwrap();

    assert_eq!(
        config.delivery.effective_installation_type(),
        InstallationType::Radiator
    );
    assert_eq!(config.delivery.effective_pwm_period_secs(), 900.0);
    assert_eq!(config.learning.effective_diminishing_rate(), 0.10);
    assert_eq!(config.learning.effective_night_setback_bonus(), 0.20);
    assert_eq!(config.building.effective_outdoor_tau_hours(), 4.0);
}

#[test]
fn env_overrides_project_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_ember_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("ember.toml"),
        r#"
[delivery]
installation_type = "floor_hydronic"
pwm_period_secs = 1800.0
transport_delay_secs = 600.0

[building]
energy_rating = "A++"
"#,
    )
    .unwrap();

    std::env::set_var("EMBER_DELIVERY_PWM_PERIOD_SECS", "1200");
    let config = EmberConfig::load(dir.path()).unwrap();
    clear_ember_env_vars();

    assert_eq!(
        config.delivery.effective_installation_type(),
        InstallationType::FloorHydronic
    );
    assert_eq!(config.delivery.effective_pwm_period_secs(), 1200.0);
    assert_eq!(config.delivery.effective_transport_delay_secs(), 600.0);
    assert_eq!(config.building.energy_rating, Some(EnergyRating::APlus2));
    assert_eq!(config.building.effective_outdoor_tau_hours(), 7.0);
}

#[test]
fn invalid_toml_is_parse_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_ember_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("ember.toml"), "[delivery\nbroken").unwrap();

    let err = EmberConfig::load(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert_eq!(err.error_code(), "CONFIG_ERROR");
}

#[test]
fn validation_rejects_zero_period() {
    let config = EmberConfig::from_toml("[delivery]\npwm_period_secs = 0.0\n").unwrap();
    let err = EmberConfig::validate(&config).unwrap_err();
    match err {
        ConfigError::ValidationFailed { field, .. } => {
            assert_eq!(field, "delivery.pwm_period_secs")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn validation_rejects_diminishing_rate_above_one() {
    let config = EmberConfig::from_toml("[learning]\ndiminishing_rate = 1.5\n").unwrap();
    assert!(EmberConfig::validate(&config).is_err());
}

#[test]
fn toml_round_trip_preserves_values() {
    let config = EmberConfig::from_toml(
        r#"
[delivery]
installation_type = "convector"
valve_actuation_secs = 120.0

[learning]
high_duty_bonus = 0.25
"#,
    )
    .unwrap();

    let text = config.to_toml().unwrap();
    let reparsed = EmberConfig::from_toml(&text).unwrap();
    assert_eq!(
        reparsed.delivery.installation_type,
        Some(InstallationType::Convector)
    );
    assert_eq!(reparsed.delivery.valve_actuation_secs, Some(120.0));
    assert_eq!(reparsed.learning.effective_high_duty_bonus(), 0.25);
}

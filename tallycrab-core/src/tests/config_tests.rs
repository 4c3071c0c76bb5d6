use super::*;

#[test]
fn test_defaults_match_order_pipeline() {
    let config = EngineConfig::default();
    assert_eq!(config.window_size(), Duration::from_secs(60));
    assert_eq!(config.grace(), Duration::ZERO);
    assert_eq!(
        config.display_offset().unwrap(),
        FixedOffset::west_opt(5 * 3600).unwrap()
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_empty_toml_is_default() {
    let config = EngineConfig::from_toml_str("").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_toml_overrides() {
    let config = EngineConfig::from_toml_str(
        r#"
        window_size_ms = 10000
        grace_ms = 2000
        display_offset = "+01:00"
        parallelism = 4
        "#,
    )
    .unwrap();
    assert_eq!(config.window_size_ms, 10_000);
    assert_eq!(config.grace_ms, 2_000);
    assert_eq!(config.parallelism, 4);
    assert_eq!(config.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
    assert_eq!(
        config.display_offset().unwrap(),
        FixedOffset::east_opt(3600).unwrap()
    );
}

#[test]
fn test_unknown_field_rejected() {
    let err = EngineConfig::from_toml_str("window_sizes = 3").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn test_zero_window_rejected() {
    let config = EngineConfig {
        window_size_ms: 0,
        ..EngineConfig::default()
    };
    let err = config.validate().unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid {
            field: "window_size_ms",
            ..
        }
    ));
}

#[test]
fn test_offset_must_be_inside_window() {
    let config = EngineConfig {
        window_size_ms: 1_000,
        window_offset_ms: 1_000,
        ..EngineConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_parallelism_rejected() {
    let config = EngineConfig {
        parallelism: 0,
        ..EngineConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_parse_utc_offset_forms() {
    let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
    assert_eq!(parse_utc_offset("-05:00").unwrap(), minus_five);
    assert_eq!(parse_utc_offset("UTC-05:00").unwrap(), minus_five);
    assert_eq!(parse_utc_offset("UTC-5").unwrap(), minus_five);
    assert_eq!(parse_utc_offset("-0500").unwrap(), minus_five);
    assert_eq!(
        parse_utc_offset("+05:30").unwrap(),
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    );
    assert_eq!(parse_utc_offset("Z").unwrap(), FixedOffset::east_opt(0).unwrap());
    assert_eq!(parse_utc_offset("UTC").unwrap(), FixedOffset::east_opt(0).unwrap());
}

#[test]
fn test_parse_utc_offset_rejects_garbage() {
    for bad in ["EST", "05:00", "+25:00", "-05:75", "+", "+123:00", "America/New_York", "+1é2"] {
        assert!(parse_utc_offset(bad).is_err(), "{bad} should be rejected");
    }
}

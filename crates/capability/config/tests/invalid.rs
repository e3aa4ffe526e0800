use plc_config::{AppConfig, ConfigError};

#[test]
fn zero_interval_and_bad_port_are_rejected() {
    unsafe {
        std::env::set_var("PLC_POLL_INTERVAL_SECONDS", "0");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Invalid(key, _)) if key == "PLC_POLL_INTERVAL_SECONDS"
    ));

    unsafe {
        std::env::set_var("PLC_POLL_INTERVAL_SECONDS", "5");
        std::env::set_var("PLC_PORT", "70000");
    }
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::Invalid(key, value)) if key == "PLC_PORT" && value == "70000"
    ));
}

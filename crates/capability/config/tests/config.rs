use plc_config::AppConfig;

#[test]
fn load_config_from_env() {
    // Rust 2024 中 set_var 需要显式标注 unsafe（测试进程内可控）。
    unsafe {
        std::env::set_var("PLC_HTTP_ADDR", "127.0.0.1:8081");
        std::env::set_var("PLC_HOST", "10.0.0.5");
        std::env::set_var("PLC_PORT", "5020");
        std::env::set_var("PLC_POLL_INTERVAL_SECONDS", "2");
        std::env::set_var("PLC_AUTOSTART", "off");
        std::env::set_var("PLC_DEVICES_FILE", "");
    }

    let config = AppConfig::from_env().expect("config");
    assert_eq!(config.http_addr, "127.0.0.1:8081");
    assert_eq!(config.plc_host, "10.0.0.5");
    assert_eq!(config.plc_port, 5020);
    assert_eq!(config.poll_interval_seconds, 2);
    assert!(!config.autostart);
    assert!(config.devices_file.is_none());
    assert_eq!(config.error_cooldown_seconds, 10);
    assert_eq!(config.persist_retries, 1);
    assert_eq!(config.log_retention_days, 30);
    assert_eq!(config.fresh_window_seconds, 600);
}

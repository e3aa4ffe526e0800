use domain::{Device, Liveness, Reading, RegisterDataType};

#[test]
fn liveness_buckets_follow_window() {
    let window_ms = 600_000;
    let now_ms = 1_700_000_000_000;

    assert_eq!(Liveness::classify(None, now_ms, window_ms), Liveness::Unknown);
    assert_eq!(
        Liveness::classify(Some(now_ms - 1_000), now_ms, window_ms),
        Liveness::Fresh
    );
    assert_eq!(
        Liveness::classify(Some(now_ms - window_ms), now_ms, window_ms),
        Liveness::Fresh
    );
    assert_eq!(
        Liveness::classify(Some(now_ms - window_ms - 1), now_ms, window_ms),
        Liveness::Stale
    );
    // 时钟回拨
    assert_eq!(
        Liveness::classify(Some(now_ms + 5_000), now_ms, window_ms),
        Liveness::Fresh
    );
}

#[test]
fn register_data_type_decodes_signed_words() {
    assert_eq!(RegisterDataType::Uint16.decode(0xFFFF), 65535.0);
    assert_eq!(RegisterDataType::Int16.decode(0xFFFF), -1.0);
    assert_eq!(RegisterDataType::parse("INT16"), Some(RegisterDataType::Int16));
    assert_eq!(RegisterDataType::parse("float"), None);
}

#[test]
fn readings_carry_device_identity() {
    let device = Device::new("press-1", 802);
    assert_eq!(device.display_address(), "D802");

    let ok = Reading::success(&device, 12.0, 1000);
    assert!(ok.is_success());
    assert_eq!(ok.value, Some(12.0));

    let failed = Reading::failure(&device, "timeout", 2000);
    assert!(!failed.is_success());
    assert_eq!(failed.value, None);
    assert_eq!(failed.error.as_deref(), Some("timeout"));
    assert_eq!(failed.address, 802);
}

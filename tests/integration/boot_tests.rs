//! Integration tests for the boot-time config path: storage, WiFi
//! provisioning and the first connect.

use blindrelay::adapters::nvs::NvsAdapter;
use blindrelay::adapters::wifi::{ConnectivityPort, WifiAdapter};
use blindrelay::app::ports::ConfigPort;
use blindrelay::config::{self, SystemConfig, WifiCredentials};
use blindrelay::error::CommsError;

use crate::mock_hw::MockNvs;

const HOME: WifiCredentials<'static> = WifiCredentials {
    ssid: "HomeNet",
    password: "correct-horse",
};

#[test]
fn fresh_device_is_provisioned_and_connects() {
    let mut nvs = NvsAdapter::new().unwrap();
    let cfg = config::boot_config(Some(&mut nvs), Some(HOME));
    assert_eq!(cfg.wifi_ssid.as_str(), "HomeNet");

    let mut wifi = WifiAdapter::new(&cfg);
    assert_eq!(wifi.connect(), Ok(()));
    assert!(wifi.is_connected());

    // Written back, so the next boot needs no build-time credentials.
    let next = config::boot_config(Some(&mut nvs), None);
    assert_eq!(next, cfg);
}

#[test]
fn stored_credentials_win_over_build_time_ones() {
    let mut nvs = MockNvs::default();
    let mut stored = SystemConfig::default();
    stored
        .set_wifi_credentials(WifiCredentials {
            ssid: "Attic",
            password: "",
        })
        .unwrap();
    nvs.save(&stored).unwrap();

    let cfg = config::boot_config(Some(&mut nvs), Some(HOME));
    assert_eq!(cfg.wifi_ssid.as_str(), "Attic");
    assert_eq!(nvs.saves, 1);
}

#[test]
fn rejected_build_credentials_are_not_persisted() {
    let mut nvs = MockNvs::default();
    let bad = WifiCredentials {
        ssid: "HomeNet",
        password: "short",
    };
    let cfg = config::boot_config(Some(&mut nvs), Some(bad));
    assert!(!cfg.has_wifi_credentials());
    assert_eq!(nvs.saves, 0);
}

#[test]
fn unprovisioned_device_reports_missing_credentials() {
    let mut nvs = MockNvs::default();
    let cfg = config::boot_config(Some(&mut nvs), None);
    assert_eq!(WifiAdapter::new(&cfg).connect(), Err(CommsError::NoCredentials));
}

#[test]
fn invalid_stored_config_falls_back_to_defaults() {
    let mut nvs = MockNvs {
        stored: Some(SystemConfig {
            channel_count: 0,
            ..SystemConfig::default()
        }),
        saves: 0,
    };
    let cfg = config::boot_config(Some(&mut nvs), None);
    assert_eq!(cfg, SystemConfig::default());
}

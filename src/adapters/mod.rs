//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | RelayOutputPort    | 74HC595 relay bank       |
//! |                | IndicatorPort      | Status LED GPIO          |
//! | `http_server`  | -                  | ESP-IDF HTTP server      |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! | `time`         | ClockPort          | ESP32 system timer       |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA         |

pub mod hardware;
#[cfg(target_os = "espidf")]
pub mod http_server;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;

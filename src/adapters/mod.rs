//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter      | Implements          | Connects to                 |
//! |--------------|---------------------|-----------------------------|
//! | `console`    | AppCommand source   | UART0 line console (stdin)  |
//! | `hardware`   | AnalogPort          | ESP32 ADC1 (oneshot)        |
//! |              | RelayPort           | Relay GPIOs (active-low)    |
//! | `log_sink`   | EventSink           | Serial log output           |
//! | `nvs`        | ConfigPort          | NVS / in-memory store       |
//! | `presenters` | DisplayPort         | Serial LCD mirror           |
//! |              | TelemetryPort       | Serial JSON telemetry       |
//! | `time`       | ClockPort           | esp_timer + system clock    |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod presenters;
pub mod time;

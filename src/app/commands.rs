//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial console,
//! cloud, provisioning) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use crate::config::SystemConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(SystemConfig),

    /// Persist the current config on the next auto-save check.
    SaveConfig,
}

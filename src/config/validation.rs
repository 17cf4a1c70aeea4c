use crate::config::schema::{MonitorSettings, SystemConfig};
use crate::error::{Result, TaskpilotError};

/// Validate system configuration before it is saved from the settings page.
///
/// `SystemConfig::merge` never calls this; it is opt-in for callers.
pub fn validate_system_config(config: &SystemConfig) -> Result<()> {
    let mcp = &config.mcp_server;
    if !mcp.url.starts_with("http://") && !mcp.url.starts_with("https://") {
        return Err(TaskpilotError::Validation(format!(
            "Invalid MCP server url: {}. Must start with http:// or https://",
            mcp.url
        )));
    }

    if mcp.timeout_ms == 0 {
        return Err(TaskpilotError::Validation(
            "MCP server timeout must be greater than zero".to_string(),
        ));
    }

    let webhook = &config.notifications.webhook;
    if !webhook.is_empty() && !webhook.starts_with("http://") && !webhook.starts_with("https://")
    {
        return Err(TaskpilotError::Validation(format!(
            "Invalid webhook url: {}",
            webhook
        )));
    }

    if config.performance.max_concurrent_tasks == 0 {
        return Err(TaskpilotError::Validation(
            "Max concurrent tasks must be at least 1".to_string(),
        ));
    }

    Ok(())
}

pub fn validate_monitor_settings(settings: &MonitorSettings) -> Result<()> {
    if settings.refresh_interval_ms == 0 {
        return Err(TaskpilotError::Validation(
            "Monitor refresh interval must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

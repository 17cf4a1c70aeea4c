use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Dashboard-facing system configuration
    #[serde(default)]
    pub system: SystemConfig,

    /// Domain store write policies
    #[serde(default)]
    pub store: StoreSettings,

    /// Live metrics refresh
    #[serde(default)]
    pub monitor: MonitorSettings,
}

/// Singleton system configuration edited on the settings page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    #[serde(default)]
    pub mcp_server: McpServerConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

impl SystemConfig {
    /// Shallow merge: every section present in the patch replaces the current one.
    pub fn merge(&mut self, patch: SystemConfigPatch) {
        if let Some(mcp_server) = patch.mcp_server {
            self.mcp_server = mcp_server;
        }
        if let Some(notifications) = patch.notifications {
            self.notifications = notifications;
        }
        if let Some(performance) = patch.performance {
            self.performance = performance;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Partial update for [`SystemConfig`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_server: Option<McpServerConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceConfig>,
}

/// Remote MCP endpoint (not contacted by this crate)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct McpServerConfig {
    #[serde(default = "default_mcp_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    /// Request timeout in milliseconds
    #[serde(rename = "timeout", alias = "timeoutMs", default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            url: default_mcp_url(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationConfig {
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub slack: bool,
    /// Webhook URL, empty when disabled
    #[serde(default)]
    pub webhook: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceConfig {
    #[serde(default = "default_max_concurrent_tasks")]
    pub max_concurrent_tasks: u32,
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent_tasks(),
            log_retention_days: default_log_retention_days(),
        }
    }
}

/// What `add` does when the id is already present.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateIdPolicy {
    #[default]
    Reject,
    Overwrite,
}

/// Whether foreign keys and step edges are checked on write.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReferentialIntegrity {
    /// Accept every write; dangling references surface from `check_references`.
    #[default]
    Lenient,
    /// Reject writes that would introduce a dangling reference.
    Strict,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSettings {
    #[serde(default)]
    pub duplicate_ids: DuplicateIdPolicy,
    #[serde(default)]
    pub integrity: ReferentialIntegrity,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorSettings {
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            refresh_interval_ms: default_refresh_interval_ms(),
        }
    }
}

fn default_mcp_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_max_concurrent_tasks() -> u32 {
    5
}

fn default_log_retention_days() -> u32 {
    30
}

fn default_refresh_interval_ms() -> u64 {
    2000
}

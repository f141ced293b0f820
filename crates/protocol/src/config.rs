use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5001";
pub const DEFAULT_SUMMARY_DELAY_MS: u64 = 1200;
pub const DEFAULT_DEMO_AUTORUN_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Unset means requests wait as long as the backend takes.
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_summary_delay_ms")]
    pub summary_delay_ms: u64,
    #[serde(default = "default_demo_autorun_delay_ms")]
    pub demo_autorun_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: None,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            summary_delay_ms: DEFAULT_SUMMARY_DELAY_MS,
            demo_autorun_delay_ms: DEFAULT_DEMO_AUTORUN_DELAY_MS,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_summary_delay_ms() -> u64 {
    DEFAULT_SUMMARY_DELAY_MS
}

fn default_demo_autorun_delay_ms() -> u64 {
    DEFAULT_DEMO_AUTORUN_DELAY_MS
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("reports")
}

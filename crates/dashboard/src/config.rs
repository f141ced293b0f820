use anyhow::Context;
use protocol::config::DashboardConfig;
use std::path::Path;

use crate::cli::Args;

/// Reads and validates a dashboard config. Without a path the built-in
/// defaults are used.
pub(crate) fn load_dashboard_config(path: Option<&Path>) -> anyhow::Result<DashboardConfig> {
    let config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => DashboardConfig::default(),
    };
    validate_config(&config)?;
    Ok(config)
}

pub(crate) fn apply_overrides(config: &mut DashboardConfig, args: &Args) -> anyhow::Result<()> {
    if let Some(url) = &args.backend_url {
        config.backend.base_url = url.clone();
    }
    validate_config(config)
}

fn validate_config(config: &DashboardConfig) -> anyhow::Result<()> {
    let base_url = config.backend.base_url.trim();
    if base_url.is_empty() {
        anyhow::bail!("backend.base_url is empty");
    }
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        anyhow::bail!("backend.base_url must start with http:// or https://: {base_url}");
    }
    if config.backend.timeout_ms == Some(0) {
        anyhow::bail!("backend.timeout_ms must be greater than zero");
    }
    if config.export.report_dir.as_os_str().is_empty() {
        anyhow::bail!("export.report_dir is empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cupidsecure-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).expect("create dir");
        let path = dir.join(name);
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn loads_file_and_keeps_defaults() {
        let path = write_config(
            "dashboard.toml",
            r#"
[backend]
base_url = "https://risk.example.com"

[export]
report_dir = "out/reports"
"#,
        );
        let config = load_dashboard_config(Some(&path)).expect("load");
        assert_eq!(config.backend.base_url, "https://risk.example.com");
        assert_eq!(config.export.report_dir, PathBuf::from("out/reports"));
        assert_eq!(config.assistant.summary_delay_ms, 1200);
    }

    #[test]
    fn missing_path_uses_defaults() {
        let config = load_dashboard_config(None).expect("defaults");
        assert_eq!(config.backend.base_url, protocol::config::DEFAULT_BASE_URL);
    }

    #[test]
    fn rejects_non_http_backend() {
        let path = write_config("bad.toml", "[backend]\nbase_url = \"ftp://nope\"\n");
        let err = load_dashboard_config(Some(&path)).expect_err("invalid");
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let path = write_config("zero.toml", "[backend]\ntimeout_ms = 0\n");
        assert!(load_dashboard_config(Some(&path)).is_err());
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_dashboard_config(Some(Path::new("/nonexistent/dashboard.toml")))
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/dashboard.toml"));
    }

    #[test]
    fn cli_backend_url_wins() {
        let mut config = DashboardConfig::default();
        let args = Args::parse_from(["cupidsecure", "--backend-url", "http://10.0.0.5:5001"]);
        apply_overrides(&mut config, &args).expect("override");
        assert_eq!(config.backend.base_url, "http://10.0.0.5:5001");

        let args = Args::parse_from(["cupidsecure", "--backend-url", "localhost"]);
        assert!(apply_overrides(&mut config, &args).is_err());
    }
}

pub(crate) fn join_base_path(base: &str, path: &str) -> anyhow::Result<String> {
    if base.trim().is_empty() {
        anyhow::bail!("backend base_url is empty");
    }
    let normalized_base = base.trim().trim_end_matches('/');
    let normalized_path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    Ok(format!("{normalized_base}{normalized_path}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_without_doubling_slashes() {
        let url = join_base_path("http://127.0.0.1:5001/", "/api/analyze").expect("url");
        assert_eq!(url, "http://127.0.0.1:5001/api/analyze");
    }

    #[test]
    fn adds_missing_leading_slash() {
        let url = join_base_path("http://host", "report").expect("url");
        assert_eq!(url, "http://host/report");
    }

    #[test]
    fn rejects_blank_base() {
        assert!(join_base_path("  ", "/api/chat").is_err());
    }
}

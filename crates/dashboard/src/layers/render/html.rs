use protocol::{ImageFindings, COLOR_HIGH, COLOR_LOW};

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Rich block shown as the first insight card when a screenshot was analyzed.
pub(crate) fn analysis_block_html(findings: &ImageFindings) -> String {
    let risk_score = findings.risk_score.unwrap_or(0);
    let critical = risk_score >= 70;
    let (banner_class, banner_color, banner_label) = if critical {
        ("critical", COLOR_HIGH, "Critical Risk")
    } else {
        ("safe", COLOR_LOW, "Low Risk")
    };

    let mut html = String::from("<div class=\"analysis-summary\">");
    html.push_str(&format!(
        "<div class=\"score-banner {banner_class}\">\
         <div class=\"score-label\" style=\"color: {banner_color}\">{banner_label}<br><span>DETECTED</span></div>\
         <div class=\"score-value\" style=\"color: {banner_color}\">{risk_score}</div>\
         </div>"
    ));
    if let Some(scam_type) = non_empty(findings.scam_type.as_deref()) {
        html.push_str(&format!(
            "<div class=\"scam-type-chip\">{}</div>",
            escape_html(scam_type)
        ));
    }
    if !findings.red_flags.is_empty() {
        html.push_str("<div class=\"flags-grid\">");
        for flag in &findings.red_flags {
            let title = non_empty(flag.title.as_deref()).unwrap_or("Flag");
            let description = flag.description.as_deref().unwrap_or("");
            html.push_str(&format!(
                "<div class=\"flag-card\"><h5>{}</h5><p>{}</p></div>",
                escape_html(title),
                escape_html(description)
            ));
        }
        html.push_str("</div>");
    }
    if let Some(verdict) = non_empty(findings.verdict.as_deref()) {
        html.push_str(&format!(
            "<div class=\"verdict-box\"><strong>Verdict:</strong> {}</div>",
            escape_html(verdict)
        ));
    }
    html.push_str("</div>");
    html
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}

const BLOCK_TAGS: &[&str] = &["div", "p", "h4", "h5", "li", "ul"];

/// Flattens an HTML fragment for display in the terminal.
pub(crate) fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '<' {
            out.push(ch);
            continue;
        }
        let mut tag = String::new();
        for tag_ch in chars.by_ref() {
            if tag_ch == '>' {
                break;
            }
            tag.push(tag_ch);
        }
        let tag = tag.trim().to_ascii_lowercase();
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        if name == "br" || (tag.starts_with('/') && BLOCK_TAGS.contains(&name.as_str())) {
            out.push('\n');
        } else if name == "li" {
            out.push_str("• ");
        } else if name == "span" && !tag.starts_with('/') && !out.ends_with(['\n', ' ']) {
            out.push(' ');
        }
    }
    collapse_blank_lines(&unescape_entities(&out))
}

fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

fn collapse_blank_lines(text: &str) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for line in text.split('\n').map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

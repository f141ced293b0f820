pub(crate) mod html;
pub(crate) mod markdown;

pub(crate) use html::{analysis_block_html, escape_html, html_to_text};
pub(crate) use markdown::format_markdown;

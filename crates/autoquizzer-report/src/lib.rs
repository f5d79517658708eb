//! autoquizzer-report: Markdown and HTML renderings of quiz sessions.

pub mod html;
pub mod markdown;

pub use html::{generate_html, write_html_report};
pub use markdown::{mode_details, score_line, session_markdown};

//! Self-contained HTML rendering of a quiz session.

use anyhow::Result;
use std::path::Path;

use autoquizzer_core::report::{ModeRun, SessionReport};

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `report` as a standalone page with inline styles.
pub fn generate_html(report: &SessionReport) -> String {
    let topic = escape(&report.quiz.topic);
    let mut page = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Quiz: {topic}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n"
    );

    page.push_str(&format!(
        "<h1>{topic}</h1>\n<dl class=\"facts\">\
         <dt>Source</dt><dd><a href=\"{url}\">{url}</a></dd>\
         <dt>Model</dt><dd>{model}</dd>\
         <dt>Attempts</dt><dd>{attempts}</dd>\
         <dt>Created</dt><dd>{created}</dd></dl>\n",
        url = escape(&report.url),
        model = escape(&report.model),
        attempts = report.generation_attempts,
        created = report.created_at.format("%Y-%m-%d %H:%M UTC"),
    ));

    page.push_str(&scoreboard(report));
    for run in report.runs() {
        page.push_str(&mode_section(report, run));
    }
    page.push_str(&raw_json(report));

    page.push_str("</main>\n</body>\n</html>\n");
    page
}

fn scoreboard(report: &SessionReport) -> String {
    let mut rows = Vec::new();
    if let Some(user) = &report.user {
        rows.push(format!(
            "<tr><td>You</td><td>{:.0}%</td><td>{}/{}</td><td></td><td></td></tr>",
            user.percentage(),
            user.correct_count,
            user.total,
        ));
    }
    rows.extend(report.runs().map(|run| {
        format!(
            "<tr><td>{}</td><td>{:.0}%</td><td>{}/{}</td><td>{}</td><td>{:.1}s</td></tr>",
            run.mode.label(),
            run.score.percentage(),
            run.score.correct_count,
            run.score.total,
            run.fallback_count(),
            run.duration_ms as f64 / 1000.0,
        )
    }));

    let mut out = String::from("<section>\n<h2>Scores</h2>\n<table>\n");
    out.push_str(
        "<tr><th>Answered by</th><th>Score</th><th>Correct</th><th>Random picks</th><th>Time</th></tr>\n",
    );
    for row in rows {
        out.push_str(&row);
        out.push('\n');
    }
    out.push_str("</table>\n");

    if let Some(cmp) = report.compare_modes() {
        out.push_str(&format!(
            "<p class=\"note\">Both correct: {} &middot; Only closed book: {} &middot; \
             Only web RAG: {} &middot; Neither: {}</p>\n",
            cmp.both_correct, cmp.only_closed_book, cmp.only_web_rag, cmp.neither
        ));
    }
    out.push_str("</section>\n");
    out
}

fn mode_section(report: &SessionReport, run: &ModeRun) -> String {
    let mut out = format!(
        "<section>\n<h2>{}</h2>\n<ol class=\"answers\">\n",
        run.mode.label()
    );

    for detail in run.details(&report.quiz) {
        let verdict = if detail.correct { "right" } else { "wrong" };
        let marker = if detail.fallback {
            " <span class=\"tag\">random</span>"
        } else {
            ""
        };
        out.push_str(&format!(
            "<li class=\"{verdict}\"><p class=\"q\">{}</p>\
             <p>LLM: {}{marker}</p><p>Key: {}</p>",
            escape(&detail.question),
            escape(&detail.model_answer),
            escape(&detail.correct_answer),
        ));
        if !detail.snippets.is_empty() {
            out.push_str("<ul class=\"snippets\">");
            for snippet in &detail.snippets {
                out.push_str(&format!("<li>{}</li>", escape(&snippet.content)));
            }
            out.push_str("</ul>");
        }
        out.push_str("</li>\n");
    }

    out.push_str("</ol>\n</section>\n");
    out
}

fn raw_json(report: &SessionReport) -> String {
    let json = serde_json::to_string_pretty(report).unwrap_or_default();
    format!(
        "<details>\n<summary>Session JSON</summary>\n<pre>{}</pre>\n</details>\n",
        escape(&json)
    )
}

/// Write the rendered page to `path`, creating parent directories.
pub fn write_html_report(report: &SessionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, generate_html(report))?;
    Ok(())
}

const STYLE: &str = "
body { margin: 0; background: #f6f4ef; color: #2b2a27; font: 16px/1.5 Georgia, serif; }
main { max-width: 56rem; margin: 0 auto; padding: 2rem 1.5rem; }
h1 { border-bottom: 3px solid #b5651d; padding-bottom: .3rem; }
h2 { color: #7a4416; margin-top: 2.5rem; }
.facts { display: grid; grid-template-columns: max-content 1fr; gap: .2rem 1rem; }
.facts dt { font-weight: bold; }
.facts dd { margin: 0; }
table { border-collapse: collapse; }
th, td { padding: .35rem .9rem; border-bottom: 1px solid #d8d2c4; text-align: left; }
.note { font-style: italic; }
.answers > li { margin: .8rem 0; padding: .5rem .8rem; border-left: 4px solid #d8d2c4; }
.answers > li.right { border-color: #3c8d5a; }
.answers > li.wrong { border-color: #b33a3a; }
.answers p { margin: .15rem 0; }
.q { font-weight: bold; }
.tag { font-size: .75rem; background: #e9dfc9; padding: 0 .3rem; border-radius: 3px; }
.snippets { font-size: .9rem; color: #5b574e; }
pre { background: #ece7dc; padding: 1rem; overflow-x: auto; font-size: .8rem; }
";

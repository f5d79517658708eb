//! The `autoquizzer run` command.

use std::path::{Path, PathBuf};

use anyhow::Result;

use autoquizzer_core::engine::QuizEngine;
use autoquizzer_core::report::{AnswerMode, ModeRun, SessionReport};
use autoquizzer_core::statistics::{aggregate, AggregateStats};
use autoquizzer_providers::config::load_config_from;
use autoquizzer_report::html::write_html_report;
use autoquizzer_report::markdown::session_markdown;

use super::build_engine;

pub async fn execute(
    urls: Vec<String>,
    output: Option<PathBuf>,
    format: String,
    seed: Option<u64>,
    skip_web_rag: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let engine = build_engine(&config, seed, !skip_web_rag)?;
    let output = output.unwrap_or_else(|| config.output_dir.clone());

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html", "md"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    eprintln!(
        "autoquizzer v{}: {} page(s) with {}",
        env!("CARGO_PKG_VERSION"),
        urls.len(),
        config.default_model
    );

    let mut reports = Vec::with_capacity(urls.len());
    let mut failed = 0;
    for url in &urls {
        match run_session(&engine, url, &config.default_model, skip_web_rag).await {
            Ok(report) => {
                save_outputs(&report, &output, &formats)?;
                reports.push(report);
            }
            Err(e) => {
                eprintln!("  ERROR: {url}: {e:#}");
                failed += 1;
            }
        }
    }

    if reports.is_empty() {
        anyhow::bail!("no session completed ({failed} failed)");
    }

    print_summary(&reports, &aggregate(&reports));
    if failed > 0 {
        eprintln!("{failed} page(s) failed.");
    }
    Ok(())
}

async fn run_session(
    engine: &QuizEngine,
    url: &str,
    model: &str,
    skip_web_rag: bool,
) -> Result<SessionReport> {
    eprintln!("  Generating: {url}");
    let generated = engine.synthesize_with_retry(url).await?;
    let mut report = SessionReport::new(url, model, generated.quiz, generated.attempts);

    let mut modes = vec![AnswerMode::ClosedBook];
    if !skip_web_rag {
        modes.push(AnswerMode::WebRag);
    }
    for mode in modes {
        let run = engine.run_mode(&report.quiz, mode).await?;
        eprintln!(
            "  Done: {url} [{mode}] {}/{} ({}ms)",
            run.score.correct_count, run.score.total, run.duration_ms
        );
        report.record(run);
    }

    Ok(report)
}

fn save_outputs(report: &SessionReport, output: &Path, formats: &[&str]) -> Result<()> {
    std::fs::create_dir_all(output)?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    let stem = format!("session-{timestamp}-{}", &report.id.simple().to_string()[..8]);

    for fmt in formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            "md" => {
                let path = output.join(format!("{stem}.md"));
                std::fs::write(&path, session_markdown(report))?;
                eprintln!("Markdown report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }
    Ok(())
}

fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

fn print_summary(reports: &[SessionReport], stats: &AggregateStats) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec![
        "Page",
        "Topic",
        "Attempts",
        "Closed book",
        "Web RAG",
        "Answer tokens",
    ]);

    for report in reports {
        let score = |run: Option<&ModeRun>| {
            run.map(|r| percent(r.score.fraction))
                .unwrap_or_else(|| "-".to_string())
        };
        table.add_row(vec![
            Cell::new(&report.url),
            Cell::new(&report.quiz.topic),
            Cell::new(report.generation_attempts),
            Cell::new(score(report.closed_book.as_ref())),
            Cell::new(score(report.web_rag.as_ref())),
            Cell::new(
                report
                    .runs()
                    .map(|r| r.token_usage.total_tokens)
                    .sum::<u32>(),
            ),
        ]);
    }

    eprintln!("\n{table}");

    let mut totals = Table::new();
    totals.set_header(vec!["Mode", "Sessions", "Correct", "Mean score", "Fallback rate"]);
    for mode_stats in [&stats.closed_book, &stats.web_rag].into_iter().flatten() {
        totals.add_row(vec![
            Cell::new(mode_stats.mode.label()),
            Cell::new(mode_stats.sessions),
            Cell::new(format!(
                "{}/{}",
                mode_stats.total_correct, mode_stats.total_questions
            )),
            Cell::new(percent(mode_stats.mean_fraction)),
            Cell::new(percent(mode_stats.fallback_rate)),
        ]);
    }
    eprintln!("{totals}");

    if let Some(lift) = stats.web_rag_lift {
        eprintln!("Web RAG lift: {:+.0} points", lift * 100.0);
    }
}

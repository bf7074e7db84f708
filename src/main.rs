use anyhow::{Context, Result};
use dotenv::dotenv;
use log::info;
use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

use scan_browser::services::filters::issue_category;
use scan_browser::{ApiClient, Browser, FacetSet, FilterSelection, Level, RepoId, View};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let raw = env::args()
        .nth(1)
        .context("usage: scan-browser <user/repository>")?;
    let repo = RepoId::parse(&raw)?;

    let base_url = env::var("SCAN_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let poll_ms = env::var("POLL_INTERVAL_MS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1000);

    let api = ApiClient::new(&base_url)?;
    let mut browser = Browser::new(api).with_poll_interval(Duration::from_millis(poll_ms));

    browser.submit(&repo).await?;
    info!("scan queued for {}", repo);

    let token = browser.open(repo);
    if let Some(view) = browser.run(token).await {
        render(&browser, &view);
    }

    Ok(())
}

fn render(browser: &Browser, view: &View) {
    match view {
        View::Loading => println!("Still loading..."),
        View::Failed(message) => println!("Uh oh! We encountered an error: {}.", message),
        View::NoSourceFiles => println!("No source files found."),
        View::NoIssues => {
            println!("Awesome! No issues found!");
            render_stats(browser);
        }
        View::NoMatch { total } => {
            println!(
                "No issues matched given filters (of total {} issues).",
                total
            );
            render_stats(browser);
        }
        View::Issues(issues) => {
            if let (Some(facets), Some(selection)) = (browser.facets(), browser.selection()) {
                render_filters(facets, selection);
            }
            for issue in issues {
                println!();
                println!("{} (line {})", issue.file, issue.line);
                println!(
                    "  {} [severity: {:?}, confidence: {:?}]",
                    issue_category(&issue.details),
                    issue.severity,
                    issue.confidence
                );
                for line in issue.code.lines() {
                    println!("  | {}", line);
                }
            }
            println!();
            render_stats(browser);
        }
    }
}

fn render_filters(facets: &FacetSet, selection: &FilterSelection) {
    let levels = |set: &BTreeSet<Level>| {
        set.iter()
            .map(|level| format!("{:?}", level))
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!(
        "Filters: severity [{}] of [{}], confidence [{}] of [{}], issue type: {}",
        levels(&selection.severities),
        levels(&facets.severities),
        levels(&selection.confidences),
        levels(&facets.confidences),
        selection.issue_type.as_deref().unwrap_or("(all)")
    );
}

fn render_stats(browser: &Browser) {
    if let (Some(metrics), Some(time)) = (browser.metrics(), browser.updated_at()) {
        println!(
            "Last updated {}. Scanned {} files with {} lines of code.",
            time.to_rfc3339(),
            metrics.files,
            metrics.lines
        );
    }
}

// src/pipeline/batch.rs

//! Batch course scraping pipeline.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{AppError, Result};
use crate::models::{BatchEntry, Config, Course};
use crate::services::{PageSource, ScheduleParser};
use crate::utils::Retry;

/// A page that could not be turned into a course.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub sln: String,
    pub error: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub page_total: usize,
    pub course_count: usize,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    pub fn success_rate(&self) -> f64 {
        if self.page_total == 0 {
            return 1.0;
        }
        self.course_count as f64 / self.page_total as f64
    }
}

/// Fetch, parse and emit every entry, one page at a time.
///
/// Each course is written as one JSON line to `out`. A page that fails to
/// fetch (after retries) or parse is logged and skipped; write errors abort
/// the run.
pub async fn run_batch<W>(
    config: &Config,
    entries: &[BatchEntry],
    source: &dyn PageSource,
    parser: &ScheduleParser<'_>,
    out: &mut W,
) -> Result<BatchOutcome>
where
    W: AsyncWrite + Unpin,
{
    let started_at = Utc::now();
    let retry = Retry::from_config(&config.retry);
    let delay = Duration::from_millis(config.http.request_delay_ms);

    log::info!("Processing {} course pages", entries.len());

    let mut course_count = 0;
    let mut failures = Vec::new();

    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 && delay.as_millis() > 0 {
            tokio::time::sleep(delay).await;
        }

        let result: Result<Course> = async {
            let html = retry
                .run(AppError::is_transient, || source.fetch_page(entry))
                .await?;
            parser
                .parse_html(&html, &config.schedule, &entry.quarter, &entry.year)
                .await
        }
        .await;

        match result {
            Ok(course) => {
                let mut line = serde_json::to_string(&course)?;
                line.push('\n');
                out.write_all(line.as_bytes()).await?;
                course_count += 1;
                log::debug!("SLN {}: {}", entry.sln, course.offering_key());
            }
            Err(e) => {
                log::warn!("Failed to process SLN {}: {}", entry.sln, e);
                failures.push(BatchFailure {
                    sln: entry.sln.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    out.flush().await?;

    let outcome = BatchOutcome {
        started_at,
        finished_at: Utc::now(),
        page_total: entries.len(),
        course_count,
        failures,
    };

    log::info!(
        "Parsed {}/{} pages ({:.0}%) in {}s",
        outcome.course_count,
        outcome.page_total,
        outcome.success_rate() * 100.0,
        (outcome.finished_at - outcome.started_at).num_seconds()
    );
    Ok(outcome)
}

//! `pagescribe watch`: re-extract whenever a page file settles after changes.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use pagescribe::{Config, Extractor, MutationOrigin, RefreshScheduler, StructuredRecord};
use tracing::{info, warn};

use super::{parse_document, render};
use crate::status::Status;

/// How often the file is checked for changes.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct WatchArgs {
    pub html: PathBuf,
    pub url: Option<String>,
    /// Overrides the configured quiet period.
    pub quiet_ms: Option<u64>,
    pub compact: bool,
}

/// Extract once, then again after each burst of file changes has been quiet
/// for the scheduler's quiet period. Stops when `on_refresh` returns `false`.
pub async fn watch_file<F>(
    path: &Path,
    url: Option<&str>,
    extractor: &Extractor,
    scheduler: &mut RefreshScheduler,
    poll: Duration,
    mut on_refresh: F,
) -> anyhow::Result<()>
where
    F: FnMut(&StructuredRecord) -> bool,
{
    let mut last = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let record = extractor.extract(&parse_document(&last, path, url)?);
    if !on_refresh(&record) {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(poll);
    loop {
        ticker.tick().await;
        let now = Instant::now();
        match tokio::fs::read_to_string(path).await {
            Ok(current) if current != last => {
                last = current;
                scheduler.note_mutation(now, MutationOrigin::External);
            }
            Ok(_) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "page unreadable, keeping last snapshot"),
        }

        if scheduler.poll(now) {
            let record = extractor.extract(&parse_document(&last, path, url)?);
            info!(status = %Status::Refreshed, "page settled");
            if !on_refresh(&record) {
                return Ok(());
            }
        }
    }
}

/// Watch until interrupted, printing each record.
pub async fn run(args: &WatchArgs, config: &Config, extractor: &Extractor) -> anyhow::Result<Status> {
    let quiet = args
        .quiet_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.refresh.quiet_period());
    let mut scheduler = RefreshScheduler::new(quiet);
    info!(path = %args.html.display(), quiet_ms = quiet.as_millis() as u64, "watching");

    let compact = args.compact;
    let watch = watch_file(
        &args.html,
        args.url.as_deref(),
        extractor,
        &mut scheduler,
        POLL_INTERVAL,
        |record| {
            match render(record, compact) {
                Ok(text) => println!("{text}"),
                Err(e) => warn!(error = %e, "failed to render record"),
            }
            eprintln!("{}", Status::Refreshed);
            true
        },
    );

    tokio::select! {
        result = watch => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
    }
    Ok(Status::Refreshed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(win_rate: u32) -> String {
        format!("<body><dl><dt>Win Rate</dt><dd>{win_rate}%</dd></dl></body>")
    }

    #[tokio::test]
    async fn test_burst_of_changes_refreshes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, page(10)).unwrap();

        let writer_path = path.clone();
        let writer = tokio::spawn(async move {
            for pct in [20, 30, 40] {
                tokio::time::sleep(Duration::from_millis(10)).await;
                tokio::fs::write(&writer_path, page(pct)).await.unwrap();
            }
        });

        let mut seen = Vec::new();
        let mut scheduler = RefreshScheduler::new(Duration::from_millis(200));
        let extractor = Extractor::default();
        let watch = watch_file(
            &path,
            None,
            &extractor,
            &mut scheduler,
            Duration::from_millis(5),
            |record| {
                seen.push(record.labeled_values.get("Win Rate").unwrap_or_default().to_string());
                seen.len() < 2
            },
        );
        tokio::time::timeout(Duration::from_secs(5), watch)
            .await
            .expect("watch finished in time")
            .unwrap();
        writer.await.unwrap();

        assert_eq!(seen, vec!["10%", "40%"]);
    }

    #[tokio::test]
    async fn test_missing_page_is_error() {
        let mut scheduler = RefreshScheduler::default();
        let result = watch_file(
            Path::new("/definitely/not/here.html"),
            None,
            &Extractor::default(),
            &mut scheduler,
            POLL_INTERVAL,
            |_| true,
        )
        .await;
        assert!(result.is_err());
    }
}

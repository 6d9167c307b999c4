//! Retrieval session to JSONL file

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use oanet_core::{JsonlWriter, ProgressContext, fmt_num, upgrade_to_bar};

use crate::api::{ApiClient, Transport};
use crate::config::Query;

/// Fetch every record matching `query` into a JSONL file at `path`.
///
/// Records go to `<path>.tmp`, renamed over `path` once the session
/// completes. On failure only the tmp file is removed, so an existing
/// output from an earlier run is left untouched.
pub fn fetch_to_jsonl<T: Transport>(
    client: &ApiClient<T>,
    query: &Query,
    path: &Path,
    progress: &ProgressContext,
) -> anyhow::Result<RunSummary> {
    let start = Instant::now();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create output dir {}", parent.display()))?;
    }
    let tmp_path = tmp_path_for(path)?;

    // Clean up stale tmp file
    if tmp_path.exists() {
        fs::remove_file(&tmp_path)
            .with_context(|| format!("Cannot remove stale {}", tmp_path.display()))?;
    }
    let file = File::create(&tmp_path)
        .with_context(|| format!("Cannot create {}", tmp_path.display()))?;

    log::info!("Fetching {} into {}...", query.entity, path.display());
    let result = write_session(client, query, file, progress).and_then(|counts| {
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Cannot move output into {}", path.display()))?;
        Ok(counts)
    });

    match result {
        Ok((records, pages)) => {
            let summary = RunSummary {
                records,
                pages,
                elapsed: start.elapsed(),
            };
            summary.log();
            Ok(summary)
        }
        Err(e) => {
            if let Err(rm) = fs::remove_file(&tmp_path) {
                log::warn!("Failed to remove partial {}: {rm}", tmp_path.display());
            }
            Err(e)
        }
    }
}

/// `<dir>/<name>.tmp` next to the final output
fn tmp_path_for(path: &Path) -> anyhow::Result<PathBuf> {
    let name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let mut tmp = name.to_os_string();
    tmp.push(".tmp");
    Ok(path.with_file_name(tmp))
}

fn write_session<T: Transport>(
    client: &ApiClient<T>,
    query: &Query,
    file: File,
    progress: &ProgressContext,
) -> anyhow::Result<(usize, usize)> {
    let pb = progress.record_bar(query.entity.api_path());
    let mut pager = client.entities(query);
    let mut writer = JsonlWriter::new(file);
    let mut bar_ready = false;

    while let Some(record) = pager.next() {
        let record = record.with_context(|| format!("Retrieval of {} failed", query.entity))?;
        writer.write(&record).context("Failed to write record")?;
        if !bar_ready {
            if let Some(total) = pager.total() {
                upgrade_to_bar(&pb, total as u64);
            }
            bar_ready = true;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let records = writer.finish().context("Failed to flush output")?;
    Ok((records, pager.pages_fetched()))
}

/// Summary of one retrieval session
#[derive(Debug)]
pub struct RunSummary {
    pub records: usize,
    pub pages: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn empty() -> Self {
        Self {
            records: 0,
            pages: 0,
            elapsed: Duration::ZERO,
        }
    }

    pub fn log(&self) {
        log::info!(
            "Fetched {} records in {} pages ({:.1}s)",
            fmt_num(self.records),
            self.pages,
            self.elapsed.as_secs_f64()
        );
        if self.records > 0 && !self.elapsed.is_zero() {
            let per_sec = self.records as f64 / self.elapsed.as_secs_f64();
            log::info!("Throughput: {per_sec:.0} records/sec");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use oanet_core::{HttpResponse, StreamError, read_jsonl};
    use serde_json::json;
    use tempfile::TempDir;

    use crate::config::ApiConfig;
    use crate::state::{Entity, PagingMode};

    /// Two pages of works, optionally failing on the second
    struct TwoPages {
        calls: Cell<usize>,
        fail_second: bool,
    }

    impl Transport for TwoPages {
        fn get(&self, _: &str, _: &[(String, String)]) -> Result<HttpResponse, StreamError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            if n == 1 && self.fail_second {
                return Ok(HttpResponse {
                    status: 503,
                    body: "Service Unavailable".to_string(),
                });
            }
            let results: Vec<_> = (n * 2..n * 2 + 2)
                .map(|i| json!({"id": format!("W{i}"), "referenced_works": []}))
                .collect();
            Ok(HttpResponse {
                status: 200,
                body: json!({"meta": {"count": 4, "per_page": 2}, "results": results}).to_string(),
            })
        }
    }

    fn api(fail_second: bool) -> ApiClient<TwoPages> {
        let config = ApiConfig {
            paging: PagingMode::Offset,
            per_page: 2,
            email: None,
            ..ApiConfig::default()
        };
        ApiClient::with_transport(
            config,
            TwoPages {
                calls: Cell::new(0),
                fail_second,
            },
        )
    }

    #[test]
    fn writes_all_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("works.jsonl");
        let progress = ProgressContext::with_tty(false);

        let summary =
            fetch_to_jsonl(&api(false), &Query::new(Entity::Works), &path, &progress).unwrap();
        assert_eq!(summary.records, 4);
        assert_eq!(summary.pages, 2);

        let ids: Vec<String> = read_jsonl(&path)
            .unwrap()
            .map(|r| r.unwrap().id().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["W0", "W1", "W2", "W3"]);
    }

    #[test]
    fn failure_removes_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("works.jsonl");
        let progress = ProgressContext::with_tty(false);

        let err = fetch_to_jsonl(&api(true), &Query::new(Entity::Works), &path, &progress)
            .unwrap_err();
        assert!(format!("{err:#}").contains("503"));
        assert!(!path.exists());
        assert!(!dir.path().join("works.jsonl.tmp").exists());
    }

    #[test]
    fn failure_keeps_previous_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("works.jsonl");
        fs::write(&path, "{\"id\":\"W1\"}\n").unwrap();
        let progress = ProgressContext::with_tty(false);

        assert!(fetch_to_jsonl(&api(true), &Query::new(Entity::Works), &path, &progress).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"id\":\"W1\"}\n");
        assert!(!dir.path().join("works.jsonl.tmp").exists());
    }

    #[test]
    fn success_replaces_output_and_stale_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("works.jsonl");
        fs::write(&path, "{\"id\":\"OLD\"}\n").unwrap();
        fs::write(dir.path().join("works.jsonl.tmp"), "garbage").unwrap();
        let progress = ProgressContext::with_tty(false);

        let summary =
            fetch_to_jsonl(&api(false), &Query::new(Entity::Works), &path, &progress).unwrap();
        assert_eq!(summary.records, 4);
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(!text.contains("OLD"));
        assert!(!dir.path().join("works.jsonl.tmp").exists());
    }

    #[test]
    fn tmp_path_sits_next_to_output() {
        let tmp = tmp_path_for(Path::new("out/works.jsonl")).unwrap();
        assert_eq!(tmp, Path::new("out/works.jsonl.tmp"));
        assert!(tmp_path_for(Path::new("..")).is_err());
    }

    #[test]
    fn run_summary_log_does_not_panic() {
        RunSummary::empty().log();
        RunSummary {
            records: 1_000,
            pages: 5,
            elapsed: Duration::from_secs(2),
        }
        .log();
    }
}

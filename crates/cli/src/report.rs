//! Human-readable progress and summary output.

use std::fmt::Write;
use std::path::Path;
use tokio::sync::mpsc;

use transcribe_core::{BatchSummary, JobResult, ProgressEvent, ProgressStatus};

/// Writes one line per finished file to `out` until the channel closes.
pub async fn print_progress<W: std::io::Write>(
    mut rx: mpsc::UnboundedReceiver<ProgressEvent>,
    total: usize,
    mut out: W,
) -> W {
    let mut finished = 0;
    while let Some(event) = rx.recv().await {
        if let Some(line) = progress_line(&event, &mut finished, total) {
            let _ = writeln!(out, "{}", line);
        }
    }
    out
}

fn progress_line(event: &ProgressEvent, finished: &mut usize, total: usize) -> Option<String> {
    let label = match event.status {
        ProgressStatus::Started => return None,
        ProgressStatus::Completed => "done",
        ProgressStatus::Skipped => "skipped",
        ProgressStatus::Failed => "FAILED",
    };
    *finished += 1;
    Some(format!(
        "[{}/{}] {:<7} {}",
        finished,
        total,
        label,
        file_name(&event.path)
    ))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Renders the end-of-batch summary and the cause of every failure.
pub fn render_summary(summary: &BatchSummary) -> String {
    let mut out = String::new();
    let elapsed = summary.elapsed().num_milliseconds().max(0) as f64 / 1000.0;

    let _ = writeln!(out, "Batch summary");
    let _ = writeln!(out, "  Total:      {}", summary.total_files);
    let _ = writeln!(out, "  Successful: {}", summary.successful);
    let _ = writeln!(out, "  Failed:     {}", summary.failed);
    let _ = writeln!(out, "  Skipped:    {}", summary.skipped);
    let _ = writeln!(out, "  Success:    {:.1}%", summary.success_rate());
    let _ = writeln!(out, "  Elapsed:    {:.1}s", elapsed);

    let mut failures: Vec<&JobResult> = summary.failures().collect();
    if !failures.is_empty() {
        failures.sort_by(|a, b| a.input_path.cmp(&b.input_path));
        let _ = writeln!(out);
        let _ = writeln!(out, "Failures:");
        for result in failures {
            let _ = writeln!(out, "  {}", render_failure(result));
        }
    }

    out
}

/// One-line description of a failed job.
pub fn render_failure(result: &JobResult) -> String {
    let stage = result
        .failed_stage
        .map(|s| format!(" ({})", s))
        .unwrap_or_default();
    format!(
        "{}{}: {}",
        result.input_path.display(),
        stage,
        result.error.as_deref().unwrap_or("unknown error")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use transcribe_core::JobStage;

    #[test]
    fn test_progress_line_counts_terminal_events() {
        let mut finished = 0;
        let started = ProgressEvent {
            path: PathBuf::from("/media/a.mp3"),
            status: ProgressStatus::Started,
        };
        assert!(progress_line(&started, &mut finished, 2).is_none());

        let failed = ProgressEvent {
            path: PathBuf::from("/media/a.mp3"),
            status: ProgressStatus::Failed,
        };
        assert_eq!(
            progress_line(&failed, &mut finished, 2).unwrap(),
            "[1/2] FAILED  a.mp3"
        );
        assert_eq!(finished, 1);
    }

    #[tokio::test]
    async fn test_print_progress_keeps_every_line_of_a_burst() {
        let (tx, rx) = mpsc::unbounded_channel();
        let observer: std::sync::Arc<dyn transcribe_core::ProgressObserver> =
            std::sync::Arc::new(tx);
        let total = 300;
        for i in 0..total {
            let path = PathBuf::from(format!("/media/{}.mp3", i));
            observer.notify(&path, ProgressStatus::Started);
            observer.notify(&path, ProgressStatus::Completed);
        }
        drop(observer);

        let out = print_progress(rx, total, Vec::new()).await;
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), total);
        assert_eq!(lines[total - 1], "[300/300] done    299.mp3");
    }

    #[test]
    fn test_render_failure() {
        let result = JobResult::failed(
            PathBuf::from("/media/bad.mp3"),
            JobStage::Transcribing,
            "Rate limit exceeded: slow down",
            12,
        );
        assert_eq!(
            render_failure(&result),
            "/media/bad.mp3 (transcribing): Rate limit exceeded: slow down"
        );
    }

    #[test]
    fn test_render_empty_summary() {
        let rendered = render_summary(&BatchSummary::empty());
        assert!(rendered.contains("Total:      0"));
        assert!(rendered.contains("Success:    0.0%"));
        assert!(!rendered.contains("Failures:"));
    }
}

use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the use case from specific output mechanisms so callers can
/// observe pipeline behavior without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. active track count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-run summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events. Used by tests and embedders
/// with their own progress reporting.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger: throttled progress lines via `log`, per-stage
/// timing accumulation, and a final summary report.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, (f64, usize)>,
    metrics: HashMap<String, (f64, usize)>,
    start_time: Instant,
    total_frames: usize,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            total_frames: 0,
        }
    }

    /// Average recorded duration for a stage, in milliseconds.
    pub fn average_timing(&self, stage: &str) -> Option<f64> {
        self.timings
            .get(stage)
            .map(|(total, count)| total / *count as f64)
    }

    /// Average recorded value for a metric.
    pub fn average_metric(&self, name: &str) -> Option<f64> {
        self.metrics
            .get(name)
            .map(|(total, count)| total / *count as f64)
    }

    /// Formatted summary, or `None` when nothing was recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_s = self.start_time.elapsed().as_secs_f64();
        let mut lines = vec![format!(
            "Run summary ({} frames, {elapsed_s:.1}s total):",
            self.total_frames
        )];

        let mut stages: Vec<&String> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let (total_ms, count) = self.timings[stage];
            lines.push(format!(
                "  {stage:8}: avg {:6.1}ms  total {total_ms:7.0}ms",
                total_ms / count as f64
            ));
        }

        let mut names: Vec<&String> = self.metrics.keys().collect();
        names.sort();
        for name in names {
            let (total, count) = self.metrics[name];
            lines.push(format!("  {name}: avg {:.1}", total / count as f64));
        }

        if self.total_frames > 0 && elapsed_s > 0.0 {
            lines.push(format!(
                "  Throughput: {:.1} fps",
                self.total_frames as f64 / elapsed_s
            ));
        }

        Some(lines.join("\n"))
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(30)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_frames = total.max(current);
        if current % self.throttle_frames == 0 || (total > 0 && current == total) {
            if total > 0 {
                let pct = current as f64 / total as f64 * 100.0;
                log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
            } else {
                log::info!("Processing: frame {current}");
            }
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        let entry = self.timings.entry(stage.to_string()).or_insert((0.0, 0));
        entry.0 += duration_ms;
        entry.1 += 1;
    }

    fn metric(&mut self, name: &str, value: f64) {
        let entry = self.metrics.entry(name.to_string()).or_insert((0.0, 0));
        entry.0 += value;
        entry.1 += 1;
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("detect", 5.0);
        logger.metric("active_tracks", 3.0);
        logger.info("hello");
        logger.summary();
    }

    #[test]
    fn test_timing_averages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("detect", 20.0);
        logger.timing("detect", 30.0);
        logger.timing("dedup", 5.0);

        assert_eq!(logger.average_timing("detect"), Some(25.0));
        assert_eq!(logger.average_timing("dedup"), Some(5.0));
        assert_eq!(logger.average_timing("missing"), None);
    }

    #[test]
    fn test_metric_averages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("active_tracks", 3.0);
        logger.metric("active_tracks", 4.0);

        assert_eq!(logger.average_metric("active_tracks"), Some(3.5));
    }

    #[test]
    fn test_summary_lists_stages_and_metrics() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.progress(10, 10);
        logger.timing("track", 2.0);
        logger.timing("detect", 20.0);
        logger.metric("active_tracks", 2.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("track"));
        assert!(summary.contains("detect"));
        assert!(summary.contains("active_tracks"));
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_total() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=20 {
            logger.progress(i, 20);
        }
        assert_eq!(logger.total_frames, 20);
    }

    #[test]
    fn test_throttle_zero_clamped() {
        let logger = StdoutPipelineLogger::new(0);
        assert_eq!(logger.throttle_frames, 1);
    }
}

//! Duration-gated logging.
//!
//! A [`TimedLog`] captures a start instant when it is created and picks the
//! record's level when it completes:
//!
//! | entry point        | elapsed > threshold | otherwise |
//! |--------------------|---------------------|-----------|
//! | `Logger::warnd`    | WARN                | DEBUG     |
//! | `Logger::autod`    | WARN                | DEBUG     |
//! | `Logger::infod`    | INFO                | INFO      |
//!
//! Every record carries `elapsed_ms` and `elapsed_us`; gated records also
//! carry `threshold_ms`.
//!
//! ```no_run
//! use std::time::Duration;
//! use gatelog::Logger;
//!
//! # fn load() -> gatelog::Result<()> {
//! let log = Logger::named_from_env("loader")?;
//!
//! let timer = log.warnd(Duration::from_millis(200));
//! // ... work ...
//! timer.finish(format_args!("loaded {} items", 42));
//!
//! // Or log on every exit path, including `?` and panics:
//! let _guard = log.infod().defer("load finished");
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::time::{Duration, Instant};

use gatelog_core::Level;

use crate::logger::{Logger, Timing};

/// How a completed timing is mapped to a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// WARN above the threshold, DEBUG at or below it.
    Threshold(Duration),
    /// Always INFO.
    Always,
}

impl Gate {
    pub fn level_for(&self, elapsed: Duration) -> Level {
        match *self {
            Gate::Threshold(threshold) if elapsed > threshold => Level::Warn,
            Gate::Threshold(_) => Level::Debug,
            Gate::Always => Level::Info,
        }
    }

    pub fn threshold(&self) -> Option<Duration> {
        match *self {
            Gate::Threshold(threshold) => Some(threshold),
            Gate::Always => None,
        }
    }
}

/// A started timing. Completing it with [`finish`](TimedLog::finish) or
/// [`defer`](TimedLog::defer) consumes it, so each start yields at most one
/// record.
#[must_use = "a timed log writes nothing unless it is finished or deferred"]
#[derive(Debug)]
pub struct TimedLog<'a> {
    logger: &'a Logger,
    start: Instant,
    gate: Gate,
}

impl<'a> TimedLog<'a> {
    pub(crate) fn start(logger: &'a Logger, gate: Gate) -> Self {
        Self {
            logger,
            start: Instant::now(),
            gate,
        }
    }

    pub fn gate(&self) -> Gate {
        self.gate
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Writes `message` at the level chosen from the elapsed time and
    /// returns that level.
    pub fn finish(self, message: impl Display) -> Level {
        self.complete(&message)
    }

    /// Converts into a guard that writes `message` when dropped. The
    /// message is rendered at drop time, not here.
    pub fn defer<M: Display>(self, message: M) -> TimedGuard<'a, M> {
        TimedGuard {
            timed: self,
            message,
        }
    }

    fn complete(&self, message: &dyn Display) -> Level {
        let elapsed = self.start.elapsed();
        let level = self.gate.level_for(elapsed);
        self.logger.emit(
            level,
            message,
            Some(Timing {
                elapsed,
                threshold: self.gate.threshold(),
            }),
        );
        level
    }
}

/// Writes its timed record on drop.
#[must_use = "dropping the guard right away logs immediately"]
#[derive(Debug)]
pub struct TimedGuard<'a, M: Display> {
    timed: TimedLog<'a>,
    message: M,
}

impl<M: Display> TimedGuard<'_, M> {
    pub fn elapsed(&self) -> Duration {
        self.timed.elapsed()
    }

    /// Replaces the message written on drop.
    pub fn set_message(&mut self, message: M) {
        self.message = message;
    }
}

impl<M: Display> Drop for TimedGuard<'_, M> {
    fn drop(&mut self) {
        self.timed.complete(&self.message);
    }
}

impl Logger {
    /// Starts a timing written at WARN if it runs longer than `threshold`,
    /// otherwise at DEBUG.
    pub fn warnd(&self, threshold: Duration) -> TimedLog<'_> {
        TimedLog::start(self, Gate::Threshold(threshold))
    }

    /// Same level selection as [`warnd`](Logger::warnd).
    pub fn autod(&self, threshold: Duration) -> TimedLog<'_> {
        TimedLog::start(self, Gate::Threshold(threshold))
    }

    /// Starts a timing always written at INFO.
    pub fn infod(&self) -> TimedLog<'_> {
        TimedLog::start(self, Gate::Always)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::capture_logger;
    use gatelog_core::LevelFilter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_gate_level_selection() {
        let gate = Gate::Threshold(Duration::from_millis(10));
        assert_eq!(gate.level_for(Duration::from_millis(11)), Level::Warn);
        assert_eq!(gate.level_for(Duration::from_millis(10)), Level::Debug);
        assert_eq!(gate.level_for(Duration::ZERO), Level::Debug);

        assert_eq!(Gate::Always.level_for(Duration::ZERO), Level::Info);
        assert_eq!(Gate::Always.level_for(Duration::from_secs(3600)), Level::Info);
    }

    #[test]
    fn test_zero_threshold_warns_on_any_delay() {
        let gate = Gate::Threshold(Duration::ZERO);
        assert_eq!(gate.level_for(Duration::from_nanos(1)), Level::Warn);
    }

    #[test]
    fn test_warnd_over_threshold() {
        let (log, capture) = capture_logger("test", LevelFilter::DEBUG);

        let timer = log.warnd(Duration::from_millis(10));
        thread::sleep(Duration::from_millis(30));
        let level = timer.finish("this should be displayed in warn level");

        assert_eq!(level, Level::Warn);
        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Warn);
        assert_eq!(records[0].field_u64("threshold_ms"), Some(10));
        let elapsed = records[0].field_u64("elapsed_ms").unwrap();
        assert!((25..=50).contains(&elapsed), "elapsed_ms = {}", elapsed);
    }

    #[test]
    fn test_warnd_under_threshold_is_debug() {
        let (log, capture) = capture_logger("test", LevelFilter::DEBUG);

        let timer = log.warnd(Duration::from_secs(10));
        thread::sleep(Duration::from_millis(300));
        timer.finish("under threshold");

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Debug);
        let elapsed = records[0].field_u64("elapsed_ms").unwrap();
        assert!((250..=400).contains(&elapsed), "elapsed_ms = {}", elapsed);
    }

    #[test]
    fn test_under_threshold_suppressed_at_warn_minimum() {
        let (log, capture) = capture_logger("test", LevelFilter::WARN);

        let timer = log.warnd(Duration::from_secs(10));
        let level = timer.finish("this should not be displayed at all");

        assert_eq!(level, Level::Debug);
        assert!(capture.records().is_empty());
    }

    #[test]
    fn test_infod_is_always_info() {
        let (log, capture) = capture_logger("test", LevelFilter::INFO);

        let timer = log.infod();
        thread::sleep(Duration::from_millis(5));
        timer.finish("timing only");

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert!(records[0].field_u64("elapsed_ms").unwrap() >= 5);
        assert!(records[0].field_u64("threshold_ms").is_none());
    }

    #[test]
    fn test_overlapping_autod_gates() {
        let (log, capture) = capture_logger("test", LevelFilter::DEBUG);

        {
            let _slow = log
                .autod(Duration::from_millis(50))
                .defer("this should be logged in warn");
            let _fast = log
                .autod(Duration::from_millis(300))
                .defer("this should be logged in debug");
            thread::sleep(Duration::from_millis(100));
        }

        // Guards drop in reverse declaration order.
        let records = capture.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "this should be logged in debug");
        assert_eq!(records[0].level, Level::Debug);
        assert_eq!(records[1].message, "this should be logged in warn");
        assert_eq!(records[1].level, Level::Warn);
    }

    #[test]
    fn test_guard_logs_on_early_return() {
        let (log, capture) = capture_logger("test", LevelFilter::DEBUG);

        fn work(log: &Logger, fail: bool) -> Result<(), String> {
            let _guard = log.infod().defer("work done");
            if fail {
                return Err("bail".to_string());
            }
            Ok(())
        }

        assert!(work(&log, true).is_err());
        assert!(work(&log, false).is_ok());
        assert_eq!(capture.records().len(), 2);
    }

    #[test]
    fn test_guard_logs_on_panic() {
        let (log, capture) = capture_logger("test", LevelFilter::DEBUG);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = log.warnd(Duration::from_secs(1)).defer("unwound");
            panic!("boom");
        }));

        assert!(result.is_err());
        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "unwound");
    }

    #[test]
    fn test_guard_message_can_change_before_drop() {
        let (log, capture) = capture_logger("test", LevelFilter::INFO);
        {
            let mut guard = log.infod().defer("pending");
            guard.set_message("processed 3 batches");
        }
        assert_eq!(capture.records()[0].message, "processed 3 batches");
    }

    #[test]
    fn test_deferred_message_rendered_at_drop() {
        struct Progress<'p>(&'p AtomicUsize);

        impl Display for Progress<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "processed {} batches", self.0.load(Ordering::SeqCst))
            }
        }

        let (log, capture) = capture_logger("test", LevelFilter::INFO);
        let batches = AtomicUsize::new(0);
        {
            let _guard = log.infod().defer(Progress(&batches));
            batches.store(4, Ordering::SeqCst);
        }
        assert_eq!(capture.records()[0].message, "processed 4 batches");
    }

    #[test]
    fn test_sub_millisecond_timing_keeps_micros() {
        let (log, capture) = capture_logger("test", LevelFilter::INFO);
        let timer = log.infod();
        thread::sleep(Duration::from_micros(300));
        timer.finish("quick");

        let records = capture.records();
        let micros = records[0].field_u64("elapsed_us").unwrap();
        let millis = records[0].field_u64("elapsed_ms").unwrap();
        assert!(micros >= 300, "elapsed_us = {}", micros);
        assert_eq!(millis, micros / 1000);
    }

    #[test]
    fn test_unfinished_timer_writes_nothing() {
        let (log, capture) = capture_logger("test", LevelFilter::TRACE);
        let timer = log.infod();
        drop(timer);
        assert!(capture.contents().is_empty());
    }

    #[test]
    fn test_concurrent_gates_are_independent() {
        let (log, capture) = capture_logger("test", LevelFilter::DEBUG);

        thread::scope(|s| {
            for i in 0..8u64 {
                let log = &log;
                s.spawn(move || {
                    let timer = log.warnd(Duration::from_secs(10));
                    thread::sleep(Duration::from_millis(i));
                    timer.finish(format_args!("worker {}", i));
                });
            }
        });

        let records = capture.records();
        assert_eq!(records.len(), 8);
        assert!(records.iter().all(|r| r.level == Level::Debug));
    }
}

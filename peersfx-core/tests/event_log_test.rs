//! Event log database tests
//!
//! The CLI opens a fresh `LoggingService` per command, so the log file is
//! reopened many times over its life and may be written from several
//! threads of one process.
//!
//! Run with: cargo test --test event_log_test -- --nocapture

use std::sync::{Arc, Barrier};
use std::thread;

use tempfile::TempDir;

use peersfx_core::{EntryPoint, LogEvent, LoggingService};

const THREAD_COUNT: usize = 4;
const EVENTS_PER_THREAD: usize = 10;

#[test]
fn test_reopen_keeps_events_and_skips_applied_migrations() {
    let temp_dir = TempDir::new().unwrap();

    {
        let logger = LoggingService::new(temp_dir.path(), EntryPoint::Cli, "0.1.0").unwrap();
        logger.log_command("market").unwrap();
        logger
            .log_error("upload_failed", "storage offline", None)
            .unwrap();
    }

    let logger = LoggingService::new(temp_dir.path(), EntryPoint::Desktop, "0.1.1").unwrap();
    logger.log_page("/wallet").unwrap();
    assert_eq!(logger.count().unwrap(), 3);

    let errors = logger.get_errors(10).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].entry_point, "cli");
    assert_eq!(errors[0].error_message.as_deref(), Some("storage offline"));

    let latest = &logger.get_recent(1).unwrap()[0];
    assert_eq!(latest.entry_point, "desktop");
    assert_eq!(latest.app_version, "0.1.1");
}

#[test]
fn test_shared_logger_across_threads() {
    let temp_dir = TempDir::new().unwrap();
    let logger = Arc::new(LoggingService::new(temp_dir.path(), EntryPoint::Cli, "0.1.0").unwrap());
    let barrier = Arc::new(Barrier::new(THREAD_COUNT));

    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..EVENTS_PER_THREAD {
                    logger
                        .log(LogEvent::new("poll").with_component(format!("worker-{}", thread_id)))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(logger.count().unwrap(), (THREAD_COUNT * EVENTS_PER_THREAD) as u64);

    let mut ids: Vec<u64> = logger
        .get_recent(THREAD_COUNT * EVENTS_PER_THREAD)
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), THREAD_COUNT * EVENTS_PER_THREAD);
}

#[test]
fn test_stats_and_clear() {
    let temp_dir = TempDir::new().unwrap();
    let logger = LoggingService::new(temp_dir.path(), EntryPoint::Cli, "0.1.0").unwrap();
    for _ in 0..3 {
        logger.log_command("notifications").unwrap();
    }
    logger.log_command("kyc").unwrap();

    let stats = logger.stats(1).unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.errors, 0);
    assert_eq!(stats.top_events.len(), 1);
    assert!(stats.oldest <= stats.newest);

    assert_eq!(logger.clear().unwrap(), 4);
    assert_eq!(logger.count().unwrap(), 0);
}

//! Resource-usage instrumentation for async operations

use std::future::Future;
use std::time::Instant;

use tracing::debug;

/// Wraps a future with timing and resident-memory-delta logging.
///
/// Both readings go out at debug level so instrumentation is free when the
/// level is filtered. The wrapped output passes through untouched.
pub async fn instrumented<Fut: Future>(name: &str, operation: Fut) -> Fut::Output {
    let started = Instant::now();
    let mem_before = resident_memory_bytes();
    debug!("Starting {}", name);

    let output = operation.await;

    let elapsed = started.elapsed().as_secs_f64();
    match (mem_before, resident_memory_bytes()) {
        (Some(before), Some(after)) => {
            let delta_mb = (after as f64 - before as f64) / 1024.0 / 1024.0;
            debug!(
                "{} finished | elapsed: {:.3}s | memory delta: {:+.2}MB",
                name, elapsed, delta_mb
            );
        }
        _ => debug!("{} finished | elapsed: {:.3}s", name, elapsed),
    }

    output
}

// Resident set size from /proc/self/statm, second field, in 4 KiB pages.
#[cfg(target_os = "linux")]
fn resident_memory_bytes() -> Option<u64> {
    let statm = std::fs::read_to_string("/proc/self/statm").ok()?;
    let resident_pages: u64 = statm.split_whitespace().nth(1)?.parse().ok()?;
    Some(resident_pages * 4096)
}

#[cfg(not(target_os = "linux"))]
fn resident_memory_bytes() -> Option<u64> {
    None
}

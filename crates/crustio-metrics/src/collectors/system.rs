use crustio_common::error::Result;

use crate::{
    buffer::{MetricBuffer, NO_METHOD},
    registry::MetricsSnapshot,
};

/// Host CPU load (one-minute average, normalized by core count) and
/// memory usage, both as 0–100 percentages rounded to two decimals.
/// Readings that are unavailable on this platform skip their lines.
pub fn collect(_snapshot: &MetricsSnapshot, buf: &mut MetricBuffer) -> Result<()> {
    if let Some(cpu) = cpu_usage_percentage() {
        buf.add("system", NO_METHOD, "cpuPercentage", round_two(cpu));
    }
    if let Some(memory) = memory_usage_percentage() {
        buf.add("system", NO_METHOD, "memoryUsage", round_two(memory));
    }
    Ok(())
}

fn cpu_usage_percentage() -> Option<f64> {
    let cores = std::thread::available_parallelism().ok()?.get();
    let load = read_load_average()?;
    Some(load / cores as f64 * 100.0)
}

fn round_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(target_os = "linux")]
fn read_load_average() -> Option<f64> {
    let loadavg = std::fs::read_to_string("/proc/loadavg").ok()?;
    loadavg.split_whitespace().next()?.parse::<f64>().ok()
}

#[cfg(not(target_os = "linux"))]
fn read_load_average() -> Option<f64> {
    None
}

#[cfg(target_os = "linux")]
fn memory_usage_percentage() -> Option<f64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    let total = meminfo_kb(&meminfo, "MemTotal:")?;
    let available = meminfo_kb(&meminfo, "MemAvailable:")?;
    if total == 0 {
        return None;
    }
    let used = total.saturating_sub(available);
    Some(used as f64 / total as f64 * 100.0)
}

#[cfg(target_os = "linux")]
fn meminfo_kb(meminfo: &str, field: &str) -> Option<u64> {
    for line in meminfo.lines() {
        if let Some(rest) = line.strip_prefix(field) {
            return rest
                .split_whitespace()
                .next()
                .and_then(|value| value.parse::<u64>().ok());
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn memory_usage_percentage() -> Option<f64> {
    None
}

use std::{sync::Arc, time::Duration};

use crustio_common::error::Result;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, warn};

use crate::{
    buffer::MetricBuffer, collectors::COLLECTORS, registry::ServiceMetrics, sink::MetricsSink,
};

/// Drives the periodic collect-and-ship cycle. Each tick snapshots the
/// registry into a fresh buffer, renders it, and dispatches the send as
/// its own task so a slow or failed push never delays the next
/// collection. Collection errors are logged and abort only that cycle.
pub struct Reporter {
    metrics: Arc<ServiceMetrics>,
    sink: Arc<dyn MetricsSink>,
    source: String,
    interval: Duration,
}

/// Handle to the spawned reporting loop. Dropping it detaches the loop;
/// it is deliberately never awaited at shutdown, so the timer alone does
/// not keep the process alive. `abort` stops reporting early.
pub struct ReporterHandle {
    task: JoinHandle<()>,
}

impl ReporterHandle {
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Reporter {
    pub fn new(
        metrics: Arc<ServiceMetrics>,
        sink: Arc<dyn MetricsSink>,
        source: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            metrics,
            sink,
            source: source.into(),
            interval,
        }
    }

    pub fn spawn(self) -> ReporterHandle {
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.tick();
            }
        });

        ReporterHandle { task }
    }

    /// Runs one cycle: build the payload, then fire off the send. Returns
    /// the send task, if one was dispatched.
    pub fn tick(&self) -> Option<JoinHandle<()>> {
        let payload = match self.build_payload() {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "metrics collection failed");
                return None;
            }
        };

        if payload.is_empty() {
            return None;
        }

        let sink = Arc::clone(&self.sink);
        Some(tokio::spawn(async move {
            match sink.push(&payload).await {
                Ok(()) => debug!(bytes = payload.len(), "pushed metrics payload"),
                Err(err) => {
                    // Log the payload too so a dead sink still leaves the
                    // data somewhere inspectable.
                    warn!(error = %err, payload = %payload, "failed to push metrics payload");
                }
            }
        }))
    }

    fn build_payload(&self) -> Result<String> {
        let mut buf = MetricBuffer::new(&self.source);
        let snapshot = self.metrics.snapshot();
        for collect in COLLECTORS {
            collect(&snapshot, &mut buf)?;
        }
        Ok(buf.render("\n"))
    }
}

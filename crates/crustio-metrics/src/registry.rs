use std::sync::{
    Mutex,
    atomic::{AtomicI64, AtomicU64, Ordering},
};

use http::Method;

/// Process-wide request/auth/order counters, safe for concurrent mutation
/// from any number of request-handling tasks. One instance per process,
/// injected through application state rather than held in a global.
///
/// Counters are cumulative since process start; reporting never resets
/// them. Integer counters are atomics; the two float accumulators use a
/// mutex, matching how float sums are guarded elsewhere in the codebase.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    total_requests: AtomicU64,
    post_requests: AtomicU64,
    get_requests: AtomicU64,
    delete_requests: AtomicU64,
    put_requests: AtomicU64,

    active_users: AtomicI64,

    total_auths: AtomicU64,
    successful_auths: AtomicU64,
    failed_auths: AtomicU64,

    pizzas_sold: AtomicU64,
    creation_failures: AtomicU64,
    revenue: Mutex<f64>,
    creation_latency_seconds: Mutex<f64>,
}

/// Plain-value copy of every counter, taken at one flush instant. Each
/// field is read atomically with respect to its own writers; the snapshot
/// as a whole is not required to be a cross-counter consistent cut.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub post_requests: u64,
    pub get_requests: u64,
    pub delete_requests: u64,
    pub put_requests: u64,
    pub active_users: i64,
    pub total_auths: u64,
    pub successful_auths: u64,
    pub failed_auths: u64,
    pub pizzas_sold: u64,
    pub creation_failures: u64,
    pub revenue: f64,
    pub creation_latency_seconds: f64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies an inbound request by method. Exactly one method bucket
    /// increments per call; methods outside the four tracked verbs only
    /// bump the total.
    pub fn record_request(&self, method: &Method) {
        match method.as_str() {
            "POST" => {
                self.post_requests.fetch_add(1, Ordering::Relaxed);
            }
            "GET" => {
                self.get_requests.fetch_add(1, Ordering::Relaxed);
            }
            "DELETE" => {
                self.delete_requests.fetch_add(1, Ordering::Relaxed);
            }
            "PUT" => {
                self.put_requests.fetch_add(1, Ordering::Relaxed);
            }
            _ => {}
        }
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auth_attempt(&self, success: bool) {
        self.total_auths.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_auths.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_auths.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Successful orders feed the pizza/revenue/latency accumulators;
    /// failed orders touch only the failure counter.
    pub fn record_order(&self, pizzas: u64, total_cost: f64, elapsed_seconds: f64, success: bool) {
        if success {
            self.pizzas_sold.fetch_add(pizzas, Ordering::Relaxed);
            if let Ok(mut revenue) = self.revenue.lock() {
                *revenue += total_cost;
            }
            if let Ok(mut latency) = self.creation_latency_seconds.lock() {
                *latency += elapsed_seconds;
            }
        } else {
            self.creation_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn increment_active_users(&self) {
        self.active_users.fetch_add(1, Ordering::Relaxed);
    }

    pub fn decrement_active_users(&self) {
        self.active_users.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            post_requests: self.post_requests.load(Ordering::Relaxed),
            get_requests: self.get_requests.load(Ordering::Relaxed),
            delete_requests: self.delete_requests.load(Ordering::Relaxed),
            put_requests: self.put_requests.load(Ordering::Relaxed),
            active_users: self.active_users.load(Ordering::Relaxed),
            total_auths: self.total_auths.load(Ordering::Relaxed),
            successful_auths: self.successful_auths.load(Ordering::Relaxed),
            failed_auths: self.failed_auths.load(Ordering::Relaxed),
            pizzas_sold: self.pizzas_sold.load(Ordering::Relaxed),
            creation_failures: self.creation_failures.load(Ordering::Relaxed),
            revenue: self.revenue.lock().map(|value| *value).unwrap_or(0.0),
            creation_latency_seconds: self
                .creation_latency_seconds
                .lock()
                .map(|value| *value)
                .unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::Method;

    use super::ServiceMetrics;

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = Arc::new(ServiceMetrics::new());
        let threads = 8;
        let per_thread = 500;

        std::thread::scope(|scope| {
            for _ in 0..threads {
                let metrics = Arc::clone(&metrics);
                scope.spawn(move || {
                    for _ in 0..per_thread {
                        metrics.record_request(&Method::GET);
                    }
                });
            }
        });

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.get_requests, threads * per_thread);
        assert_eq!(snapshot.total_requests, threads * per_thread);
    }

    #[test]
    fn post_increments_exactly_its_bucket_and_the_total() {
        let metrics = ServiceMetrics::new();
        metrics.record_request(&Method::POST);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.post_requests, 1);
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.get_requests, 0);
        assert_eq!(snapshot.delete_requests, 0);
        assert_eq!(snapshot.put_requests, 0);
    }

    #[test]
    fn unclassified_methods_bump_only_the_total() {
        let metrics = ServiceMetrics::new();
        metrics.record_request(&Method::PATCH);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(
            snapshot.post_requests
                + snapshot.get_requests
                + snapshot.delete_requests
                + snapshot.put_requests,
            0
        );
    }

    #[test]
    fn successful_orders_leave_failures_untouched() {
        let metrics = ServiceMetrics::new();
        metrics.record_order(2, 19.98, 1.2, true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pizzas_sold, 2);
        assert!((snapshot.revenue - 19.98).abs() < 1e-9);
        assert!((snapshot.creation_latency_seconds - 1.2).abs() < 1e-9);
        assert_eq!(snapshot.creation_failures, 0);
    }

    #[test]
    fn failed_orders_touch_only_the_failure_counter() {
        let metrics = ServiceMetrics::new();
        metrics.record_order(0, 0.0, 0.0, false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.creation_failures, 1);
        assert_eq!(snapshot.pizzas_sold, 0);
        assert_eq!(snapshot.revenue, 0.0);
        assert_eq!(snapshot.creation_latency_seconds, 0.0);
    }

    #[test]
    fn auth_attempts_split_into_success_and_failure() {
        let metrics = ServiceMetrics::new();
        metrics.record_auth_attempt(true);
        metrics.record_auth_attempt(true);
        metrics.record_auth_attempt(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_auths, 3);
        assert_eq!(snapshot.successful_auths, 2);
        assert_eq!(snapshot.failed_auths, 1);
    }

    #[test]
    fn active_users_can_go_up_and_down() {
        let metrics = ServiceMetrics::new();
        metrics.increment_active_users();
        metrics.increment_active_users();
        metrics.decrement_active_users();

        assert_eq!(metrics.snapshot().active_users, 1);
    }
}

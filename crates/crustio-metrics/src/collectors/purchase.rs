use crustio_common::error::Result;

use crate::{
    buffer::{MetricBuffer, NO_METHOD},
    registry::MetricsSnapshot,
};

pub fn collect(snapshot: &MetricsSnapshot, buf: &mut MetricBuffer) -> Result<()> {
    buf.add("pizzas", NO_METHOD, "pizzasSold", snapshot.pizzas_sold);
    buf.add("pizzas", NO_METHOD, "revenue", snapshot.revenue);
    buf.add(
        "pizzas",
        NO_METHOD,
        "creationFailure",
        snapshot.creation_failures,
    );
    buf.add(
        "pizzas",
        NO_METHOD,
        "creationLatency",
        snapshot.creation_latency_seconds,
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{buffer::MetricBuffer, registry::MetricsSnapshot};

    #[test]
    fn emits_the_purchase_lines() {
        let snapshot = MetricsSnapshot {
            pizzas_sold: 7,
            revenue: 0.0294,
            creation_failures: 1,
            creation_latency_seconds: 2.5,
            ..Default::default()
        };
        let mut buf = MetricBuffer::new("test");
        super::collect(&snapshot, &mut buf).unwrap();

        assert_eq!(
            buf.render("\n"),
            "pizzas,source=test,method=none pizzasSold=7\n\
             pizzas,source=test,method=none revenue=0.0294\n\
             pizzas,source=test,method=none creationFailure=1\n\
             pizzas,source=test,method=none creationLatency=2.5"
        );
    }
}

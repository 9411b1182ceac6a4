use crustio_common::error::Result;

use crate::{
    buffer::{MetricBuffer, NO_METHOD},
    registry::MetricsSnapshot,
};

pub fn collect(snapshot: &MetricsSnapshot, buf: &mut MetricBuffer) -> Result<()> {
    buf.add("user", NO_METHOD, "activeUsers", snapshot.active_users);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{buffer::MetricBuffer, registry::MetricsSnapshot};

    #[test]
    fn emits_the_active_user_gauge() {
        let snapshot = MetricsSnapshot {
            active_users: 3,
            ..Default::default()
        };
        let mut buf = MetricBuffer::new("test");
        super::collect(&snapshot, &mut buf).unwrap();

        assert_eq!(buf.render("\n"), "user,source=test,method=none activeUsers=3");
    }
}

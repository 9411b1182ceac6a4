use crustio_common::error::Result;

use crate::{
    buffer::{MetricBuffer, NO_METHOD},
    registry::MetricsSnapshot,
};

pub fn collect(snapshot: &MetricsSnapshot, buf: &mut MetricBuffer) -> Result<()> {
    buf.add("auth", NO_METHOD, "totalAuths", snapshot.total_auths);
    buf.add(
        "auth",
        NO_METHOD,
        "successfulAuths",
        snapshot.successful_auths,
    );
    buf.add("auth", NO_METHOD, "failedAuths", snapshot.failed_auths);
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{buffer::MetricBuffer, registry::MetricsSnapshot};

    #[test]
    fn emits_the_auth_lines() {
        let snapshot = MetricsSnapshot {
            total_auths: 5,
            successful_auths: 4,
            failed_auths: 1,
            ..Default::default()
        };
        let mut buf = MetricBuffer::new("test");
        super::collect(&snapshot, &mut buf).unwrap();

        assert_eq!(
            buf.render("\n"),
            "auth,source=test,method=none totalAuths=5\n\
             auth,source=test,method=none successfulAuths=4\n\
             auth,source=test,method=none failedAuths=1"
        );
    }
}

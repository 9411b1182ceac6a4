use crustio_common::error::Result;

use crate::{buffer::MetricBuffer, registry::MetricsSnapshot};

pub fn collect(snapshot: &MetricsSnapshot, buf: &mut MetricBuffer) -> Result<()> {
    buf.add("request", "http", "postRequests", snapshot.post_requests);
    buf.add("request", "http", "getRequests", snapshot.get_requests);
    buf.add("request", "http", "deleteRequests", snapshot.delete_requests);
    buf.add("request", "http", "putRequests", snapshot.put_requests);
    buf.add("request", "http", "allRequests", snapshot.total_requests);
    Ok(())
}

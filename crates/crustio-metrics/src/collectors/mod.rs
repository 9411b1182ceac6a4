pub mod auth;
pub mod http;
pub mod purchase;
pub mod system;
pub mod user;

use crustio_common::error::Result;

use crate::{buffer::MetricBuffer, registry::MetricsSnapshot};

pub type CollectorFn = fn(&MetricsSnapshot, &mut MetricBuffer) -> Result<()>;

/// Invocation order is part of the payload contract: http, system, user,
/// purchase, auth.
pub const COLLECTORS: &[CollectorFn] = &[
    http::collect,
    system::collect,
    user::collect,
    purchase::collect,
    auth::collect,
];

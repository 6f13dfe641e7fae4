mod future_ext;
mod init;

use std::fmt;
use std::time::Duration;

pub use init::{init_logging, LoggingTask};

pub(crate) mod prelude {
    pub(crate) use super::future_ext::FutureExt as _;
    pub(crate) use super::future_ext::TryFutureExt as _;
    pub(crate) use super::{tracing_duration, tracing_err};

    // We don't care if some of the imports here are not used. They may be used
    // at some point. It's just convenient not to import them manually all the
    // time a new logging macro is needed.
    #[allow(unused_imports)]
    pub(crate) use tracing::{
        debug, debug_span, error, error_span, info, info_span, instrument, trace, trace_span, warn,
        warn_span, Instrument as _,
    };
}

/// Records the error as a structured value, so that its source chain is preserved.
#[must_use]
pub fn tracing_err<'a, E: std::error::Error + 'static>(err: &'a E) -> impl tracing::Value + 'a {
    err as &dyn std::error::Error
}

pub(crate) fn tracing_duration(duration: Duration) -> impl tracing::Value {
    tracing::field::display(DurationDisplay(duration))
}

struct DurationDisplay(Duration);

impl fmt::Display for DurationDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2?}", self.0)
    }
}

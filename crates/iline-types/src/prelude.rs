pub use crate::error::{Error, IlResult};
pub use crate::types::{Identity, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4

pub use crate::app::App;
pub use iline_types::prelude::*;

// vim: ts=4

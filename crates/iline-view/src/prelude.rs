pub use iline_types::prelude::*;

// vim: ts=4

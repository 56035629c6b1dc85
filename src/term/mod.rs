//! Terminal output backend
//!
//! The shared console sink and spinner primitives.

mod sink;
mod spinner;

pub use sink::{console, Console, SinkError, SpinnerOptions};
pub use spinner::{default_spinner, SpinnerKind};

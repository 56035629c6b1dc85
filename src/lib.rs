//! Themed pretty-printing and live spinner status for the console.
//!
//! Two pieces, sharing one terminal line:
//!
//! - A structural formatter that decomposes nested values into display-node
//!   trees and prints them indented, colour-annotated, with optional
//!   indentation guidelines. Token colours come from an ordered style-rule
//!   table evaluated first-match-wins.
//! - A status controller that runs a unit of work under an animated spinner
//!   line, suspends the spinner around any output the work produces, and
//!   renders a styled exit message on success.
//!
//! # Printing
//!
//! ```no_run
//! use themed_print::{render, render_with, RenderOptions};
//!
//! render(&[&vec![1, 2, 3]]);
//!
//! let opts = RenderOptions {
//!     show_guideline: true,
//!     ..RenderOptions::default()
//! };
//! render_with(&[&vec![vec![1], vec![2, 3]]], &opts);
//! ```
//!
//! # Status
//!
//! ```no_run
//! use themed_print::{render, Status};
//!
//! let answer = Status::new("computing")
//!     .exit_message("finished")
//!     .run(|| {
//!         render(&[&"partial result"]);
//!         42
//!     });
//! assert_eq!(answer, 42);
//! ```
//!
//! Colour output, default indent and the default spinner can be configured
//! in `~/.themed-print/config.toml`; see [`config::Config`].

pub mod config;
pub mod fmt;
pub mod status;
pub mod term;

pub use config::{Color, Config, Style, StyleFlags, StyleId, Theme};
pub use fmt::{
    log, log_with, render, render_to_string, render_with, Decompose, DisplayNode, NodeKind,
    RenderOptions, UNPRINTABLE,
};
pub use status::{with_status, with_status_on, ShowStatus, Status};
pub use term::{console, Console, SpinnerKind, SpinnerOptions};

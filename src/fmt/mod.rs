//! Structural formatter
//!
//! Decomposes values into display-node trees and renders them as indented,
//! styled console output.

mod node;
mod render;

pub use node::{Decompose, DisplayNode, NodeKind, UNPRINTABLE};
pub use render::{log, log_with, render, render_to_string, render_with, RenderOptions};

pub(crate) use render::styled_text;

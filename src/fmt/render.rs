//! Layout and rendering of display-node trees
//!
//! Walks a decomposed tree depth-first and produces indented, styled lines.
//! Styling is resolved through the process-wide style-rule table; container
//! punctuation always uses the structural punctuation style. Output goes to
//! the shared console sink as a single block so an active spinner is
//! suspended exactly once around it.

use std::fmt::Write as _;

use crossterm::{
    style::{Attribute, ResetColor, SetAttribute, SetForegroundColor},
    Command,
};

use crate::config::{style_table, theme, Style, StyleFlags, StyleId};
use crate::fmt::node::{Decompose, DisplayNode, NodeKind};
use crate::term::console;

/// Vertical guide character used when guidelines are enabled
const GUIDE: char = '│';

/// Options for one render call
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Spaces added per nesting level
    pub indent: usize,
    /// Draw a vertical guide character in each indent column
    pub show_guideline: bool,
    /// Separator between top-level values
    pub sep: String,
    /// String appended after all output
    pub end: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let config = crate::config::config();
        Self {
            indent: config.indent.max(1),
            show_guideline: config.show_guideline,
            sep: " ".to_string(),
            end: "\n".to_string(),
        }
    }
}

/// One styled fragment of a line
#[derive(Debug, Clone)]
struct Span {
    text: String,
    style: Option<StyleId>,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    fn punct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Some(StyleId::Punctuation),
        }
    }

    /// Token span styled through the rule table, first match wins
    fn token(text: impl Into<String>) -> Self {
        let text = text.into();
        let style = style_table().match_token(&text);
        Self { text, style }
    }
}

/// One output line at a given nesting depth
#[derive(Debug, Clone)]
struct Line {
    depth: usize,
    spans: Vec<Span>,
}

impl Line {
    fn new(depth: usize) -> Self {
        Self {
            depth,
            spans: Vec::new(),
        }
    }
}

/// How a child's label is joined to its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    /// No label (sequence elements, root values)
    Bare,
    /// Mapping entry: `key: value`
    Colon,
    /// Object field: `field=value`
    Equals,
}

/// Print one or more values with default options
pub fn render(content: &[&dyn Decompose]) {
    render_with(content, &RenderOptions::default());
}

/// Print one or more values.
///
/// Never fails: sink errors are logged at debug level and swallowed, and
/// values without a textual form decompose to the fallback token instead of
/// erroring.
pub fn render_with(content: &[&dyn Decompose], opts: &RenderOptions) {
    let console = console();
    let text = render_block(content, opts, console.ansi());
    console.write(&text);
}

/// Render to a plain string without colours
pub fn render_to_string(content: &[&dyn Decompose], opts: &RenderOptions) -> String {
    render_block(content, opts, false)
}

/// Print values prefixed with a styled `[HH:MM:SS]` timestamp
pub fn log(content: &[&dyn Decompose]) {
    log_with(content, &RenderOptions::default());
}

/// Print values prefixed with a styled `[HH:MM:SS]` timestamp
pub fn log_with(content: &[&dyn Decompose], opts: &RenderOptions) {
    let console = console();
    let stamp = chrono::Local::now().format("[%H:%M:%S]").to_string();
    let text = log_block(content, opts, console.ansi(), &stamp);
    console.write(&text);
}

fn log_block(content: &[&dyn Decompose], opts: &RenderOptions, ansi: bool, stamp: &str) -> String {
    let mut out = styled_text(stamp, theme().style(StyleId::Timestamp), ansi);
    out.push(' ');
    out.push_str(&render_block(content, opts, ansi));
    out
}

/// Render each value to its own block of lines and join with the separator
fn render_block(content: &[&dyn Decompose], opts: &RenderOptions, ansi: bool) -> String {
    let mut out = String::new();
    for (i, value) in content.iter().enumerate() {
        if i > 0 {
            out.push_str(&opts.sep);
        }
        let mut node = value.decompose();
        node.assign_depths(0);
        let mut lines = Vec::new();
        emit(&node, LabelKind::Bare, &mut lines);
        out.push_str(&serialize(&lines, opts, ansi));
    }
    out.push_str(&opts.end);
    out
}

/// Depth-first pre-order emission of one node into lines
fn emit(node: &DisplayNode, label: LabelKind, lines: &mut Vec<Line>) {
    let mut head = Line::new(node.depth);
    if let Some(key) = &node.label {
        match label {
            LabelKind::Colon => {
                head.spans.push(Span::token(format!("{key}:")));
                head.spans.push(Span::plain(" "));
            }
            LabelKind::Equals => {
                head.spans.push(Span::plain(key.clone()));
                head.spans.push(Span::punct("="));
            }
            LabelKind::Bare => {}
        }
    }

    match node.kind {
        NodeKind::Scalar => {
            head.spans.push(Span::token(node.text.clone()));
            lines.push(head);
        }
        NodeKind::Sequence | NodeKind::Mapping | NodeKind::Object => {
            let (open, close, child_label) = match node.kind {
                NodeKind::Sequence => ("[", "]", LabelKind::Bare),
                NodeKind::Mapping => ("{", "}", LabelKind::Colon),
                _ => ("(", ")", LabelKind::Equals),
            };
            if node.kind == NodeKind::Object {
                head.spans.push(Span {
                    text: node.text.clone(),
                    style: Some(StyleId::TypeName),
                });
            }
            head.spans.push(Span::punct(open));

            // Empty collections stay on one line
            if node.children.is_empty() {
                head.spans.push(Span::punct(close));
                lines.push(head);
                return;
            }

            lines.push(head);
            let last = node.children.len() - 1;
            for (i, child) in node.children.iter().enumerate() {
                emit(child, child_label, lines);
                if i != last {
                    if let Some(line) = lines.last_mut() {
                        line.spans.push(Span::punct(","));
                    }
                }
            }

            let mut tail = Line::new(node.depth);
            tail.spans.push(Span::punct(close));
            lines.push(tail);
        }
    }
}

/// Serialize lines with indentation, guidelines and optional ANSI styling
fn serialize(lines: &[Line], opts: &RenderOptions, ansi: bool) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&indent_prefix(line.depth, opts, ansi));
        for span in &line.spans {
            match span.style {
                Some(id) if ansi => {
                    out.push_str(&styled_text(&span.text, theme().style(id), true));
                }
                _ => out.push_str(&span.text),
            }
        }
    }
    out
}

/// Leading indentation for one line: plain spaces, or one guide character
/// plus fill spaces per level when guidelines are enabled
fn indent_prefix(depth: usize, opts: &RenderOptions, ansi: bool) -> String {
    if depth == 0 {
        return String::new();
    }
    if opts.show_guideline {
        let unit = format!("{}{}", GUIDE, " ".repeat(opts.indent.saturating_sub(1)));
        let prefix = unit.repeat(depth);
        if ansi {
            styled_text(&prefix, theme().style(StyleId::Punctuation), true)
        } else {
            prefix
        }
    } else {
        " ".repeat(opts.indent * depth)
    }
}

/// Apply a style to a piece of text, emitting ANSI codes when enabled
pub(crate) fn styled_text(text: &str, style: Style, ansi: bool) -> String {
    if !ansi || style == Style::plain() {
        return text.to_string();
    }
    let mut out = String::new();
    // write_ansi into a String cannot fail
    if let Some(color) = style.color {
        let _ = SetForegroundColor(color.to_crossterm()).write_ansi(&mut out);
    }
    if style.flags.contains(StyleFlags::BOLD) {
        let _ = SetAttribute(Attribute::Bold).write_ansi(&mut out);
    }
    if style.flags.contains(StyleFlags::ITALIC) {
        let _ = SetAttribute(Attribute::Italic).write_ansi(&mut out);
    }
    if style.flags.contains(StyleFlags::UNDERLINE) {
        let _ = SetAttribute(Attribute::Underlined).write_ansi(&mut out);
    }
    if style.flags.contains(StyleFlags::DIM) {
        let _ = SetAttribute(Attribute::Dim).write_ansi(&mut out);
    }
    let _ = out.write_str(text);
    let _ = SetAttribute(Attribute::Reset).write_ansi(&mut out);
    let _ = ResetColor.write_ansi(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fmt::node::UNPRINTABLE;
    use std::collections::BTreeMap;

    fn opts() -> RenderOptions {
        RenderOptions {
            indent: 4,
            show_guideline: false,
            sep: " ".to_string(),
            end: "\n".to_string(),
        }
    }

    #[test]
    fn test_scalars_on_one_line() {
        let out = render_to_string(&[&1, &"hi"], &opts());
        assert_eq!(out, "1 \"hi\"\n");
    }

    #[test]
    fn test_nested_sequence_layout() {
        let out = render_to_string(&[&vec![1, 2]], &opts());
        assert_eq!(out, "[\n    1,\n    2\n]\n");
    }

    #[test]
    fn test_empty_collections_stay_on_one_line() {
        let empty: Vec<i32> = Vec::new();
        assert_eq!(render_to_string(&[&empty], &opts()), "[]\n");

        let map: BTreeMap<i32, i32> = BTreeMap::new();
        assert_eq!(render_to_string(&[&map], &opts()), "{}\n");

        let obj = DisplayNode::object("Unit", Vec::new());
        assert_eq!(render_to_string(&[&obj], &opts()), "Unit()\n");
    }

    #[test]
    fn test_mapping_layout_preserves_key_order() {
        let node = DisplayNode::mapping(vec![
            ("\"z\"".to_string(), 1i32.decompose()),
            ("\"a\"".to_string(), 2i32.decompose()),
        ]);
        let out = render_to_string(&[&node], &opts());
        assert_eq!(out, "{\n    \"z\": 1,\n    \"a\": 2\n}\n");
    }

    #[test]
    fn test_object_layout() {
        let node = DisplayNode::object(
            "Point",
            vec![("x", 1i32.decompose()), ("y", 2i32.decompose())],
        );
        let out = render_to_string(&[&node], &opts());
        assert_eq!(out, "Point(\n    x=1,\n    y=2\n)\n");
    }

    #[test]
    fn test_deep_nesting_indentation() {
        let out = render_to_string(&[&vec![vec![vec![7]]]], &opts());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            ["[", "    [", "        [", "            7", "        ]", "    ]", "]"]
        );
        // Leading width is depth * indent
        for line in &lines {
            let depth = (line.len() - line.trim_start().len()) / 4;
            assert!(depth <= 3);
        }
    }

    #[test]
    fn test_guideline_prefix() {
        let mut o = opts();
        o.show_guideline = true;
        let out = render_to_string(&[&vec![vec![1]]], &o);
        assert_eq!(out, "[\n│   [\n│   │   1\n│   ]\n]\n");
    }

    #[test]
    fn test_preorder_scalar_order() {
        let value = vec![vec![1, 2], vec![3], vec![4, 5]];
        let out = render_to_string(&[&value], &opts());
        let positions: Vec<usize> = ["1", "2", "3", "4", "5"]
            .iter()
            .map(|t| out.find(&format!("    {t}")).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let value = vec![(1, "a"), (2, "b")];
        let first = render_to_string(&[&value], &opts());
        let second = render_to_string(&[&value], &opts());
        assert_eq!(first, second);
    }

    #[test]
    fn test_sep_and_end() {
        let mut o = opts();
        o.sep = ", ".to_string();
        o.end = String::new();
        let out = render_to_string(&[&1, &2, &3], &o);
        assert_eq!(out, "1, 2, 3");
    }

    #[test]
    fn test_unprintable_fallback_renders() {
        let node = DisplayNode::opaque();
        let out = render_to_string(&[&node], &opts());
        assert_eq!(out, format!("{UNPRINTABLE}\n"));
    }

    #[test]
    fn test_log_block_prefixes_timestamp() {
        let out = log_block(&[&42], &opts(), false, "[10:20:30]");
        assert_eq!(out, "[10:20:30] 42\n");
    }

    #[test]
    fn test_styled_text_plain_passthrough() {
        let style = theme().style(StyleId::Number);
        assert_eq!(styled_text("42", style, false), "42");
        let ansi = styled_text("42", style, true);
        assert!(ansi.contains("42"));
        assert!(ansi.starts_with('\x1b'));
    }

    #[test]
    fn test_indent_width_invariant() {
        for indent in [1usize, 2, 4, 8] {
            let mut o = opts();
            o.indent = indent;
            let out = render_to_string(&[&vec![vec![1]]], &o);
            let inner = out.lines().nth(2).unwrap();
            let leading = inner.len() - inner.trim_start().len();
            assert_eq!(leading, 2 * indent);
        }
    }
}

//! Snapshot rendering helpers.
//!
//! Converts an element tree (shadow roots included) into an indented
//! plain-text outline suitable for snapshot testing and assertions.

use crate::dom::Element;

/// Render `element` and its descendants as an indented outline.
///
/// Each node is one line: `<tag attr="value">`, followed by its text
/// content in quotes when present. A host's shadow root is printed as
/// `#shadow-root` before its light children. Lines are separated by `'\n'`;
/// the final line has no trailing newline.
///
/// # Examples
///
/// ```ignore
/// use gilt_elements::testing::render_tree;
///
/// let outline = render_tree(&host.element());
/// assert!(outline.contains("#shadow-root"));
/// ```
pub fn render_tree(element: &Element) -> String {
    let mut lines = Vec::new();
    write_node(element, 0, &mut lines);
    lines.join("\n")
}

fn write_node(element: &Element, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    if element.is_shadow_root() {
        lines.push(format!("{indent}#shadow-root"));
    } else {
        let mut line = format!("{indent}<{}", element.tag());
        for name in element.attribute_names() {
            match element.get_attribute(&name) {
                Some(value) if !value.is_empty() => line.push_str(&format!(" {name}=\"{value}\"")),
                _ => line.push_str(&format!(" {name}")),
            }
        }
        line.push('>');
        if let Some(text) = element.text_content() {
            line.push_str(&format!(" {text:?}"));
        }
        lines.push(line);
    }
    if let Some(shadow) = element.shadow_root() {
        write_node(&shadow, depth + 1, lines);
    }
    for child in element.children() {
        write_node(&child, depth + 1, lines);
    }
}

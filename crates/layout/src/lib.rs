//! Block-only layout: every element is a full-width block stacked below its previous sibling.
//!
//! Heights come from an inline `height: <n>px` when present, otherwise from the element's
//! own row plus its children. Good enough to decide what is on screen; not a renderer.
use core_types::Rect;
use css::{Display, parse_display, parse_length};
use html::dom_utils::style_property;
use html::{Id, Node};
use std::collections::HashMap;

pub const DEFAULT_BLOCK_HEIGHT: f32 = 24.0; // one text row

/// Element geometry in page coordinates (origin at the top-left of the document).
#[derive(Clone, Debug, Default)]
pub struct PageLayout {
    pub rects: HashMap<Id, Rect>,
    pub page_height: f32,
}

impl PageLayout {
    pub fn rect(&self, id: Id) -> Option<Rect> {
        self.rects.get(&id).copied()
    }
}

/// Compute block layout for a document.
/// - `page_width` is the available content width in px
pub fn layout_page(root: &Node, page_width: f32) -> PageLayout {
    let mut rects = HashMap::new();
    let page_height = layout_subtree(root, 0.0, 0.0, page_width, &mut rects);
    PageLayout { rects, page_height }
}

// Lays out `node` at (x, y) and returns its height.
fn layout_subtree(
    node: &Node,
    x: f32,
    y: f32,
    width: f32,
    rects: &mut HashMap<Id, Rect>,
) -> f32 {
    let base_height = match node {
        // Document and <html>/<body> are pure containers with no row of their own.
        Node::Document { .. } => 0.0,
        Node::Element { name, .. }
            if name.eq_ignore_ascii_case("html") || name.eq_ignore_ascii_case("body") =>
        {
            0.0
        }
        Node::Element { name, .. } if is_non_rendering(name) => return 0.0,
        Node::Element { .. } => {
            if style_property(node, "display").map(parse_display) == Some(Display::None) {
                rects.insert(node.id(), Rect::new(x, y, 0.0, 0.0));
                return 0.0;
            }
            DEFAULT_BLOCK_HEIGHT
        }
        Node::Text { text, .. } => {
            if text.trim().is_empty() {
                return 0.0;
            }
            DEFAULT_BLOCK_HEIGHT
        }
        Node::Comment { .. } => return 0.0,
    };

    let mut cursor_y = y + base_height;
    for child in node.children().unwrap_or(&[]) {
        cursor_y += layout_subtree(child, x, cursor_y, width, rects);
    }

    let explicit = style_property(node, "height")
        .and_then(parse_length)
        .map(|l| l.px());
    let height = explicit.unwrap_or(cursor_y - y);

    if matches!(node, Node::Element { .. }) {
        rects.insert(node.id(), Rect::new(x, y, width, height));
    }
    height
}

fn is_non_rendering(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "head" | "style" | "script" | "title" | "meta" | "link"
    )
}

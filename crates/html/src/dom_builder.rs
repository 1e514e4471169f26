use crate::dom_utils::parse_style_attribute;
use crate::types::{Id, Node, Token};

/// Build a document tree from a token stream.
///
/// Ids are left at `Id(0)`; call [`crate::dom_utils::assign_node_ids`] afterwards.
/// A `style` attribute is parsed into the element's inline declarations and removed
/// from the attribute list.
pub fn build_dom(tokens: &[Token]) -> Node {
    let mut doctype = None;
    // open[0] holds the document's children; each later entry is an open element.
    let mut open: Vec<Node> = Vec::new();
    let mut root_children: Vec<Node> = Vec::new();

    for token in tokens {
        match token {
            Token::Doctype(s) => {
                doctype = Some(s.clone());
            }
            Token::Comment(c) => {
                append(&mut open, &mut root_children, Node::Comment {
                    id: Id(0),
                    text: c.clone(),
                });
            }
            Token::Text(txt) => {
                if !txt.is_empty() {
                    append(&mut open, &mut root_children, Node::Text {
                        id: Id(0),
                        text: txt.clone(),
                    });
                }
            }
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let mut attributes = attributes.clone();
                let mut style = Vec::new();
                if let Some(pos) = attributes.iter().position(|(k, _)| k == "style") {
                    let (_, value) = attributes.remove(pos);
                    style = parse_style_attribute(value.as_deref().unwrap_or(""));
                }
                let element = Node::Element {
                    id: Id(0),
                    name: name.clone(),
                    attributes,
                    style,
                    children: Vec::new(),
                };
                if *self_closing {
                    append(&mut open, &mut root_children, element);
                } else {
                    open.push(element);
                }
            }
            Token::EndTag(name) => {
                // Ignore stray end tags that match nothing open.
                if !open.iter().any(|n| n.element_name() == Some(name.as_str())) {
                    continue;
                }
                while let Some(node) = open.pop() {
                    let matched = node.element_name() == Some(name.as_str());
                    append(&mut open, &mut root_children, node);
                    if matched {
                        break;
                    }
                }
            }
        }
    }

    // Close anything left open at EOF.
    while let Some(node) = open.pop() {
        append(&mut open, &mut root_children, node);
    }

    Node::Document {
        id: Id(0),
        doctype,
        children: root_children,
    }
}

fn append(open: &mut [Node], root_children: &mut Vec<Node>, node: Node) {
    match open.last_mut().and_then(Node::children_mut) {
        Some(children) => children.push(node),
        None => root_children.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize;

    fn element_names(node: &Node, out: &mut Vec<String>) {
        if let Some(name) = node.element_name() {
            out.push(name.to_string());
        }
        for c in node.children().unwrap_or(&[]) {
            element_names(c, out);
        }
    }

    #[test]
    fn builds_nested_elements_and_closes_at_eof() {
        let dom = build_dom(&tokenize("<html><body><div><p>one<p>two</body>"));
        let mut names = Vec::new();
        element_names(&dom, &mut names);
        assert_eq!(names, ["html", "body", "div", "p", "p"]);
    }

    #[test]
    fn moves_style_attribute_into_inline_declarations() {
        let dom = build_dom(&tokenize(r#"<div style="height: 40px; color:red" id=x></div>"#));
        let Some([Node::Element {
            attributes, style, ..
        }]) = dom.children()
        else {
            panic!("expected one element, got: {dom:?}");
        };
        assert_eq!(attributes, &vec![("id".to_string(), Some("x".to_string()))]);
        assert_eq!(
            style,
            &vec![
                ("height".to_string(), "40px".to_string()),
                ("color".to_string(), "red".to_string()),
            ]
        );
    }

    #[test]
    fn ignores_stray_end_tags() {
        let dom = build_dom(&tokenize("<div></span>text</div>"));
        let Some([div]) = dom.children() else {
            panic!("expected one element, got: {dom:?}");
        };
        assert!(matches!(div.children(), Some([Node::Text { text, .. }]) if text == "text"));
    }
}

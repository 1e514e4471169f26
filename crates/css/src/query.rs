use crate::syntax::{AttrOp, Combinator, ComplexSelector, Compound, SelectorList, SimpleSelector};
use html::dom_utils::get_attr;
use html::{Id, Node};

fn matches_simple(node: &Node, selector: &SimpleSelector) -> bool {
    let Node::Element {
        name: tag,
        attributes,
        ..
    } = node
    else {
        return false;
    };
    match selector {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(t) => tag.eq_ignore_ascii_case(t),
        SimpleSelector::Id(want) => get_attr(node, "id") == Some(want.as_str()),
        SimpleSelector::Class(want) => get_attr(node, "class")
            .map(|list| list.split_whitespace().any(|c| c == want))
            .unwrap_or(false),
        SimpleSelector::Attribute { name, test } => {
            let Some((_, value)) = attributes.iter().find(|(k, _)| k.eq_ignore_ascii_case(name))
            else {
                return false;
            };
            let Some((op, want)) = test else {
                return true;
            };
            // A valueless attribute (`<div hidden>`) has the empty string as its value.
            let have = value.as_deref().unwrap_or("");
            match op {
                AttrOp::Equals => have == want,
                AttrOp::Includes => have.split_whitespace().any(|w| w == want),
                AttrOp::Prefix => !want.is_empty() && have.starts_with(want.as_str()),
                AttrOp::Suffix => !want.is_empty() && have.ends_with(want.as_str()),
                AttrOp::Substring => !want.is_empty() && have.contains(want.as_str()),
            }
        }
    }
}

fn matches_compound(node: &Node, compound: &Compound) -> bool {
    compound.parts.iter().all(|s| matches_simple(node, s))
}

// `ancestors` is ordered root-first, nearest parent last.
fn matches_complex(node: &Node, ancestors: &[&Node], selector: &ComplexSelector) -> bool {
    let Some(last) = selector.compounds.last() else {
        return false;
    };
    matches_compound(node, last)
        && match_ancestors(selector, selector.compounds.len() - 1, ancestors)
}

fn match_ancestors(selector: &ComplexSelector, idx: usize, ancestors: &[&Node]) -> bool {
    if idx == 0 {
        return true;
    }
    let compound = &selector.compounds[idx - 1];
    match selector.combinators[idx - 1] {
        Combinator::Child => {
            let Some((parent, rest)) = ancestors.split_last() else {
                return false;
            };
            matches_compound(parent, compound) && match_ancestors(selector, idx - 1, rest)
        }
        Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
            matches_compound(ancestors[i], compound)
                && match_ancestors(selector, idx - 1, &ancestors[..i])
        }),
    }
}

/// Does `node` (whose ancestor chain is `ancestors`, root-first) match any selector in `list`?
pub fn matches(node: &Node, ancestors: &[&Node], list: &SelectorList) -> bool {
    list.selectors
        .iter()
        .any(|s| matches_complex(node, ancestors, s))
}

/// `querySelectorAll`: every matching element under `root` in document order, each once.
pub fn query_selector_all(root: &Node, list: &SelectorList) -> Vec<Id> {
    fn walk<'a>(node: &'a Node, ancestors: &mut Vec<&'a Node>, list: &SelectorList, out: &mut Vec<Id>) {
        if matches(node, ancestors, list) {
            out.push(node.id());
        }
        if let Some(children) = node.children() {
            ancestors.push(node);
            for c in children {
                walk(c, ancestors, list, out);
            }
            ancestors.pop();
        }
    }

    let mut out = Vec::new();
    let mut ancestors = Vec::new();
    walk(root, &mut ancestors, list, &mut out);
    log::trace!(target: "css.query", "{list} matched {} elements", out.len());
    out
}

/// `querySelector`: the first match in document order.
pub fn query_selector(root: &Node, list: &SelectorList) -> Option<Id> {
    fn walk<'a>(node: &'a Node, ancestors: &mut Vec<&'a Node>, list: &SelectorList) -> Option<Id> {
        if matches(node, ancestors, list) {
            return Some(node.id());
        }
        let children = node.children()?;
        ancestors.push(node);
        let found = children.iter().find_map(|c| walk(c, ancestors, list));
        ancestors.pop();
        found
    }

    walk(root, &mut Vec::new(), list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_selector_list;
    use html::dom_utils::find_node_by_id;
    use html::parse_document;

    fn select(html: &str, selector: &str) -> Vec<String> {
        let dom = parse_document(html);
        let list = parse_selector_list(selector).unwrap();
        query_selector_all(&dom, &list)
            .into_iter()
            .map(|id| {
                let node = find_node_by_id(&dom, id).unwrap();
                get_attr(node, "id").unwrap_or("?").to_string()
            })
            .collect()
    }

    #[test]
    fn attribute_presence_matches_empty_and_valueless() {
        let html = r#"
            <div id=a data-background-image-url="/a.png"></div>
            <div id=b data-background-image-url=""></div>
            <div id=c data-background-image-url></div>
            <div id=d data-other="/d.png"></div>
        "#;
        assert_eq!(select(html, "[data-background-image-url]"), ["a", "b", "c"]);
    }

    #[test]
    fn results_are_in_document_order_without_duplicates() {
        let html = r#"<section id=s class="hero"><div id=x class="hero card"></div></section>"#;
        assert_eq!(select(html, ".card, .hero, section"), ["s", "x"]);
    }

    #[test]
    fn combinators_respect_ancestry() {
        let html = r#"<div id=nav><p id=p><a id=deep></a></p><a id=direct></a></div><a id=outside></a>"#;
        assert_eq!(select(html, "#nav a"), ["deep", "direct"]);
        assert_eq!(select(html, "#nav > a"), ["direct"]);
        assert_eq!(select(html, "div p > a"), ["deep"]);
    }

    #[test]
    fn attribute_operators() {
        let html = r#"<a id=x data-ga-target="true" href="https://example.com/a.png" rel="noopener external"></a>"#;
        assert_eq!(select(html, r#"[data-ga-target="true"]"#), ["x"]);
        assert_eq!(select(html, "[rel~=external]"), ["x"]);
        assert_eq!(select(html, "[href^=https][href$='.png'][href*=example]"), ["x"]);
        assert!(select(html, r#"[data-ga-target="false"]"#).is_empty());
    }

    #[test]
    fn query_selector_returns_first_match() {
        let dom = parse_document("<div id=one class=c></div><div id=two class=c></div>");
        let list = parse_selector_list(".c").unwrap();
        let first = query_selector(&dom, &list).unwrap();
        assert_eq!(get_attr(find_node_by_id(&dom, first).unwrap(), "id"), Some("one"));
    }
}

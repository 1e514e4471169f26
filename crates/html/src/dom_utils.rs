use crate::{Id, Node};

pub fn get_attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    match node {
        Node::Element { attributes, .. } => attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref()),
        _ => None,
    }
}

/// Set (or replace) an attribute. Returns false for non-element nodes.
pub fn set_attr(node: &mut Node, name: &str, value: &str) -> bool {
    let Node::Element { attributes, .. } = node else {
        return false;
    };
    match attributes
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
    {
        Some((_, v)) => *v = Some(value.to_string()),
        None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
    }
    true
}

pub fn has_class(node: &Node, class: &str) -> bool {
    get_attr(node, "class")
        .map(|list| list.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// `classList.add`: appends `class` unless the token is already present.
pub fn add_class(node: &mut Node, class: &str) -> bool {
    if !matches!(node, Node::Element { .. }) || class.trim().is_empty() {
        return false;
    }
    if has_class(node, class) {
        return true;
    }
    let list = match get_attr(node, "class").map(str::trim) {
        Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
        _ => class.to_string(),
    };
    set_attr(node, "class", &list)
}

pub fn style_property<'a>(node: &'a Node, property: &str) -> Option<&'a str> {
    match node {
        Node::Element { style, .. } => style
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(property))
            .map(|(_, v)| v.as_str()),
        _ => None,
    }
}

/// `element.style.<property> = value`: replaces in place or appends.
pub fn set_style_property(node: &mut Node, property: &str, value: &str) -> bool {
    let Node::Element { style, .. } = node else {
        return false;
    };
    let property = property.to_ascii_lowercase();
    match style.iter_mut().find(|(k, _)| *k == property) {
        Some((_, v)) => *v = value.to_string(),
        None => style.push((property, value.to_string())),
    }
    true
}

// input: "color: red; height: 40px;"
// output: vec![("color", "red"), ("height", "40px")]
pub fn parse_style_attribute(input: &str) -> Vec<(String, String)> {
    input
        .split(';')
        .filter_map(|pair| {
            let (n, v) = pair.split_once(':')?;
            let name = n.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, v.trim().to_string()))
        })
        .collect()
}

pub fn style_text(style: &[(String, String)]) -> String {
    style
        .iter()
        .map(|(k, v)| format!("{k}: {v};"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn outline_from_dom(root: &Node, cap: usize) -> Vec<String> {
    fn walk(node: &Node, depth: usize, out: &mut Vec<String>, left: &mut usize) {
        if *left == 0 {
            return;
        }
        *left -= 1;
        let indent = "  ".repeat(depth);
        match node {
            Node::Document {
                doctype, children, ..
            } => {
                if let Some(dt) = doctype {
                    out.push(format!("{indent}<!{dt}>"));
                } else {
                    out.push(format!("{indent}#document"));
                }
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Element {
                name,
                children,
                style,
                ..
            } => {
                let id = get_attr(node, "id").unwrap_or("");
                let class = get_attr(node, "class").unwrap_or("");
                let mut line = format!("{indent}<{name}");
                if !id.is_empty() {
                    line.push_str(&format!(r#" id="{id}""#));
                }
                if !class.is_empty() {
                    line.push_str(&format!(r#" class="{class}""#));
                }
                line.push('>');
                if !style.is_empty() {
                    line.push_str(&format!("  /* {} */", style_text(style)));
                }
                out.push(line);
                for c in children {
                    walk(c, depth + 1, out, left);
                }
            }
            Node::Text { text, .. } => {
                let t = text.replace('\n', " ").trim().to_string();
                if !t.is_empty() {
                    out.push(format!("{indent}\"{}\"", truncate(&t, 40)));
                }
            }
            Node::Comment { text, .. } => {
                let t = text.replace('\n', " ");
                out.push(format!("{indent}<!-- {} -->", truncate(&t, 40)));
            }
        }
    }
    let mut out = Vec::new();
    let mut left = cap;
    walk(root, 0, &mut out, &mut left);
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

pub fn assign_node_ids(root: &mut Node) {
    fn walk(node: &mut Node, next: &mut u32) {
        // only assign if currently unset
        if node.id() == Id(0) {
            node.set_id(Id(*next));
            *next = next.wrapping_add(1);
        }
        if let Some(children) = node.children_mut() {
            for c in children {
                walk(c, next);
            }
        }
    }

    let mut next = max_node_id(root).0.wrapping_add(1).max(1);
    walk(root, &mut next);
}

pub fn max_node_id(node: &Node) -> Id {
    node.children()
        .unwrap_or(&[])
        .iter()
        .map(max_node_id)
        .fold(node.id(), Id::max)
}

pub fn find_node_by_id(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children()?
        .iter()
        .find_map(|c| find_node_by_id(c, id))
}

pub fn find_node_by_id_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_node_by_id_mut(c, id))
}

/// First element with the given tag name, in document order.
pub fn find_element_by_name_mut<'a>(node: &'a mut Node, name: &str) -> Option<&'a mut Node> {
    if node
        .element_name()
        .is_some_and(|n| n.eq_ignore_ascii_case(name))
    {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_element_by_name_mut(c, name))
}

/// Child-index path from `root` to the node with `id`.
pub fn path_to(root: &Node, id: Id) -> Option<Vec<usize>> {
    fn walk(node: &Node, id: Id, path: &mut Vec<usize>) -> bool {
        if node.id() == id {
            return true;
        }
        for (i, c) in node.children().unwrap_or(&[]).iter().enumerate() {
            path.push(i);
            if walk(c, id, path) {
                return true;
            }
            path.pop();
        }
        false
    }
    let mut path = Vec::new();
    walk(root, id, &mut path).then_some(path)
}

fn node_at_path_mut<'a>(root: &'a mut Node, path: &[usize]) -> Option<&'a mut Node> {
    let mut node = root;
    for &i in path {
        node = node.children_mut()?.get_mut(i)?;
    }
    Some(node)
}

/// Exchange the tree positions of two nodes.
///
/// Fails (returns false) when either node is missing, is the root, or one contains the other.
pub fn swap_nodes(root: &mut Node, a: Id, b: Id) -> bool {
    if a == b {
        return path_to(root, a).is_some();
    }
    let (Some(path_a), Some(path_b)) = (path_to(root, a), path_to(root, b)) else {
        return false;
    };
    if path_a.is_empty()
        || path_b.is_empty()
        || path_a.starts_with(&path_b)
        || path_b.starts_with(&path_a)
    {
        return false;
    }

    let placeholder = Node::Comment {
        id: Id(0),
        text: String::new(),
    };
    let Some(slot_a) = node_at_path_mut(root, &path_a) else {
        return false;
    };
    let node_a = std::mem::replace(slot_a, placeholder);
    let Some(slot_b) = node_at_path_mut(root, &path_b) else {
        return false;
    };
    let node_b = std::mem::replace(slot_b, node_a);
    match node_at_path_mut(root, &path_a) {
        Some(slot_a) => {
            *slot_a = node_b;
            true
        }
        None => false,
    }
}

/// Append `<script src=…>` to `<head>`, returning the new element's id.
pub fn append_script(root: &mut Node, src: &str) -> Option<Id> {
    let id = Id(max_node_id(root).0.wrapping_add(1));
    let head = find_element_by_name_mut(root, "head")?;
    head.children_mut()?.push(Node::Element {
        id,
        name: "script".to_string(),
        attributes: vec![("src".to_string(), Some(src.to_string()))],
        style: Vec::new(),
        children: Vec::new(),
    });
    log::debug!(target: "html.dom", "appended script {src} as {id:?}");
    Some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_dom, tokenize};

    fn parse(html: &str) -> Node {
        let mut dom = build_dom(&tokenize(html));
        assign_node_ids(&mut dom);
        dom
    }

    fn id_of(dom: &Node, attr_id: &str) -> Id {
        fn walk(node: &Node, want: &str) -> Option<Id> {
            if get_attr(node, "id") == Some(want) {
                return Some(node.id());
            }
            node.children()?.iter().find_map(|c| walk(c, want))
        }
        walk(dom, attr_id).unwrap_or_else(|| panic!("no element with id={attr_id}"))
    }

    #[test]
    fn assigns_unique_ids_in_document_order() {
        let dom = parse("<div id=a><span id=b></span></div><p id=c></p>");
        let (a, b, c) = (id_of(&dom, "a"), id_of(&dom, "b"), id_of(&dom, "c"));
        assert!(a < b && b < c, "ids not in document order: {a:?} {b:?} {c:?}");
        assert_eq!(dom.id(), Id(1));
    }

    #[test]
    fn add_class_does_not_duplicate_tokens() {
        let mut dom = parse(r#"<div id=a class="hero"></div>"#);
        let a = id_of(&dom, "a");
        let node = find_node_by_id_mut(&mut dom, a).unwrap();
        assert!(add_class(node, "loaded"));
        assert!(add_class(node, "loaded"));
        assert_eq!(get_attr(node, "class"), Some("hero loaded"));
    }

    #[test]
    fn set_style_property_replaces_existing_declaration() {
        let mut dom = parse(r#"<div id=a style="background-image: none; height: 10px"></div>"#);
        let a = id_of(&dom, "a");
        let node = find_node_by_id_mut(&mut dom, a).unwrap();
        set_style_property(node, "Background-Image", "url(/x.png)");
        assert_eq!(style_property(node, "background-image"), Some("url(/x.png)"));
        let Node::Element { style, .. } = node else {
            unreachable!()
        };
        assert_eq!(style_text(style), "background-image: url(/x.png); height: 10px;");
    }

    #[test]
    fn swap_nodes_exchanges_positions_across_parents() {
        let mut dom = parse("<div id=p1><i id=a></i><b id=x></b></div><div id=p2><u id=b></u></div>");
        let (a, b) = (id_of(&dom, "a"), id_of(&dom, "b"));
        assert!(swap_nodes(&mut dom, a, b));
        let p1 = find_node_by_id(&dom, id_of(&dom, "p1")).unwrap();
        let p2 = find_node_by_id(&dom, id_of(&dom, "p2")).unwrap();
        assert_eq!(p1.children().unwrap()[0].id(), b);
        assert_eq!(p2.children().unwrap()[0].id(), a);
    }

    #[test]
    fn swap_nodes_rejects_ancestor_pairs() {
        let mut dom = parse("<div id=outer><span id=inner></span></div>");
        let (outer, inner) = (id_of(&dom, "outer"), id_of(&dom, "inner"));
        assert!(!swap_nodes(&mut dom, outer, inner));
    }

    #[test]
    fn append_script_targets_head() {
        let mut dom = parse("<html><head></head><body></body></html>");
        let id = append_script(&mut dom, "/app.js").expect("head present");
        let script = find_node_by_id(&dom, id).unwrap();
        assert_eq!(script.element_name(), Some("script"));
        assert_eq!(get_attr(script, "src"), Some("/app.js"));

        let mut no_head = parse("<div></div>");
        assert_eq!(append_script(&mut no_head, "/app.js"), None);
    }

    #[test]
    fn outline_shows_inline_style_and_class() {
        let dom = parse(r#"<div class="loaded" style="background-image: url(a)">hi</div>"#);
        let lines = outline_from_dom(&dom, 10);
        assert_eq!(lines[0], "#document");
        assert_eq!(
            lines[1],
            r#"  <div class="loaded">  /* background-image: url(a); */"#
        );
        assert_eq!(lines[2], "    \"hi\"");
    }
}

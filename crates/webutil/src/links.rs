use crate::validate::validate_email;
use css::{SelectorError, parse_selector_list, query_selector};
use html::Node;
use html::dom_utils::{find_node_by_id_mut, get_attr, set_attr};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters `encodeURI` leaves alone besides ASCII alphanumerics.
const URI_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

/// Percent-encode like `encodeURI`: URL delimiters survive, everything else is UTF-8 escaped.
pub fn encode_uri(input: &str) -> String {
    utf8_percent_encode(input, URI_KEEP).to_string()
}

/// Route a user-supplied link through `/redirect`.
///
/// E-mail addresses become `mailto:` links, anything with a scheme passes through as-is, and
/// bare hosts get `http://`.
pub fn construct_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    if validate_email(url) {
        return format!("/redirect?url=mailto:{}", encode_uri(url));
    }
    if url.contains(':') {
        format!("/redirect?url={url}")
    } else {
        format!("/redirect?url=http://{}", encode_uri(url))
    }
}

/// Rewrite every `<a>` below the first element matching `container` to open its redirect
/// link in a new tab. Returns how many anchors were rewritten.
pub fn format_links(root: &mut Node, container: &str) -> Result<usize, SelectorError> {
    let list = parse_selector_list(container)?;
    let Some(id) = query_selector(root, &list) else {
        log::debug!(target: "webutil.links", "no container matches {container}");
        return Ok(0);
    };
    let Some(container) = find_node_by_id_mut(root, id) else {
        return Ok(0);
    };

    let mut count = 0;
    if let Some(children) = container.children_mut() {
        for child in children {
            rewrite_anchors(child, &mut count);
        }
    }
    Ok(count)
}

fn rewrite_anchors(node: &mut Node, count: &mut usize) {
    if node.element_name().is_some_and(|n| n.eq_ignore_ascii_case("a")) {
        let href = construct_url(get_attr(node, "href").unwrap_or(""));
        set_attr(node, "href", &href);
        set_attr(node, "target", "_blank");
        *count += 1;
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            rewrite_anchors(child, count);
        }
    }
}

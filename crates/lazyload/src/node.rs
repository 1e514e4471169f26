use crate::loader::ImageLoader;
use core_types::ImageTicket;
use css::background_image_layers;
use html::dom_utils::{add_class, find_node_by_id_mut, get_attr, set_style_property};
use html::{Id, Node};

/// Attribute naming an element's deferred background image.
pub const SOURCE_ATTRIBUTE: &str = "data-background-image-url";

/// Placeholder used when an element has no source, and as the last background layer.
pub const FALLBACK_IMAGE_URL: &str = "/static/image.png";

/// One element waiting for its background image.
///
/// The source is read once at construction and never changes. An absent or empty source is
/// kept as `None`; the fallback is only substituted when loading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadableNode {
    element: Id,
    image_source: Option<String>,
    loaded_class: String,
}

impl LoadableNode {
    pub fn new(element: Id, image_source: Option<String>, loaded_class: impl Into<String>) -> Self {
        let image_source = image_source.filter(|s| !s.trim().is_empty());
        Self {
            element,
            image_source,
            loaded_class: loaded_class.into(),
        }
    }

    /// Wrap an element, reading [`SOURCE_ATTRIBUTE`]. Returns `None` for non-elements.
    pub fn from_element(node: &Node, loaded_class: &str) -> Option<Self> {
        if !matches!(node, Node::Element { .. }) {
            return None;
        }
        let source = get_attr(node, SOURCE_ATTRIBUTE).map(str::to_string);
        Some(Self::new(node.id(), source, loaded_class))
    }

    pub fn element(&self) -> Id {
        self.element
    }

    pub fn image_source(&self) -> Option<&str> {
        self.image_source.as_deref()
    }

    pub fn loaded_class(&self) -> &str {
        &self.loaded_class
    }

    /// The URL actually fetched: the element's source, or the fallback when it has none.
    pub fn resolved_source(&self) -> &str {
        self.image_source.as_deref().unwrap_or(FALLBACK_IMAGE_URL)
    }

    /// `url(<source>),url(<fallback>)`
    pub fn background_image_value(&self) -> String {
        background_image_layers([self.resolved_source(), FALLBACK_IMAGE_URL])
    }

    /// First phase: issue the fetch.
    pub fn begin_load(&self, images: &mut dyn ImageLoader) -> ImageTicket {
        let ticket = images.issue(self.resolved_source());
        log::debug!(
            target: "lazyload.node",
            "{:?}: fetching {} as {:?}",
            self.element,
            self.resolved_source(),
            ticket
        );
        ticket
    }

    /// Second phase, run at a paint opportunity after the fetch settled: apply the
    /// background layers and the loaded class. Returns false if the element is gone.
    pub fn show(&self, document: &mut Node) -> bool {
        let Some(element) = find_node_by_id_mut(document, self.element) else {
            log::debug!(target: "lazyload.node", "{:?}: element left the document", self.element);
            return false;
        };
        set_style_property(element, "background-image", &self.background_image_value());
        add_class(element, &self.loaded_class);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::dom_utils::{has_class, style_property};
    use html::parse_document;

    fn first_element(dom: &Node) -> &Node {
        fn walk(node: &Node) -> Option<&Node> {
            if matches!(node, Node::Element { .. }) {
                return Some(node);
            }
            node.children()?.iter().find_map(walk)
        }
        walk(dom).expect("document has an element")
    }

    #[test]
    fn reads_source_once_and_keeps_it_verbatim() {
        let dom = parse_document(r#"<div data-background-image-url="/img/hero.jpg"></div>"#);
        let node = LoadableNode::from_element(first_element(&dom), "loaded").unwrap();
        assert_eq!(node.image_source(), Some("/img/hero.jpg"));
        assert_eq!(node.resolved_source(), "/img/hero.jpg");
        assert_eq!(
            node.background_image_value(),
            "url(/img/hero.jpg),url(/static/image.png)"
        );
    }

    #[test]
    fn empty_or_missing_source_resolves_to_fallback_only_at_load_time() {
        for html in [
            r#"<div data-background-image-url=""></div>"#,
            r#"<div data-background-image-url></div>"#,
            r#"<div class="hero"></div>"#,
        ] {
            let dom = parse_document(html);
            let node = LoadableNode::from_element(first_element(&dom), "loaded").unwrap();
            assert_eq!(node.image_source(), None, "for {html}");
            assert_eq!(node.resolved_source(), FALLBACK_IMAGE_URL, "for {html}");
            assert_eq!(
                node.background_image_value(),
                "url(/static/image.png),url(/static/image.png)"
            );
        }
    }

    #[test]
    fn show_applies_style_and_class() {
        let mut dom = parse_document(
            r#"<div class="tile" style="height: 10px" data-background-image-url="/a.png"></div>"#,
        );
        let node = LoadableNode::from_element(first_element(&dom), "loaded").unwrap();
        assert!(node.show(&mut dom));

        let element = first_element(&dom);
        assert!(has_class(element, "tile") && has_class(element, "loaded"));
        assert_eq!(
            style_property(element, "background-image"),
            Some("url(/a.png),url(/static/image.png)")
        );
        assert_eq!(style_property(element, "height"), Some("10px"));
    }

    #[test]
    fn show_reports_detached_element() {
        let mut dom = parse_document("<p></p>");
        let node = LoadableNode::new(Id(999), Some("/x.png".into()), "loaded");
        assert!(!node.show(&mut dom));
    }
}

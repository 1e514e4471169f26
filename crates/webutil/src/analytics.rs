use css::{parse_selector_list, query_selector_all};
use html::dom_utils::{find_node_by_id, get_attr};
use html::{Id, Node};
use serde::Serialize;

const TRACKED_SELECTOR: &str = r#"[data-ga-target="true"]"#;

/// One analytics event, in the field layout the collector expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsHit {
    pub hit_type: &'static str,
    pub event_category: String,
    pub event_action: String,
    pub event_label: Option<String>,
    pub transport: &'static str,
}

/// Where hits go (a `ga('send', ..)` stand-in).
pub trait AnalyticsSink {
    fn send(&mut self, hit: AnalyticsHit);
}

impl AnalyticsSink for Vec<AnalyticsHit> {
    fn send(&mut self, hit: AnalyticsHit) {
        self.push(hit);
    }
}

/// A tracked element and the fixed parts of its hits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsBinding {
    pub element: Id,
    pub category: String,
    pub label: Option<String>,
}

impl AnalyticsBinding {
    pub fn hit(&self, event_type: &str) -> AnalyticsHit {
        AnalyticsHit {
            hit_type: "event",
            event_category: self.category.clone(),
            event_action: event_type.to_string(),
            event_label: self.label.clone(),
            transport: "beacon",
        }
    }
}

/// Bindings for every element marked `data-ga-target="true"`, in document order.
pub fn bind_analytics_events(root: &Node) -> Vec<AnalyticsBinding> {
    let Ok(list) = parse_selector_list(TRACKED_SELECTOR) else {
        return Vec::new();
    };
    query_selector_all(root, &list)
        .into_iter()
        .filter_map(|id| {
            let node = find_node_by_id(root, id)?;
            Some(AnalyticsBinding {
                element: id,
                category: node.element_name()?.to_ascii_uppercase(),
                label: get_attr(node, "data-ga-label").map(str::to_string),
            })
        })
        .collect()
}

/// Deliver an event on `target` to the sink if the element is bound. Returns whether a hit
/// was sent.
pub fn dispatch(
    bindings: &[AnalyticsBinding],
    target: Id,
    event_type: &str,
    sink: &mut dyn AnalyticsSink,
) -> bool {
    let Some(binding) = bindings.iter().find(|b| b.element == target) else {
        return false;
    };
    log::trace!(target: "webutil.analytics", "{} {event_type}", binding.category);
    sink.send(binding.hit(event_type));
    true
}

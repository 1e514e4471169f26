use crate::loader::{ImageLoader, LoadOutcome};
use crate::node::LoadableNode;
use crate::observer::{VisibilityEntry, VisibilityObserver};
use crate::options::LazyLoadOptions;
use core_types::ImageTicket;
use css::{SelectorError, parse_selector_list, query_selector_all};
use html::dom_utils::find_node_by_id;
use html::{Id, Node};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LazyLoadError {
    #[error("invalid lazy-load selector {selector:?}: {source}")]
    InvalidSelector {
        selector: String,
        #[source]
        source: SelectorError,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Subscribed, not yet seen intersecting.
    Observed,
    /// Fetch issued, waiting for it to settle.
    Fetching(ImageTicket),
    /// Fetch settled, waiting for the next frame to apply the style.
    AwaitingFrame,
}

#[derive(Clone, Debug)]
pub struct PendingNode {
    pub node: LoadableNode,
    pub state: LoadState,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoaderStats {
    pub tracked: usize,
    pub loaded: usize,
    pub ignored_notifications: usize,
    pub failed_fetches: usize,
}

/// Drives every element matching a selector from "observed" to "loaded", then retires the
/// visibility subscription.
///
/// Invariants:
/// - every id in `pending` is observed by `observer`;
/// - `observer` is `Some` exactly while `pending` is non-empty, and is disconnected once
///   when it is taken.
///
/// All mutation happens through `&mut self`, so the coordinator is single-owner by
/// construction. The host feeds it three kinds of input:
/// [`on_visibility`](Self::on_visibility), [`on_image_settled`](Self::on_image_settled) and
/// [`on_frame`](Self::on_frame).
#[derive(Debug)]
pub struct LazyLoadCoordinator<O: VisibilityObserver> {
    pending: HashMap<Id, PendingNode>,
    in_flight: HashMap<ImageTicket, Id>,
    // Settled nodes in settle order, shown at the next frame.
    ready: Vec<Id>,
    observer: Option<O>,
    stats: LoaderStats,
}

impl<O: VisibilityObserver> LazyLoadCoordinator<O> {
    /// Snapshot the elements matching `options.selector` and subscribe each to `observer`.
    ///
    /// Elements added to the document later are never picked up. When nothing matches, the
    /// observer is disconnected immediately.
    pub fn new(
        document: &Node,
        options: &LazyLoadOptions,
        mut observer: O,
    ) -> Result<Self, LazyLoadError> {
        let selector = parse_selector_list(&options.selector).map_err(|source| {
            LazyLoadError::InvalidSelector {
                selector: options.selector.clone(),
                source,
            }
        })?;

        let mut pending = HashMap::new();
        let mut order = Vec::new();
        for id in query_selector_all(document, &selector) {
            let Some(node) = find_node_by_id(document, id)
                .and_then(|n| LoadableNode::from_element(n, &options.loaded_class_name))
            else {
                continue;
            };
            if pending.contains_key(&id) {
                continue;
            }
            order.push(id);
            pending.insert(id, PendingNode {
                node,
                state: LoadState::Observed,
            });
        }

        let tracked = pending.len();
        let observer = if tracked == 0 {
            observer.disconnect();
            log::info!(
                target: "lazyload.coordinator",
                "{} matched nothing; observer disconnected",
                options.selector
            );
            None
        } else {
            for id in &order {
                observer.observe(*id);
            }
            log::debug!(
                target: "lazyload.coordinator",
                "tracking {tracked} elements for {}",
                options.selector
            );
            Some(observer)
        };

        Ok(Self {
            pending,
            in_flight: HashMap::new(),
            ready: Vec::new(),
            observer,
            stats: LoaderStats {
                tracked,
                ..LoaderStats::default()
            },
        })
    }

    /// Handle one notification batch, in the order given. Returns how many fetches started.
    ///
    /// Entries that are not intersecting, or whose target is no longer pending, are ignored.
    /// A node whose load already started is not loaded again.
    pub fn on_visibility(
        &mut self,
        entries: &[VisibilityEntry],
        images: &mut dyn ImageLoader,
    ) -> usize {
        log::trace!(target: "lazyload.coordinator", "visibility batch of {}", entries.len());
        let mut started = 0;
        for entry in entries {
            if !entry.is_intersecting {
                continue;
            }
            let Some(pending) = self.pending.get_mut(&entry.target) else {
                self.stats.ignored_notifications += 1;
                continue;
            };
            if pending.state != LoadState::Observed {
                self.stats.ignored_notifications += 1;
                continue;
            }
            let ticket = pending.node.begin_load(images);
            pending.state = LoadState::Fetching(ticket);
            self.in_flight.insert(ticket, entry.target);
            started += 1;
        }
        started
    }

    /// Record that a fetch settled. The node is shown at the next [`on_frame`](Self::on_frame).
    ///
    /// A failed fetch is shown all the same; the fallback layer covers it.
    pub fn on_image_settled(&mut self, ticket: ImageTicket, outcome: LoadOutcome) {
        let Some(id) = self.in_flight.remove(&ticket) else {
            log::debug!(target: "lazyload.coordinator", "unknown ticket {ticket:?}");
            return;
        };
        let Some(pending) = self.pending.get_mut(&id) else {
            return;
        };
        if let LoadOutcome::Failed(reason) = &outcome {
            self.stats.failed_fetches += 1;
            log::warn!(
                target: "lazyload.coordinator",
                "{id:?}: fetching {} failed: {reason}",
                pending.node.resolved_source()
            );
        }
        pending.state = LoadState::AwaitingFrame;
        self.ready.push(id);
    }

    /// Paint opportunity: apply every settled node, then run its completion step.
    ///
    /// Returns the nodes shown, in settle order. Each node's style is in the document before
    /// its completion step runs.
    pub fn on_frame(&mut self, document: &mut Node) -> Vec<LoadableNode> {
        let ready = std::mem::take(&mut self.ready);
        let mut shown = Vec::with_capacity(ready.len());
        for id in ready {
            let Some(pending) = self.pending.get(&id) else {
                continue;
            };
            pending.node.show(document);
            if let Some(done) = self.complete(id) {
                shown.push(done.node);
            }
        }
        shown
    }

    // unobserve -> remove -> disconnect when drained.
    fn complete(&mut self, id: Id) -> Option<PendingNode> {
        if let Some(observer) = self.observer.as_mut() {
            observer.unobserve(id);
        }
        let done = self.pending.remove(&id)?;
        self.stats.loaded += 1;
        log::debug!(
            target: "lazyload.coordinator",
            "{id:?} loaded; {} pending",
            self.pending.len()
        );

        if self.pending.is_empty()
            && let Some(mut observer) = self.observer.take()
        {
            observer.disconnect();
            log::info!(
                target: "lazyload.coordinator",
                "all {} elements loaded; observer disconnected",
                self.stats.loaded
            );
        }
        Some(done)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: Id) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn state(&self, id: Id) -> Option<LoadState> {
        self.pending.get(&id).map(|p| p.state)
    }

    pub fn pending_node(&self, id: Id) -> Option<&LoadableNode> {
        self.pending.get(&id).map(|p| &p.node)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Nodes settled but not yet shown.
    pub fn ready_len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_disconnected(&self) -> bool {
        self.observer.is_none()
    }

    pub fn observer(&self) -> Option<&O> {
        self.observer.as_ref()
    }

    pub fn observer_mut(&mut self) -> Option<&mut O> {
        self.observer.as_mut()
    }

    pub fn stats(&self) -> LoaderStats {
        self.stats
    }
}

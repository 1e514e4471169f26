use core_types::Rect;
use html::Id;
use std::collections::HashMap;

/// One visibility change for one observed element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub target: Id,
    pub is_intersecting: bool,
}

impl VisibilityEntry {
    pub fn visible(target: Id) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }

    pub fn hidden(target: Id) -> Self {
        Self {
            target,
            is_intersecting: false,
        }
    }
}

/// The subscription side of a visibility primitive (IntersectionObserver-like).
///
/// Notifications are not pulled through this trait: the host delivers each batch to
/// [`crate::LazyLoadCoordinator::on_visibility`].
pub trait VisibilityObserver {
    fn observe(&mut self, target: Id);
    fn unobserve(&mut self, target: Id);
    /// Stop observing everything. Called at most once per coordinator.
    fn disconnect(&mut self);
}

impl<O: VisibilityObserver + ?Sized> VisibilityObserver for Box<O> {
    fn observe(&mut self, target: Id) {
        (**self).observe(target)
    }

    fn unobserve(&mut self, target: Id) {
        (**self).unobserve(target)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}

/// Geometry-driven visibility primitive.
///
/// Targets are matched against the viewport grown by `root_margin` on every side. Observing a
/// target queues an initial record with its current state; moving the viewport queues one
/// record per target whose state flipped, in observation order.
#[derive(Debug)]
pub struct ViewportObserver {
    rects: HashMap<Id, Rect>,
    viewport: Rect,
    root_margin: f32,
    // (target, last reported state), in observation order
    observed: Vec<(Id, bool)>,
    records: Vec<VisibilityEntry>,
    connected: bool,
}

impl ViewportObserver {
    pub fn new(rects: HashMap<Id, Rect>, viewport: Rect, root_margin: f32) -> Self {
        Self {
            rects,
            viewport,
            root_margin,
            observed: Vec::new(),
            records: Vec::new(),
            connected: true,
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_observing(&self, target: Id) -> bool {
        self.observed.iter().any(|(id, _)| *id == target)
    }

    pub fn observed_len(&self) -> usize {
        self.observed.len()
    }

    fn intersects(&self, target: Id) -> bool {
        // Targets without geometry (not rendered) never intersect.
        self.rects
            .get(&target)
            .is_some_and(|r| r.intersects(&self.viewport.expand(self.root_margin)))
    }

    /// Move the viewport and queue records for every target whose state changed.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        let margin_box = viewport.expand(self.root_margin);
        let rects = &self.rects;
        for (target, last) in &mut self.observed {
            let now = rects.get(target).is_some_and(|r| r.intersects(&margin_box));
            if now != *last {
                *last = now;
                self.records.push(VisibilityEntry {
                    target: *target,
                    is_intersecting: now,
                });
            }
        }
        log::trace!(
            target: "lazyload.observer",
            "viewport y={} h={}: {} queued records",
            viewport.y,
            viewport.height,
            self.records.len()
        );
    }

    /// Drain the queued batch.
    pub fn take_records(&mut self) -> Vec<VisibilityEntry> {
        std::mem::take(&mut self.records)
    }
}

impl VisibilityObserver for ViewportObserver {
    fn observe(&mut self, target: Id) {
        if !self.connected || self.is_observing(target) {
            return;
        }
        let now = self.intersects(target);
        self.observed.push((target, now));
        self.records.push(VisibilityEntry {
            target,
            is_intersecting: now,
        });
    }

    fn unobserve(&mut self, target: Id) {
        self.observed.retain(|(id, _)| *id != target);
        self.records.retain(|r| r.target != target);
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.observed.clear();
        self.records.clear();
        log::debug!(target: "lazyload.observer", "disconnected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> ViewportObserver {
        let rects = HashMap::from([
            (Id(1), Rect::new(0.0, 0.0, 100.0, 100.0)),
            (Id(2), Rect::new(0.0, 700.0, 100.0, 100.0)),
            (Id(3), Rect::new(0.0, 1500.0, 100.0, 100.0)),
        ]);
        ViewportObserver::new(rects, Rect::new(0.0, 0.0, 100.0, 600.0), 0.0)
    }

    #[test]
    fn observe_queues_initial_state() {
        let mut obs = observer();
        obs.observe(Id(1));
        obs.observe(Id(2));
        obs.observe(Id(1));
        assert_eq!(
            obs.take_records(),
            vec![VisibilityEntry::visible(Id(1)), VisibilityEntry::hidden(Id(2))]
        );
        assert!(obs.take_records().is_empty());
    }

    #[test]
    fn scrolling_reports_only_transitions_in_observation_order() {
        let mut obs = observer();
        obs.observe(Id(3));
        obs.observe(Id(2));
        obs.observe(Id(1));
        obs.take_records();

        obs.set_viewport(Rect::new(0.0, 650.0, 100.0, 600.0));
        assert_eq!(
            obs.take_records(),
            vec![VisibilityEntry::visible(Id(2)), VisibilityEntry::hidden(Id(1))]
        );

        obs.set_viewport(Rect::new(0.0, 1000.0, 100.0, 600.0));
        assert_eq!(
            obs.take_records(),
            vec![VisibilityEntry::visible(Id(3)), VisibilityEntry::hidden(Id(2))]
        );
    }

    #[test]
    fn root_margin_extends_the_viewport() {
        let rects = HashMap::from([(Id(2), Rect::new(0.0, 700.0, 100.0, 100.0))]);
        let mut obs = ViewportObserver::new(rects, Rect::new(0.0, 0.0, 100.0, 600.0), 150.0);
        obs.observe(Id(2));
        assert_eq!(obs.take_records(), vec![VisibilityEntry::visible(Id(2))]);
    }

    #[test]
    fn unobserve_and_disconnect_drop_pending_records() {
        let mut obs = observer();
        obs.observe(Id(1));
        obs.observe(Id(2));
        obs.unobserve(Id(1));
        assert_eq!(obs.take_records(), vec![VisibilityEntry::hidden(Id(2))]);

        obs.disconnect();
        assert!(!obs.is_connected());
        obs.observe(Id(3));
        obs.set_viewport(Rect::new(0.0, 1500.0, 100.0, 600.0));
        assert!(obs.take_records().is_empty());
        assert_eq!(obs.observed_len(), 0);
    }

    #[test]
    fn targets_without_geometry_never_intersect() {
        let mut obs = observer();
        obs.observe(Id(42));
        assert_eq!(obs.take_records(), vec![VisibilityEntry::hidden(Id(42))]);
    }
}

//! The loader actor: one thread owns the document, the coordinator and the observer, and
//! everything else talks to it through [`bus`] channels.
mod images;

pub use images::{MAX_IMAGE_BYTES, NetImageLoader, SettleImmediately, decode_outcome};

use bus::{ImageSettled, LoaderCommand, LoaderEvent};
use core_types::Rect;
use html::Node;
use lazyload::{
    ImageLoader, LazyLoadCoordinator, LazyLoadError, LazyLoadOptions, ViewportObserver,
};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use url::Url;

/// How often settled nodes are painted.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct LoaderSetup {
    pub document: Node,
    pub options: LazyLoadOptions,
    /// Initial viewport, in page coordinates. Its width is also the layout width.
    pub viewport: Rect,
    pub root_margin: f32,
    pub base_url: Option<Url>,
    /// When false, every fetch settles as loaded without touching the network.
    pub load_images: bool,
}

/// Lay out the document, build the coordinator and spawn the actor.
///
/// Selector errors surface here, before any thread exists. The actor stops on
/// [`LoaderCommand::Shutdown`], or once every sender of `cmd_rx` is dropped.
pub fn start_lazyload_runtime(
    setup: LoaderSetup,
    cmd_rx: Receiver<LoaderCommand>,
    evt_tx: Sender<LoaderEvent>,
) -> Result<JoinHandle<()>, LazyLoadError> {
    let LoaderSetup {
        document,
        options,
        viewport,
        root_margin,
        base_url,
        load_images,
    } = setup;

    let page = layout::layout_page(&document, viewport.width);
    log::debug!(
        target: "runtime.lazyload",
        "laid out {} elements, page height {}",
        page.rects.len(),
        page.page_height
    );
    let observer = ViewportObserver::new(page.rects, viewport, root_margin);
    let coordinator = LazyLoadCoordinator::new(&document, &options, observer)?;

    // Fetch workers report here, never on the host's command channel.
    let (settle_tx, settle_rx) = mpsc::channel();
    let images: Box<dyn ImageLoader + Send> = if load_images {
        Box::new(NetImageLoader::new(base_url, settle_tx))
    } else {
        Box::new(SettleImmediately::new(settle_tx))
    };

    Ok(thread::spawn(move || {
        Actor {
            document,
            coordinator,
            images,
            settle_rx,
            evt_tx,
            reported_disconnect: false,
        }
        .run(cmd_rx)
    }))
}

struct Actor {
    document: Node,
    coordinator: LazyLoadCoordinator<ViewportObserver>,
    images: Box<dyn ImageLoader + Send>,
    settle_rx: Receiver<ImageSettled>,
    evt_tx: Sender<LoaderEvent>,
    reported_disconnect: bool,
}

impl Actor {
    fn run(mut self, cmd_rx: Receiver<LoaderCommand>) {
        let tracked = self.coordinator.stats().tracked;
        // Elements on screen from the start load without waiting for a scroll.
        let started = self.deliver_records();
        log::info!(
            target: "runtime.lazyload",
            "loader runtime started; tracking {tracked}, {started} visible"
        );
        // An empty match disconnects before the first command.
        if !self.send(LoaderEvent::Ready { tracked, started }) || !self.report_disconnect() {
            return;
        }

        let mut next_frame = Instant::now() + FRAME_INTERVAL;
        loop {
            let timeout = next_frame.saturating_duration_since(Instant::now());
            match cmd_rx.recv_timeout(timeout) {
                Ok(LoaderCommand::Scroll { viewport }) => {
                    let started = self.scroll(viewport);
                    if !self.send(LoaderEvent::ScrollHandled { started }) {
                        break;
                    }
                }
                Ok(LoaderCommand::Shutdown { reply }) => {
                    log::info!(target: "runtime.lazyload", "shutdown; {} still pending", self.coordinator.pending_len());
                    let _ = reply.send(self.document);
                    return;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            for ImageSettled { ticket, outcome } in self.settle_rx.try_iter() {
                self.coordinator.on_image_settled(ticket, outcome);
            }
            if Instant::now() >= next_frame {
                if !self.frame() {
                    break;
                }
                next_frame = Instant::now() + FRAME_INTERVAL;
            }
        }
        log::debug!(target: "runtime.lazyload", "host went away; stopping");
    }

    fn scroll(&mut self, viewport: Rect) -> usize {
        let Some(observer) = self.coordinator.observer_mut() else {
            return 0;
        };
        observer.set_viewport(viewport);
        log::trace!(target: "runtime.lazyload", "scroll to y={}", viewport.y);
        self.deliver_records()
    }

    // Hand the observer's queued batch to the coordinator; returns fetches started.
    fn deliver_records(&mut self) -> usize {
        let Some(observer) = self.coordinator.observer_mut() else {
            return 0;
        };
        let records = observer.take_records();
        let started = self.coordinator.on_visibility(&records, &mut self.images);
        log::trace!(
            target: "runtime.lazyload",
            "{} records, {started} fetches",
            records.len()
        );
        started
    }

    // Returns false once the host stopped listening.
    fn frame(&mut self) -> bool {
        for node in self.coordinator.on_frame(&mut self.document) {
            let event = LoaderEvent::NodeLoaded {
                id: node.element(),
                source: node.resolved_source().to_string(),
            };
            if !self.send(event) {
                return false;
            }
        }
        self.report_disconnect()
    }

    // Emits `ObserverDisconnected` the first time the coordinator is drained.
    fn report_disconnect(&mut self) -> bool {
        if self.reported_disconnect || !self.coordinator.is_disconnected() {
            return true;
        }
        self.reported_disconnect = true;
        self.send(LoaderEvent::ObserverDisconnected)
    }

    fn send(&self, event: LoaderEvent) -> bool {
        self.evt_tx.send(event).is_ok()
    }
}

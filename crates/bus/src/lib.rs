use core_types::{ImageTicket, Rect};
use html::{Id, Node};
use lazyload::LoadOutcome;
use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug)]
pub enum LoaderCommand {
    // Host -> runtime
    Scroll {
        viewport: Rect,
    },
    // Host -> runtime; the final document comes back on `reply`
    Shutdown {
        reply: Sender<Node>,
    },
}

/// Fetch worker -> runtime, on a channel the runtime owns.
#[derive(Debug)]
pub struct ImageSettled {
    pub ticket: ImageTicket,
    pub outcome: LoadOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderEvent {
    // First event of every run; `started` counts fetches for elements already on screen
    Ready {
        tracked: usize,
        started: usize,
    },
    ScrollHandled {
        started: usize,
    },
    NodeLoaded {
        id: Id,
        source: String,
    },
    ObserverDisconnected,
}

pub struct Bus {
    pub cmd_tx: Sender<LoaderCommand>,
    pub evt_rx: Receiver<LoaderEvent>,
    pub evt_tx: Sender<LoaderEvent>, // shareable for runtimes
}

impl Bus {
    /// A fresh bus plus the command receiver the runtime consumes.
    pub fn new() -> (Self, Receiver<LoaderCommand>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        (
            Self {
                cmd_tx,
                evt_rx,
                evt_tx,
            },
            cmd_rx,
        )
    }
}

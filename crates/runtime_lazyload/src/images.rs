use bus::ImageSettled;
use core_types::ImageTicket;
use lazyload::{ImageLoader, LoadOutcome};
use net::{FetchResult, fetch_bytes};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use url::Url;

/// Largest image body we are willing to download and decode.
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Fetches and decodes images on worker threads, reporting back as
/// [`ImageSettled`].
pub struct NetImageLoader {
    next_ticket: u64,
    base_url: Option<Url>,
    settle_tx: Sender<ImageSettled>,
}

impl NetImageLoader {
    pub fn new(base_url: Option<Url>, settle_tx: Sender<ImageSettled>) -> Self {
        Self {
            next_ticket: 1,
            base_url,
            settle_tx,
        }
    }

    /// `src` as an absolute URL, joined onto the base URL when there is one.
    pub fn resolve(&self, src: &str) -> Result<Url, url::ParseError> {
        match &self.base_url {
            Some(base) => base.join(src),
            None => Url::parse(src),
        }
    }
}

impl ImageLoader for NetImageLoader {
    fn issue(&mut self, src: &str) -> ImageTicket {
        let ticket = ImageTicket::next(&mut self.next_ticket);
        let url = match self.resolve(src) {
            Ok(url) => url,
            Err(e) => {
                // Settles on the next actor iteration, like any other failure.
                let _ = self.settle_tx.send(ImageSettled {
                    ticket,
                    outcome: LoadOutcome::Failed(format!("cannot resolve {src:?}: {e}")),
                });
                return ticket;
            }
        };

        let tx = self.settle_tx.clone();
        fetch_bytes(
            url.to_string(),
            MAX_IMAGE_BYTES,
            Arc::new(move |result: FetchResult| {
                let outcome = match result.body {
                    Ok(bytes) => decode_outcome(&bytes),
                    Err(e) => LoadOutcome::Failed(e.to_string()),
                };
                let _ = tx.send(ImageSettled { ticket, outcome });
            }),
        );
        ticket
    }
}

pub fn decode_outcome(bytes: &[u8]) -> LoadOutcome {
    if bytes.is_empty() {
        return LoadOutcome::Failed("empty image response".to_string());
    }
    match image::load_from_memory(bytes) {
        Ok(img) => LoadOutcome::Loaded {
            width: img.width(),
            height: img.height(),
        },
        Err(e) => LoadOutcome::Failed(e.to_string()),
    }
}

/// Settles every ticket as loaded without touching the network.
pub struct SettleImmediately {
    next_ticket: u64,
    settle_tx: Sender<ImageSettled>,
}

impl SettleImmediately {
    pub fn new(settle_tx: Sender<ImageSettled>) -> Self {
        Self {
            next_ticket: 1,
            settle_tx,
        }
    }
}

impl ImageLoader for SettleImmediately {
    fn issue(&mut self, _src: &str) -> ImageTicket {
        let ticket = ImageTicket::next(&mut self.next_ticket);
        let _ = self.settle_tx.send(ImageSettled {
            ticket,
            outcome: LoadOutcome::Loaded {
                width: 0,
                height: 0,
            },
        });
        ticket
    }
}

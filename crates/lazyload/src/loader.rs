use core_types::ImageTicket;

/// How an issued image fetch settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { width: u32, height: u32 },
    Failed(String),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded { .. })
    }
}

/// Starts image fetches. Completion is reported back to the coordinator separately via
/// [`crate::LazyLoadCoordinator::on_image_settled`] with the returned ticket.
pub trait ImageLoader {
    fn issue(&mut self, url: &str) -> ImageTicket;
}

impl<L: ImageLoader + ?Sized> ImageLoader for &mut L {
    fn issue(&mut self, url: &str) -> ImageTicket {
        (**self).issue(url)
    }
}

impl<L: ImageLoader + ?Sized> ImageLoader for Box<L> {
    fn issue(&mut self, url: &str) -> ImageTicket {
        (**self).issue(url)
    }
}

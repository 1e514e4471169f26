/// Layout metrics of one element on an offset-parent chain.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OffsetMetrics {
    pub is_body: bool,
    pub offset_left: f32,
    pub offset_top: f32,
    pub scroll_left: f32,
    pub scroll_top: f32,
    pub client_left: f32,
    pub client_top: f32,
}

/// Page position of an element, given its offset-parent chain (element first).
///
/// `<body>` with no scroll of its own takes the document's scroll offsets instead.
pub fn element_position(chain: &[OffsetMetrics], document_scroll: (f32, f32)) -> (f32, f32) {
    chain.iter().fold((0.0, 0.0), |(x, y), el| {
        let (scroll_x, scroll_y) = if el.is_body {
            (
                non_zero_or(el.scroll_left, document_scroll.0),
                non_zero_or(el.scroll_top, document_scroll.1),
            )
        } else {
            (el.scroll_left, el.scroll_top)
        };
        (
            x + el.offset_left - scroll_x + el.client_left,
            y + el.offset_top - scroll_y + el.client_top,
        )
    })
}

fn non_zero_or(v: f32, fallback: f32) -> f32 {
    if v != 0.0 { v } else { fallback }
}

/// Is a scroll container scrolled all the way down?
pub fn is_bottom_visible(scroll_top: f32, scroll_height: f32, offset_height: f32) -> bool {
    (scroll_top - (scroll_height - offset_height)).abs() < f32::EPSILON
}

/// CSS Length value, currently only supports `px`,
/// but keep this extensible for `em`, `%`, etc.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
}

impl Length {
    pub fn px(self) -> f32 {
        match self {
            Length::Px(v) => v,
        }
    }
}

/// The subset of `display` that affects box generation here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Display {
    Block,
    None,
}

/// Parse `<number>px`. Zero is allowed; negative and non-finite values are rejected.
pub fn parse_length(value: &str) -> Option<Length> {
    let v = value.trim();
    if v == "0" {
        return Some(Length::Px(0.0));
    }
    let px_str = v.strip_suffix("px")?;
    let num = px_str.trim().parse::<f32>().ok()?;
    (num.is_finite() && num >= 0.0).then_some(Length::Px(num))
}

/// Anything other than `none` generates a block box for our purposes.
pub fn parse_display(value: &str) -> Display {
    if value.trim().eq_ignore_ascii_case("none") {
        Display::None
    } else {
        Display::Block
    }
}

/// `url(a),url(b)`: a comma-separated `background-image` layer list.
pub fn background_image_layers<'a>(urls: impl IntoIterator<Item = &'a str>) -> String {
    urls.into_iter()
        .map(|u| format!("url({u})"))
        .collect::<Vec<_>>()
        .join(",")
}

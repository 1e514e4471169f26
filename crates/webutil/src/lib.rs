//! Page helpers that used to live next to the lazy loader.
//!
//! Everything here is a plain function over strings or the [`html::Node`] tree; the browser
//! globals they depended on (`localStorage`, `ga`, element metrics) are passed in explicitly.
pub mod analytics;
pub mod calendar;
pub mod jwt;
pub mod links;
pub mod number;
pub mod position;
pub mod storage;
pub mod time;
pub mod validate;

pub use jwt::JwtError;

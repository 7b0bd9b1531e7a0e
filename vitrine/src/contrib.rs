//! Re-exports of included contrib crates
//!
//! If this module is empty or you can't find a specific crate, then check vitrine's feature flags.

#[cfg(feature = "contrib-articles")]
pub use vitrine_contrib_articles as articles;
#[cfg(feature = "contrib-settings")]
pub use vitrine_contrib_settings as settings;

//! A live-updating content site on top of a hosted backend
//!
//! # Starting point
//! Create a [`Vitrine`] from the environment, [`connect`](Vitrine::connect) it to a
//! [`RemoteClient`](core::RemoteClient) and open the site's pages from the returned [`Site`].
//!
//! Check the [`contrib`] module and vitrine's feature flags for the optional parts.

pub use crate::vitrine::*;

pub mod config;
pub mod contrib;
pub mod error;
#[cfg(all(feature = "contrib-settings", feature = "contrib-articles"))]
pub mod page;
pub mod tracing;
mod vitrine;

pub mod core {
    //! Re-export of [`vitrine_core`]
    pub use vitrine_core::*;
}

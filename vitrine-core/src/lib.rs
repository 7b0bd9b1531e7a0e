//! Core concepts shared by vitrine's crates
//!
//! - [`models`] the records the site reads and writes
//! - [`remote`] the interface to the hosted backend and an in-memory implementation of it
//! - [`signal`] a cloneable "something changed, please refetch" signal

pub use crate::remote::RemoteClient;
pub use crate::remote::RemoteError;
pub use crate::signal::RefreshSignal;

pub mod models;
pub mod remote;
pub mod signal;

pub mod re_exports {
    //! Re-exports of crates whose types appear in vitrine's public api
    pub use serde;
    pub use serde_json;
    pub use time;
    pub use uuid;
}

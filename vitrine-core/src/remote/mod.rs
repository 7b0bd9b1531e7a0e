//! The interface to the hosted backend
//!
//! The backend offers two things:
//! - a query builder style interface over named tables ([`Query`])
//! - named channels delivering row-level change events ([`Channel`])
//!
//! [`RemoteClient`] abstracts over both.
//! [`MemoryClient`] implements it in-process and is used by tests and the demo.

use std::error::Error;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub use self::channel::ChangeEvent;
pub use self::channel::ChangeFilter;
pub use self::channel::ChangeKind;
pub use self::channel::Channel;
pub use self::channel::ChannelFeed;
pub use self::memory::MemoryClient;
pub use self::memory::Operation;
pub use self::query::Direction;
pub use self::query::Filter;
pub use self::query::Order;
pub use self::query::Query;

mod channel;
mod memory;
mod query;

/// A single row as sent over the wire
pub type Row = serde_json::Map<String, Value>;

/// Client for the hosted backend
///
/// Implementors only move rows around.
/// Decoding rows into models is left to the caller (see [`from_row`]).
pub trait RemoteClient: Send + Sync + 'static {
    /// Runs a query and returns the matching rows
    ///
    /// If the query is [`Query::single`], exactly one row has to match.
    /// Otherwise [`RemoteError::NotSingle`] is returned.
    fn select(&self, query: &Query) -> impl Future<Output = Result<Vec<Row>, RemoteError>> + Send;

    /// Inserts `row` into `table` or updates the existing row it identifies
    fn upsert(
        &self,
        table: &str,
        row: Row,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Subscribes to change events under a channel `name`
    ///
    /// The name has to be unique among all channels currently subscribed through this client.
    fn channel(
        &self,
        name: &str,
        filter: ChangeFilter,
    ) -> impl Future<Output = Result<Channel, RemoteError>> + Send;

    /// Unsubscribes a channel
    ///
    /// Dropping a [`Channel`] releases it as well,
    /// this method gives the backend the chance to be told explicitly.
    fn remove_channel(&self, channel: Channel)
    -> impl Future<Output = Result<(), RemoteError>> + Send;
}

/// Error returned by a [`RemoteClient`]
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A query marked as [`Query::single`] matched zero or several rows
    #[error("Expected exactly one row, but the query matched {0}")]
    NotSingle(usize),

    /// The backend does not know the table
    #[error("The table '{0}' does not exist")]
    UnknownTable(String),

    /// Another live channel already uses this name
    ///
    /// Channel names are supposed to be unique per subscription.
    /// Append something random to the name.
    #[error("A channel named '{0}' is already subscribed")]
    ChannelExists(String),

    /// A value could not be converted into a [`Row`]
    ///
    /// Rows are json objects, so the value has to serialize into a map.
    #[error("The value could not be converted into a row: {0}")]
    InvalidRow(serde_json::Error),

    /// The backend rejected the request
    #[error("The backend rejected the request: {0}")]
    Backend(String),

    /// The request did not reach the backend or its response got lost
    ///
    /// [`MemoryClient`] never fails this way.
    /// Clients talking to the hosted backend over the network wrap their
    /// http or websocket errors in this variant.
    #[error("The backend could not be reached: {0}")]
    Transport(#[source] Box<dyn Error + Send + Sync + 'static>),
}

/// Serializes a model into a [`Row`]
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, RemoteError> {
    match serde_json::to_value(value).map_err(RemoteError::InvalidRow)? {
        Value::Object(row) => Ok(row),
        _ => Err(RemoteError::InvalidRow(serde::ser::Error::custom(
            "expected the value to serialize into a map",
        ))),
    }
}

/// Deserializes a model from a [`Row`]
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, serde_json::Error> {
    serde_json::from_value(Value::Object(row))
}

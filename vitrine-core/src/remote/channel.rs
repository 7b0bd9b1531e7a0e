use std::sync::Arc;

use tokio::sync::mpsc;

use crate::remote::Row;

/// Kind of a row-level change
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change delivered through a [`Channel`]
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// The table the changed row belongs to
    pub table: String,

    pub kind: ChangeKind,

    /// The row after the change
    ///
    /// Empty for [`ChangeKind::Delete`].
    pub new: Row,

    /// The row before the change, if the backend sends it
    pub old: Option<Row>,
}

/// Selects which change events a [`Channel`] receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeFilter {
    pub table: String,

    /// `None` subscribes to every kind of change
    pub kind: Option<ChangeKind>,
}

impl ChangeFilter {
    /// Subscribes to updates of rows in `table`
    pub fn updates(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind: Some(ChangeKind::Update),
        }
    }

    /// Subscribes to every change of rows in `table`
    pub fn all(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind: None,
        }
    }

    /// Checks whether `event` should be delivered to a channel with this filter
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        self.table == event.table && self.kind.is_none_or(|kind| kind == event.kind)
    }
}

/// A named subscription to change events
///
/// Dropping the channel ends the subscription.
#[derive(Debug)]
pub struct Channel {
    name: Arc<str>,
    filter: ChangeFilter,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
}

/// The sending half of a [`Channel`], kept by the [`RemoteClient`](crate::RemoteClient)
#[derive(Debug, Clone)]
pub struct ChannelFeed {
    name: Arc<str>,
    filter: ChangeFilter,
    sender: mpsc::UnboundedSender<ChangeEvent>,
}

impl Channel {
    /// Creates a new channel and the feed to deliver its events through
    pub fn new(name: &str, filter: ChangeFilter) -> (ChannelFeed, Channel) {
        let name: Arc<str> = Arc::from(name);
        let (sender, events) = mpsc::unbounded_channel();
        (
            ChannelFeed {
                name: Arc::clone(&name),
                filter: filter.clone(),
                sender,
            },
            Channel {
                name,
                filter,
                events,
            },
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filter(&self) -> &ChangeFilter {
        &self.filter
    }

    /// Waits for the next change event
    ///
    /// Returns `None` once the client dropped the channel's feed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }
}

impl ChannelFeed {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivers `event` if it matches the channel's filter
    ///
    /// Returns whether the event was delivered.
    pub fn deliver(&self, event: &ChangeEvent) -> bool {
        self.filter.matches(event) && self.sender.send(event.clone()).is_ok()
    }

    /// Checks whether the [`Channel`] has been dropped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

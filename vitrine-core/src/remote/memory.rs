use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::watch;
use tracing::debug;

use crate::remote::ChangeEvent;
use crate::remote::ChangeFilter;
use crate::remote::ChangeKind;
use crate::remote::Channel;
use crate::remote::ChannelFeed;
use crate::remote::Direction;
use crate::remote::Query;
use crate::remote::RemoteClient;
use crate::remote::RemoteError;
use crate::remote::Row;

/// A [`RemoteClient`] keeping its tables in memory
///
/// Clones share the same tables and channels.
///
/// # Differences to the hosted backend
///
/// - `select` returns whole rows and ignores [`Query::columns`].
///   Embedded relations have to be stored inline (e.g. an article row containing a `category` object).
/// - Filters on an embedded relation (`category.slug`) drop rows whose relation is `null`.
/// - `upsert` on a table holding a single row and given a row without `id`
///   replaces that row (keeping its `id`).
///
/// # Testing helpers
///
/// [`MemoryClient::fail_next`] makes the next call of an [`Operation`] fail
/// and [`MemoryClient::hold_selects`] keeps selects from completing until [`MemoryClient::release_selects`].
#[derive(Debug, Clone)]
pub struct MemoryClient {
    state: Arc<Mutex<MemoryState>>,

    /// `true` while selects may complete
    gate: Arc<watch::Sender<bool>>,
}

/// The operations of a [`RemoteClient`]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Upsert,
    Channel,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: HashMap<String, Vec<Row>>,
    feeds: Vec<ChannelFeed>,

    /// Number of queued failures per operation
    failures: HashMap<Operation, usize>,

    /// Number of `select` calls so far
    selects: usize,
}

impl Default for MemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryClient {
    /// Constructs a new client without any tables
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            gate: Arc::new(watch::Sender::new(true)),
        }
    }

    /// Creates `table` if it doesn't exist yet
    pub fn create_table(&self, table: &str) {
        self.lock().tables.entry(table.to_string()).or_default();
    }

    /// Appends a row to `table` (creating it if necessary) without emitting any change event
    pub fn insert(&self, table: &str, row: Row) {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row);
    }

    /// Returns a copy of every row in `table`
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Counts the channels which are subscribed and haven't been dropped
    pub fn live_channels(&self) -> usize {
        let mut state = self.lock();
        state.feeds.retain(|feed| !feed.is_closed());
        state.feeds.len()
    }

    /// Counts the `select` calls received so far
    pub fn select_count(&self) -> usize {
        self.lock().selects
    }

    /// Makes the next call of `operation` fail with [`RemoteError::Backend`]
    ///
    /// Calling this several times queues several failures.
    pub fn fail_next(&self, operation: Operation) {
        *self.lock().failures.entry(operation).or_default() += 1;
    }

    /// Keeps selects from completing
    ///
    /// A held select still reads the tables when it is called,
    /// so it will complete with the data from that moment.
    pub fn hold_selects(&self) {
        self.gate.send_replace(false);
    }

    /// Lets all held selects complete
    pub fn release_selects(&self) {
        self.gate.send_replace(true);
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteClient for MemoryClient {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, RemoteError> {
        let result = {
            let mut state = self.lock();
            state.selects += 1;
            state.take_failure(Operation::Select)?;
            state.select(query)
        };

        let mut gate = self.gate.subscribe();
        // The sender lives as long as `self`
        let _ = gate.wait_for(|open| *open).await;

        result
    }

    async fn upsert(&self, table: &str, row: Row) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.take_failure(Operation::Upsert)?;

        let rows = state
            .tables
            .get_mut(table)
            .ok_or_else(|| RemoteError::UnknownTable(table.to_string()))?;

        let position = match row.get("id") {
            Some(id) if !id.is_null() => rows.iter().position(|r| r.get("id") == Some(id)),
            _ if rows.len() == 1 => Some(0),
            _ => None,
        };

        let event = match position {
            Some(position) => {
                let mut new = row;
                if let Some(id) = rows[position].get("id").cloned() {
                    new.entry("id").or_insert(id);
                }
                let old = std::mem::replace(&mut rows[position], new.clone());
                ChangeEvent {
                    table: table.to_string(),
                    kind: ChangeKind::Update,
                    new,
                    old: Some(old),
                }
            }
            None => {
                rows.push(row.clone());
                ChangeEvent {
                    table: table.to_string(),
                    kind: ChangeKind::Insert,
                    new: row,
                    old: None,
                }
            }
        };

        state.feeds.retain(|feed| !feed.is_closed());
        let delivered = state
            .feeds
            .iter()
            .filter(|feed| feed.deliver(&event))
            .count();
        debug!(table, kind = ?event.kind, delivered, "Emitted change event");

        Ok(())
    }

    async fn channel(&self, name: &str, filter: ChangeFilter) -> Result<Channel, RemoteError> {
        let mut state = self.lock();
        state.take_failure(Operation::Channel)?;

        state.feeds.retain(|feed| !feed.is_closed());
        if state.feeds.iter().any(|feed| feed.name() == name) {
            return Err(RemoteError::ChannelExists(name.to_string()));
        }

        let (feed, channel) = Channel::new(name, filter);
        state.feeds.push(feed);
        Ok(channel)
    }

    async fn remove_channel(&self, channel: Channel) -> Result<(), RemoteError> {
        self.lock()
            .feeds
            .retain(|feed| feed.name() != channel.name());
        Ok(())
    }
}

impl MemoryState {
    fn take_failure(&mut self, operation: Operation) -> Result<(), RemoteError> {
        match self.failures.get_mut(&operation) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Err(RemoteError::Backend(format!("injected {operation:?} failure")))
            }
            _ => Ok(()),
        }
    }

    fn select(&self, query: &Query) -> Result<Vec<Row>, RemoteError> {
        let rows = self
            .tables
            .get(query.table())
            .ok_or_else(|| RemoteError::UnknownTable(query.table().to_string()))?;

        let mut rows: Vec<Row> = rows
            .iter()
            .filter(|row| {
                query
                    .filters()
                    .iter()
                    .all(|filter| lookup(row, filter.path()) == Some(&filter.value))
            })
            .cloned()
            .collect();

        if query.is_single() && rows.len() != 1 {
            return Err(RemoteError::NotSingle(rows.len()));
        }

        if let Some(order) = query.ordering() {
            let descending = order.direction == Direction::Descending;
            rows.sort_by(|a, b| {
                compare_nulls_last(
                    lookup(a, order.column.split('.')),
                    lookup(b, order.column.split('.')),
                    descending,
                )
            });
        }

        if let Some(limit) = query.row_limit() {
            rows.truncate(limit.get());
        }

        Ok(rows)
    }
}

/// Follows `path` into `row`
///
/// Returns `None` if any segment is missing or a relation on the way is not an object.
/// A trailing `null` is returned as `Some(Value::Null)`.
fn lookup<'a, 'p>(row: &'a Row, mut path: impl Iterator<Item = &'p str>) -> Option<&'a Value> {
    let mut value = row.get(path.next()?)?;
    for segment in path {
        value = value.as_object()?.get(segment)?;
    }
    Some(value)
}

/// Orders two optional values, putting missing and `null` values last regardless of `descending`
///
/// Strings which both parse as RFC 3339 timestamps are compared as instants.
fn compare_nulls_last(a: Option<&Value>, b: Option<&Value>, descending: bool) -> Ordering {
    let a = a.filter(|value| !value.is_null());
    let b = b.filter(|value| !value.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ordering = match (a, b) {
                (Value::Number(a), Value::Number(b)) => a
                    .as_f64()
                    .partial_cmp(&b.as_f64())
                    .unwrap_or(Ordering::Equal),
                (Value::String(a), Value::String(b)) => {
                    match (
                        OffsetDateTime::parse(a, &Rfc3339),
                        OffsetDateTime::parse(b, &Rfc3339),
                    ) {
                        (Ok(a), Ok(b)) => a.cmp(&b),
                        _ => a.cmp(b),
                    }
                }
                (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
                _ => Ordering::Equal,
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(row) => row,
            _ => panic!("not an object"),
        }
    }

    fn seeded() -> MemoryClient {
        let client = MemoryClient::new();
        client.insert(
            "articles",
            row(json!({"id": 1, "published": true, "rank": 2, "category": {"slug": "rust"}})),
        );
        client.insert(
            "articles",
            row(json!({"id": 2, "published": false, "rank": 3, "category": null})),
        );
        client.insert(
            "articles",
            row(json!({"id": 3, "published": true, "rank": null, "category": {"slug": "go"}})),
        );
        client
    }

    fn ids(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .map(|row| row["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn filters_follow_embedded_relations() {
        let client = seeded();

        let rows = client
            .select(&Query::from("articles").eq("category.slug", "rust"))
            .await
            .unwrap();
        assert_eq!(ids(&rows), [1]);
    }

    #[tokio::test]
    async fn ordering_puts_nulls_last() {
        let client = seeded();

        let rows = client
            .select(&Query::from("articles").order("rank", Direction::Descending))
            .await
            .unwrap();
        assert_eq!(ids(&rows), [2, 1, 3]);

        let rows = client
            .select(
                &Query::from("articles")
                    .order("rank", Direction::Ascending)
                    .limit(NonZeroUsize::MIN),
            )
            .await
            .unwrap();
        assert_eq!(ids(&rows), [1]);
    }

    #[tokio::test]
    async fn timestamps_order_by_instant() {
        let client = MemoryClient::new();
        for (id, created_at) in [
            (1, "2024-05-01T10:00:00Z"),
            (2, "2024-05-01T10:00:00.500Z"),
            (3, "2024-05-01T12:30:00+02:00"),
            (4, "not a timestamp"),
        ] {
            client.insert("articles", row(json!({"id": id, "created_at": created_at})));
        }

        let rows = client
            .select(&Query::from("articles").order("created_at", Direction::Descending))
            .await
            .unwrap();
        // Unparsable strings fall back to string order
        assert_eq!(ids(&rows), [4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn single_requires_exactly_one_row() {
        let client = seeded();

        let error = client
            .select(&Query::from("articles").eq("published", true).single())
            .await
            .unwrap_err();
        assert!(matches!(error, RemoteError::NotSingle(2)));

        let error = client
            .select(&Query::from("missing").single())
            .await
            .unwrap_err();
        assert!(matches!(error, RemoteError::UnknownTable(_)));
    }

    #[tokio::test]
    async fn upsert_without_id_replaces_the_singleton() {
        let client = MemoryClient::new();
        client.insert("site_settings", row(json!({"id": "a", "site_name": "Old"})));
        let mut channel = client
            .channel("settings", ChangeFilter::updates("site_settings"))
            .await
            .unwrap();

        client
            .upsert("site_settings", row(json!({"site_name": "New"})))
            .await
            .unwrap();

        assert_eq!(
            client.rows("site_settings"),
            [row(json!({"id": "a", "site_name": "New"}))]
        );
        let event = channel.recv().await.unwrap();
        assert_eq!(event.kind, ChangeKind::Update);
        assert_eq!(event.new["site_name"], "New");
        assert_eq!(event.old.unwrap()["site_name"], "Old");
    }

    #[tokio::test]
    async fn channel_names_are_unique_while_live() {
        let client = MemoryClient::new();
        let channel = client
            .channel("settings", ChangeFilter::all("site_settings"))
            .await
            .unwrap();

        let error = client
            .channel("settings", ChangeFilter::all("site_settings"))
            .await
            .unwrap_err();
        assert!(matches!(error, RemoteError::ChannelExists(_)));
        assert_eq!(client.live_channels(), 1);

        drop(channel);
        assert_eq!(client.live_channels(), 0);
        client
            .channel("settings", ChangeFilter::all("site_settings"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn injected_failures_are_consumed_once() {
        let client = seeded();
        client.fail_next(Operation::Select);

        assert!(client.select(&Query::from("articles")).await.is_err());
        assert!(client.select(&Query::from("articles")).await.is_ok());
        assert_eq!(client.select_count(), 2);
    }
}

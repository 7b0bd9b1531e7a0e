use std::num::NonZeroUsize;

use serde_json::Value;

/// A read from a single table
///
/// Built like the backend's own query builder:
///
/// ```rust
/// # use std::num::NonZeroUsize;
/// # use vitrine_core::remote::{Direction, Query};
/// let query = Query::from("articles")
///     .select("id, title, category:categories(name, slug)")
///     .eq("published", true)
///     .eq("category.slug", "rust")
///     .order("created_at", Direction::Descending)
///     .limit(NonZeroUsize::new(3).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: String,
    filters: Vec<Filter>,
    order: Option<Order>,
    limit: Option<NonZeroUsize>,
    single: bool,
}

/// An equality filter
///
/// `column` may be a dotted path into an embedded relation, e.g. `category.slug`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

/// The order to return rows in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Direction of an [`Order`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Query {
    /// Starts a query selecting every column of `table`
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
            single: false,
        }
    }

    /// Sets the columns (and embedded relations) to select
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Only returns rows whose `column` equals `value`
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Orders the rows by `column`
    ///
    /// Calling this again replaces the previous order.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    /// Returns at most `limit` rows
    pub fn limit(mut self, limit: NonZeroUsize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Expects the query to match exactly one row
    pub fn single(mut self) -> Self {
        self.single = true;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &str {
        &self.columns
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn row_limit(&self) -> Option<NonZeroUsize> {
        self.limit
    }

    pub fn is_single(&self) -> bool {
        self.single
    }
}

impl Filter {
    /// Splits the filter's column into the path segments leading to the compared value
    pub fn path(&self) -> impl Iterator<Item = &str> {
        self.column.split('.')
    }
}

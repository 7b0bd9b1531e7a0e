//! Listings of published articles
//!
//! An [`ArticleListing`] fetches the newest published articles matching an [`ArticleFilter`]
//! and presents them as a [`ListingView`].

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::debug;
use tracing::error;
use vitrine_core::RemoteClient;
use vitrine_core::models::Article;
use vitrine_core::remote::Direction;
use vitrine_core::remote::Query;
use vitrine_core::remote::from_row;

/// Columns selected for a listing, including the joined category and author
pub const ARTICLE_COLUMNS: &str = "id, title, slug, excerpt, featured_image_url, published, \
    created_at, reading_time, category:categories(name, slug), author:profiles(full_name)";

/// Narrows down which published articles are listed
///
/// The default lists every published article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    /// Only list articles marked as featured
    pub featured: bool,

    /// Only list articles of the category with this slug
    pub category_slug: Option<String>,

    /// List at most this many articles
    pub limit: Option<NonZeroUsize>,
}

impl ArticleFilter {
    /// Only list featured articles
    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    /// Only list articles of a category
    pub fn in_category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    /// List at most `limit` articles
    pub fn limit(mut self, limit: NonZeroUsize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builds the query for this filter
    ///
    /// Unpublished articles are always excluded and the newest article comes first.
    pub fn query(&self) -> Query {
        let mut query = Query::from(Article::TABLE)
            .select(ARTICLE_COLUMNS)
            .eq("published", true)
            .order("created_at", Direction::Descending);
        if self.featured {
            query = query.eq("featured", true);
        }
        if let Some(slug) = &self.category_slug {
            query = query.eq("category.slug", slug.as_str());
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

/// A list of articles fetched for an [`ArticleFilter`]
///
/// Failing fetches are logged and keep the previously fetched articles.
/// There is no dedicated error state: a listing which never fetched successfully is empty.
pub struct ArticleListing<C: RemoteClient> {
    client: Arc<C>,
    filter: ArticleFilter,
    articles: Vec<Article>,
    loading: bool,
}

/// What an [`ArticleListing`] has to show
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListingView<'a> {
    /// The first fetch hasn't completed yet
    Loading,

    /// No published article matches the filter
    Empty,

    /// The matching articles, newest first
    Populated(&'a [Article]),
}

impl<C: RemoteClient> ArticleListing<C> {
    /// Constructs a listing which hasn't fetched yet
    pub fn new(client: Arc<C>, filter: ArticleFilter) -> Self {
        Self {
            client,
            filter,
            articles: Vec::new(),
            loading: true,
        }
    }

    pub fn filter(&self) -> &ArticleFilter {
        &self.filter
    }

    /// The articles of the last successful fetch
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Checks whether the first fetch is still outstanding
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> ListingView<'_> {
        if self.loading {
            ListingView::Loading
        } else if self.articles.is_empty() {
            ListingView::Empty
        } else {
            ListingView::Populated(&self.articles)
        }
    }

    /// Replaces the filter and fetches again if it changed
    ///
    /// Returns whether a fetch was made.
    pub async fn set_filter(&mut self, filter: ArticleFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.fetch().await;
        true
    }

    /// Fetches the articles matching the current filter
    pub async fn fetch(&mut self) {
        let decoded = match self.client.select(&self.filter.query()).await {
            Ok(rows) => rows
                .into_iter()
                .map(from_row::<Article>)
                .collect::<Result<Vec<_>, _>>(),
            Err(error) => {
                error!(
                    filter = ?self.filter,
                    error.display = %error,
                    error.debug = ?error,
                    "Failed to fetch articles"
                );
                self.loading = false;
                return;
            }
        };

        match decoded {
            Ok(articles) => {
                debug!(count = articles.len(), filter = ?self.filter, "Fetched articles");
                self.articles = articles;
            }
            Err(error) => {
                error!(
                    error.display = %error,
                    error.debug = ?error,
                    "Failed to decode articles"
                );
            }
        }
        self.loading = false;
    }
}

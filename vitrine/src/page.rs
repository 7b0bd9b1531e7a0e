//! The site's index page

use std::sync::Arc;

use vitrine_contrib_articles::ArticleListing;
use vitrine_contrib_articles::ListingView;
use vitrine_contrib_settings::SettingsSync;
use vitrine_core::RefreshSignal;
use vitrine_core::RemoteClient;

use crate::config::Config;

/// Composes the live settings with the newest articles
///
/// The page only wires its parts together,
/// see [`SettingsSync`] and [`ArticleListing`] for their behaviour.
pub struct IndexPage<C: RemoteClient> {
    settings: SettingsSync<C>,
    articles: ArticleListing<C>,
}

/// The hero section at the top of the index page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hero {
    pub title: String,
    pub subtitle: String,
    pub image_url: Option<String>,
}

impl<C: RemoteClient> IndexPage<C> {
    /// Activates the settings synchronization and prepares the article listing
    ///
    /// Nothing is shown until [`IndexPage::load`] has been awaited.
    pub fn open(client: Arc<C>, signal: &RefreshSignal, config: &Config) -> Self {
        Self {
            settings: SettingsSync::activate(Arc::clone(&client), signal, &config.sync_options()),
            articles: ArticleListing::new(client, config.home_filter()),
        }
    }

    /// Waits for the settings and fetches the articles
    pub async fn load(&mut self) {
        tokio::join!(self.settings.loaded(), self.articles.fetch());
    }

    /// The hero built from the current settings
    ///
    /// `None` until the settings are known.
    pub fn hero(&self) -> Option<Hero> {
        self.settings.current().map(|settings| Hero {
            title: settings.hero_title,
            subtitle: settings.hero_subtitle,
            image_url: settings.hero_image_url,
        })
    }

    pub fn articles(&self) -> ListingView<'_> {
        self.articles.view()
    }

    pub fn settings(&self) -> &SettingsSync<C> {
        &self.settings
    }

    /// Stops the settings synchronization
    pub async fn close(self) {
        self.settings.deactivate().await;
    }
}

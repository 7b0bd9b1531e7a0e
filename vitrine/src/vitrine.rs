use std::sync::Arc;

use tracing::info;
use vitrine_core::RefreshSignal;
use vitrine_core::RemoteClient;

use crate::config::Config;
use crate::error::VitrineError;

/// Entry point of a vitrine application
///
/// Reads the [`Config`], installs the `tracing` subscriber
/// and owns the [`RefreshSignal`] shared by everything opened from it.
pub struct Vitrine {
    config: Config,
    signal: RefreshSignal,
}

impl Vitrine {
    /// Reads the [`Config`] from the environment and calls [`Vitrine::with_config`]
    pub fn from_env() -> Result<Self, VitrineError> {
        Self::with_config(Config::from_env()?)
    }

    /// Installs the global `tracing` subscriber
    ///
    /// Fails if a subscriber was installed already.
    pub fn with_config(config: Config) -> Result<Self, VitrineError> {
        crate::tracing::init(&config)?;
        info!(service_name = config.service_name.as_str(), "Starting vitrine");
        Ok(Self {
            config,
            signal: RefreshSignal::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The signal raised after the site settings were saved
    pub fn signal(&self) -> &RefreshSignal {
        &self.signal
    }

    /// Connects to a backend
    pub fn connect<C: RemoteClient>(&self, client: Arc<C>) -> Site<C> {
        Site {
            client,
            config: self.config.clone(),
            signal: self.signal.clone(),
        }
    }
}

/// A [`Vitrine`] connected to a backend
///
/// Opens the site's pages. Every page shares the site's [`RefreshSignal`].
pub struct Site<C: RemoteClient> {
    client: Arc<C>,
    config: Config,
    signal: RefreshSignal,
}

impl<C: RemoteClient> Site<C> {
    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    pub fn signal(&self) -> &RefreshSignal {
        &self.signal
    }

    /// Opens and loads the index page
    #[cfg(all(feature = "contrib-settings", feature = "contrib-articles"))]
    pub async fn index(&self) -> crate::page::IndexPage<C> {
        let mut page = crate::page::IndexPage::open(Arc::clone(&self.client), &self.signal, &self.config);
        page.load().await;
        page
    }

    /// Activates a settings synchronization for the admin panel
    ///
    /// Bind a [`SettingsForm`](vitrine_contrib_settings::SettingsForm) to it to edit the settings.
    #[cfg(feature = "contrib-settings")]
    pub async fn admin(&self) -> vitrine_contrib_settings::SettingsSync<C> {
        let sync = vitrine_contrib_settings::SettingsSync::activate(
            Arc::clone(&self.client),
            &self.signal,
            &self.config.sync_options(),
        );
        sync.loaded().await;
        sync
    }
}

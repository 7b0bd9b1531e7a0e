use std::future::pending;
use std::sync::Arc;

use futures_lite::future::Boxed;
use thiserror::Error;
use tokio::sync::Notify;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;
use tracing::warn;
use uuid::Uuid;
use vitrine_core::RefreshSignal;
use vitrine_core::RemoteClient;
use vitrine_core::RemoteError;
use vitrine_core::models::SiteSettings;
use vitrine_core::remote::ChangeEvent;
use vitrine_core::remote::ChangeFilter;
use vitrine_core::remote::Channel;
use vitrine_core::remote::Query;
use vitrine_core::remote::Row;
use vitrine_core::remote::from_row;
use vitrine_core::remote::to_row;
use vitrine_core::signal::RefreshListener;

/// Keeps a local copy of the [`SiteSettings`] in sync with the backend
///
/// Each activation spawns one task which
/// 1. subscribes to updates of the settings table under a channel name unique to this activation,
/// 2. fetches the settings once,
/// 3. replaces its state with the payload of every update it receives,
/// 4. refetches whenever the [`RefreshSignal`] is raised or [`SettingsSync::refetch`] is called.
///
/// Every fetch and every change event is numbered in the order it was issued or received.
/// Only results newer than the currently applied one change the state,
/// so a slow fetch can't overwrite a more recent change event.
///
/// Call [`SettingsSync::deactivate`] to stop the task and release its channel and listener.
/// Dropping a `SettingsSync` stops the task as well, without waiting for the cleanup to finish.
pub struct SettingsSync<C: RemoteClient> {
    client: Arc<C>,
    table: String,
    state: watch::Receiver<SettingsState>,
    refetch: Arc<Notify>,

    /// Dropping or sending stops the task
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Options for [`SettingsSync::activate`]
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Table storing the settings row
    pub table: String,

    /// Prefix for the channel name
    ///
    /// A random suffix is appended for every activation.
    pub channel_prefix: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            table: SiteSettings::TABLE.to_string(),
            channel_prefix: "site-settings".to_string(),
        }
    }
}

/// The state shared by a [`SettingsSync`] with its consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsState {
    /// The last known settings
    ///
    /// `None` until the first successful fetch or change event.
    pub settings: Option<SiteSettings>,

    /// `true` until the first fetch completed (successfully or not)
    pub loading: bool,

    /// Number of the fetch or change event `settings` originates from
    ///
    /// `0` while `settings` is `None`.
    pub sequence: u64,
}

/// Error returned by [`SettingsSync::update`]
#[derive(Error, Debug)]
pub enum UpdateError {
    /// The settings could not be converted into a row
    #[error("The settings could not be serialized: {0}")]
    Serialize(RemoteError),

    /// The backend did not accept the upsert
    #[error("The settings could not be written: {0}")]
    Upsert(RemoteError),
}

impl<C: RemoteClient> SettingsSync<C> {
    /// Starts synchronizing the settings
    ///
    /// The returned value starts out loading.
    ///
    /// # Panics
    /// If called outside a tokio runtime.
    pub fn activate(client: Arc<C>, signal: &RefreshSignal, options: &SyncOptions) -> Self {
        let (sender, state) = watch::channel(SettingsState {
            settings: None,
            loading: true,
            sequence: 0,
        });
        let (shutdown, shutdown_receiver) = oneshot::channel();
        let refetch = Arc::new(Notify::new());

        let worker = Worker {
            client: Arc::clone(&client),
            table: options.table.clone(),
            channel_name: format!("{}-{}", options.channel_prefix, Uuid::new_v4()),
            state: sender,
            issued: 0,
        };
        let task = tokio::spawn(worker.run(
            signal.listen(),
            Arc::clone(&refetch),
            shutdown_receiver,
        ));

        Self {
            client,
            table: options.table.clone(),
            state,
            refetch,
            shutdown,
            task,
        }
    }

    /// Returns the last known settings
    ///
    /// `None` until the settings have been received once.
    pub fn current(&self) -> Option<SiteSettings> {
        self.state.borrow().settings.clone()
    }

    /// Checks whether the first fetch is still running
    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Clones the current state
    pub fn state(&self) -> SettingsState {
        self.state.borrow().clone()
    }

    /// Clones the underlying `watch::Receiver`.
    ///
    /// This enables the caller to wait for updates.
    pub fn watch(&self) -> watch::Receiver<SettingsState> {
        self.state.clone()
    }

    /// Waits for the first fetch to complete and returns the settings known at that point
    pub async fn loaded(&self) -> Option<SiteSettings> {
        let mut state = self.state.clone();
        match state.wait_for(|state| !state.loading).await {
            Ok(state) => state.settings.clone(),
            // The task stopped, the last state is all there is
            Err(_) => self.current(),
        }
    }

    /// Fetches the settings again
    ///
    /// Only this activation refetches.
    /// Raise the [`RefreshSignal`] to make every activation refetch.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }

    /// Writes a complete set of settings to the backend
    ///
    /// This method does **not** change the local state.
    /// The change will arrive through the subscription like any other update.
    ///
    /// Failures are logged before being returned.
    pub async fn update(&self, draft: &SiteSettings) -> Result<(), UpdateError> {
        let row = to_row(draft).map_err(|error| {
            error!(
                error.display = %error,
                error.debug = ?error,
                "Failed to serialize site settings"
            );
            UpdateError::Serialize(error)
        })?;

        self.client.upsert(&self.table, row).await.map_err(|error| {
            error!(
                table = self.table.as_str(),
                error.display = %error,
                error.debug = ?error,
                "Failed to update site settings"
            );
            UpdateError::Upsert(error)
        })
    }

    /// Stops synchronizing and waits until the channel and listener have been released
    ///
    /// The state stays readable through receivers obtained from [`SettingsSync::watch`].
    pub async fn deactivate(self) {
        let Self { shutdown, task, .. } = self;
        // The task might have stopped already
        let _ = shutdown.send(());
        if let Err(error) = task.await {
            error!(
                error.display = %error,
                error.debug = ?error,
                "Settings synchronization task failed"
            );
        }
    }
}

/// Output of a fetch: its sequence number and the query's result
type Fetched = (u64, Result<Vec<Row>, RemoteError>);

/// The task spawned by [`SettingsSync::activate`]
struct Worker<C> {
    client: Arc<C>,
    table: String,
    channel_name: String,
    state: watch::Sender<SettingsState>,

    /// The last sequence number handed out
    issued: u64,
}

impl<C: RemoteClient> Worker<C> {
    async fn run(
        mut self,
        listener: RefreshListener,
        refetch: Arc<Notify>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        let mut listener = Some(listener);
        let mut channel = match self
            .client
            .channel(&self.channel_name, ChangeFilter::updates(&self.table))
            .await
        {
            Ok(channel) => Some(channel),
            Err(error) => {
                error!(
                    channel = self.channel_name.as_str(),
                    error.display = %error,
                    error.debug = ?error,
                    "Failed to subscribe to site settings changes"
                );
                None
            }
        };
        let mut fetch = Some(self.fetch());

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                fetched = next_fetched(&mut fetch) => {
                    fetch = None;
                    self.apply_fetched(fetched);
                }

                event = next_event(&mut channel) => match event {
                    Some(event) => self.apply_event(event),
                    None => {
                        warn!(channel = self.channel_name.as_str(), "Site settings channel closed");
                        channel = None;
                    }
                },

                raised = next_raise(&mut listener) => match raised {
                    // A newer fetch supersedes the one in flight
                    Some(()) => fetch = Some(self.fetch()),
                    None => listener = None,
                },

                _ = refetch.notified() => fetch = Some(self.fetch()),
            }
        }

        if let Some(channel) = channel {
            if let Err(error) = self.client.remove_channel(channel).await {
                warn!(
                    channel = self.channel_name.as_str(),
                    error.display = %error,
                    error.debug = ?error,
                    "Failed to remove site settings channel"
                );
            }
        }
        drop(listener);
        debug!(channel = self.channel_name.as_str(), "Stopped site settings synchronization");
    }

    /// Hands out the next sequence number
    fn next_sequence(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Starts a fetch of the settings row
    fn fetch(&mut self) -> Boxed<Fetched> {
        let sequence = self.next_sequence();
        let client = Arc::clone(&self.client);
        let query = Query::from(self.table.as_str()).single();
        Box::pin(async move { (sequence, client.select(&query).await) })
    }

    fn apply_fetched(&mut self, (sequence, result): Fetched) {
        let settings = match result {
            Ok(rows) => match rows.into_iter().next().map(from_row::<SiteSettings>) {
                Some(Ok(settings)) => Some(settings),
                Some(Err(error)) => {
                    error!(
                        error.display = %error,
                        error.debug = ?error,
                        "Failed to decode fetched site settings"
                    );
                    None
                }
                None => {
                    error!("Fetching site settings returned no row");
                    None
                }
            },
            Err(error) => {
                error!(
                    error.display = %error,
                    error.debug = ?error,
                    "Failed to fetch site settings"
                );
                None
            }
        };

        self.state.send_if_modified(|state| {
            let was_loading = state.loading;
            state.loading = false;
            match settings {
                Some(settings) if sequence > state.sequence => {
                    state.settings = Some(settings);
                    state.sequence = sequence;
                    true
                }
                Some(_) => {
                    debug!(sequence, applied = state.sequence, "Discarded outdated fetch");
                    was_loading
                }
                None => was_loading,
            }
        });
    }

    fn apply_event(&mut self, event: ChangeEvent) {
        let sequence = self.next_sequence();
        let settings = match from_row::<SiteSettings>(event.new) {
            Ok(settings) => settings,
            Err(error) => {
                warn!(
                    sequence,
                    error.display = %error,
                    error.debug = ?error,
                    "Dropped malformed site settings change"
                );
                return;
            }
        };
        debug!(sequence, "Received site settings change");

        self.state.send_if_modified(|state| {
            if sequence > state.sequence {
                state.settings = Some(settings);
                state.sequence = sequence;
                true
            } else {
                false
            }
        });
    }
}

async fn next_fetched(fetch: &mut Option<Boxed<Fetched>>) -> Fetched {
    match fetch {
        Some(fetch) => fetch.await,
        None => pending().await,
    }
}

async fn next_event(channel: &mut Option<Channel>) -> Option<ChangeEvent> {
    match channel {
        Some(channel) => channel.recv().await,
        None => pending().await,
    }
}

async fn next_raise(listener: &mut Option<RefreshListener>) -> Option<()> {
    match listener {
        Some(listener) => listener.recv().await,
        None => pending().await,
    }
}

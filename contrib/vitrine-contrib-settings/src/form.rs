use tokio::sync::watch;
use tracing::debug;
use tracing::info;
use vitrine_core::RefreshSignal;
use vitrine_core::RemoteClient;
use vitrine_core::models::SiteSettings;

use crate::field::SettingsEdit;
use crate::field::SettingsField;
use crate::sync::SettingsState;
use crate::sync::SettingsSync;

/// An editable draft of the [`SiteSettings`]
///
/// The draft is seeded from the bound [`SettingsSync`].
/// Every call to [`SettingsForm::sync_upstream`] re-seeds it if the upstream value changed since,
/// replacing any unsaved edits.
///
/// [`SettingsForm::save`] always submits the complete draft, never a diff.
pub struct SettingsForm<'a, C: RemoteClient> {
    sync: &'a SettingsSync<C>,
    signal: RefreshSignal,
    upstream: watch::Receiver<SettingsState>,

    draft: Option<SiteSettings>,

    /// The upstream sequence the draft was seeded from
    seeded: u64,
}

/// Feedback for the admin after saving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Short headline
    pub title: &'static str,

    /// One sentence explaining what happened
    pub description: &'static str,

    /// How the notification should be presented
    pub variant: NotificationVariant,
}

/// How a [`Notification`] should be presented
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NotificationVariant {
    /// Something worked as expected
    Default,

    /// Something failed and the admin should act on it
    Destructive,
}

impl Notification {
    fn saved() -> Self {
        Self {
            title: "Success",
            description: "Site settings updated successfully",
            variant: NotificationVariant::Default,
        }
    }

    fn save_failed() -> Self {
        Self {
            title: "Error",
            description: "Failed to update site settings",
            variant: NotificationVariant::Destructive,
        }
    }
}

impl<'a, C: RemoteClient> SettingsForm<'a, C> {
    /// Binds a new form to `sync`
    ///
    /// After a successful save the form raises `signal`
    /// so every other [`SettingsSync`] connected to it refetches.
    pub fn new(sync: &'a SettingsSync<C>, signal: RefreshSignal) -> Self {
        let mut upstream = sync.watch();
        let (draft, seeded) = {
            let state = upstream.borrow_and_update();
            (state.settings.clone(), state.sequence)
        };
        Self {
            sync,
            signal,
            upstream,
            draft,
            seeded,
        }
    }

    /// Checks whether the settings are still loading
    pub fn is_loading(&self) -> bool {
        self.sync.is_loading()
    }

    /// The current draft
    ///
    /// `None` until the settings have been loaded.
    pub fn draft(&self) -> Option<&SiteSettings> {
        self.draft.as_ref()
    }

    /// Reads a field from the draft
    pub fn value(&self, field: SettingsField) -> Option<SettingsEdit> {
        self.draft
            .as_ref()
            .map(|draft| SettingsEdit::read(field, draft))
    }

    /// Re-seeds the draft if the upstream settings changed
    ///
    /// Returns whether the draft was replaced.
    pub fn sync_upstream(&mut self) -> bool {
        if !self.upstream.has_changed().unwrap_or(false) {
            return false;
        }

        let state = self.upstream.borrow_and_update();
        match &state.settings {
            Some(settings) if state.sequence != self.seeded => {
                self.draft = Some(settings.clone());
                self.seeded = state.sequence;
                true
            }
            _ => false,
        }
    }

    /// Sets a single field of the draft
    ///
    /// Returns `false` if there is no draft to edit yet.
    pub fn edit(&mut self, edit: SettingsEdit) -> bool {
        let Some(draft) = self.draft.as_mut() else {
            debug!(field = %edit.field(), "Ignored edit before settings were loaded");
            return false;
        };
        edit.apply(draft);
        true
    }

    /// Submits the complete draft
    ///
    /// On failure the draft is kept as is, so the admin can retry.
    pub async fn save(&mut self) -> Notification {
        let Some(draft) = self.draft.as_ref() else {
            debug!("Refused to save settings before they were loaded");
            return Notification::save_failed();
        };

        match self.sync.update(draft).await {
            Ok(()) => {
                info!("Saved site settings");
                self.signal.raise();
                Notification::saved()
            }
            // Already logged by `SettingsSync::update`
            Err(_) => Notification::save_failed(),
        }
    }
}

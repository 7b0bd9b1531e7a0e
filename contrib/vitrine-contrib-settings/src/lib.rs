//! Live site settings
//!
//! # "Settings" refresher
//!
//! In vitrine's naming, **"settings"** are the site's configuration values
//! which an admin changes at runtime (site name, hero text, colors, ...).
//! They are stored in a single row in the backend and shared by every viewer.
//!
//! **"config"** values require a restart.
//! They are read from environment variables (see the `vitrine` crate).
//!
//! # Starting point
//! Activate a [`SettingsSync`] to read the settings and keep them up to date.
//! Bind a [`SettingsForm`] to it to edit them.
#![warn(missing_docs)]

pub use crate::field::EditError;
pub use crate::field::Section;
pub use crate::field::SettingsEdit;
pub use crate::field::SettingsField;
pub use crate::form::Notification;
pub use crate::form::NotificationVariant;
pub use crate::form::SettingsForm;
pub use crate::sync::SettingsState;
pub use crate::sync::SettingsSync;
pub use crate::sync::SyncOptions;
pub use crate::sync::UpdateError;

mod field;
mod form;
mod sync;

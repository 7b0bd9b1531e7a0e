//! The records vitrine reads from and writes to the hosted backend
//!
//! Field names match the backend's column names.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

/// The site's configuration
///
/// The backend stores exactly one row of this type.
/// It is never addressed by a caller supplied key,
/// reads expect a single row and writes are upserts on that row.
///
/// Every field has a default.
/// A payload missing some fields (or setting them to `null`) still decodes,
/// while a payload carrying a field with the wrong type is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    /// The row's primary key, as assigned by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    #[serde(deserialize_with = "null_as_default")]
    pub site_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub site_description: String,

    #[serde(deserialize_with = "null_as_default")]
    pub hero_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hero_subtitle: String,
    pub hero_image_url: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub primary_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub secondary_color: String,
    #[serde(deserialize_with = "null_as_default")]
    pub logo_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub favicon_url: String,

    #[serde(deserialize_with = "null_as_default")]
    pub meta_title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub meta_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub meta_keywords: String,

    #[serde(deserialize_with = "null_as_default")]
    pub social_twitter: String,
    #[serde(deserialize_with = "null_as_default")]
    pub social_facebook: String,
    #[serde(deserialize_with = "null_as_default")]
    pub social_linkedin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub social_instagram: String,

    pub about_content: Option<String>,
    pub about_mission: Option<String>,
    pub about_vision: Option<String>,

    /// Values listed on the about page in addition to (or instead of) the default ones
    pub custom_values: Option<Vec<CompanyValue>>,

    /// Team members listed on the about page in addition to (or instead of) the default ones
    pub custom_team_members: Option<Vec<TeamMember>>,

    /// Whether the about page shows the built-in values
    ///
    /// Use [`SiteSettings::shows_default_values`] to read it.
    pub show_default_values: Option<bool>,

    /// Whether the about page shows the built-in team
    ///
    /// Use [`SiteSettings::shows_default_team`] to read it.
    pub show_default_team: Option<bool>,
}

impl SiteSettings {
    /// Name of the backend table storing the settings row
    pub const TABLE: &'static str = "site_settings";

    /// Whether the about page shows the built-in values (defaults to `true`)
    pub fn shows_default_values(&self) -> bool {
        self.show_default_values.unwrap_or(true)
    }

    /// Whether the about page shows the built-in team (defaults to `true`)
    pub fn shows_default_team(&self) -> bool {
        self.show_default_team.unwrap_or(true)
    }
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            id: None,
            site_name: String::new(),
            site_description: String::new(),
            hero_title: String::new(),
            hero_subtitle: String::new(),
            hero_image_url: None,
            primary_color: "#000000".to_string(),
            secondary_color: "#6366f1".to_string(),
            logo_url: String::new(),
            favicon_url: String::new(),
            meta_title: String::new(),
            meta_description: String::new(),
            meta_keywords: String::new(),
            social_twitter: String::new(),
            social_facebook: String::new(),
            social_linkedin: String::new(),
            social_instagram: String::new(),
            about_content: None,
            about_mission: None,
            about_vision: None,
            custom_values: None,
            custom_team_members: None,
            show_default_values: None,
            show_default_team: None,
        }
    }
}

/// Reads `null` as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A value the company stands for, shown on the about page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyValue {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub icon: Option<String>,
}

/// A member of the team, shown on the about page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A published piece of content as shown in article listings
///
/// `category` and `author` are many-to-one relations
/// which the backend embeds into the row when joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    #[serde(default)]
    pub featured_image_url: Option<String>,
    pub published: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Estimated reading time in minutes
    #[serde(default)]
    pub reading_time: Option<u32>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub author: Option<AuthorRef>,
}

impl Article {
    /// Name of the backend table storing articles
    pub const TABLE: &'static str = "articles";
}

/// The part of a category embedded into an [`Article`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
    pub slug: String,
}

/// The part of an author's profile embedded into an [`Article`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub full_name: String,
}

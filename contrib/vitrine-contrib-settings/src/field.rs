use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use vitrine_core::models::CompanyValue;
use vitrine_core::models::SiteSettings;
use vitrine_core::models::TeamMember;

/// Identifies one editable field of the [`SiteSettings`]
///
/// The `Display` and `FromStr` representations are the backend's column names.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SettingsField {
    SiteName,
    SiteDescription,
    MetaTitle,
    MetaDescription,
    MetaKeywords,
    SocialTwitter,
    SocialFacebook,
    SocialLinkedin,
    SocialInstagram,
    HeroTitle,
    HeroSubtitle,
    HeroImageUrl,
    PrimaryColor,
    SecondaryColor,
    LogoUrl,
    FaviconUrl,
    AboutContent,
    AboutMission,
    AboutVision,
    CustomValues,
    CustomTeamMembers,
    ShowDefaultValues,
    ShowDefaultTeam,
}

/// The tabs of the settings form
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Section {
    /// Site identity, SEO metadata and social links
    General,
    /// The homepage's hero section
    Hero,
    /// Colors, logo and favicon
    Branding,
    /// The about page's content, values and team
    About,
}

/// Sets one field of the [`SiteSettings`] to a typed value
///
/// Serialized as `{"field": "<column name>", "value": <value>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum SettingsEdit {
    SiteName(String),
    SiteDescription(String),
    MetaTitle(String),
    MetaDescription(String),
    MetaKeywords(String),
    SocialTwitter(String),
    SocialFacebook(String),
    SocialLinkedin(String),
    SocialInstagram(String),
    HeroTitle(String),
    HeroSubtitle(String),
    HeroImageUrl(Option<String>),
    PrimaryColor(String),
    SecondaryColor(String),
    LogoUrl(String),
    FaviconUrl(String),
    AboutContent(Option<String>),
    AboutMission(Option<String>),
    AboutVision(Option<String>),
    CustomValues(Vec<CompanyValue>),
    CustomTeamMembers(Vec<TeamMember>),
    ShowDefaultValues(bool),
    ShowDefaultTeam(bool),
}

/// Error returned by [`SettingsEdit::parse`]
#[derive(Error, Debug)]
pub enum EditError {
    /// No settings field has this name
    #[error("'{0}' is not a settings field")]
    UnknownField(String),

    /// The value doesn't have the field's type
    #[error("Invalid value for '{field}': {source}")]
    InvalidValue {
        /// The field the value was meant for
        field: SettingsField,
        /// Why the value was rejected
        source: serde_json::Error,
    },
}

impl SettingsField {
    /// Every field in the order the form shows them
    pub const ALL: [SettingsField; 23] = [
        Self::SiteName,
        Self::SiteDescription,
        Self::MetaTitle,
        Self::MetaDescription,
        Self::MetaKeywords,
        Self::SocialTwitter,
        Self::SocialFacebook,
        Self::SocialLinkedin,
        Self::SocialInstagram,
        Self::HeroTitle,
        Self::HeroSubtitle,
        Self::HeroImageUrl,
        Self::PrimaryColor,
        Self::SecondaryColor,
        Self::LogoUrl,
        Self::FaviconUrl,
        Self::AboutContent,
        Self::AboutMission,
        Self::AboutVision,
        Self::CustomValues,
        Self::CustomTeamMembers,
        Self::ShowDefaultValues,
        Self::ShowDefaultTeam,
    ];

    /// The backend's column name
    pub fn name(self) -> &'static str {
        match self {
            Self::SiteName => "site_name",
            Self::SiteDescription => "site_description",
            Self::MetaTitle => "meta_title",
            Self::MetaDescription => "meta_description",
            Self::MetaKeywords => "meta_keywords",
            Self::SocialTwitter => "social_twitter",
            Self::SocialFacebook => "social_facebook",
            Self::SocialLinkedin => "social_linkedin",
            Self::SocialInstagram => "social_instagram",
            Self::HeroTitle => "hero_title",
            Self::HeroSubtitle => "hero_subtitle",
            Self::HeroImageUrl => "hero_image_url",
            Self::PrimaryColor => "primary_color",
            Self::SecondaryColor => "secondary_color",
            Self::LogoUrl => "logo_url",
            Self::FaviconUrl => "favicon_url",
            Self::AboutContent => "about_content",
            Self::AboutMission => "about_mission",
            Self::AboutVision => "about_vision",
            Self::CustomValues => "custom_values",
            Self::CustomTeamMembers => "custom_team_members",
            Self::ShowDefaultValues => "show_default_values",
            Self::ShowDefaultTeam => "show_default_team",
        }
    }

    /// The form tab showing this field
    pub fn section(self) -> Section {
        match self {
            Self::SiteName
            | Self::SiteDescription
            | Self::MetaTitle
            | Self::MetaDescription
            | Self::MetaKeywords
            | Self::SocialTwitter
            | Self::SocialFacebook
            | Self::SocialLinkedin
            | Self::SocialInstagram => Section::General,
            Self::HeroTitle | Self::HeroSubtitle | Self::HeroImageUrl => Section::Hero,
            Self::PrimaryColor | Self::SecondaryColor | Self::LogoUrl | Self::FaviconUrl => {
                Section::Branding
            }
            Self::AboutContent
            | Self::AboutMission
            | Self::AboutVision
            | Self::CustomValues
            | Self::CustomTeamMembers
            | Self::ShowDefaultValues
            | Self::ShowDefaultTeam => Section::About,
        }
    }
}

impl fmt::Display for SettingsField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingsField {
    type Err = EditError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| EditError::UnknownField(name.to_string()))
    }
}

impl Section {
    /// Every section in the order the form shows them
    pub const ALL: [Section; 4] = [
        Section::General,
        Section::Hero,
        Section::Branding,
        Section::About,
    ];

    /// The tab's title
    pub fn title(self) -> &'static str {
        match self {
            Section::General => "General",
            Section::Hero => "Hero Section",
            Section::Branding => "Branding",
            Section::About => "About",
        }
    }

    /// The fields shown in this tab
    pub fn fields(self) -> impl Iterator<Item = SettingsField> {
        SettingsField::ALL
            .into_iter()
            .filter(move |field| field.section() == self)
    }
}

impl SettingsEdit {
    /// Checks an untyped `value` against the field's type
    ///
    /// This is the entry point for values coming from a form or an api request.
    pub fn parse(field: &str, value: Value) -> Result<Self, EditError> {
        let field: SettingsField = field.parse()?;
        serde_json::from_value(json!({"field": field.name(), "value": value}))
            .map_err(|source| EditError::InvalidValue { field, source })
    }

    /// Reads a field's current value
    pub fn read(field: SettingsField, settings: &SiteSettings) -> Self {
        match field {
            SettingsField::SiteName => Self::SiteName(settings.site_name.clone()),
            SettingsField::SiteDescription => {
                Self::SiteDescription(settings.site_description.clone())
            }
            SettingsField::MetaTitle => Self::MetaTitle(settings.meta_title.clone()),
            SettingsField::MetaDescription => {
                Self::MetaDescription(settings.meta_description.clone())
            }
            SettingsField::MetaKeywords => Self::MetaKeywords(settings.meta_keywords.clone()),
            SettingsField::SocialTwitter => Self::SocialTwitter(settings.social_twitter.clone()),
            SettingsField::SocialFacebook => {
                Self::SocialFacebook(settings.social_facebook.clone())
            }
            SettingsField::SocialLinkedin => {
                Self::SocialLinkedin(settings.social_linkedin.clone())
            }
            SettingsField::SocialInstagram => {
                Self::SocialInstagram(settings.social_instagram.clone())
            }
            SettingsField::HeroTitle => Self::HeroTitle(settings.hero_title.clone()),
            SettingsField::HeroSubtitle => Self::HeroSubtitle(settings.hero_subtitle.clone()),
            SettingsField::HeroImageUrl => Self::HeroImageUrl(settings.hero_image_url.clone()),
            SettingsField::PrimaryColor => Self::PrimaryColor(settings.primary_color.clone()),
            SettingsField::SecondaryColor => {
                Self::SecondaryColor(settings.secondary_color.clone())
            }
            SettingsField::LogoUrl => Self::LogoUrl(settings.logo_url.clone()),
            SettingsField::FaviconUrl => Self::FaviconUrl(settings.favicon_url.clone()),
            SettingsField::AboutContent => Self::AboutContent(settings.about_content.clone()),
            SettingsField::AboutMission => Self::AboutMission(settings.about_mission.clone()),
            SettingsField::AboutVision => Self::AboutVision(settings.about_vision.clone()),
            SettingsField::CustomValues => {
                Self::CustomValues(settings.custom_values.clone().unwrap_or_default())
            }
            SettingsField::CustomTeamMembers => {
                Self::CustomTeamMembers(settings.custom_team_members.clone().unwrap_or_default())
            }
            SettingsField::ShowDefaultValues => {
                Self::ShowDefaultValues(settings.shows_default_values())
            }
            SettingsField::ShowDefaultTeam => Self::ShowDefaultTeam(settings.shows_default_team()),
        }
    }

    /// The field this edit sets
    pub fn field(&self) -> SettingsField {
        match self {
            Self::SiteName(_) => SettingsField::SiteName,
            Self::SiteDescription(_) => SettingsField::SiteDescription,
            Self::MetaTitle(_) => SettingsField::MetaTitle,
            Self::MetaDescription(_) => SettingsField::MetaDescription,
            Self::MetaKeywords(_) => SettingsField::MetaKeywords,
            Self::SocialTwitter(_) => SettingsField::SocialTwitter,
            Self::SocialFacebook(_) => SettingsField::SocialFacebook,
            Self::SocialLinkedin(_) => SettingsField::SocialLinkedin,
            Self::SocialInstagram(_) => SettingsField::SocialInstagram,
            Self::HeroTitle(_) => SettingsField::HeroTitle,
            Self::HeroSubtitle(_) => SettingsField::HeroSubtitle,
            Self::HeroImageUrl(_) => SettingsField::HeroImageUrl,
            Self::PrimaryColor(_) => SettingsField::PrimaryColor,
            Self::SecondaryColor(_) => SettingsField::SecondaryColor,
            Self::LogoUrl(_) => SettingsField::LogoUrl,
            Self::FaviconUrl(_) => SettingsField::FaviconUrl,
            Self::AboutContent(_) => SettingsField::AboutContent,
            Self::AboutMission(_) => SettingsField::AboutMission,
            Self::AboutVision(_) => SettingsField::AboutVision,
            Self::CustomValues(_) => SettingsField::CustomValues,
            Self::CustomTeamMembers(_) => SettingsField::CustomTeamMembers,
            Self::ShowDefaultValues(_) => SettingsField::ShowDefaultValues,
            Self::ShowDefaultTeam(_) => SettingsField::ShowDefaultTeam,
        }
    }

    /// Writes the value into `settings`, leaving every other field untouched
    pub fn apply(self, settings: &mut SiteSettings) {
        match self {
            Self::SiteName(value) => settings.site_name = value,
            Self::SiteDescription(value) => settings.site_description = value,
            Self::MetaTitle(value) => settings.meta_title = value,
            Self::MetaDescription(value) => settings.meta_description = value,
            Self::MetaKeywords(value) => settings.meta_keywords = value,
            Self::SocialTwitter(value) => settings.social_twitter = value,
            Self::SocialFacebook(value) => settings.social_facebook = value,
            Self::SocialLinkedin(value) => settings.social_linkedin = value,
            Self::SocialInstagram(value) => settings.social_instagram = value,
            Self::HeroTitle(value) => settings.hero_title = value,
            Self::HeroSubtitle(value) => settings.hero_subtitle = value,
            Self::HeroImageUrl(value) => settings.hero_image_url = value,
            Self::PrimaryColor(value) => settings.primary_color = value,
            Self::SecondaryColor(value) => settings.secondary_color = value,
            Self::LogoUrl(value) => settings.logo_url = value,
            Self::FaviconUrl(value) => settings.favicon_url = value,
            Self::AboutContent(value) => settings.about_content = value,
            Self::AboutMission(value) => settings.about_mission = value,
            Self::AboutVision(value) => settings.about_vision = value,
            Self::CustomValues(value) => settings.custom_values = Some(value),
            Self::CustomTeamMembers(value) => settings.custom_team_members = Some(value),
            Self::ShowDefaultValues(value) => settings.show_default_values = Some(value),
            Self::ShowDefaultTeam(value) => settings.show_default_team = Some(value),
        }
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

/// Identifier of one of the page's slide-up drawers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawerId {
    Work,
    Contact,
}

impl DrawerId {
    /// Resolves the slug carried by a trigger element. Unknown slugs map to
    /// `None` so activation events for them can be dropped instead of failing.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "work" => Some(Self::Work),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Contact => "contact",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub name: String,
    pub summary: String,
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub tagline: String,
    pub bio: Vec<String>,
    pub footer: String,
}

/// Static page content rendered by the server: everything on the landing
/// page that is not the live view counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteContent {
    pub profile: Profile,
    #[serde(default)]
    pub links: Vec<SocialLink>,
    #[serde(default)]
    pub projects: Vec<ProjectSummary>,
}

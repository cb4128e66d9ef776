use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::{Profile, ProjectSummary, SiteContent, SocialLink};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
    /// Seconds the rendered page stays valid before the next request
    /// regenerates it. Zero disables caching entirely.
    pub revalidate_seconds: u64,
    pub content: SiteContent,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            database_url: "sqlite://./data/site.db".into(),
            revalidate_seconds: 1,
            content: default_site_content(),
        }
    }
}

/// Optional overrides read from `site.toml`. Anything absent falls back to
/// the compiled defaults.
#[derive(Debug, Default, Deserialize)]
struct SiteFile {
    bind_addr: Option<String>,
    database_url: Option<String>,
    revalidate_seconds: Option<u64>,
    profile: Option<Profile>,
    links: Option<Vec<SocialLink>>,
    projects: Option<Vec<ProjectSummary>>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("site.toml") {
        match toml::from_str::<SiteFile>(&raw) {
            Ok(file) => apply_site_file(&mut settings, file),
            Err(error) => tracing::warn!(%error, "ignoring malformed site.toml"),
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Ok(v) = std::env::var("APP__REVALIDATE_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.revalidate_seconds = parsed;
        }
    }

    settings
}

fn apply_site_file(settings: &mut Settings, file: SiteFile) {
    if let Some(v) = file.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file.database_url {
        settings.database_url = v;
    }
    if let Some(v) = file.revalidate_seconds {
        settings.revalidate_seconds = v;
    }
    if let Some(v) = file.profile {
        settings.content.profile = v;
    }
    if let Some(v) = file.links {
        settings.content.links = v;
    }
    if let Some(v) = file.projects {
        settings.content.projects = v;
    }
}

pub fn default_site_content() -> SiteContent {
    SiteContent {
        profile: Profile {
            display_name: "@dev".into(),
            tagline: "software developer".into(),
            bio: vec![
                "Developer at heart, passionate about building a better web and \
                 creating great experiences for end users."
                    .into(),
                "Doing everything from data scrapers, dynamic websites and APIs, \
                 native applications and data visualizations."
                    .into(),
            ],
            footer: "All rights reserved.".into(),
        },
        links: vec![
            SocialLink {
                label: "GitHub".into(),
                url: "https://github.com".into(),
            },
            SocialLink {
                label: "Email".into(),
                url: "mailto:hello@example.com".into(),
            },
        ],
        projects: vec![ProjectSummary {
            name: "Project".into(),
            summary: "A featured project shown in the work drawer.".into(),
            tags: vec!["web".into()],
            live_url: None,
        }],
    }
}

pub fn prepare_database_url(raw_database_url: &str) -> anyhow::Result<String> {
    let database_url = normalize_database_url(raw_database_url);
    ensure_parent_dir_exists(&database_url)?;
    Ok(database_url)
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite://{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

fn ensure_parent_dir_exists(database_url: &str) -> anyhow::Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn normalizes_plain_file_path_to_sqlite_url() {
        assert_eq!(
            normalize_database_url("./data/test.db"),
            "sqlite://./data/test.db"
        );
    }

    #[test]
    fn keeps_memory_url_untouched() {
        assert_eq!(
            normalize_database_url("sqlite::memory:"),
            "sqlite::memory:"
        );
    }

    #[test]
    fn creates_parent_dir_for_relative_sqlite_url() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();

        let temp_root = env::temp_dir().join(format!("portfolio_server_test_{suffix}"));
        fs::create_dir_all(&temp_root).expect("temp root");

        let original_dir = env::current_dir().expect("cwd");
        env::set_current_dir(&temp_root).expect("set cwd");

        prepare_database_url("./data/test.db").expect("prepare db url");
        assert!(temp_root.join("data").exists());

        env::set_current_dir(original_dir).expect("restore cwd");
        fs::remove_dir_all(temp_root).expect("cleanup");
    }

    #[test]
    fn site_file_overrides_profile_but_keeps_other_defaults() {
        let mut settings = Settings::default();
        let file: SiteFile = toml::from_str(
            r#"
            revalidate_seconds = 30

            [profile]
            display_name = "@someone"
            tagline = "makes things"
            bio = ["One line."]
            footer = "fin"
            "#,
        )
        .expect("parse");

        apply_site_file(&mut settings, file);

        assert_eq!(settings.revalidate_seconds, 30);
        assert_eq!(settings.content.profile.display_name, "@someone");
        assert!(!settings.content.links.is_empty(), "default links retained");
    }
}

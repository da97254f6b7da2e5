use std::{collections::HashMap, fs, io::ErrorKind, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "survey.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub directory_base_url: String,
    pub submit_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory_base_url: "https://bdapis.com/api/v1.2".into(),
            submit_url: "http://localhost:3000/submit".into(),
        }
    }
}

/// Defaults, then `survey.toml` in the working directory, then environment.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg = toml::from_str::<HashMap<String, String>>(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            if let Some(v) = file_cfg.get("directory_base_url") {
                settings.directory_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("submit_url") {
                settings.submit_url = v.clone();
            }
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    if let Some(v) = env("DIRECTORY_BASE_URL") {
        settings.directory_base_url = v;
    }
    if let Some(v) = env("APP__DIRECTORY_BASE_URL") {
        settings.directory_base_url = v;
    }

    if let Some(v) = env("SUBMIT_URL") {
        settings.submit_url = v;
    }
    if let Some(v) = env("APP__SUBMIT_URL") {
        settings.submit_url = v;
    }

    settings.validate()?;
    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("directory_base_url", &self.directory_base_url),
            ("submit_url", &self.submit_url),
        ] {
            let url = Url::parse(value).with_context(|| format!("invalid {name} '{value}'"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{name} must be an http(s) url, got '{value}'");
            }
        }
        Ok(())
    }
}

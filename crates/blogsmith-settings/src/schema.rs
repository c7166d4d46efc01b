//! System settings as stored under the `system` key

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{SettingsError, SettingsResult};

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("e-mail pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<BackgroundConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Empty or an e-mail address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_address: Option<String>,
}

/// Background settings as entered; unset fields take the defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_image_url: Option<String>,
    /// Percent, light mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Percent, dark mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_opacity: Option<f64>,
    /// Pixels, 0 to 20
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_duration: Option<u64>,
}

/// Background settings with every field resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Background {
    pub image_url: String,
    pub home_image_url: String,
    pub opacity: f64,
    pub dark_opacity: f64,
    pub blur: f64,
    pub overlay_opacity: f64,
    pub enabled: bool,
    pub transition_duration: u64,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            image_url: String::new(),
            home_image_url: String::new(),
            opacity: 20.0,
            dark_opacity: 10.0,
            blur: 1.0,
            overlay_opacity: 80.0,
            enabled: false,
            transition_duration: 1200,
        }
    }
}

impl BackgroundConfig {
    /// Fill unset fields from the defaults
    pub fn resolve(&self) -> Background {
        let defaults = Background::default();
        Background {
            image_url: self.image_url.clone().unwrap_or(defaults.image_url),
            home_image_url: self.home_image_url.clone().unwrap_or(defaults.home_image_url),
            opacity: self.opacity.unwrap_or(defaults.opacity),
            dark_opacity: self.dark_opacity.unwrap_or(defaults.dark_opacity),
            blur: self.blur.unwrap_or(defaults.blur),
            overlay_opacity: self.overlay_opacity.unwrap_or(defaults.overlay_opacity),
            enabled: self.enabled.unwrap_or(defaults.enabled),
            transition_duration: self
                .transition_duration
                .unwrap_or(defaults.transition_duration),
        }
    }

    fn validate(&self) -> SettingsResult<()> {
        check_range("background.opacity", self.opacity, 100.0)?;
        check_range("background.darkOpacity", self.dark_opacity, 100.0)?;
        check_range("background.blur", self.blur, 20.0)?;
        check_range("background.overlayOpacity", self.overlay_opacity, 100.0)
    }
}

impl SystemConfig {
    /// What a fresh installation shows in the settings form
    pub fn defaults() -> Self {
        let background = Background::default();
        Self {
            email: Some(EmailConfig {
                api_key: Some(String::new()),
                sender_name: Some(String::new()),
                sender_address: Some(String::new()),
            }),
            background: Some(BackgroundConfig {
                image_url: Some(background.image_url),
                home_image_url: Some(background.home_image_url),
                opacity: Some(background.opacity),
                dark_opacity: Some(background.dark_opacity),
                blur: Some(background.blur),
                overlay_opacity: Some(background.overlay_opacity),
                enabled: Some(background.enabled),
                transition_duration: Some(background.transition_duration),
            }),
        }
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if let Some(background) = &self.background {
            background.validate()?;
        }

        if let Some(address) = self
            .email
            .as_ref()
            .and_then(|email| email.sender_address.as_deref())
            && !address.is_empty()
        {
            if !EMAIL.is_match(address) {
                return Err(SettingsError::Validation(format!(
                    "email.senderAddress `{address}` is not an e-mail address"
                )));
            }
        }

        Ok(())
    }

    /// Both the API key and the sender address are filled in
    pub fn is_email_configured(&self) -> bool {
        self.email.as_ref().is_some_and(|email| {
            let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
            filled(&email.api_key) && filled(&email.sender_address)
        })
    }
}

fn check_range(field: &str, value: Option<f64>, max: f64) -> SettingsResult<()> {
    match value {
        Some(v) if !(0.0..=max).contains(&v) => Err(SettingsError::Validation(format!(
            "{field} must be between 0 and {max}, got {v}"
        ))),
        _ => Ok(()),
    }
}

use super::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentFormatKind {
    #[default]
    Current,
    Legacy,
}

impl FragmentFormatKind {
    pub fn format(self) -> FragmentFormat {
        match self {
            Self::Current => FragmentFormat::current(),
            Self::Legacy => FragmentFormat::legacy(),
        }
    }
}

pub(crate) const DEFAULT_CONTRAST_CLASSES: [&str; 16] = [
    "feature-title",
    "feature-summary-commentary",
    "feature-summary-container",
    "feature-summary-row",
    "feature-icon",
    "scenario-header",
    "scenario-capsule",
    "scenario-tags",
    "scenario-duration",
    "step-capsule",
    "step-status",
    "step-duration",
    "messages",
    "embed_button",
    "link",
    "table",
];

/// Viewer settings. Every field has a default, so a TOML document only needs
/// the keys it changes.
///
/// ```toml
/// fragment_format = "legacy"
/// theme_storage_key = "report-theme"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub fragment_format: FragmentFormatKind,
    pub theme_storage_key: String,
    pub contrast_classes: Vec<String>,
    pub loading_placeholder: String,
    pub too_large_message: String,
    pub unsupported_message: String,
    pub decode_failed_message: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fragment_format: FragmentFormatKind::Current,
            theme_storage_key: "behave-html-pretty-formatter-theme".to_string(),
            contrast_classes: DEFAULT_CONTRAST_CLASSES
                .iter()
                .map(|class| class.to_string())
                .collect(),
            loading_placeholder: "Loading...".to_string(),
            too_large_message: "Data too large to display, use the Download button.".to_string(),
            unsupported_message:
                "Your browser cannot decompress this embed, use the Download button instead."
                    .to_string(),
            decode_failed_message: "Embed data could not be decoded.".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(src: &str) -> Result<Self> {
        let config: Self = toml::from_str(src).map_err(|err| Error::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|err| Error::Config(err.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.theme_storage_key.trim().is_empty() {
            return Err(Error::Config("theme_storage_key must not be empty".into()));
        }
        if let Some(class) = self
            .contrast_classes
            .iter()
            .find(|class| class.trim().is_empty() || class.contains(char::is_whitespace))
        {
            return Err(Error::Config(format!(
                "contrast class must be a single class name: {class:?}"
            )));
        }
        Ok(())
    }

    pub fn format(&self) -> FragmentFormat {
        self.fragment_format.format()
    }
}

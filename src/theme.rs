use super::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) const THEME_TOGGLE_ID: &str = "dark_mode_toggle";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Dark,
    Light,
    #[default]
    Auto,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
            Self::Auto => "auto",
        }
    }

    /// Order of the theme button: auto, dark, light, auto.
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::Dark,
            Self::Dark => Self::Light,
            Self::Light => Self::Auto,
        }
    }

    /// Concrete scheme after consulting the platform for `auto`.
    pub fn resolve(self, prefers_dark: bool) -> Self {
        match self {
            Self::Auto if prefers_dark => Self::Dark,
            Self::Auto => Self::Light,
            other => other,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemePreference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            "auto" => Ok(Self::Auto),
            other => Err(Error::Config(format!("unknown theme preference: {other}"))),
        }
    }
}

impl Viewer {
    pub(crate) fn stored_theme(&self) -> ThemePreference {
        self.local_storage
            .get(&self.config.theme_storage_key)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub(crate) fn apply_theme(&mut self, preference: ThemePreference) -> Result<()> {
        let resolved = preference.resolve(self.platform_mocks.prefers_dark_color_scheme);
        if let Some(root) = self.dom.document_element() {
            let (add, remove) = match resolved {
                ThemePreference::Dark => ("dark", "light"),
                _ => ("light", "dark"),
            };
            self.dom.class_remove(root, remove)?;
            self.dom.class_add(root, add)?;
        }
        if let Some(button) = self.dom.by_id(THEME_TOGGLE_ID) {
            self.dom.set_attr(button, "data-value", preference.as_str())?;
            self.dom
                .set_attr(button, "data-next-value", preference.next().as_str())?;
        }
        self.trace_line(format!("[theme] preference={preference} applied={resolved}"));
        Ok(())
    }

    pub(crate) fn cycle_theme(&mut self) -> Result<ThemePreference> {
        let next = self.stored_theme().next();
        let key = self.config.theme_storage_key.clone();
        self.local_storage.set(&key, next.as_str());
        self.apply_theme(next)?;
        Ok(next)
    }

    /// High contrast detected on the platform at load is routed through the
    /// toggle state so the fragment reflects it.
    pub(crate) fn detect_contrast(&mut self) -> Result<()> {
        if !self.platform_mocks.forced_high_contrast {
            return Ok(());
        }
        let keyword = self.format.high_contrast.clone();
        if self.toggles.current().contains(&keyword) {
            return Ok(());
        }
        self.trace_line("[theme] high contrast color scheme detected".to_string());
        self.toggle(&keyword)
    }
}

//! Deterministic headless viewer for behave "pretty" HTML test reports.
//!
//! A report is loaded into an in-memory DOM and the page's client-side
//! behavior is reproduced against it: toggle state mirrored into the URL
//! fragment, section expand/collapse, high contrast, summary panel, theme
//! preference, status filter, deferred embed rendering and embed downloads.
//!
//! ```
//! use behave_report_viewer::Viewer;
//!
//! let html = r#"
//!   <div class="embed_button collapse" id="embed_button_e1" onclick="toggle_hash('e1')">Log</div>
//!   <pre class="embed_content collapse" id="embed_e1"><span>hello</span></pre>
//! "#;
//! let mut viewer = Viewer::from_html_with_url("file:///report.html#toggle=e1", html)?;
//! viewer.load()?;
//! viewer.assert_no_class("#embed_e1", "collapse")?;
//! viewer.click("#embed_button_e1")?;
//! assert_eq!(viewer.location_hash(), "#toggles");
//! # Ok::<(), behave_report_viewer::Error>(())
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

mod actions;
mod config;
mod core_dom_utils;
mod dom;
mod effects;
mod embed;
mod html;
mod runtime_state;
mod selector;
mod theme;
mod toggle_state;
mod viewer;

pub use actions::{ControlAction, ExpanderAction};
pub use config::{FragmentFormatKind, ViewerConfig};
pub use embed::Decompressor;
pub use runtime_state::{
    DownloadArtifact, LocationNavigation, LocationNavigationKind, PendingRender,
};
pub use theme::ThemePreference;
pub use toggle_state::{FragmentFormat, ToggleSet, ToggleState, detect_changes};
pub use viewer::Viewer;

pub(crate) use core_dom_utils::*;
pub(crate) use effects::{SectionIndex, is_summary_outside_fragment};
pub(crate) use html::{decode_html_character_references, parse_html};
pub(crate) use runtime_state::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("html parse error: {0}")]
    HtmlParse(String),
    #[error("selector not found: {0}")]
    SelectorNotFound(String),
    #[error("unsupported selector: {0}")]
    UnsupportedSelector(String),
    #[error("unsupported handler: {0}")]
    UnsupportedHandler(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("dom error: {0}")]
    Dom(String),
    #[error(
        "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
    )]
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

/// Status classes a scenario header or capsule can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
    Skipped,
    Undefined,
    Untested,
    Executing,
}

impl ScenarioStatus {
    pub const ALL: [ScenarioStatus; 6] = [
        Self::Passed,
        Self::Failed,
        Self::Skipped,
        Self::Undefined,
        Self::Untested,
        Self::Executing,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Undefined => "undefined",
            Self::Untested => "untested",
            Self::Executing => "executing",
        }
    }

    pub fn from_class_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.class_name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Vec<ScenarioStatus>),
}

impl StatusFilter {
    /// Parses the comma separated argument of a `filter_status(...)` control.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let mut statuses = Vec::new();
        for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let status = ScenarioStatus::from_class_name(token)
                .ok_or_else(|| Error::UnsupportedHandler(format!("unknown status: {token}")))?;
            if !statuses.contains(&status) {
                statuses.push(status);
            }
        }
        Ok(Self::Only(statuses))
    }

    pub fn admits(&self, classes: &[String]) -> bool {
        match self {
            Self::All => true,
            Self::Only(statuses) => statuses
                .iter()
                .any(|status| classes.iter().any(|class| class == status.class_name())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    attrs: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

#[cfg(test)]
mod tests;

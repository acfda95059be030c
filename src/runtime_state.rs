use super::*;

/// Splits a URL into the part before the fragment and the fragment itself
/// (including its leading `#`, empty when there is none).
pub(crate) fn split_url_fragment(url: &str) -> (&str, &str) {
    match url.find('#') {
        Some(pos) => (&url[..pos], &url[pos..]),
        None => (url, ""),
    }
}

pub(crate) fn ensure_hash_prefix(value: &str) -> String {
    if value.is_empty() || value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{value}")
    }
}

pub(crate) fn with_fragment(url: &str, fragment: &str) -> String {
    let (base, _) = split_url_fragment(url);
    format!("{base}{}", ensure_hash_prefix(fragment))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationNavigationKind {
    /// `location.hash = ...` or following a link: new history entry.
    Push,
    /// `history.replaceState(...)`: current entry rewritten, no notification.
    Replace,
    /// Back/forward traversal.
    Traverse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNavigation {
    pub kind: LocationNavigationKind,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub filename: String,
    pub href: String,
}

/// An embed waiting for its payload to be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRender {
    pub target_id: String,
    pub data: String,
    pub compressed: bool,
}

#[derive(Debug)]
pub(crate) struct LocationHistoryState {
    pub(crate) entries: Vec<String>,
    pub(crate) index: usize,
    pub(crate) navigations: Vec<LocationNavigation>,
}

impl LocationHistoryState {
    pub(crate) fn new(initial_url: &str) -> Self {
        Self {
            entries: vec![initial_url.to_string()],
            index: 0,
            navigations: Vec::new(),
        }
    }

    pub(crate) fn current(&self) -> &str {
        self.entries
            .get(self.index)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub(crate) fn push(&mut self, url: &str) {
        let next = self.index.saturating_add(1).min(self.entries.len());
        self.entries.truncate(next);
        self.entries.push(url.to_string());
        self.index = self.entries.len().saturating_sub(1);
    }

    pub(crate) fn replace_current(&mut self, url: &str) {
        if self.entries.is_empty() {
            self.entries.push(url.to_string());
            self.index = 0;
            return;
        }
        let index = self.index.min(self.entries.len().saturating_sub(1));
        self.entries[index] = url.to_string();
        self.index = index;
    }

    /// Moves through history by `delta` entries; `None` when out of range.
    pub(crate) fn traverse(&mut self, delta: isize) -> Option<&str> {
        let target = self.index.checked_add_signed(delta)?;
        if target >= self.entries.len() {
            return None;
        }
        self.index = target;
        Some(self.current())
    }
}

#[derive(Debug, Default)]
pub(crate) struct StorageState {
    pub(crate) items: Vec<(String, String)>,
}

impl StorageState {
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub(crate) fn set(&mut self, key: &str, value: &str) {
        if let Some((_, stored)) = self.items.iter_mut().find(|(name, _)| name == key) {
            *stored = value.to_string();
        } else {
            self.items.push((key.to_string(), value.to_string()));
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct PlatformMockState {
    pub(crate) prefers_dark_color_scheme: bool,
    pub(crate) forced_high_contrast: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SchedulerState {
    pub(crate) render_queue: VecDeque<PendingRender>,
    pub(crate) next_render_id: usize,
}

impl SchedulerState {
    pub(crate) fn allocate_render_id(&mut self) -> String {
        self.next_render_id += 1;
        format!("to_render_{}", self.next_render_id)
    }
}

#[derive(Debug)]
pub(crate) struct TraceState {
    pub(crate) enabled: bool,
    pub(crate) toggles: bool,
    pub(crate) effects: bool,
    pub(crate) logs: VecDeque<String>,
    pub(crate) log_limit: usize,
}

impl Default for TraceState {
    fn default() -> Self {
        Self {
            enabled: false,
            toggles: true,
            effects: true,
            logs: VecDeque::new(),
            log_limit: 10_000,
        }
    }
}

//! Toggle state mirrored into the URL fragment.
//!
//! The set of expanded sections (plus the reserved contrast and summary
//! keywords) lives in the fragment as `#toggle=<id1>,<id2>,...`. This module
//! holds the codec between a [`ToggleSet`] and that string, the change
//! detector run on fragment changes, and the [`ToggleState`] object that owns
//! the held set together with the changes not applied to the document yet.

/// Ordered set of unique toggle ids, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleSet {
    ids: Vec<String>,
}

impl ToggleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from ids, keeping the first occurrence of duplicates.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|existing| existing == id)
    }

    /// Appends `id` if absent. Returns whether it was added.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        let id = id.into();
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes `id` if present. Returns whether it was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        match self.ids.iter().position(|existing| existing == id) {
            Some(pos) => {
                self.ids.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Flips membership of `id`. Returns whether it is present afterwards.
    pub fn flip(&mut self, id: &str) -> bool {
        if self.remove(id) {
            false
        } else {
            self.ids.push(id.to_string());
            true
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.ids
    }
}

impl<'a> IntoIterator for &'a ToggleSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

/// One revision of the fragment encoding.
///
/// Report generator revisions disagree on the reserved keywords and on
/// whether the summary panel is part of the fragment at all, so each is kept
/// as its own format instead of guessing a canonical one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFormat {
    pub prefix: String,
    pub empty_sentinel: String,
    pub high_contrast: String,
    pub summary: Option<String>,
}

impl Default for FragmentFormat {
    fn default() -> Self {
        Self::current()
    }
}

impl FragmentFormat {
    pub fn current() -> Self {
        Self {
            prefix: "#toggle=".to_string(),
            empty_sentinel: "#toggles".to_string(),
            high_contrast: "high_contrast".to_string(),
            summary: Some("summary".to_string()),
        }
    }

    pub fn legacy() -> Self {
        Self {
            prefix: "#toggle=".to_string(),
            empty_sentinel: "#".to_string(),
            high_contrast: "HC".to_string(),
            summary: None,
        }
    }

    pub fn is_high_contrast(&self, id: &str) -> bool {
        self.high_contrast == id
    }

    pub fn is_summary(&self, id: &str) -> bool {
        self.summary.as_deref() == Some(id)
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.is_high_contrast(id) || self.is_summary(id)
    }

    /// Decodes a fragment. Anything without the prefix is the empty set.
    pub fn parse(&self, fragment: &str) -> ToggleSet {
        let Some(list) = fragment.strip_prefix(self.prefix.as_str()) else {
            return ToggleSet::new();
        };
        ToggleSet::from_ids(list.split(',').filter(|id| !id.is_empty()))
    }

    pub fn serialize(&self, set: &ToggleSet) -> String {
        if set.is_empty() {
            return self.empty_sentinel.clone();
        }
        format!("{}{}", self.prefix, set.as_slice().join(","))
    }
}

/// Ids whose toggle effect must be applied to move from `previous` to
/// `next`: additions in `next` order, then removals in `previous` order.
pub fn detect_changes(previous: &ToggleSet, next: &ToggleSet) -> Vec<String> {
    let added = next.iter().filter(|id| !previous.contains(id));
    let removed = previous.iter().filter(|id| !next.contains(id));
    added.chain(removed).map(str::to_string).collect()
}

/// Held toggle set plus the changes staged but not applied yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToggleState {
    current: ToggleSet,
    pending: Vec<String>,
}

impl ToggleState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &ToggleSet {
        &self.current
    }

    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Stages a direct toggle of `id` and returns the fragment to write.
    pub fn stage_toggle(&mut self, id: &str, format: &FragmentFormat) -> String {
        self.pending.push(id.to_string());
        self.current.flip(id);
        format.serialize(&self.current)
    }

    /// Adopts a freshly parsed set and hands back the changes to dispatch.
    ///
    /// Change detection only runs when nothing was staged. The pending list
    /// is empty when this returns.
    pub fn synchronize(&mut self, parsed: ToggleSet) -> Vec<String> {
        if self.pending.is_empty() {
            self.pending = detect_changes(&self.current, &parsed);
        }
        self.current = parsed;
        std::mem::take(&mut self.pending)
    }
}

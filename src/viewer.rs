use super::*;
use std::fmt;

const TRACE_TARGET: &str = "behave_report_viewer";

/// A loaded report together with the state its page script would keep.
pub struct Viewer {
    pub(crate) dom: Dom,
    pub(crate) config: ViewerConfig,
    pub(crate) format: FragmentFormat,
    pub(crate) toggles: ToggleState,
    pub(crate) sections: SectionIndex,
    pub(crate) location_history: LocationHistoryState,
    pub(crate) local_storage: StorageState,
    pub(crate) scheduler: SchedulerState,
    pub(crate) platform_mocks: PlatformMockState,
    pub(crate) trace_state: TraceState,
    pub(crate) downloads: Vec<DownloadArtifact>,
    pub(crate) decompressor: Option<Box<dyn Decompressor>>,
    pub(crate) status_filter: StatusFilter,
    loaded: bool,
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("url", &self.url())
            .field("format", &self.format)
            .field("toggles", &self.toggles)
            .field("sections", &self.sections.len())
            .field("pending_renders", &self.scheduler.render_queue.len())
            .field("decompressor", &self.decompressor.is_some())
            .field("status_filter", &self.status_filter)
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl Viewer {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with_url("about:blank", html)
    }

    pub fn from_html_with_url(url: &str, html: &str) -> Result<Self> {
        Self::from_html_with_config(url, html, ViewerConfig::default())
    }

    pub fn from_html_with_config(url: &str, html: &str, config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        let dom = parse_html(html)?;
        let format = config.format();
        let sections = SectionIndex::build(&dom, &format);
        log::debug!(
            target: TRACE_TARGET,
            "indexed {} toggleable sections",
            sections.len()
        );
        Ok(Self {
            dom,
            config,
            format,
            toggles: ToggleState::new(),
            sections,
            location_history: LocationHistoryState::new(url),
            local_storage: StorageState::default(),
            scheduler: SchedulerState::default(),
            platform_mocks: PlatformMockState::default(),
            trace_state: TraceState::default(),
            downloads: Vec::new(),
            decompressor: None,
            status_filter: StatusFilter::All,
            loaded: false,
        })
    }

    /// Seeds local storage before [`Viewer::load`] reads the theme from it.
    pub fn with_local_storage(mut self, items: &[(&str, &str)]) -> Self {
        for (key, value) in items {
            self.local_storage.set(key, value);
        }
        self
    }

    pub fn with_decompressor(mut self, decompressor: impl Decompressor + 'static) -> Self {
        self.decompressor = Some(Box::new(decompressor));
        self
    }

    pub fn set_prefers_dark_color_scheme(&mut self, prefers_dark: bool) {
        self.platform_mocks.prefers_dark_color_scheme = prefers_dark;
    }

    pub fn set_forced_high_contrast(&mut self, forced: bool) {
        self.platform_mocks.forced_high_contrast = forced;
    }

    /// Runs the page's load handling: stored theme, embed rendering, the
    /// initial fragment and contrast detection. Calling it again does
    /// nothing.
    ///
    /// Returns the number of toggle effects applied from the initial fragment.
    pub fn load(&mut self) -> Result<usize> {
        if self.loaded {
            return Ok(0);
        }
        self.loaded = true;

        let theme = self.stored_theme();
        self.apply_theme(theme)?;
        self.schedule_embed_renders()?;
        let applied = self.sync_from_location()?;
        self.detect_contrast()?;
        Ok(applied)
    }

    /// Flips `id` in the toggle set, rewrites the fragment in place and
    /// applies the change.
    pub fn toggle(&mut self, id: &str) -> Result<()> {
        if is_summary_outside_fragment(&self.format, id) {
            self.trace_toggle_line(format!("[toggle] {id} outside fragment"));
            return self.toggle_summary();
        }

        let fragment = self.toggles.stage_toggle(id, &self.format);
        self.trace_toggle_line(format!("[toggle] {id} -> {fragment}"));
        self.replace_fragment(&fragment);
        self.sync_from_location().map(|_| ())
    }

    /// Reconciles the held toggle set with the current fragment and applies
    /// every pending change. Returns how many effects were dispatched.
    pub fn sync_from_location(&mut self) -> Result<usize> {
        let fragment = self.location_hash().to_string();
        let parsed = self.format.parse(&fragment);
        let pending = self.toggles.synchronize(parsed);
        self.trace_toggle_line(format!(
            "[hash] sync {fragment:?} pending=[{}]",
            pending.join(",")
        ));
        for id in &pending {
            self.dispatch_toggle_effect(id)?;
        }
        Ok(pending.len())
    }

    /// Navigates to `fragment` with a new history entry, like assigning
    /// `location.hash`. Returns the number of dispatched effects.
    pub fn set_hash(&mut self, fragment: &str) -> Result<usize> {
        let from = self.url().to_string();
        let to = with_fragment(&from, fragment);
        if to == from {
            return Ok(0);
        }
        self.location_history.push(&to);
        self.trace_toggle_line(format!("[hash] push {to}"));
        self.location_history.navigations.push(LocationNavigation {
            kind: LocationNavigationKind::Push,
            from,
            to,
        });
        self.sync_from_location()
    }

    pub fn history_back(&mut self) -> Result<usize> {
        self.traverse_history(-1)
    }

    pub fn history_forward(&mut self) -> Result<usize> {
        self.traverse_history(1)
    }

    fn traverse_history(&mut self, delta: isize) -> Result<usize> {
        let from = self.url().to_string();
        let Some(to) = self.location_history.traverse(delta).map(str::to_string) else {
            return Ok(0);
        };
        self.trace_toggle_line(format!("[hash] traverse {delta} {to}"));
        let changed = split_url_fragment(&from).1 != split_url_fragment(&to).1;
        self.location_history.navigations.push(LocationNavigation {
            kind: LocationNavigationKind::Traverse,
            from,
            to,
        });
        if changed {
            self.sync_from_location()
        } else {
            Ok(0)
        }
    }

    fn replace_fragment(&mut self, fragment: &str) {
        let from = self.url().to_string();
        let to = with_fragment(&from, fragment);
        self.location_history.replace_current(&to);
        self.trace_toggle_line(format!("[hash] replace {to}"));
        self.location_history.navigations.push(LocationNavigation {
            kind: LocationNavigationKind::Replace,
            from,
            to,
        });
    }

    /// Clicks the element matching `selector`, running the inline handler of
    /// the nearest element (itself or an ancestor) that has one.
    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let Some(owner) = self.dom.closest_with_attr(target, "onclick") else {
            self.trace_effect_line(format!("[effect] click {selector} has no handler"));
            return Ok(());
        };
        let handler = self.dom.attr(owner, "onclick").unwrap_or_default();
        let action = ControlAction::parse(&handler)?;
        self.perform(action, owner)
    }

    fn perform(&mut self, action: ControlAction, owner: NodeId) -> Result<()> {
        match action {
            ControlAction::ToggleHash(id) => self.toggle(&id),
            ControlAction::Expander(action) => self.run_expander(action, owner),
            ControlAction::ExpandThisOnly => self.expand_this_only_node(owner),
            ControlAction::DownloadEmbed { id, filename } => {
                self.download_embed_by_id(&id, &filename)
            }
            ControlAction::ToggleDarkMode => self.cycle_theme().map(|_| ()),
            ControlAction::FilterStatus(filter) => self.apply_status_filter(filter),
        }
    }

    /// Runs a scenario expander as if `button` was clicked.
    pub fn expander(&mut self, action: ExpanderAction, button: &str) -> Result<()> {
        let button = self.select_one(button)?;
        self.run_expander(action, button)
    }

    /// Expands or collapses the scenario whose name element is `name`.
    pub fn expand_this_only(&mut self, name: &str) -> Result<()> {
        let name = self.select_one(name)?;
        self.expand_this_only_node(name)
    }

    pub fn download_embed(&mut self, id: &str, filename: &str) -> Result<()> {
        self.download_embed_by_id(id, filename)
    }

    /// Advances the theme preference and returns the new one.
    pub fn toggle_dark_mode(&mut self) -> Result<ThemePreference> {
        self.cycle_theme()
    }

    pub fn filter_status(&mut self, filter: StatusFilter) -> Result<()> {
        self.apply_status_filter(filter)
    }

    /// Completes every queued embed render in order. Returns how many ran.
    pub fn run_pending_tasks(&mut self) -> Result<usize> {
        let mut completed = 0usize;
        while let Some(task) = self.scheduler.render_queue.pop_front() {
            self.complete_render(task)?;
            completed += 1;
        }
        Ok(completed)
    }

    pub fn pending_renders(&self) -> impl Iterator<Item = &PendingRender> {
        self.scheduler.render_queue.iter()
    }

    pub fn url(&self) -> &str {
        self.location_history.current()
    }

    /// Fragment of the current URL including its `#`, empty when absent.
    pub fn location_hash(&self) -> &str {
        split_url_fragment(self.url()).1
    }

    pub fn toggle_set(&self) -> &ToggleSet {
        self.toggles.current()
    }

    pub fn fragment_format(&self) -> &FragmentFormat {
        &self.format
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn theme_preference(&self) -> ThemePreference {
        self.stored_theme()
    }

    pub fn local_storage_item(&self, key: &str) -> Option<&str> {
        self.local_storage.get(key)
    }

    pub fn status_filter(&self) -> &StatusFilter {
        &self.status_filter
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn take_downloads(&mut self) -> Vec<DownloadArtifact> {
        std::mem::take(&mut self.downloads)
    }

    pub fn take_location_navigations(&mut self) -> Vec<LocationNavigation> {
        std::mem::take(&mut self.location_history.navigations)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace_state.enabled = enabled;
    }

    pub fn set_trace_toggles(&mut self, enabled: bool) {
        self.trace_state.toggles = enabled;
    }

    pub fn set_trace_effects(&mut self, enabled: bool) {
        self.trace_state.effects = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Config(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_state.log_limit = max_entries;
        while self.trace_state.logs.len() > self.trace_state.log_limit {
            self.trace_state.logs.pop_front();
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace_state.logs.drain(..).collect()
    }

    pub(crate) fn trace_toggle_line(&mut self, line: String) {
        if self.trace_state.toggles {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_effect_line(&mut self, line: String) {
        if self.trace_state.effects {
            self.trace_line(line);
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        log::debug!(target: TRACE_TARGET, "{line}");
        if self.trace_state.enabled {
            if self.trace_state.logs.len() >= self.trace_state.log_limit {
                self.trace_state.logs.pop_front();
            }
            self.trace_state.logs.push_back(line);
        }
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class_state(selector, class_name, true)
    }

    pub fn assert_no_class(&self, selector: &str, class_name: &str) -> Result<()> {
        self.assert_class_state(selector, class_name, false)
    }

    fn assert_class_state(&self, selector: &str, class_name: &str, present: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.class_contains(target, class_name) != present {
            let expected = if present {
                format!("class {class_name}")
            } else {
                format!("no class {class_name}")
            };
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected,
                actual: self.dom.class_list(target).join(" "),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_attr(&self, selector: &str, name: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.attr(target, name).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{name}={expected}"),
                actual: format!("{name}={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    /// Compares one inline style property; an unset property reads as "".
    pub fn assert_style(&self, selector: &str, property: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.style_get(target, property);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{property}: {expected}"),
                actual: format!("{property}: {actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }
}

use super::*;

pub(crate) const COLLAPSE_CLASS: &str = "collapse";
pub(crate) const CONTRAST_CLASS: &str = "contrast";
pub(crate) const TOGGLE_BUTTON_CLASS: &str = "embed_button";
pub(crate) const SUMMARY_CONTAINER_CLASS: &str = "feature-summary-container";
pub(crate) const STEP_STATUS_CLASS: &str = "step-status";
pub(crate) const SCENARIO_HEADER_CLASS: &str = "scenario-header";
pub(crate) const SCENARIO_CAPSULE_CLASS: &str = "scenario-capsule";

const CONTROL_ID_PREFIX: &str = "embed_button_";
/// Summary keyword of formats that keep the panel out of the fragment.
const LEGACY_SUMMARY_ID: &str = "summary";

/// Control and content elements of every toggleable section, resolved once
/// when the document is parsed.
#[derive(Debug, Clone, Default)]
pub(crate) struct SectionIndex {
    controls: HashMap<String, NodeId>,
    contents: HashMap<String, NodeId>,
}

impl SectionIndex {
    pub(crate) fn build(dom: &Dom, format: &FragmentFormat) -> Self {
        let mut controls = HashMap::new();
        let elements = dom.all_element_nodes();

        for node in &elements {
            let Some(section) = dom
                .attr(*node, "id")
                .and_then(|id| id.strip_prefix(CONTROL_ID_PREFIX).map(str::to_string))
            else {
                continue;
            };
            if is_non_section_keyword(format, &section) {
                continue;
            }
            // The id may sit on decorative markup inside the actual button.
            let control = dom
                .closest_with_class(*node, TOGGLE_BUTTON_CLASS)
                .unwrap_or(*node);
            controls.entry(section).or_insert(control);
        }

        for node in &elements {
            let Some(handler) = dom.attr(*node, "onclick") else {
                continue;
            };
            if let Ok(ControlAction::ToggleHash(section)) = ControlAction::parse(&handler) {
                if !is_non_section_keyword(format, &section) {
                    controls.entry(section).or_insert(*node);
                }
            }
        }

        let mut contents = HashMap::new();
        for (section, control) in &controls {
            let candidates = [
                format!("embed_{section}"),
                format!("embed_container_{section}"),
                section.clone(),
            ];
            if let Some(content) = candidates
                .iter()
                .filter_map(|id| dom.by_id(id))
                .find(|content| content != control)
            {
                contents.insert(section.clone(), content);
            }
        }

        Self { controls, contents }
    }

    pub(crate) fn control(&self, section: &str) -> Option<NodeId> {
        self.controls.get(section).copied()
    }

    pub(crate) fn content(&self, section: &str) -> Option<NodeId> {
        self.contents.get(section).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.controls.len()
    }
}

pub(crate) fn is_summary_outside_fragment(format: &FragmentFormat, id: &str) -> bool {
    format.summary.is_none() && id == LEGACY_SUMMARY_ID
}

fn is_non_section_keyword(format: &FragmentFormat, id: &str) -> bool {
    format.is_reserved(id) || is_summary_outside_fragment(format, id)
}

impl Viewer {
    /// Applies the toggle effect of one changed id.
    pub(crate) fn dispatch_toggle_effect(&mut self, id: &str) -> Result<()> {
        if self.format.is_high_contrast(id) {
            self.trace_effect_line(format!("[effect] high contrast via {id}"));
            self.toggle_contrast()
        } else if self.format.is_summary(id) {
            self.trace_effect_line(format!("[effect] summary via {id}"));
            self.toggle_summary()
        } else {
            self.toggle_section(id).map(|_| ())
        }
    }

    /// Returns whether the section exists in this document.
    pub(crate) fn toggle_section(&mut self, id: &str) -> Result<bool> {
        let Some(control) = self.sections.control(id) else {
            log::debug!(target: "behave_report_viewer", "no control for section {id}");
            self.trace_effect_line(format!("[effect] skip section={id} reason=missing-control"));
            return Ok(false);
        };
        self.dom.class_toggle(control, COLLAPSE_CLASS)?;
        let content = self.sections.content(id);
        if let Some(content) = content {
            self.dom.class_toggle(content, COLLAPSE_CLASS)?;
        }
        let label = content
            .map(|node| self.dom.node_label(node))
            .unwrap_or_else(|| "none".to_string());
        let collapsed = self.dom.class_contains(control, COLLAPSE_CLASS);
        self.trace_effect_line(format!(
            "[effect] section={id} control={} content={label} collapsed={collapsed}",
            self.dom.node_label(control)
        ));
        Ok(true)
    }

    pub(crate) fn toggle_contrast(&mut self) -> Result<()> {
        for node in self.dom.elements_by_class(STEP_STATUS_CLASS) {
            let next = if self.dom.style_get(node, "display") == "block" {
                "none"
            } else {
                "block"
            };
            self.dom.style_set(node, "display", next)?;
        }

        let classes = self.config.contrast_classes.clone();
        for class_name in &classes {
            for node in self.dom.elements_by_class(class_name) {
                self.dom.class_toggle(node, CONTRAST_CLASS)?;
            }
        }
        Ok(())
    }

    pub(crate) fn toggle_summary(&mut self) -> Result<()> {
        for node in self.dom.elements_by_class(SUMMARY_CONTAINER_CLASS) {
            self.dom.class_toggle(node, COLLAPSE_CLASS)?;
        }
        Ok(())
    }

    pub(crate) fn run_expander(&mut self, action: ExpanderAction, button: NodeId) -> Result<()> {
        let Some(feature_id) = self
            .dom
            .parent_element(button)
            .and_then(|parent| self.dom.parent_element(parent))
            .and_then(|grandparent| self.dom.attr(grandparent, "id"))
        else {
            self.trace_effect_line("[effect] expander skipped: no feature id".to_string());
            return Ok(());
        };

        let mut targets = self.dom.elements_by_class(SCENARIO_CAPSULE_CLASS);
        targets.extend(self.dom.elements_by_class(SCENARIO_HEADER_CLASS));

        let mut touched = 0usize;
        for node in targets {
            let parent_id = self
                .dom
                .parent_element(node)
                .and_then(|parent| self.dom.attr(parent, "id"));
            if parent_id.as_deref() != Some(feature_id.as_str()) {
                continue;
            }
            touched += 1;
            match action {
                ExpanderAction::ExpandAll => self.dom.class_remove(node, COLLAPSE_CLASS)?,
                ExpanderAction::CollapseAll => self.dom.class_add(node, COLLAPSE_CLASS)?,
                ExpanderAction::ExpandAllFailed => {
                    if self.dom.class_contains(node, "passed") {
                        self.dom.class_add(node, COLLAPSE_CLASS)?;
                    } else {
                        self.dom.class_remove(node, COLLAPSE_CLASS)?;
                    }
                }
            }
        }
        self.trace_effect_line(format!(
            "[effect] expander {action:?} feature={feature_id} elements={touched}"
        ));
        Ok(())
    }

    pub(crate) fn expand_this_only_node(&mut self, name: NodeId) -> Result<()> {
        let Some(id) = self.dom.attr(name, "id") else {
            return Ok(());
        };
        let Some(header) = self.dom.by_id(&format!("{id}-h")) else {
            self.trace_effect_line(format!("[effect] skip scenario={id} reason=missing-header"));
            return Ok(());
        };
        let capsule = self.dom.by_id(&format!("{id}-c"));

        let expand = self.dom.class_contains(header, COLLAPSE_CLASS);
        for node in std::iter::once(header).chain(capsule) {
            if expand {
                self.dom.class_remove(node, COLLAPSE_CLASS)?;
            } else {
                self.dom.class_add(node, COLLAPSE_CLASS)?;
            }
        }
        self.trace_effect_line(format!("[effect] scenario={id} expanded={expand}"));
        Ok(())
    }

    pub(crate) fn apply_status_filter(&mut self, filter: StatusFilter) -> Result<()> {
        let mut targets = self.dom.elements_by_class(SCENARIO_HEADER_CLASS);
        targets.extend(self.dom.elements_by_class(SCENARIO_CAPSULE_CLASS));

        let mut hidden = 0usize;
        for node in targets {
            if filter.admits(&self.dom.class_list(node)) {
                self.dom.style_set(node, "display", "")?;
            } else {
                self.dom.style_set(node, "display", "none")?;
                hidden += 1;
            }
        }
        self.trace_effect_line(format!("[effect] filter {filter:?} hidden={hidden}"));
        self.status_filter = filter;
        Ok(())
    }
}

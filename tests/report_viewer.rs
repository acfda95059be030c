use behave_report_viewer::{
    Error, LocationNavigationKind, Result, ThemePreference, Viewer, ViewerConfig,
};

const REPORT: &str = r#"
<html>
<body>
  <span id="dark_mode_toggle" onclick="toggle_dark_mode()">Theme</span>
  <span id="summary_button" onclick="toggle_hash('summary')">Summary</span>
  <div class="feature-summary-container collapse" id="summary">
    <div class="feature-summary-row">1 feature passed</div>
  </div>
  <div class="feature-container" id="feature_1">
    <div class="scenario-capsule passed" id="scenario_1-c">
      <div class="embed_button collapse" id="embed_button_s1" onclick="toggle_hash('s1')">Output</div>
      <div class="embed_content collapse" id="embed_s1">captured stdout</div>
      <div class="embed_button collapse" id="embed_button_s2" onclick="toggle_hash('s2')">Stderr</div>
      <div class="embed_content collapse" id="embed_s2">captured stderr</div>
    </div>
  </div>
</body>
</html>
"#;

fn viewer_at(fragment: &str) -> Result<Viewer> {
    let mut viewer =
        Viewer::from_html_with_url(&format!("file:///reports/run.html{fragment}"), REPORT)?;
    viewer.load()?;
    Ok(viewer)
}

#[test]
fn shared_link_restores_expanded_sections() -> Result<()> {
    let viewer = viewer_at("#toggle=summary,s1")?;

    assert_eq!(viewer.toggle_set().as_slice(), ["summary", "s1"]);
    viewer.assert_no_class("#summary", "collapse")?;
    viewer.assert_no_class("#embed_button_s1", "collapse")?;
    viewer.assert_no_class("#embed_s1", "collapse")?;
    viewer.assert_class("#embed_s2", "collapse")?;
    Ok(())
}

#[test]
fn summary_panel_with_matching_id_is_not_treated_as_a_section() -> Result<()> {
    let mut viewer = viewer_at("")?;
    assert_eq!(viewer.section_count(), 2);

    viewer.click("#summary_button")?;
    viewer.assert_no_class("#summary", "collapse")?;
    assert_eq!(viewer.location_hash(), "#toggle=summary");
    Ok(())
}

#[test]
fn toggling_twice_restores_fragment_and_document() -> Result<()> {
    let mut viewer = viewer_at("#toggle=s2")?;
    let before = viewer.dump_dom("#feature_1")?;

    viewer.toggle("s1")?;
    assert_eq!(viewer.location_hash(), "#toggle=s2,s1");
    viewer.toggle("s1")?;

    assert_eq!(viewer.location_hash(), "#toggle=s2");
    assert_eq!(viewer.toggle_set().as_slice(), ["s2"]);
    assert_eq!(viewer.dump_dom("#feature_1")?, before);
    Ok(())
}

#[test]
fn toggles_never_create_history_entries() -> Result<()> {
    let mut viewer = viewer_at("")?;
    viewer.click("#embed_button_s1")?;
    viewer.click("#embed_button_s2")?;
    viewer.click("#embed_button_s1")?;

    assert_eq!(viewer.location_hash(), "#toggle=s2");
    assert!(
        viewer
            .take_location_navigations()
            .iter()
            .all(|navigation| navigation.kind == LocationNavigationKind::Replace)
    );
    assert_eq!(viewer.history_back()?, 0);
    Ok(())
}

#[test]
fn editing_the_fragment_applies_only_the_difference() -> Result<()> {
    let mut viewer = viewer_at("#toggle=s1")?;
    viewer.enable_trace(true);

    assert_eq!(viewer.set_hash("#toggle=s2")?, 2);
    viewer.assert_class("#embed_s1", "collapse")?;
    viewer.assert_no_class("#embed_s2", "collapse")?;

    let sync_lines = viewer
        .take_trace_logs()
        .into_iter()
        .filter(|line| line.starts_with("[hash] sync"))
        .collect::<Vec<_>>();
    assert_eq!(sync_lines, ["[hash] sync \"#toggle=s2\" pending=[s2,s1]"]);
    Ok(())
}

#[test]
fn unknown_ids_in_a_link_are_harmless() -> Result<()> {
    let mut viewer = viewer_at("#toggle=s9,s1")?;
    viewer.assert_no_class("#embed_s1", "collapse")?;
    viewer.toggle("s9")?;
    assert_eq!(viewer.location_hash(), "#toggle=s1");
    Ok(())
}

#[test]
fn viewer_can_be_configured_from_toml() -> Result<()> {
    let config = ViewerConfig::from_toml_str(r#"theme_storage_key = "my-theme""#)?;
    let mut viewer = Viewer::from_html_with_config("file:///reports/run.html", REPORT, config)?
        .with_local_storage(&[("my-theme", "light")]);
    viewer.set_prefers_dark_color_scheme(true);
    viewer.load()?;

    assert_eq!(viewer.theme_preference(), ThemePreference::Light);
    viewer.assert_class("html", "light")?;
    viewer.click("#dark_mode_toggle")?;
    assert_eq!(viewer.local_storage_item("my-theme"), Some("auto"));
    viewer.assert_class("html", "dark")?;
    Ok(())
}

#[test]
fn assertion_errors_describe_the_mismatch() -> Result<()> {
    let viewer = viewer_at("")?;
    match viewer.assert_no_class("#embed_s1", "collapse") {
        Err(Error::AssertionFailed {
            selector, actual, ..
        }) => {
            assert_eq!(selector, "#embed_s1");
            assert_eq!(actual, "embed_content collapse");
        }
        other => panic!("expected assertion failure, got: {other:?}"),
    }
    Ok(())
}

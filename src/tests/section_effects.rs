use super::*;

#[test]
fn load_without_fragment_leaves_everything_collapsed() -> Result<()> {
    let mut viewer = Viewer::from_html_with_url(REPORT_URL, REPORT_HTML)?;
    assert_eq!(viewer.load()?, 0);
    assert_eq!(viewer.section_count(), 3);
    assert!(viewer.toggle_set().is_empty());
    viewer.assert_class("#embed_e1", "collapse")?;
    viewer.assert_class("#summary_panel", "collapse")?;
    assert_eq!(viewer.location_hash(), "");
    Ok(())
}

#[test]
fn initial_fragment_expands_summary_and_section() -> Result<()> {
    let mut viewer =
        Viewer::from_html_with_url(&format!("{REPORT_URL}#toggle=summary,e1"), REPORT_HTML)?;
    assert_eq!(viewer.load()?, 2);

    viewer.assert_no_class("#summary_panel", "collapse")?;
    viewer.assert_no_class("#embed_button_e1", "collapse")?;
    viewer.assert_no_class("#embed_e1", "collapse")?;
    viewer.assert_class("#embed_e2", "collapse")?;
    assert_eq!(viewer.toggle_set().as_slice(), ["summary", "e1"]);
    Ok(())
}

#[test]
fn second_load_and_repeated_sync_do_nothing() -> Result<()> {
    let mut viewer = report_viewer("#toggle=e1")?;
    assert_eq!(viewer.load()?, 0);
    assert_eq!(viewer.sync_from_location()?, 0);
    assert_eq!(viewer.sync_from_location()?, 0);
    viewer.assert_no_class("#embed_e1", "collapse")?;
    Ok(())
}

#[test]
fn clicking_a_section_button_rewrites_fragment_in_place() -> Result<()> {
    let mut viewer = report_viewer("")?;

    viewer.click("#embed_button_e1")?;
    assert_eq!(viewer.location_hash(), "#toggle=e1");
    viewer.assert_no_class("#embed_button_e1", "collapse")?;
    viewer.assert_no_class("#embed_e1", "collapse")?;

    let navigations = viewer.take_location_navigations();
    assert_eq!(
        navigations,
        vec![LocationNavigation {
            kind: LocationNavigationKind::Replace,
            from: REPORT_URL.to_string(),
            to: format!("{REPORT_URL}#toggle=e1"),
        }]
    );

    viewer.click("#embed_button_e1")?;
    assert_eq!(viewer.location_hash(), "#toggles");
    viewer.assert_class("#embed_button_e1", "collapse")?;
    viewer.assert_class("#embed_e1", "collapse")?;
    assert!(viewer.toggle_set().is_empty());
    Ok(())
}

#[test]
fn decorative_id_resolves_to_enclosing_button() -> Result<()> {
    let mut viewer = report_viewer("")?;
    viewer.click("#embed_button_e2")?;

    assert_eq!(viewer.location_hash(), "#toggle=e2");
    viewer.assert_no_class("#e2_control", "collapse")?;
    viewer.assert_no_class("#embed_e2", "collapse")?;
    viewer.assert_no_class("#embed_button_e2", "collapse")?;
    Ok(())
}

#[test]
fn table_heading_toggles_through_its_handler() -> Result<()> {
    let mut viewer = report_viewer("")?;
    viewer.click("#t1_header")?;

    assert_eq!(viewer.location_hash(), "#toggle=table_t1");
    viewer.assert_no_class("#t1_header", "collapse")?;
    viewer.assert_no_class("#table_t1", "collapse")?;
    Ok(())
}

#[test]
fn toggles_before_load_reach_the_document() -> Result<()> {
    let mut viewer = Viewer::from_html_with_url(REPORT_URL, REPORT_HTML)?;
    viewer.toggle("e1")?;
    viewer.click("#t1_header")?;
    viewer.assert_no_class("#embed_e1", "collapse")?;
    viewer.assert_no_class("#table_t1", "collapse")?;

    assert_eq!(viewer.load()?, 0);
    assert_eq!(viewer.location_hash(), "#toggle=e1,table_t1");
    viewer.assert_no_class("#embed_button_e1", "collapse")?;
    viewer.assert_no_class("#embed_e1", "collapse")?;
    viewer.assert_no_class("#table_t1", "collapse")?;
    Ok(())
}

#[test]
fn hash_set_before_load_is_applied_once() -> Result<()> {
    let mut viewer = Viewer::from_html_with_url(REPORT_URL, REPORT_HTML)?;
    assert_eq!(viewer.set_hash("#toggle=e2")?, 1);
    viewer.assert_no_class("#embed_e2", "collapse")?;

    assert_eq!(viewer.load()?, 0);
    viewer.assert_no_class("#e2_control", "collapse")?;
    viewer.assert_no_class("#embed_e2", "collapse")?;
    Ok(())
}

#[test]
fn unknown_section_is_skipped_without_error() -> Result<()> {
    let mut viewer =
        Viewer::from_html_with_url(&format!("{REPORT_URL}#toggle=ghost"), REPORT_HTML)?;
    viewer.enable_trace(true);
    assert_eq!(viewer.load()?, 1);

    assert_eq!(viewer.toggle_set().as_slice(), ["ghost"]);
    viewer.assert_class("#embed_e1", "collapse")?;
    let logs = viewer.take_trace_logs();
    assert!(
        logs.iter()
            .any(|line| line == "[effect] skip section=ghost reason=missing-control"),
        "trace: {logs:?}"
    );
    Ok(())
}

#[test]
fn hash_navigation_and_history_traversal_resync() -> Result<()> {
    let mut viewer = report_viewer("")?;

    assert_eq!(viewer.set_hash("#toggle=e1")?, 1);
    viewer.assert_no_class("#embed_e1", "collapse")?;
    assert_eq!(viewer.set_hash("toggle=e1,table_t1")?, 1);
    viewer.assert_no_class("#table_t1", "collapse")?;
    assert_eq!(viewer.set_hash("#toggle=e1,table_t1")?, 0);

    assert_eq!(viewer.history_back()?, 1);
    viewer.assert_class("#table_t1", "collapse")?;
    viewer.assert_no_class("#embed_e1", "collapse")?;

    assert_eq!(viewer.history_back()?, 1);
    viewer.assert_class("#embed_e1", "collapse")?;
    assert_eq!(viewer.history_back()?, 0);

    assert_eq!(viewer.history_forward()?, 1);
    viewer.assert_no_class("#embed_e1", "collapse")?;

    let kinds = viewer
        .take_location_navigations()
        .into_iter()
        .map(|navigation| navigation.kind)
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            LocationNavigationKind::Push,
            LocationNavigationKind::Push,
            LocationNavigationKind::Traverse,
            LocationNavigationKind::Traverse,
            LocationNavigationKind::Traverse,
        ]
    );
    Ok(())
}

#[test]
fn summary_control_goes_through_the_fragment() -> Result<()> {
    let mut viewer = report_viewer("")?;
    viewer.click("#summary_toggle")?;
    assert_eq!(viewer.location_hash(), "#toggle=summary");
    viewer.assert_no_class("#summary_panel", "collapse")?;

    viewer.click("#summary_toggle")?;
    viewer.assert_class("#summary_panel", "collapse")?;
    Ok(())
}

#[test]
fn expanders_only_touch_scenarios_of_their_feature() -> Result<()> {
    let mut viewer = report_viewer("")?;

    viewer.click("#f1_expand_all")?;
    for id in ["#sc1-h", "#sc1-c", "#sc2-h", "#sc2-c"] {
        viewer.assert_no_class(id, "collapse")?;
    }

    viewer.click("#f1_collapse_all")?;
    for id in ["#sc1-h", "#sc1-c", "#sc2-h", "#sc2-c"] {
        viewer.assert_class(id, "collapse")?;
    }

    viewer.expander(ExpanderAction::ExpandAllFailed, "#f1_expand_failed")?;
    viewer.assert_class("#sc1-h", "collapse")?;
    viewer.assert_class("#sc1-c", "collapse")?;
    viewer.assert_no_class("#sc2-h", "collapse")?;
    viewer.assert_no_class("#sc2-c", "collapse")?;

    // Expanders do not touch the fragment.
    assert_eq!(viewer.location_hash(), "");
    Ok(())
}

#[test]
fn expand_this_only_flips_header_and_capsule_together() -> Result<()> {
    let mut viewer = report_viewer("")?;

    viewer.click("#sc2")?;
    viewer.assert_no_class("#sc2-h", "collapse")?;
    viewer.assert_no_class("#sc2-c", "collapse")?;
    viewer.assert_class("#sc1-h", "collapse")?;

    viewer.expand_this_only("#sc2")?;
    viewer.assert_class("#sc2-h", "collapse")?;
    viewer.assert_class("#sc2-c", "collapse")?;
    Ok(())
}

#[test]
fn status_filter_hides_other_scenarios() -> Result<()> {
    let mut viewer = report_viewer("")?;

    viewer.click("#filter_failed")?;
    assert_eq!(
        viewer.status_filter(),
        &StatusFilter::Only(vec![ScenarioStatus::Failed])
    );
    viewer.assert_style("#sc1-h", "display", "none")?;
    viewer.assert_style("#sc1-c", "display", "none")?;
    viewer.assert_style("#sc2-h", "display", "")?;
    viewer.assert_style("#sc2-c", "display", "")?;

    viewer.click("#filter_all")?;
    assert_eq!(viewer.status_filter(), &StatusFilter::All);
    viewer.assert_style("#sc1-h", "display", "")?;
    Ok(())
}

#[test]
fn legacy_format_uses_its_own_keywords() -> Result<()> {
    let config = ViewerConfig {
        fragment_format: FragmentFormatKind::Legacy,
        ..ViewerConfig::default()
    };
    let html = REPORT_HTML.replace("toggle_hash('high_contrast')", "toggle_hash('HC')");
    let mut viewer = Viewer::from_html_with_config(REPORT_URL, &html, config)?;
    viewer.load()?;

    viewer.click("#contrast_toggle")?;
    assert_eq!(viewer.location_hash(), "#toggle=HC");
    viewer.assert_style("#st1", "display", "block")?;

    viewer.click("#contrast_toggle")?;
    assert_eq!(viewer.location_hash(), "#");
    viewer.assert_style("#st1", "display", "none")?;

    // The summary panel is not part of the legacy fragment.
    viewer.toggle("summary")?;
    viewer.assert_no_class("#summary_panel", "collapse")?;
    assert_eq!(viewer.location_hash(), "#");
    Ok(())
}

#[test]
fn legacy_summary_link_leaves_summary_button_alone() -> Result<()> {
    let config = ViewerConfig {
        fragment_format: FragmentFormatKind::Legacy,
        ..ViewerConfig::default()
    };
    let html = REPORT_HTML.replace("toggle_hash('high_contrast')", "toggle_hash('HC')");
    let url = format!("{REPORT_URL}#toggle=summary");
    let mut viewer = Viewer::from_html_with_config(&url, &html, config)?;
    assert_eq!(viewer.section_count(), 3);
    viewer.load()?;

    viewer.assert_no_class("#summary_toggle", "collapse")?;
    viewer.assert_class("#summary_panel", "collapse")?;

    viewer.click("#summary_toggle")?;
    viewer.assert_no_class("#summary_toggle", "collapse")?;
    viewer.assert_no_class("#summary_panel", "collapse")?;
    Ok(())
}

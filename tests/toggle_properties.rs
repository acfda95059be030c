use behave_report_viewer::{FragmentFormat, ToggleSet, Viewer, detect_changes};
use proptest::collection::{hash_set, vec};
use proptest::prelude::*;
use proptest::test_runner::{FileFailurePersistence, TestCaseError, TestCaseResult};

const TOGGLE_PROPTEST_REGRESSION_FILE: &str =
    "tests/proptest-regressions/toggle_properties.txt";
const DEFAULT_TOGGLE_PROPTEST_CASES: u32 = 128;
const SECTION_COUNT: usize = 5;
const RUN_URL: &str = "file:///run.html#toggles";

fn toggle_proptest_cases() -> u32 {
    std::env::var("BEHAVE_REPORT_VIEWER_PROPTEST_CASES")
        .ok()
        .and_then(|raw| raw.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_TOGGLE_PROPTEST_CASES)
}

fn toggle_id_strategy() -> BoxedStrategy<String> {
    "[a-z0-9_]{1,8}".boxed()
}

fn toggle_set_strategy() -> BoxedStrategy<ToggleSet> {
    vec(toggle_id_strategy(), 0..=6)
        .prop_map(|ids| ToggleSet::from_ids(ids))
        .boxed()
}

fn format_strategy() -> BoxedStrategy<FragmentFormat> {
    prop_oneof![
        Just(FragmentFormat::current()),
        Just(FragmentFormat::legacy()),
    ]
    .boxed()
}

fn section_html() -> String {
    let mut html = String::from("<html><body>");
    for index in 0..SECTION_COUNT {
        html.push_str(&format!(
            "<div class=\"embed_button collapse\" id=\"embed_button_s{index}\" \
             onclick=\"toggle_hash('s{index}')\">s{index}</div>\
             <div class=\"embed_content collapse\" id=\"embed_s{index}\">body {index}</div>"
        ));
    }
    html.push_str("<div class=\"feature-summary-container collapse\" id=\"panel\"></div>");
    html.push_str("</body></html>");
    html
}

fn toggle_target_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        8 => (0..SECTION_COUNT).prop_map(|index| format!("s{index}")),
        1 => Just("summary".to_string()),
        1 => Just("ghost".to_string()),
    ]
    .boxed()
}

fn viewer_error(err: behave_report_viewer::Error) -> TestCaseError {
    TestCaseError::fail(format!("{err:?}"))
}

fn assert_document_matches_set(viewer: &Viewer) -> TestCaseResult {
    for index in 0..SECTION_COUNT {
        let id = format!("s{index}");
        let selector = format!("#embed_{id}");
        let outcome = if viewer.toggle_set().contains(&id) {
            viewer.assert_no_class(&selector, "collapse")
        } else {
            viewer.assert_class(&selector, "collapse")
        };
        prop_assert!(outcome.is_ok(), "section {id} out of sync: {outcome:?}");
    }
    let panel = if viewer.toggle_set().contains("summary") {
        viewer.assert_no_class("#panel", "collapse")
    } else {
        viewer.assert_class("#panel", "collapse")
    };
    prop_assert!(panel.is_ok(), "summary panel out of sync: {panel:?}");
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: toggle_proptest_cases(),
        failure_persistence: Some(Box::new(
            FileFailurePersistence::Direct(TOGGLE_PROPTEST_REGRESSION_FILE),
        )),
        .. ProptestConfig::default()
    })]

    #[test]
    fn serialized_sets_parse_back(set in toggle_set_strategy(), format in format_strategy()) {
        let fragment = format.serialize(&set);
        prop_assert_eq!(format.parse(&fragment), set);
    }

    #[test]
    fn detected_changes_are_the_symmetric_difference(
        previous in hash_set(toggle_id_strategy(), 0..6),
        next in hash_set(toggle_id_strategy(), 0..6),
    ) {
        let previous = ToggleSet::from_ids(previous);
        let next = ToggleSet::from_ids(next);
        let changes = detect_changes(&previous, &next);

        let added = next.iter().filter(|id| !previous.contains(id)).count();
        let removed = previous.iter().filter(|id| !next.contains(id)).count();
        prop_assert_eq!(changes.len(), added + removed);
        for id in &changes[..added] {
            prop_assert!(next.contains(id) && !previous.contains(id));
        }
        for id in &changes[added..] {
            prop_assert!(previous.contains(id) && !next.contains(id));
        }

        let mut replayed = previous.clone();
        for id in &changes {
            replayed.flip(id);
        }
        let mut expected = next.iter().collect::<Vec<_>>();
        let mut actual = replayed.iter().collect::<Vec<_>>();
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn document_follows_toggle_sequences(targets in vec(toggle_target_strategy(), 1..=16)) {
        let html = section_html();
        let mut viewer = Viewer::from_html_with_url(RUN_URL, &html)
            .map_err(viewer_error)?;
        viewer.load().map_err(viewer_error)?;

        for target in &targets {
            viewer.toggle(target).map_err(viewer_error)?;
            assert_document_matches_set(&viewer)?;
            prop_assert_eq!(viewer.sync_from_location().map_err(viewer_error)?, 0);
        }
    }

    #[test]
    fn toggling_twice_is_a_no_op(
        start in vec(toggle_target_strategy(), 0..=6),
        target in toggle_target_strategy(),
    ) {
        let html = section_html();
        let mut viewer = Viewer::from_html_with_url(RUN_URL, &html)
            .map_err(viewer_error)?;
        viewer.load().map_err(viewer_error)?;
        for id in &start {
            viewer.toggle(id).map_err(viewer_error)?;
        }

        let fragment = viewer.location_hash().to_string();
        let set = viewer.toggle_set().clone();
        let dom = viewer.dump_dom("body").map_err(viewer_error)?;

        viewer.toggle(&target).map_err(viewer_error)?;
        viewer.toggle(&target).map_err(viewer_error)?;

        prop_assert_eq!(viewer.location_hash(), fragment.as_str());
        prop_assert_eq!(viewer.toggle_set(), &set);
        prop_assert_eq!(viewer.dump_dom("body").map_err(viewer_error)?, dom);
    }
}

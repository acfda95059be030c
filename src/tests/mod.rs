use super::*;

mod section_effects;

const REPORT_URL: &str = "file:///tmp/report.html";

/// Trimmed down report with one feature, two scenarios and the usual
/// controls.
const REPORT_HTML: &str = r#"
<html>
<head><title>Test Suite Reporter</title></head>
<body>
  <div class="global-buttons">
    <span class="button" id="dark_mode_toggle" onclick="toggle_dark_mode()">Theme</span>
    <span class="button" id="summary_toggle" onclick="toggle_hash('summary')">Summary</span>
    <span class="button" id="contrast_toggle" onclick="toggle_hash('high_contrast')">Contrast</span>
    <span class="button" id="filter_failed" onclick="filter_status('failed')">Failed only</span>
    <span class="button" id="filter_all" onclick="filter_status('all')">All</span>
  </div>
  <div class="feature-summary-container collapse" id="summary_panel">
    <div class="feature-summary-row">2 scenarios</div>
  </div>
  <div class="feature-container" id="f1">
    <div class="feature-title">Checkout</div>
    <div class="feature-buttons">
      <span class="button" id="f1_expand_all" onclick="expander('expand_all', this)">Expand All</span>
      <span class="button" id="f1_collapse_all" onclick="expander('collapse_all', this)">Collapse All</span>
      <span class="button" id="f1_expand_failed" onclick="expander('expand_all_failed', this)">Expand Failed</span>
    </div>
    <div class="scenario-header passed collapse" id="sc1-h">
      <span class="scenario-name" id="sc1" onclick="expand_this_only(this)">Pay with card</span>
    </div>
    <div class="scenario-capsule passed collapse" id="sc1-c">
      <div class="step-capsule passed">
        <span class="step-status" id="st1" style="display: none">passed</span>
        <span class="step-text">Given a basket</span>
      </div>
      <span class="embed_button collapse" id="embed_button_e1" onclick="toggle_hash('e1')">Log</span>
      <pre class="embed_content collapse" id="embed_e1"><span>hello &amp; bye</span></pre>
      <div class="embed_button collapse" id="e2_control" onclick="toggle_hash('e2')">
        <span class="icon" id="embed_button_e2">Screenshot</span>
      </div>
      <div class="embed_content collapse" id="embed_e2"><img src="shot.png"></div>
    </div>
    <div class="scenario-header failed collapse" id="sc2-h">
      <span class="scenario-name" id="sc2" onclick="expand_this_only(this)">Pay with voucher</span>
    </div>
    <div class="scenario-capsule failed collapse" id="sc2-c">
      <div class="step-capsule failed">
        <span class="step-status" id="st2" style="display: none">failed</span>
        <span class="step-text">Then the total is 0</span>
      </div>
      <div class="table-header collapse" id="t1_header" onclick="toggle_hash('table_t1')">Data</div>
      <table class="table collapse" id="table_t1"><tr><td>voucher</td></tr></table>
    </div>
  </div>
</body>
</html>
"#;

fn report_viewer(fragment: &str) -> Result<Viewer> {
    let url = format!("{REPORT_URL}{fragment}");
    let mut viewer = Viewer::from_html_with_url(&url, REPORT_HTML)?;
    viewer.load()?;
    Ok(viewer)
}

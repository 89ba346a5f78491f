//! HTML composition of the dashboard view.
//!
//! The page is rendered server-side: charts arrive as inline SVG and the
//! table and KPI cards as plain markup. The only script handles the refresh
//! button and the install prompt.

use std::fmt::Write as _;

use super::DashboardView;
use crate::chart::svg::SvgSurface;
use crate::present::escape_html;
use crate::present::table::COLUMNS;

/// Page-level switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageOptions {
    /// Include the refresh/install script (served pages only).
    pub interactive: bool,
    /// Reveal the install control immediately (an offer is pending).
    pub install_visible: bool,
}

const STYLES: &str = r#"
:root { --bg: #f4f1ea; --surface: #fffdf8; --border: #d9d2c3; --text: #1d2a24; --muted: #5f6b64; --accent: #1f7a63; }
* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; font-size: 14px; line-height: 1.5; }
.app { max-width: 1100px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; gap: 12px; margin-bottom: 20px; }
header h1 { font-size: 22px; }
#generatedAt { color: var(--muted); font-size: 13px; }
button { border: 1px solid var(--border); background: var(--surface); border-radius: 6px; padding: 6px 12px; cursor: pointer; }
.kpis { display: grid; grid-template-columns: repeat(auto-fill, minmax(160px, 1fr)); gap: 12px; margin-bottom: 20px; }
.kpi { background: var(--surface); border: 1px solid var(--border); border-radius: 8px; padding: 12px; }
.kpi .label { color: var(--muted); font-size: 12px; }
.kpi .value { font-size: 20px; font-weight: 600; }
.charts { display: grid; grid-template-columns: repeat(auto-fit, minmax(320px, 1fr)); gap: 16px; margin-bottom: 20px; }
.chart { background: var(--surface); border: 1px solid var(--border); border-radius: 8px; padding: 12px; }
.chart h2 { font-size: 14px; margin-bottom: 8px; }
.chart svg { width: 100%; height: auto; aspect-ratio: 640 / 280; }
table { width: 100%; border-collapse: collapse; background: var(--surface); }
th, td { padding: 6px 8px; border-bottom: 1px solid var(--border); text-align: right; white-space: nowrap; }
th:first-child, td:first-child { text-align: left; }
.empty { background: var(--surface); border: 1px dashed var(--border); border-radius: 8px; padding: 32px; text-align: center; color: var(--muted); }
"#;

const SCRIPT: &str = r#"
(() => {
  let deferredPrompt = null;
  const installBtn = document.getElementById("installBtn");

  window.addEventListener("beforeinstallprompt", (event) => {
    event.preventDefault();
    deferredPrompt = event;
    fetch("/api/install/offer", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ platforms: event.platforms || [] }),
    }).finally(() => { installBtn.hidden = false; });
  });

  installBtn.addEventListener("click", async () => {
    let allowed = false;
    try {
      const resp = await fetch("/api/install/consume", { method: "POST" });
      allowed = (await resp.json()).prompt === true;
    } catch (err) {
      console.error(err);
    }
    if (allowed && deferredPrompt) {
      deferredPrompt.prompt();
      await deferredPrompt.userChoice;
    }
    deferredPrompt = null;
    installBtn.hidden = true;
  });

  document.getElementById("refreshBtn").addEventListener("click", () => {
    window.location.href = "./?refresh=" + Date.now();
  });
})();
"#;

fn hidden(visible: bool) -> &'static str {
    if visible { "" } else { " hidden" }
}

/// Render the complete HTML document.
pub fn render_page(view: &DashboardView<SvgSurface>, options: PageOptions) -> String {
    let mut html = String::with_capacity(16 * 1024);

    let _ = write!(
        html,
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Running Dashboard</title>
<link rel="manifest" href="./manifest.webmanifest">
<link rel="icon" href="./assets/icon.svg" type="image/svg+xml">
<style>{STYLES}</style>
</head>
<body>
<div class="app">
<header>
<div><h1>Running Dashboard</h1><p id="generatedAt">{status}</p></div>
<div><button id="refreshBtn" type="button">Refresh</button> <button id="installBtn" type="button"{install_hidden}>Install</button></div>
</header>
<section id="emptyState" class="empty"{empty_hidden}><p>{empty_message}</p></section>
<main id="content"{content_hidden}>
"#,
        status = escape_html(&view.status),
        install_hidden = hidden(options.install_visible),
        empty_hidden = hidden(view.empty_state_visible),
        empty_message = escape_html(&view.empty_message),
        content_hidden = hidden(view.content_visible),
    );

    html.push_str(r#"<section id="kpis" class="kpis">"#);
    for card in view.kpis.cards() {
        let _ = write!(
            html,
            r#"<article class="kpi"><p class="label">{}</p><p class="value">{}</p></article>"#,
            escape_html(card.label),
            escape_html(&card.value),
        );
    }
    html.push_str("</section>\n<section class=\"charts\">\n");

    for (title, surface) in [
        ("Monthly Mileage", &view.charts.monthly),
        ("Pace vs Heart Rate", &view.charts.scatter),
        ("Cadence Trend", &view.charts.cadence),
        ("Distance per Run", &view.charts.distance),
    ] {
        let _ = writeln!(
            html,
            r#"<div class="chart"><h2>{}</h2>{}</div>"#,
            escape_html(title),
            surface.to_markup(),
        );
    }
    html.push_str("</section>\n<table id=\"runTable\"><thead><tr>");
    for column in COLUMNS {
        let _ = write!(html, "<th>{}</th>", escape_html(column));
    }
    html.push_str("</tr></thead><tbody>");
    for row in view.table.rows() {
        html.push_str("<tr>");
        for cell in &row.cells {
            let _ = write!(html, "<td>{}</td>", escape_html(cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>\n</main>\n</div>\n");

    if options.interactive {
        let _ = write!(html, "<script>{SCRIPT}</script>\n");
    }
    html.push_str("</body>\n</html>\n");
    html
}

use crate::dashboard::DashboardFrame;
use crate::models::{CompanyDetail, Verdict};
use crate::registry::Slot;
use crate::render::GaugeStatus;
use crate::sector::SectorFilterController;
use serde::Serialize;
use std::fmt::Write;

pub struct PageView<'a> {
    pub detail: &'a CompanyDetail,
    pub frame: &'a DashboardFrame,
    pub sector: Option<&'a SectorFilterController>,
    pub report_html: Option<&'a str>,
}

pub fn render_page(view: &PageView<'_>) -> String {
    let detail = view.detail;
    let info = &detail.company_info;

    INDEX_HTML
        .replace("{{CSS}}", DASHBOARD_CSS)
        .replace("{{THEME}}", view.frame.theme.as_str())
        .replace("{{TICKER}}", &escape_html(&info.ticker))
        .replace("{{COMPANY}}", &escape_html(&info.company_name))
        .replace("{{META}}", &company_meta(detail))
        .replace("{{PERCENT}}", &escape_html(&detail.insolvency.percent))
        .replace("{{PERCENT_COUNT}}", &percent_count(&detail.insolvency.percent))
        .replace("{{STATUS}}", &escape_html(&detail.insolvency.status))
        .replace("{{GAUGE_STATUS}}", &gauge_status(view.frame.gauge_status.as_ref()))
        .replace("{{TREND_TITLE}}", &escape_html(&detail.trend.title))
        .replace("{{RISK_FACTORS}}", &risk_factors(detail))
        .replace("{{SECTOR_TITLE}}", &escape_html(&detail.sector_risk.title))
        .replace("{{SECTOR_FILTER}}", &sector_filter(view.sector))
        .replace("{{BENCHMARK}}", &benchmark(detail))
        .replace("{{NEWS}}", &news(detail))
        .replace("{{REPORT}}", view.report_html.unwrap_or(REPORT_PLACEHOLDER))
        .replace("{{FRAME_JSON}}", &script_json(view.frame))
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON safe to embed inside a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn company_meta(detail: &CompanyDetail) -> String {
    let info = &detail.company_info;
    let mut parts = Vec::new();
    if !info.market_type.is_empty() {
        parts.push(escape_html(&info.market_type));
    }
    if let Some(industry) = &info.industry {
        parts.push(escape_html(industry));
    }
    if let Some(year) = info.founded_year {
        parts.push(format!("Founded {year}"));
    }
    parts.join(" · ")
}

fn percent_count(percent: &str) -> String {
    percent.trim_end_matches('%').to_string()
}

fn gauge_status(status: Option<&GaugeStatus>) -> String {
    match status {
        Some(status) => format!(
            "<div class=\"gauge-score-value\">{}</div>\
             <div class=\"gauge-status-text\" style=\"color: {};\">{}</div>",
            escape_html(&status.score),
            escape_html(&status.color),
            escape_html(&status.label)
        ),
        None => String::new(),
    }
}

fn risk_factors(detail: &CompanyDetail) -> String {
    let mut html = String::new();
    for factor in &detail.risk_factors {
        let _ = write!(
            html,
            "<div class=\"stat\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>",
            escape_html(&factor.name),
            escape_html(&factor.value)
        );
    }
    html
}

fn sector_filter(controller: Option<&SectorFilterController>) -> String {
    let Some(controller) = controller else {
        return "<p class=\"placeholder-text\">No sector data.</p>".to_string();
    };

    let selected = controller.selected();
    let mut options = String::new();
    for datum in controller.feed().data() {
        let checked = if selected.contains(&datum.label) { " checked" } else { "" };
        let label = escape_html(&datum.label);
        let _ = write!(
            options,
            "<label class=\"option\"><input type=\"checkbox\" class=\"sector-option\" value=\"{label}\"{checked} /> {label}</label>"
        );
    }

    SECTOR_FILTER_HTML
        .replace("{{SUMMARY}}", &escape_html(&controller.summary_text()))
        .replace("{{OPTIONS}}", &options)
        .replace(
            "{{KEEP}}",
            if controller.keep_highlight() { " checked" } else { "" },
        )
}

fn benchmark(detail: &CompanyDetail) -> String {
    let mut html = String::new();
    let mut index = 0;
    for category in &detail.benchmark.categories {
        let _ = write!(
            html,
            "<div class=\"bench-category\"><h3>{}</h3><p class=\"subtitle\">{}</p>",
            escape_html(&category.name),
            escape_html(&category.rule)
        );
        for metric in &category.metrics {
            let verdict = match metric.verdict {
                Verdict::Better => "better",
                Verdict::Par => "par",
                Verdict::Worse => "worse",
            };
            let _ = write!(
                html,
                "<div class=\"bench-row\"><span class=\"label\">{name}</span>\
                 <div class=\"bench-chart\"><canvas class=\"benchmark-bar-chart\" id=\"{slot}\"></canvas></div>\
                 <span class=\"verdict verdict-{verdict}\">{verdict}</span></div>",
                name = escape_html(&metric.name),
                slot = Slot::Benchmark(index),
            );
            index += 1;
        }
        html.push_str("</div>");
    }
    if index == 0 {
        html.push_str("<p class=\"placeholder-text\">No benchmark data.</p>");
    }
    html
}

fn news(detail: &CompanyDetail) -> String {
    if detail.news.is_empty() {
        return "<li class=\"placeholder-text\">No recent news.</li>".to_string();
    }
    detail
        .news
        .iter()
        .map(|title| format!("<li>{}</li>", escape_html(title)))
        .collect()
}

const REPORT_PLACEHOLDER: &str =
    "<p class=\"placeholder-text\">Generate a report to see the analyst summary.</p>";

pub const DASHBOARD_CSS: &str = r#"
    :root {
      --color-primary: #1a73e8;
      --color-danger: #d93025;
      --color-warning: #f9ab00;
      --color-success: #1e8e3e;
      --color-text-primary: #202124;
      --color-text-secondary: #5f6368;
      --color-border: #dadce0;
      --color-surface: #ffffff;
      --color-bg: #f1f3f4;
    }

    [data-theme="dark"] {
      --color-primary: #8ab4f8;
      --color-danger: #f28b82;
      --color-warning: #fdd663;
      --color-success: #81c995;
      --color-text-primary: #e8eaed;
      --color-text-secondary: #9aa0a6;
      --color-border: #3c4043;
      --color-surface: #202124;
      --color-bg: #171717;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      background: var(--color-bg);
      color: var(--color-text-primary);
      font-family: "Inter", "Segoe UI", sans-serif;
    }

    header.topbar {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      padding: 16px 28px;
      background: var(--color-surface);
      border-bottom: 1px solid var(--color-border);
    }

    .app {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(320px, 1fr));
      gap: 20px;
      padding: 24px 28px 48px;
    }

    .card {
      background: var(--color-surface);
      border: 1px solid var(--color-border);
      border-radius: 16px;
      padding: 20px;
      display: grid;
      gap: 12px;
    }

    .card.wide { grid-column: 1 / -1; }

    h1, h2, h3 { margin: 0; }

    .subtitle, .placeholder-text, .muted {
      color: var(--color-text-secondary);
      margin: 0;
    }

    .stat { display: flex; justify-content: space-between; }
    .stat .label { color: var(--color-text-secondary); }
    .stat .value { font-weight: 600; }

    .big-number { font-size: 2.4rem; font-weight: 700; }

    .gauge-status { text-align: center; }
    .gauge-score-value { font-size: 1.8rem; font-weight: 700; }
    .gauge-status-text { font-weight: 600; }

    .chart-box { position: relative; height: 260px; }

    details.filter { position: relative; }
    details.filter .panel {
      position: absolute;
      z-index: 10;
      background: var(--color-surface);
      border: 1px solid var(--color-border);
      border-radius: 12px;
      padding: 12px;
      display: grid;
      gap: 6px;
      min-width: 240px;
    }
    .panel .actions { display: flex; gap: 8px; }

    .bench-row {
      display: grid;
      grid-template-columns: 180px 1fr 70px;
      align-items: center;
      gap: 8px;
    }
    .bench-chart { position: relative; height: 48px; }
    .verdict-better { color: var(--color-success); }
    .verdict-worse { color: var(--color-danger); }
    .verdict-par { color: var(--color-text-secondary); }

    button {
      border: 1px solid var(--color-border);
      background: var(--color-surface);
      color: var(--color-text-primary);
      border-radius: 999px;
      padding: 8px 14px;
      cursor: pointer;
    }
    button:disabled { opacity: 0.6; cursor: progress; }
"#;

const SECTOR_FILTER_HTML: &str = r#"<details class="filter" id="sector-filter-dd">
          <summary id="sector-filter-summary">{{SUMMARY}}</summary>
          <div class="panel">
            {{OPTIONS}}
            <label class="option"><input type="checkbox" id="sector-keep-highlight"{{KEEP}} /> Keep my industry</label>
            <div class="actions">
              <button type="button" id="sector-apply-filter">Apply</button>
              <button type="button" id="sector-filter-clear">Clear</button>
              <button type="button" id="sector-filter-close">Close</button>
            </div>
          </div>
        </details>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{COMPANY}} · Early Warning Dashboard</title>
  <style>{{CSS}}</style>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
  <script src="https://cdn.jsdelivr.net/npm/chartjs-plugin-datalabels@2"></script>
</head>
<body data-corp="{{TICKER}}">
  <header class="topbar">
    <div>
      <h1>{{COMPANY}} <span class="muted">{{TICKER}}</span></h1>
      <p class="subtitle">{{META}}</p>
    </div>
    <form method="get" action="/company">
      <input type="search" name="corp_id" placeholder="Stock code or company name" />
      <button type="submit">Search</button>
    </form>
    <button type="button" id="theme-toggle" aria-label="Toggle theme">Theme</button>
  </header>

  <main class="app">
    <section class="card">
      <h2>Default probability</h2>
      <span class="big-number" data-count="{{PERCENT_COUNT}}">{{PERCENT}}</span>
      <p class="subtitle">Status: {{STATUS}}</p>
      {{RISK_FACTORS}}
    </section>

    <section class="card">
      <h2>Risk gauge</h2>
      <div class="chart-box"><canvas id="riskGaugeChart"></canvas></div>
      <div class="gauge-status" id="riskGaugeStatus">{{GAUGE_STATUS}}</div>
    </section>

    <section class="card">
      <h2>{{TREND_TITLE}}</h2>
      <div class="chart-box"><canvas id="riskTrendChart"></canvas></div>
    </section>

    <section class="card">
      <h2>{{SECTOR_TITLE}}</h2>
      {{SECTOR_FILTER}}
      <div class="chart-box"><canvas id="sectorRiskChart"></canvas></div>
    </section>

    <section class="card wide">
      <h2>Industry benchmark</h2>
      <p class="muted">Company (blue) against the industry average (grey).</p>
      {{BENCHMARK}}
    </section>

    <section class="card">
      <h2>News</h2>
      <ul>{{NEWS}}</ul>
    </section>

    <section class="card wide">
      <h2>Analyst report</h2>
      <form id="ai-report-form" method="post" action="/company/{{TICKER}}/ai-report">
        <button type="submit"><span>Generate report</span></button>
      </form>
      <div id="ai-report-content">{{REPORT}}</div>
    </section>
  </main>

  <script type="application/json" id="chart-frame">{{FRAME_JSON}}</script>
  <script>
    document.addEventListener('DOMContentLoaded', () => {
      Chart.register(ChartDataLabels);
      const corp = document.body.dataset.corp;
      const instances = new Map();

      const hydrate = (config) => {
        const cfg = structuredClone(config);
        cfg.data.datasets.forEach((ds) => {
          if (ds.valueLabels) {
            const labels = ds.valueLabels;
            delete ds.valueLabels;
            ds.datalabels = { formatter: (_, ctx) => labels[ctx.dataIndex] };
          }
        });
        Object.values(cfg.options.scales || {}).forEach((scale) => {
          if (scale.ticks && scale.ticks.suffix) {
            const suffix = scale.ticks.suffix;
            delete scale.ticks.suffix;
            scale.ticks.callback = (value) => `${value}${suffix}`;
          }
        });
        return cfg;
      };

      const draw = (slot, config) => {
        const canvas = document.getElementById(slot);
        if (!canvas) return;
        const previous = instances.get(slot);
        if (previous) previous.destroy();
        instances.set(slot, new Chart(canvas, hydrate(config)));
      };

      const gaugeStatus = document.getElementById('riskGaugeStatus');
      const applyFrame = (frame) => {
        document.documentElement.setAttribute('data-theme', frame.theme);
        Object.entries(frame.charts).forEach(([slot, config]) => draw(slot, config));
        if (frame.gauge_status && gaugeStatus) {
          const s = frame.gauge_status;
          gaugeStatus.innerHTML = `<div class="gauge-score-value">${s.score}</div>` +
            `<div class="gauge-status-text" style="color: ${s.color};">${s.label}</div>`;
        }
      };

      const checkboxes = Array.from(document.querySelectorAll('.sector-option'));
      const keepHighlight = document.getElementById('sector-keep-highlight');
      const dropdown = document.getElementById('sector-filter-dd');
      const summary = document.getElementById('sector-filter-summary');
      const selection = () => ({
        selected: checkboxes.filter((cb) => cb.checked).map((cb) => cb.value),
        keep_highlight: keepHighlight ? keepHighlight.checked : true
      });
      const updateSummary = () => {
        if (summary) summary.textContent = `Sectors selected (${selection().selected.length})`;
      };

      const postJson = async (url, body) => {
        const res = await fetch(url, {
          method: 'POST',
          headers: { 'Content-Type': 'application/json' },
          body: JSON.stringify(body)
        });
        if (!res.ok) throw new Error(await res.text());
        return res.json();
      };

      checkboxes.forEach((cb) => cb.addEventListener('change', updateSummary));
      const clearBtn = document.getElementById('sector-filter-clear');
      if (clearBtn) clearBtn.addEventListener('click', () => {
        checkboxes.forEach((cb) => { cb.checked = false; });
        updateSummary();
      });
      const closeBtn = document.getElementById('sector-filter-close');
      if (closeBtn) closeBtn.addEventListener('click', () => { dropdown.open = false; });
      let applied = selection();
      const showError = (error) => {
        if (summary) summary.textContent = `Error: ${error.message}`;
        else console.error(error);
      };

      const applyBtn = document.getElementById('sector-apply-filter');
      if (applyBtn) applyBtn.addEventListener('click', async () => {
        const body = selection();
        applyBtn.disabled = true;
        try {
          const result = await postJson(`/api/company/${corp}/sector`, body);
          applied = body;
          if (result.chart) draw('sectorRiskChart', result.chart);
          if (summary) summary.textContent = result.summary;
          dropdown.open = false;
        } catch (error) {
          showError(error);
        } finally {
          applyBtn.disabled = false;
        }
      });

      const themeBtn = document.getElementById('theme-toggle');
      if (themeBtn) themeBtn.addEventListener('click', async () => {
        themeBtn.disabled = true;
        try {
          applyFrame(await postJson(`/api/company/${corp}/theme`, applied));
          updateSummary();
        } catch (error) {
          showError(error);
        } finally {
          themeBtn.disabled = false;
        }
      });

      const reportForm = document.getElementById('ai-report-form');
      if (reportForm) reportForm.addEventListener('submit', async (e) => {
        e.preventDefault();
        const button = reportForm.querySelector('button');
        const text = button.querySelector('span:last-child');
        const content = document.getElementById('ai-report-content');
        button.disabled = true;
        if (text) text.textContent = 'Generating...';
        content.innerHTML = '<p class="placeholder-text">Writing the report...</p>';
        try {
          const res = await fetch(reportForm.action, { method: 'POST', headers: { 'Accept': 'text/html' } });
          if (!res.ok) throw new Error(`Server error: ${res.statusText}`);
          const doc = new DOMParser().parseFromString(await res.text(), 'text/html');
          const fresh = doc.getElementById('ai-report-content');
          content.innerHTML = fresh ? fresh.innerHTML : '<p class="placeholder-text">Could not load the report.</p>';
        } catch (error) {
          content.innerHTML = `<p class="placeholder-text" style="color: var(--color-danger)">Error: ${error.message}</p>`;
        } finally {
          button.disabled = false;
          if (text) text.textContent = 'Generate report';
        }
      });

      const counters = document.querySelectorAll('[data-count]');
      const animate = (el) => {
        const target = parseFloat(el.dataset.count);
        if (Number.isNaN(target)) return;
        const percent = el.textContent.includes('%');
        const decimals = (target.toString().split('.')[1] || '').length;
        let start;
        const step = (ts) => {
          if (!start) start = ts;
          const progress = Math.min((ts - start) / 1500, 1);
          const current = progress === 1 ? target : progress * target;
          el.textContent = current.toFixed(decimals) + (percent ? '%' : '');
          if (progress < 1) requestAnimationFrame(step);
        };
        requestAnimationFrame(step);
      };
      const observer = new IntersectionObserver((entries) => {
        entries.forEach((entry) => {
          if (entry.isIntersecting) {
            animate(entry.target);
            observer.unobserve(entry.target);
          }
        });
      }, { threshold: 0.5 });
      counters.forEach((el) => observer.observe(el));

      applyFrame(JSON.parse(document.getElementById('chart-frame').textContent));
    });
  </script>
</body>
</html>
"#;

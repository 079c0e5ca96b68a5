//! Analyst report fragments for the report panel.

use crate::models::{CompanyDetail, Verdict};
use crate::ui::escape_html;
use chrono::{DateTime, Local};
use std::fmt::Write;

const NO_DATA: &str = "no data";

pub trait ReportGenerator: Send + Sync {
    /// Returns an HTML fragment for the report panel.
    fn generate(&self, detail: &CompanyDetail) -> String;
}

/// Builds the report from the dashboard figures alone.
#[derive(Debug, Clone, Default)]
pub struct SummaryReport;

impl ReportGenerator for SummaryReport {
    fn generate(&self, detail: &CompanyDetail) -> String {
        render_summary(detail, Local::now())
    }
}

fn render_summary(detail: &CompanyDetail, generated_at: DateTime<Local>) -> String {
    let info = &detail.company_info;
    let mut html = String::new();

    let _ = write!(
        html,
        "<h3>Summary</h3><p>{name} ({ticker}, {market}, founded {founded}). \
         Default probability {percent}, status <strong>{status}</strong>.</p>",
        name = escape_html(&info.company_name),
        ticker = escape_html(&info.ticker),
        market = or_no_data(&info.market_type),
        founded = info
            .founded_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| NO_DATA.to_string()),
        percent = escape_html(&detail.insolvency.percent),
        status = escape_html(&detail.insolvency.status),
    );

    html.push_str("<h3>Insolvency risk</h3>");
    match detail.risk_score {
        Some(score) => {
            let band = crate::render::Band::classify(score);
            let _ = write!(
                html,
                "<p>Risk score {score:.1} of 100, in the {} band.</p>",
                band.label().to_lowercase()
            );
        }
        None => {
            let _ = write!(html, "<p>Risk score: {NO_DATA}.</p>");
        }
    }

    html.push_str("<h3>Indicators</h3><ul>");
    if detail.risk_factors.is_empty() {
        let _ = write!(html, "<li>{NO_DATA}</li>");
    }
    for factor in &detail.risk_factors {
        let _ = write!(
            html,
            "<li>{}: {}</li>",
            escape_html(&factor.name),
            escape_html(&factor.value)
        );
    }
    html.push_str("</ul>");

    html.push_str("<h3>Risk factors</h3><ul>");
    let mut signals = 0;
    for category in &detail.benchmark.categories {
        let worse: Vec<&str> = category
            .metrics
            .iter()
            .filter(|m| m.verdict == Verdict::Worse)
            .map(|m| m.name.as_str())
            .collect();
        if worse.is_empty() {
            continue;
        }
        signals += 1;
        let _ = write!(
            html,
            "<li>{}: {} ({})</li>",
            escape_html(&category.name),
            escape_html(&category.signal_if_worse),
            escape_html(&worse.join(", "))
        );
    }
    if signals == 0 {
        html.push_str("<li>No metric is worse than the industry average.</li>");
    }
    html.push_str("</ul>");

    if let Some(mscore) = detail.beneish.mscore {
        let _ = write!(
            html,
            "<p>Beneish M-score {mscore:.2} ({}; threshold {:.2}).</p>",
            if detail.beneish.flagged {
                "possible earnings manipulation"
            } else {
                "within normal range"
            },
            detail.beneish.threshold
        );
    }

    html.push_str("<h3>Benchmark</h3><p>");
    let names: Vec<&str> = detail
        .benchmark
        .categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    if names.is_empty() {
        html.push_str(NO_DATA);
    } else {
        html.push_str(&escape_html(&names.join(", ")));
    }
    let _ = write!(
        html,
        "</p><p class=\"muted\">Source: internal calculation, {}.</p>",
        generated_at.format("%Y-%m-%d %H:%M")
    );

    html
}

fn or_no_data(value: &str) -> String {
    if value.is_empty() {
        NO_DATA.to_string()
    } else {
        escape_html(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::company::{company_detail, placeholder_detail};
    use crate::models::{AppData, CompanyYear};
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()
    }

    #[test]
    fn report_covers_every_section() {
        let data = AppData {
            rows: vec![
                CompanyYear {
                    stock_code: "000001".into(),
                    year: 2023,
                    company_name: "Acme <Holdings>".into(),
                    industry_name: Some("Retail".into()),
                    default_prob: Some(0.7),
                    debt_ratio: Some(300.0),
                    beneish_mscore: Some(-1.5),
                    ..Default::default()
                },
                CompanyYear {
                    stock_code: "000002".into(),
                    year: 2023,
                    company_name: "Peer".into(),
                    industry_name: Some("Retail".into()),
                    default_prob: Some(0.1),
                    debt_ratio: Some(100.0),
                    ..Default::default()
                },
            ],
        };
        let detail = company_detail("000001", &data).unwrap();
        let html = render_summary(&detail, at());

        for section in ["Summary", "Insolvency risk", "Indicators", "Risk factors", "Benchmark"] {
            assert!(html.contains(&format!("<h3>{section}</h3>")), "missing {section}");
        }
        assert!(html.contains("Acme &lt;Holdings&gt;"));
        assert!(html.contains("danger band"));
        assert!(html.contains("Insolvency risk (Debt ratio (%))"));
        assert!(html.contains("possible earnings manipulation"));
        assert!(html.contains("2026-03-02 09:30"));
    }

    #[test]
    fn placeholder_report_marks_missing_values() {
        let html = render_summary(&placeholder_detail("123456"), at());
        assert!(html.contains("Risk score: no data."));
        assert!(html.contains("<li>no data</li>"));
        assert!(!html.contains("Beneish"));
    }
}

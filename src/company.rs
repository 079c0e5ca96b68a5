//! Company lookup and assembly of the dashboard detail from yearly rows.

use crate::feed::SectorDatum;
use crate::models::{
    AppData, Benchmark, BenchmarkCategory, BenchmarkMetric, Beneish, CompanyDetail, CompanyInfo,
    CompanyYear, Direction, InsolvencyCard, RiskFactor, SectorRisk, TrendSeries, Verdict,
};
use crate::render::TrendPoint;
use std::collections::BTreeMap;
use thiserror::Error;

pub const BENEISH_THRESHOLD: f64 = -2.22;
pub const BENCHMARK_TOLERANCE: f64 = 0.05;

const SECTOR_LIMIT: usize = 6;
const NEWS_LIMIT: usize = 5;
const OTHER_INDUSTRY: &str = "Other";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("empty company id")]
    Empty,

    #[error("cannot resolve company id: {0}")]
    Unknown(String),

    #[error("no data for {0}")]
    NoData(String),
}

/// Resolves user input (a stock code in any common shape, or part of a
/// company name) to a six-digit stock code present in `data`.
pub fn resolve_stock_code(corp_id: &str, data: &AppData) -> Result<String, LookupError> {
    let input = corp_id.trim().to_uppercase();
    if input.is_empty() {
        return Err(LookupError::Empty);
    }

    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        let code = format!("{digits:0>6}");
        if data.rows.iter().any(|row| row.stock_code == code) {
            return Ok(code);
        }
    }

    let by_name = data
        .rows
        .iter()
        .filter(|row| row.company_name.to_uppercase().contains(&input))
        .min_by(|a, b| {
            a.company_name
                .cmp(&b.company_name)
                .then_with(|| b.year.cmp(&a.year))
        });
    if let Some(row) = by_name {
        return Ok(row.stock_code.clone());
    }

    if input.len() == 6 && input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(input);
    }

    Err(LookupError::Unknown(corp_id.to_string()))
}

pub fn company_detail(stock_code: &str, data: &AppData) -> Result<CompanyDetail, LookupError> {
    let mut rows: Vec<&CompanyYear> = data
        .rows
        .iter()
        .filter(|row| row.stock_code == stock_code)
        .collect();
    rows.sort_by_key(|row| row.year);
    let Some(latest) = rows.last().copied() else {
        return Err(LookupError::NoData(stock_code.to_string()));
    };

    let prob = latest.default_prob.unwrap_or(0.0);
    let mscore = latest.beneish_mscore;

    Ok(CompanyDetail {
        company_info: CompanyInfo {
            company_name: latest.company_name.clone(),
            ticker: latest.stock_code.clone(),
            market_type: market_type(latest.market.as_deref()),
            founded_year: latest.founded_year,
            industry: latest.industry_name.clone(),
        },
        trend: TrendSeries {
            title: format!("{} default probability by year", latest.company_name),
            points: rows
                .iter()
                .map(|row| TrendPoint {
                    label: row.year.to_string(),
                    value: row.default_prob.unwrap_or(0.0) * 100.0,
                })
                .collect(),
        },
        news: latest.news_titles.iter().take(NEWS_LIMIT).cloned().collect(),
        insolvency: InsolvencyCard {
            percent: format!("{:.1}%", prob * 100.0),
            status: insolvency_status(prob).to_string(),
        },
        risk_factors: vec![
            RiskFactor {
                name: "Interest coverage".to_string(),
                value: format!("{:.1}", latest.icr.unwrap_or(0.0)),
            },
            RiskFactor {
                name: "Debt ratio".to_string(),
                value: format!("{:.1}%", latest.debt_ratio.unwrap_or(0.0)),
            },
            RiskFactor {
                name: "ROA".to_string(),
                value: format!("{:.1}%", latest.roa.unwrap_or(0.0)),
            },
        ],
        sector_risk: sector_risk(latest, data),
        benchmark: benchmark(latest, data),
        beneish: Beneish {
            mscore,
            year: Some(latest.year),
            threshold: BENEISH_THRESHOLD,
            flagged: mscore.is_some_and(|score| score >= BENEISH_THRESHOLD),
        },
        risk_score: Some((prob * 100.0).clamp(0.0, 100.0)),
    })
}

/// A detail with no data, so the page still renders for an unknown company.
pub fn placeholder_detail(corp_id: &str) -> CompanyDetail {
    CompanyDetail {
        company_info: CompanyInfo {
            company_name: "N/A".to_string(),
            ticker: corp_id.to_string(),
            market_type: String::new(),
            founded_year: None,
            industry: None,
        },
        trend: TrendSeries {
            title: String::new(),
            points: Vec::new(),
        },
        news: Vec::new(),
        insolvency: InsolvencyCard {
            percent: "-".to_string(),
            status: "No data".to_string(),
        },
        risk_factors: Vec::new(),
        sector_risk: SectorRisk {
            title: "Average default probability by industry".to_string(),
            series: Vec::new(),
            highlight: None,
        },
        benchmark: Benchmark {
            categories: Vec::new(),
            tolerance: BENCHMARK_TOLERANCE,
        },
        beneish: Beneish {
            mscore: None,
            year: None,
            threshold: BENEISH_THRESHOLD,
            flagged: false,
        },
        risk_score: None,
    }
}

pub fn insolvency_status(prob: f64) -> &'static str {
    if prob >= 0.6 {
        "Danger"
    } else if prob >= 0.4 {
        "Warning"
    } else {
        "Good"
    }
}

/// Compares a company figure with its industry average. Relative differences
/// within `tolerance` are a tie.
pub fn verdict(company: f64, industry: f64, direction: Direction, tolerance: f64) -> Verdict {
    let scale = industry.abs();
    let diff = if scale > f64::EPSILON {
        (company - industry) / scale
    } else {
        company - industry
    };
    if diff.abs() <= tolerance {
        return Verdict::Par;
    }

    let better = match direction {
        Direction::HigherBetter => diff > 0.0,
        Direction::LowerBetter => diff < 0.0,
    };
    if better { Verdict::Better } else { Verdict::Worse }
}

fn market_type(market: Option<&str>) -> String {
    match market.map(str::trim) {
        Some(m) if m.eq_ignore_ascii_case("KOSPI") => "KOSPI".to_string(),
        Some(m) if m.eq_ignore_ascii_case("KOSDAQ") => "KOSDAQ".to_string(),
        Some(m) => m.to_string(),
        None => String::new(),
    }
}

fn sector_risk(latest: &CompanyYear, data: &AppData) -> SectorRisk {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for row in data.rows.iter().filter(|row| row.year == latest.year) {
        let industry = industry_label(row);
        let entry = sums.entry(industry).or_insert((0.0, 0));
        if let Some(prob) = row.default_prob {
            entry.0 += prob;
            entry.1 += 1;
        }
    }

    let mut series: Vec<SectorDatum> = sums
        .into_iter()
        .map(|(label, (sum, count))| SectorDatum {
            label: label.to_string(),
            value: if count == 0 { 0.0 } else { sum / count as f64 },
        })
        .collect();
    series.sort_by(|a, b| b.value.total_cmp(&a.value));
    series.truncate(SECTOR_LIMIT);

    SectorRisk {
        title: "Average default probability by industry".to_string(),
        series,
        highlight: Some(industry_label(latest).to_string()),
    }
}

/// The sector bucket of a row; missing or blank industries share one bucket.
fn industry_label(row: &CompanyYear) -> &str {
    row.industry_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(OTHER_INDUSTRY)
}

fn benchmark(latest: &CompanyYear, data: &AppData) -> Benchmark {
    let peers: Vec<&CompanyYear> = data
        .rows
        .iter()
        .filter(|row| row.year == latest.year && row.industry_name == latest.industry_name)
        .collect();

    let metric = |name: &str, field: fn(&CompanyYear) -> Option<f64>, direction: Direction| {
        let company = field(latest).unwrap_or(0.0);
        let industry = average(peers.iter().filter_map(|row| field(row)));
        BenchmarkMetric {
            name: name.to_string(),
            company,
            industry,
            direction,
            verdict: verdict(company, industry, direction, BENCHMARK_TOLERANCE),
        }
    };

    let category = |name: &str, rule: &str, signal: &str, metrics: Vec<BenchmarkMetric>| {
        BenchmarkCategory {
            name: name.to_string(),
            rule: rule.to_string(),
            signal_if_worse: signal.to_string(),
            metrics,
        }
    };

    use Direction::{HigherBetter, LowerBetter};
    Benchmark {
        categories: vec![
            category(
                "Profitability",
                "Below the industry average means weakening competitiveness",
                "Weakening competitiveness",
                vec![
                    metric("Operating margin (%)", |r| r.opm, HigherBetter),
                    metric("Net margin (%)", |r| r.npm, HigherBetter),
                    metric("ROE (%)", |r| r.roe, HigherBetter),
                    metric("ROA (%)", |r| r.roa, HigherBetter),
                ],
            ),
            category(
                "Stability",
                "Below the industry average or in a risk range means insolvency risk",
                "Insolvency risk",
                vec![
                    metric("Debt ratio (%)", |r| r.debt_ratio, LowerBetter),
                    metric("Current ratio (%)", |r| r.current_ratio, HigherBetter),
                    metric("Interest coverage", |r| r.icr, HigherBetter),
                ],
            ),
            category(
                "Growth",
                "Falling short of the industry average means declining competitiveness",
                "Declining competitiveness",
                vec![
                    metric("Sales growth (%)", |r| r.sales_growth, HigherBetter),
                    metric("Operating income growth (%)", |r| r.op_income_growth, HigherBetter),
                ],
            ),
            category(
                "Efficiency",
                "Far below the industry means operational inefficiency",
                "Operational inefficiency",
                vec![
                    metric("Total asset turnover", |r| r.asset_turnover, HigherBetter),
                    metric("Receivables turnover", |r| r.ar_turnover, HigherBetter),
                ],
            ),
        ],
        tolerance: BENCHMARK_TOLERANCE,
    }
}

fn average(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

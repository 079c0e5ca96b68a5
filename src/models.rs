use crate::charts::ChartConfig;
use crate::feed::SectorDatum;
use crate::render::TrendPoint;
use crate::sector::SectorView;
use serde::{Deserialize, Serialize};

/// One company-year row of the data file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompanyYear {
    pub stock_code: String,
    pub year: i32,
    pub company_name: String,
    #[serde(default)]
    pub industry_name: Option<String>,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub news_titles: Vec<String>,
    #[serde(default)]
    pub default_prob: Option<f64>,
    #[serde(default)]
    pub icr: Option<f64>,
    #[serde(default)]
    pub opm: Option<f64>,
    #[serde(default)]
    pub npm: Option<f64>,
    #[serde(default)]
    pub roa: Option<f64>,
    #[serde(default)]
    pub roe: Option<f64>,
    #[serde(default)]
    pub current_ratio: Option<f64>,
    #[serde(default)]
    pub debt_ratio: Option<f64>,
    #[serde(default)]
    pub sales_growth: Option<f64>,
    #[serde(default)]
    pub op_income_growth: Option<f64>,
    #[serde(default)]
    pub asset_turnover: Option<f64>,
    #[serde(default)]
    pub ar_turnover: Option<f64>,
    #[serde(default)]
    pub beneish_mscore: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    pub rows: Vec<CompanyYear>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyInfo {
    pub company_name: String,
    pub ticker: String,
    pub market_type: String,
    pub founded_year: Option<i32>,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsolvencyCard {
    pub percent: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RiskFactor {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendSeries {
    pub title: String,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorRisk {
    pub title: String,
    pub series: Vec<SectorDatum>,
    pub highlight: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherBetter,
    LowerBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Better,
    Par,
    Worse,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkMetric {
    pub name: String,
    pub company: f64,
    pub industry: f64,
    pub direction: Direction,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkCategory {
    pub name: String,
    pub rule: String,
    pub signal_if_worse: String,
    pub metrics: Vec<BenchmarkMetric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Benchmark {
    pub categories: Vec<BenchmarkCategory>,
    pub tolerance: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Beneish {
    pub mscore: Option<f64>,
    pub year: Option<i32>,
    pub threshold: f64,
    pub flagged: bool,
}

/// Everything the dashboard page shows for one company.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetail {
    pub company_info: CompanyInfo,
    pub trend: TrendSeries,
    pub news: Vec<String>,
    pub insolvency: InsolvencyCard,
    pub risk_factors: Vec<RiskFactor>,
    pub sector_risk: SectorRisk,
    pub benchmark: Benchmark,
    pub beneish: Beneish,
    /// Gauge score in `[0, 100]`; absent when the company is unknown.
    pub risk_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyQuery {
    pub corp_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SectorRequest {
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default = "default_keep_highlight")]
    pub keep_highlight: bool,
}

fn default_keep_highlight() -> bool {
    true
}

/// The re-rendered sector chart after a filter is applied.
#[derive(Debug, Clone, Serialize)]
pub struct SectorResponse {
    #[serde(flatten)]
    pub view: SectorView,
    pub chart: Option<ChartConfig>,
}

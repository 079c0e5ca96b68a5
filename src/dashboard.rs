//! Binds chart configs to page slots and re-renders them on filter and theme
//! changes.

use crate::charts::ChartConfig;
use crate::feed::{FeedError, SectorFeed};
use crate::models::CompanyDetail;
use crate::registry::{ChartBackend, ChartRegistry, FrameBackend, Slot};
use crate::render::{
    GaugeStatus, TrendPoint, benchmark_chart, gauge_chart, sector_chart, trend_chart,
};
use crate::sector::{SectorFilterController, SectorView};
use crate::theme::{PresentationContext, Theme, ThemeChanged};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkRow {
    pub name: String,
    pub subject: f64,
    pub reference: f64,
}

/// The data a dashboard page renders its charts from.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub risk_score: Option<f64>,
    pub trend: Vec<TrendPoint>,
    pub sector: Option<SectorFeed>,
    pub benchmarks: Vec<BenchmarkRow>,
}

impl PageData {
    pub fn from_detail(detail: &CompanyDetail) -> Result<Self, FeedError> {
        let sector = SectorFeed::new(
            detail.sector_risk.series.clone(),
            detail.sector_risk.highlight.clone(),
        )?;

        let benchmarks = detail
            .benchmark
            .categories
            .iter()
            .flat_map(|category| &category.metrics)
            .map(|metric| BenchmarkRow {
                name: metric.name.clone(),
                subject: metric.company,
                reference: metric.industry,
            })
            .collect();

        Ok(Self {
            risk_score: detail.risk_score,
            trend: detail.trend.points.clone(),
            sector: Some(sector),
            benchmarks,
        })
    }

    /// Slots that have a drawing surface on the page for this data.
    pub fn surfaces(&self) -> Vec<Slot> {
        let mut slots = vec![Slot::Gauge, Slot::Trend];
        if self.sector.is_some() {
            slots.push(Slot::Sector);
        }
        slots.extend((0..self.benchmarks.len()).map(Slot::Benchmark));
        slots
    }
}

pub struct Dashboard<B: ChartBackend> {
    backend: B,
    registry: ChartRegistry<B::Handle>,
    context: PresentationContext,
    risk_score: Option<f64>,
    trend: Vec<TrendPoint>,
    benchmarks: Vec<BenchmarkRow>,
    sector: Option<SectorFilterController>,
    sector_view: Option<SectorView>,
    gauge_status: Option<GaugeStatus>,
}

impl<B: ChartBackend> Dashboard<B> {
    pub fn new(backend: B, context: PresentationContext, data: PageData) -> Self {
        Self {
            backend,
            registry: ChartRegistry::new(),
            context,
            risk_score: data.risk_score,
            trend: data.trend,
            benchmarks: data.benchmarks,
            sector: data.sector.map(SectorFilterController::new),
            sector_view: None,
            gauge_status: None,
        }
    }

    pub fn theme(&self) -> Theme {
        self.context.theme()
    }

    pub fn registry(&self) -> &ChartRegistry<B::Handle> {
        &self.registry
    }

    pub fn sector(&self) -> Option<&SectorFilterController> {
        self.sector.as_ref()
    }

    pub fn sector_mut(&mut self) -> Option<&mut SectorFilterController> {
        self.sector.as_mut()
    }

    pub fn gauge_status(&self) -> Option<&GaugeStatus> {
        self.gauge_status.as_ref()
    }

    pub fn render_all(&mut self) {
        self.render_gauge();
        self.render_trend();
        self.render_sector();
        self.render_benchmarks();
        debug!(
            theme = self.context.theme().as_str(),
            live = self.registry.len(),
            "rendered all charts"
        );
    }

    /// Swaps the active theme and re-renders every chart with fresh tokens.
    pub fn on_theme_changed(&mut self, event: ThemeChanged) {
        self.context.set_theme(event.theme);
        self.render_all();
    }

    pub fn render_gauge(&mut self) {
        let (Some(score), true) = (self.risk_score, self.backend.has_surface(Slot::Gauge)) else {
            return;
        };
        let tokens = self.context.color_tokens();
        if let Some((config, status)) = gauge_chart(score, &tokens) {
            self.bind(Slot::Gauge, config);
            self.gauge_status = Some(status);
        }
    }

    pub fn render_trend(&mut self) {
        if !self.backend.has_surface(Slot::Trend) {
            return;
        }
        let tokens = self.context.color_tokens();
        if let Some(config) = trend_chart(&self.trend, &tokens) {
            self.bind(Slot::Trend, config);
        }
    }

    /// Re-renders the sector chart from the last applied selection.
    pub fn render_sector(&mut self) -> Option<&SectorView> {
        let view = self.sector.as_ref()?.view();
        self.show_sector(view)
    }

    /// Applies the filter panel's selection and re-renders only the sector
    /// chart.
    pub fn apply_sector_filter(&mut self) -> Option<&SectorView> {
        let view = self.sector.as_mut()?.apply();
        self.show_sector(view)
    }

    pub fn render_benchmarks(&mut self) {
        let tokens = self.context.color_tokens();
        for index in 0..self.benchmarks.len() {
            let slot = Slot::Benchmark(index);
            if !self.backend.has_surface(slot) {
                continue;
            }
            let row = &self.benchmarks[index];
            let config = benchmark_chart(row.subject, row.reference, &tokens);
            self.bind(slot, config);
        }
    }

    fn show_sector(&mut self, view: SectorView) -> Option<&SectorView> {
        if !self.backend.has_surface(Slot::Sector) {
            return None;
        }
        let tokens = self.context.color_tokens();
        let config = sector_chart(&view.bars, &tokens);
        self.bind(Slot::Sector, config);
        self.sector_view = Some(view);
        self.sector_view.as_ref()
    }

    fn bind(&mut self, slot: Slot, config: ChartConfig) {
        let backend = &mut self.backend;
        self.registry.rebind(slot, || backend.create(slot, config));
        debug!(%slot, "chart rendered");
    }
}

/// Everything the page script needs to draw the current charts.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardFrame {
    pub theme: Theme,
    pub charts: BTreeMap<Slot, ChartConfig>,
    pub gauge_status: Option<GaugeStatus>,
    pub sector: Option<SectorView>,
}

impl Dashboard<FrameBackend> {
    pub fn frame(&self) -> DashboardFrame {
        DashboardFrame {
            theme: self.context.theme(),
            charts: self
                .registry
                .iter()
                .map(|(slot, chart)| (slot, chart.config.clone()))
                .collect(),
            gauge_status: self.gauge_status.clone(),
            sector: self.sector_view.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::Indexable;
    use crate::feed::SectorDatum;
    use crate::registry::ChartHandle;
    use crate::theme::Stylesheet;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::Arc;

    const CSS: &str = r#"
        :root { --color-primary: #1a73e8; --color-success: #1e8e3e; --color-surface: #ffffff; }
        [data-theme="dark"] { --color-primary: #8ab4f8; --color-success: #81c995; }
    "#;

    /// Counts instances that are alive on the page.
    #[derive(Clone, Default)]
    struct CountingBackend {
        live: Rc<Cell<i32>>,
        created: Rc<Cell<u32>>,
    }

    struct CountedChart {
        live: Rc<Cell<i32>>,
    }

    impl ChartHandle for CountedChart {
        fn destroy(self) {
            self.live.set(self.live.get() - 1);
        }
    }

    impl ChartBackend for CountingBackend {
        type Handle = CountedChart;

        fn create(&mut self, _slot: Slot, _config: ChartConfig) -> CountedChart {
            self.live.set(self.live.get() + 1);
            self.created.set(self.created.get() + 1);
            CountedChart {
                live: Rc::clone(&self.live),
            }
        }
    }

    fn context(theme: Theme) -> PresentationContext {
        PresentationContext::new(theme, Arc::new(Stylesheet::parse(CSS)))
    }

    fn page_data() -> PageData {
        let feed = SectorFeed::new(
            vec![
                SectorDatum {
                    label: "A".into(),
                    value: 0.7,
                },
                SectorDatum {
                    label: "B".into(),
                    value: 0.3,
                },
                SectorDatum {
                    label: "H".into(),
                    value: 0.5,
                },
            ],
            Some("H".into()),
        )
        .unwrap();

        PageData {
            risk_score: Some(45.0),
            trend: vec![TrendPoint {
                label: "2023".into(),
                value: 4.0,
            }],
            sector: Some(feed),
            benchmarks: vec![
                BenchmarkRow {
                    name: "ROE".into(),
                    subject: 8.0,
                    reference: 10.0,
                },
                BenchmarkRow {
                    name: "ROA".into(),
                    subject: 4.0,
                    reference: 4.5,
                },
            ],
        }
    }

    #[test]
    fn rendering_twice_leaves_one_instance_per_slot() {
        let backend = CountingBackend::default();
        let live = Rc::clone(&backend.live);
        let mut dashboard = Dashboard::new(backend, context(Theme::Light), page_data());

        dashboard.render_all();
        dashboard.render_all();
        dashboard.render_sector();

        assert_eq!(dashboard.registry().len(), 5);
        assert_eq!(live.get(), 5);
    }

    #[test]
    fn gauge_status_follows_band() {
        let mut dashboard = Dashboard::new(FrameBackend::default(), context(Theme::Light), page_data());
        dashboard.render_gauge();
        let status = dashboard.gauge_status().unwrap();
        assert_eq!(status.label, "Caution");
        assert_eq!(status.score, "45.0");
    }

    #[test]
    fn non_numeric_score_renders_nothing() {
        let data = PageData {
            risk_score: Some(f64::NAN),
            ..page_data()
        };
        let mut dashboard = Dashboard::new(FrameBackend::default(), context(Theme::Light), data);
        dashboard.render_all();
        assert!(dashboard.registry().get(Slot::Gauge).is_none());
        assert!(dashboard.gauge_status().is_none());
    }

    #[test]
    fn missing_surface_is_skipped_silently() {
        let backend = FrameBackend::with_surfaces([Slot::Gauge, Slot::Benchmark(1)]);
        let mut dashboard = Dashboard::new(backend, context(Theme::Light), page_data());
        dashboard.render_all();

        let frame = dashboard.frame();
        let slots: Vec<Slot> = frame.charts.keys().copied().collect();
        assert_eq!(slots, vec![Slot::Gauge, Slot::Benchmark(1)]);
        assert!(frame.sector.is_none());
    }

    #[test]
    fn apply_with_keep_highlight_pins_highlight_bar() {
        let mut dashboard = Dashboard::new(FrameBackend::default(), context(Theme::Light), page_data());
        dashboard.render_all();

        let sector = dashboard.sector_mut().unwrap();
        sector.restore(&["A".to_string()], true);
        let view = dashboard.apply_sector_filter().unwrap().clone();
        let order: Vec<(&str, f64)> = view
            .bars
            .iter()
            .map(|b| (b.label.as_str(), b.percent))
            .collect();
        assert_eq!(order, vec![("A", 70.0), ("H", 50.0)]);

        let frame = dashboard.frame();
        let colors = frame.charts[&Slot::Sector].data.datasets[0]
            .background_color
            .clone()
            .unwrap();
        assert_eq!(colors.at(0).map(String::as_str), Some("#1a73e8"));
        assert_eq!(colors.at(1).map(String::as_str), Some("#1e8e3e"));
    }

    #[test]
    fn clear_does_not_rerender_until_apply() {
        let backend = CountingBackend::default();
        let created = Rc::clone(&backend.created);
        let mut dashboard = Dashboard::new(backend, context(Theme::Light), page_data());
        dashboard.render_all();
        let before = created.get();

        dashboard.sector_mut().unwrap().clear();
        assert_eq!(dashboard.sector().unwrap().summary_text(), "Sectors selected (0)");
        assert_eq!(created.get(), before);

        dashboard.apply_sector_filter();
        assert_eq!(created.get(), before + 1);
    }

    #[test]
    fn theme_change_after_clear_keeps_applied_sector_data() {
        let mut dashboard = Dashboard::new(FrameBackend::default(), context(Theme::Light), page_data());
        dashboard.render_all();
        let before = dashboard.frame().charts[&Slot::Sector].data.datasets[0].data.clone();
        assert_eq!(before, vec![70.0, 50.0, 30.0]);

        dashboard.sector_mut().unwrap().clear();
        dashboard.on_theme_changed(ThemeChanged { theme: Theme::Dark });

        let frame = dashboard.frame();
        assert_eq!(frame.charts[&Slot::Sector].data.datasets[0].data, before);
        assert_eq!(frame.sector.unwrap().summary, "Sectors selected (0)");
    }

    #[test]
    fn theme_change_rerenders_with_new_tokens_and_keeps_selection() {
        let mut dashboard = Dashboard::new(FrameBackend::default(), context(Theme::Light), page_data());
        dashboard.render_all();
        dashboard.sector_mut().unwrap().restore(&["B".to_string()], false);
        dashboard.apply_sector_filter();

        dashboard.on_theme_changed(ThemeChanged { theme: Theme::Dark });
        let frame = dashboard.frame();
        assert_eq!(frame.theme, Theme::Dark);
        assert_eq!(frame.charts.len(), 5);

        let sector = &frame.charts[&Slot::Sector].data.datasets[0];
        assert_eq!(sector.data, vec![30.0]);
        assert_eq!(
            sector.background_color,
            Some(Indexable::Each(vec!["#8ab4f8".to_string()]))
        );
    }

    #[test]
    fn page_data_flattens_benchmark_metrics() {
        let detail = crate::company::company_detail(
            "000001",
            &crate::models::AppData {
                rows: vec![crate::models::CompanyYear {
                    stock_code: "000001".into(),
                    year: 2023,
                    company_name: "Acme".into(),
                    industry_name: Some("Retail".into()),
                    default_prob: Some(0.3),
                    ..Default::default()
                }],
            },
        )
        .unwrap();
        let data = PageData::from_detail(&detail).unwrap();
        assert_eq!(data.benchmarks.len(), 11);
        assert_eq!(data.surfaces().len(), 3 + 11);
        assert_eq!(data.sector.as_ref().unwrap().highlight(), Some("Retail"));
    }
}

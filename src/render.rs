//! Chart config builders, one per chart kind.
//!
//! Builders are pure: the same inputs and tokens always give the same config.
//! Binding configs to slots happens in [`crate::dashboard`].

use crate::charts::{
    Align, Anchor, Animation, ChartConfig, ChartData, ChartKind, ChartOptions, DataLabels,
    Dataset, Font, Grid, IndexAxis, Indexable, Plugins, Scale, Scales, Ticks, Toggle,
};
use crate::labels::WrappedLabel;
use crate::sector::SectorBar;
use crate::theme::ThemeTokens;
use serde::{Deserialize, Serialize};

pub const CAUTION_THRESHOLD: f64 = 33.33;
pub const DANGER_THRESHOLD: f64 = 66.67;

const GAUGE_SEGMENTS: [f64; 3] = [33.33, 33.33, 33.34];
const GAUGE_INDICATOR_WIDTH: f64 = 2.0;
const BENCHMARK_REFERENCE_COLOR: &str = "#bdc1c6";
const BENCHMARK_AXIS_GRACE: f64 = 1.1;
const BENCHMARK_INSIDE_RATIO: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Good,
    Caution,
    Danger,
}

impl Band {
    /// Boundary scores belong to the higher band.
    pub fn classify(score: f64) -> Self {
        if score >= DANGER_THRESHOLD {
            Band::Danger
        } else if score >= CAUTION_THRESHOLD {
            Band::Caution
        } else {
            Band::Good
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Good => "Good",
            Band::Caution => "Caution",
            Band::Danger => "Danger",
        }
    }

    pub fn color(self, tokens: &ThemeTokens) -> &str {
        match self {
            Band::Good => &tokens.success,
            Band::Caution => &tokens.warning,
            Band::Danger => &tokens.danger,
        }
    }
}

/// The text shown next to the gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugeStatus {
    pub score: String,
    pub band: Band,
    pub label: String,
    pub color: String,
}

/// Half-ring gauge with a thin indicator at `score`. Non-finite scores render
/// nothing.
pub fn gauge_chart(score: f64, tokens: &ThemeTokens) -> Option<(ChartConfig, GaugeStatus)> {
    if !score.is_finite() {
        return None;
    }

    let band = Band::classify(score);
    let status = GaugeStatus {
        score: format!("{score:.1}"),
        band,
        label: band.label().to_string(),
        color: band.color(tokens).to_string(),
    };

    let position = score.clamp(0.0, 100.0);
    let remainder = (100.0 - position - GAUGE_INDICATOR_WIDTH).max(0.0);

    let background = Dataset {
        data: GAUGE_SEGMENTS.to_vec(),
        background_color: Some(Indexable::Each(vec![
            tokens.success.clone(),
            tokens.warning.clone(),
            tokens.danger.clone(),
        ])),
        border_width: Some(0.0),
        ..Dataset::default()
    };
    let indicator = Dataset {
        data: vec![position, GAUGE_INDICATOR_WIDTH, remainder],
        background_color: Some(Indexable::Each(vec![
            "transparent".to_string(),
            tokens.text_primary.clone(),
            "transparent".to_string(),
        ])),
        border_width: Some(0.0),
        ..Dataset::default()
    };

    let config = ChartConfig {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: Vec::new(),
            datasets: vec![background, indicator],
        },
        options: ChartOptions {
            maintain_aspect_ratio: true,
            circumference: Some(180.0),
            rotation: Some(270.0),
            cutout: Some("60%".to_string()),
            plugins: Plugins {
                legend: Toggle::hidden(),
                tooltip: Some(Toggle::enabled(false)),
                datalabels: DataLabels {
                    display: Some(false),
                    ..DataLabels::default()
                },
            },
            animation: Some(Animation {
                animate_rotate: false,
            }),
            ..ChartOptions::default()
        },
    };

    Some((config, status))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    /// Percentage, `0..=100`.
    pub value: f64,
}

pub fn trend_chart(points: &[TrendPoint], tokens: &ThemeTokens) -> Option<ChartConfig> {
    if points.is_empty() {
        return None;
    }

    let dataset = Dataset {
        label: Some("Default probability".to_string()),
        data: points.iter().map(|p| p.value).collect(),
        border_color: Some(tokens.danger.clone()),
        background_color: Some(Indexable::All(with_alpha(&tokens.danger, "33"))),
        fill: Some(true),
        tension: Some(0.4),
        point_background_color: Some(tokens.surface.clone()),
        point_border_color: Some(tokens.danger.clone()),
        point_radius: Some(5.0),
        point_hover_radius: Some(7.0),
        value_labels: points.iter().map(|p| percent_label(p.value)).collect(),
        ..Dataset::default()
    };

    Some(ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels: points
                .iter()
                .map(|p| WrappedLabel::Single(p.label.clone()))
                .collect(),
            datasets: vec![dataset],
        },
        options: ChartOptions {
            scales: Some(Scales {
                x: Some(Scale {
                    ticks: Some(ticks(tokens, None)),
                    grid: Some(grid_color(tokens)),
                    ..Scale::default()
                }),
                y: Some(Scale {
                    begin_at_zero: Some(true),
                    ticks: Some(ticks(tokens, Some("%"))),
                    grid: Some(grid_color(tokens)),
                    ..Scale::default()
                }),
            }),
            plugins: Plugins {
                datalabels: DataLabels {
                    anchor: Some(Anchor::End),
                    align: Some(Indexable::All(Align::End)),
                    color: Some(Indexable::All(tokens.text_secondary.clone())),
                    font: Some(Font::weight("bold")),
                    ..DataLabels::default()
                },
                ..Plugins::default()
            },
            ..ChartOptions::default()
        },
    })
}

pub fn sector_chart(bars: &[SectorBar], tokens: &ThemeTokens) -> ChartConfig {
    let dataset = Dataset {
        label: Some("Default probability".to_string()),
        data: bars.iter().map(|bar| bar.percent).collect(),
        background_color: Some(Indexable::Each(
            bars.iter()
                .map(|bar| {
                    if bar.highlighted {
                        tokens.success.clone()
                    } else {
                        tokens.primary.clone()
                    }
                })
                .collect(),
        )),
        border_radius: Some(4.0),
        value_labels: bars.iter().map(|bar| percent_label(bar.percent)).collect(),
        ..Dataset::default()
    };

    ChartConfig {
        kind: ChartKind::Bar,
        data: ChartData {
            labels: bars.iter().map(|bar| bar.wrapped.clone()).collect(),
            datasets: vec![dataset],
        },
        options: ChartOptions {
            index_axis: Some(IndexAxis::Y),
            scales: Some(Scales {
                x: Some(Scale {
                    begin_at_zero: Some(true),
                    max: Some(100.0),
                    ticks: Some(ticks(tokens, Some("%"))),
                    grid: Some(grid_color(tokens)),
                    ..Scale::default()
                }),
                y: Some(Scale {
                    ticks: Some(ticks(tokens, None)),
                    grid: Some(Grid {
                        color: None,
                        display: Some(false),
                    }),
                    ..Scale::default()
                }),
            }),
            plugins: Plugins {
                datalabels: DataLabels {
                    anchor: Some(Anchor::End),
                    align: Some(Indexable::All(Align::Start)),
                    color: Some(Indexable::All(tokens.surface.clone())),
                    ..DataLabels::default()
                },
                ..Plugins::default()
            },
            ..ChartOptions::default()
        },
    }
}

/// Where a benchmark bar's value label sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPlacement {
    /// At the end of the bar, inside it, in the surface color.
    Inside,
    /// Past the end of the bar in the default text color.
    Outside,
}

impl LabelPlacement {
    /// Long bars get their label inside so it is not clipped at the edge of
    /// the axis, which ends 10% past the larger value.
    pub fn for_value(value: f64, subject: f64, reference: f64) -> Self {
        let axis_max = subject.max(reference) * BENCHMARK_AXIS_GRACE;
        if value > axis_max * BENCHMARK_INSIDE_RATIO {
            LabelPlacement::Inside
        } else {
            LabelPlacement::Outside
        }
    }

    fn align(self) -> Align {
        match self {
            LabelPlacement::Inside => Align::Start,
            LabelPlacement::Outside => Align::End,
        }
    }

    fn color(self, tokens: &ThemeTokens) -> String {
        match self {
            LabelPlacement::Inside => tokens.surface.clone(),
            LabelPlacement::Outside => tokens.text_primary.clone(),
        }
    }
}

pub fn benchmark_chart(subject: f64, reference: f64, tokens: &ThemeTokens) -> ChartConfig {
    let values = [subject, reference];
    let placements: Vec<LabelPlacement> = values
        .iter()
        .map(|value| LabelPlacement::for_value(*value, subject, reference))
        .collect();

    let dataset = Dataset {
        data: values.to_vec(),
        background_color: Some(Indexable::Each(vec![
            tokens.primary.clone(),
            BENCHMARK_REFERENCE_COLOR.to_string(),
        ])),
        border_radius: Some(4.0),
        bar_percentage: Some(0.9),
        category_percentage: Some(1.0),
        value_labels: values.iter().map(|value| format!("{value:.1}")).collect(),
        ..Dataset::default()
    };

    ChartConfig {
        kind: ChartKind::Bar,
        data: ChartData {
            labels: vec![
                WrappedLabel::Single(String::new()),
                WrappedLabel::Single(String::new()),
            ],
            datasets: vec![dataset],
        },
        options: ChartOptions {
            index_axis: Some(IndexAxis::Y),
            scales: Some(Scales {
                x: Some(Scale {
                    display: Some(false),
                    begin_at_zero: Some(true),
                    grace: Some("10%".to_string()),
                    ..Scale::default()
                }),
                y: Some(Scale {
                    display: Some(false),
                    ..Scale::default()
                }),
            }),
            plugins: Plugins {
                legend: Toggle::hidden(),
                tooltip: Some(Toggle::enabled(true)),
                datalabels: DataLabels {
                    anchor: Some(Anchor::End),
                    align: Some(Indexable::Each(
                        placements.iter().map(|p| p.align()).collect(),
                    )),
                    offset: Some(4.0),
                    color: Some(Indexable::Each(
                        placements.iter().map(|p| p.color(tokens)).collect(),
                    )),
                    font: Some(Font::weight("500")),
                    ..DataLabels::default()
                },
            },
            ..ChartOptions::default()
        },
    }
}

fn percent_label(value: f64) -> String {
    format!("{value:.1}%")
}

fn with_alpha(color: &str, alpha: &str) -> String {
    if color.is_empty() {
        String::new()
    } else {
        format!("{color}{alpha}")
    }
}

fn ticks(tokens: &ThemeTokens, suffix: Option<&str>) -> Ticks {
    Ticks {
        color: tokens.text_secondary.clone(),
        suffix: suffix.map(str::to_string),
    }
}

fn grid_color(tokens: &ThemeTokens) -> Grid {
    Grid {
        color: Some(tokens.border.clone()),
        display: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::wrap_label;

    fn tokens() -> ThemeTokens {
        ThemeTokens {
            primary: "#1a73e8".into(),
            danger: "#d93025".into(),
            warning: "#f9ab00".into(),
            success: "#1e8e3e".into(),
            text_primary: "#202124".into(),
            text_secondary: "#5f6368".into(),
            border: "#dadce0".into(),
            surface: "#ffffff".into(),
        }
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(Band::classify(0.0), Band::Good);
        assert_eq!(Band::classify(33.32), Band::Good);
        assert_eq!(Band::classify(33.33), Band::Caution);
        assert_eq!(Band::classify(66.66), Band::Caution);
        assert_eq!(Band::classify(66.67), Band::Danger);
        assert_eq!(Band::classify(100.0), Band::Danger);
    }

    #[test]
    fn gauge_reports_status_in_band_color() {
        let (config, status) = gauge_chart(72.5, &tokens()).unwrap();
        assert_eq!(status.score, "72.5");
        assert_eq!(status.band, Band::Danger);
        assert_eq!(status.label, "Danger");
        assert_eq!(status.color, "#d93025");

        assert_eq!(config.kind, ChartKind::Doughnut);
        assert_eq!(config.options.circumference, Some(180.0));
        assert_eq!(config.data.datasets[0].data, vec![33.33, 33.33, 33.34]);
        assert_eq!(config.data.datasets[1].data, vec![72.5, 2.0, 25.5]);
    }

    #[test]
    fn gauge_indicator_never_goes_negative() {
        let (config, _) = gauge_chart(99.5, &tokens()).unwrap();
        assert_eq!(config.data.datasets[1].data, vec![99.5, 2.0, 0.0]);
    }

    #[test]
    fn gauge_skips_non_numeric_score() {
        assert!(gauge_chart(f64::NAN, &tokens()).is_none());
        assert!(gauge_chart(f64::INFINITY, &tokens()).is_none());
    }

    #[test]
    fn trend_labels_points_with_percent() {
        let points = vec![
            TrendPoint {
                label: "2022".into(),
                value: 4.0,
            },
            TrendPoint {
                label: "2023".into(),
                value: 6.26,
            },
        ];
        let config = trend_chart(&points, &tokens()).unwrap();
        let dataset = &config.data.datasets[0];
        assert_eq!(dataset.value_labels, vec!["4.0%", "6.3%"]);
        assert_eq!(
            dataset.background_color,
            Some(Indexable::All("#d9302533".to_string()))
        );
        assert_eq!(config.data.labels.len(), 2);
    }

    #[test]
    fn trend_without_points_is_skipped() {
        assert!(trend_chart(&[], &tokens()).is_none());
    }

    #[test]
    fn trend_tolerates_missing_tokens() {
        let points = vec![TrendPoint {
            label: "2023".into(),
            value: 1.0,
        }];
        let config = trend_chart(&points, &ThemeTokens::default()).unwrap();
        assert_eq!(
            config.data.datasets[0].background_color,
            Some(Indexable::All(String::new()))
        );
    }

    #[test]
    fn sector_colors_highlight_bar() {
        let bars = vec![
            SectorBar {
                label: "A".into(),
                wrapped: wrap_label("A", 10),
                percent: 70.0,
                highlighted: false,
            },
            SectorBar {
                label: "H".into(),
                wrapped: wrap_label("H", 10),
                percent: 50.0,
                highlighted: true,
            },
        ];
        let config = sector_chart(&bars, &tokens());
        let dataset = &config.data.datasets[0];
        assert_eq!(dataset.data, vec![70.0, 50.0]);
        assert_eq!(
            dataset.background_color,
            Some(Indexable::Each(vec!["#1a73e8".into(), "#1e8e3e".into()]))
        );
        assert_eq!(config.options.index_axis, Some(IndexAxis::Y));
        let x = config.options.scales.as_ref().and_then(|s| s.x.as_ref()).unwrap();
        assert_eq!(x.max, Some(100.0));
    }

    #[test]
    fn benchmark_placement_threshold() {
        // axis max = 11.0, inside above 8.8
        assert_eq!(LabelPlacement::for_value(10.0, 10.0, 5.0), LabelPlacement::Inside);
        assert_eq!(LabelPlacement::for_value(5.0, 10.0, 5.0), LabelPlacement::Outside);
        assert_eq!(LabelPlacement::for_value(9.0, 10.0, 9.0), LabelPlacement::Inside);
        assert_eq!(LabelPlacement::for_value(8.8, 10.0, 8.8), LabelPlacement::Outside);
    }

    #[test]
    fn benchmark_labels_follow_placement() {
        let config = benchmark_chart(10.0, 5.0, &tokens());
        let labels = &config.options.plugins.datalabels;
        assert_eq!(
            labels.align,
            Some(Indexable::Each(vec![Align::Start, Align::End]))
        );
        assert_eq!(
            labels.color,
            Some(Indexable::Each(vec!["#ffffff".into(), "#202124".into()]))
        );
        assert_eq!(config.data.datasets[0].value_labels, vec!["10.0", "5.0"]);
        let x = config.options.scales.as_ref().and_then(|s| s.x.as_ref()).unwrap();
        assert_eq!(x.display, Some(false));
    }
}

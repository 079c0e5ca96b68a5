//! Declarative chart configs in the shape the page's charting library takes.
//!
//! Anything the library would compute through a callback is carried as data
//! instead: `ticks.suffix` for axis tick text and `valueLabels` for the
//! pre-formatted data labels. The page script maps both onto callbacks.

use crate::labels::WrappedLabel;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ChartData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<WrappedLabel>,
    pub datasets: Vec<Dataset>,
}

/// A single value applied to every point, or one value per point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Indexable<T> {
    All(T),
    Each(Vec<T>),
}

impl<T> Indexable<T> {
    pub fn at(&self, index: usize) -> Option<&T> {
        match self {
            Indexable::All(value) => Some(value),
            Indexable::Each(values) => values.get(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Indexable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_hover_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_labels: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexAxis {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_axis: Option<IndexAxis>,
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub circumference: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cutout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scales: Option<Scales>,
    pub plugins: Plugins,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            index_axis: None,
            responsive: true,
            maintain_aspect_ratio: false,
            circumference: None,
            rotation: None,
            cutout: None,
            scales: None,
            plugins: Plugins::default(),
            animation: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub animate_rotate: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scales {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Scale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Scale>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_at_zero: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Ticks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Ticks {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Grid {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toggle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl Toggle {
    pub fn hidden() -> Self {
        Self {
            display: Some(false),
            enabled: None,
        }
    }

    pub fn enabled(enabled: bool) -> Self {
        Self {
            display: None,
            enabled: Some(enabled),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Toggle,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Toggle>,
    pub datalabels: DataLabels,
}

impl Default for Plugins {
    fn default() -> Self {
        Self {
            legend: Toggle::hidden(),
            tooltip: None,
            datalabels: DataLabels::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Start,
    End,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Anchor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub align: Option<Indexable<Align>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Indexable<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<Font>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Font {
    pub weight: String,
}

impl Font {
    pub fn weight(weight: &str) -> Self {
        Self {
            weight: weight.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_serializes_with_library_field_names() {
        let config = ChartConfig {
            kind: ChartKind::Bar,
            data: ChartData {
                labels: vec![WrappedLabel::Single("A".into())],
                datasets: vec![Dataset {
                    data: vec![1.0],
                    background_color: Some(Indexable::Each(vec!["#fff".into()])),
                    border_radius: Some(4.0),
                    value_labels: vec!["1.0%".into()],
                    ..Dataset::default()
                }],
            },
            options: ChartOptions {
                index_axis: Some(IndexAxis::Y),
                ..ChartOptions::default()
            },
        };

        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["type"], json!("bar"));
        assert_eq!(value["data"]["labels"], json!(["A"]));
        assert_eq!(value["data"]["datasets"][0]["backgroundColor"], json!(["#fff"]));
        assert_eq!(value["data"]["datasets"][0]["borderRadius"], json!(4.0));
        assert_eq!(value["data"]["datasets"][0]["valueLabels"], json!(["1.0%"]));
        assert!(value["data"]["datasets"][0].get("fill").is_none());
        assert_eq!(value["options"]["indexAxis"], json!("y"));
        assert_eq!(value["options"]["maintainAspectRatio"], json!(false));
        assert_eq!(value["options"]["plugins"]["legend"], json!({ "display": false }));
    }

    #[test]
    fn indexable_lookup() {
        let all = Indexable::All(Align::End);
        assert_eq!(all.at(5), Some(&Align::End));
        let each = Indexable::Each(vec![Align::Start, Align::End]);
        assert_eq!(each.at(1), Some(&Align::End));
        assert_eq!(each.at(2), None);
    }
}

//! Selection state for the sector bar chart.

use crate::feed::SectorFeed;
use crate::labels::{DEFAULT_WRAP_WIDTH, WrappedLabel, wrap_label};
use serde::Serialize;
use tracing::debug;

const INITIAL_SELECTION: usize = 4;

/// One bar of the sector chart, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorBar {
    pub label: String,
    pub wrapped: WrappedLabel,
    pub percent: f64,
    pub highlighted: bool,
}

/// Filters `feed` down to `selected`, pinning the highlight label when
/// `keep_highlight` is set, and sorts by value descending. Equal values keep
/// their dataset order.
pub fn apply_filter(feed: &SectorFeed, selected: &[String], keep_highlight: bool) -> Vec<SectorBar> {
    let highlight = feed.highlight();
    let pinned = highlight.filter(|label| keep_highlight && !selected.iter().any(|s| s == label));

    let mut filtered: Vec<_> = feed
        .data()
        .iter()
        .filter(|d| selected.iter().any(|s| *s == d.label) || pinned == Some(d.label.as_str()))
        .collect();
    filtered.sort_by(|a, b| b.value.total_cmp(&a.value));

    filtered
        .into_iter()
        .map(|d| SectorBar {
            label: d.label.clone(),
            wrapped: wrap_label(&d.label, DEFAULT_WRAP_WIDTH),
            percent: d.value * 100.0,
            highlighted: highlight == Some(d.label.as_str()),
        })
        .collect()
}

/// The labels checked on first load: the highlight label, then dataset
/// entries in order until four labels are chosen.
pub fn initial_selection(feed: &SectorFeed) -> Vec<String> {
    let mut labels: Vec<String> = feed.highlight().map(str::to_string).into_iter().collect();
    for datum in feed.data() {
        if labels.len() >= INITIAL_SELECTION {
            break;
        }
        if !labels.contains(&datum.label) {
            labels.push(datum.label.clone());
        }
    }
    labels
}

/// The sector chart as last applied, with the summary of the live
/// checkboxes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorView {
    pub bars: Vec<SectorBar>,
    pub summary: String,
    pub selected_count: usize,
}

/// Filter panel state. The checkboxes and keep-highlight toggle change
/// freely; the chart only follows them once [`apply`](Self::apply) runs.
#[derive(Debug, Clone)]
pub struct SectorFilterController {
    feed: SectorFeed,
    checked: Vec<bool>,
    keep_highlight: bool,
    applied: Vec<String>,
    applied_keep_highlight: bool,
}

impl SectorFilterController {
    pub fn new(feed: SectorFeed) -> Self {
        let initial = initial_selection(&feed);
        let checked = feed
            .data()
            .iter()
            .map(|d| initial.contains(&d.label))
            .collect();
        let mut controller = Self {
            feed,
            checked,
            keep_highlight: true,
            applied: Vec::new(),
            applied_keep_highlight: true,
        };
        controller.applied = controller.selected();
        controller
    }

    pub fn feed(&self) -> &SectorFeed {
        &self.feed
    }

    /// Sets the checkboxes, as when a page posts its panel state. The chart
    /// keeps its applied selection. Unknown labels are ignored.
    pub fn restore(&mut self, selected: &[String], keep_highlight: bool) {
        for (datum, checked) in self.feed.data().iter().zip(self.checked.iter_mut()) {
            *checked = selected.contains(&datum.label);
        }
        self.keep_highlight = keep_highlight;
    }

    /// Sets both the checkboxes and the applied selection, as when a page
    /// reports what its chart currently shows.
    pub fn restore_applied(&mut self, selected: &[String], keep_highlight: bool) {
        self.restore(selected, keep_highlight);
        self.commit();
    }

    /// Unchecks everything. The chart keeps showing the last applied
    /// selection until [`apply`](Self::apply) runs.
    pub fn clear(&mut self) {
        self.checked.iter_mut().for_each(|c| *c = false);
    }

    pub fn keep_highlight(&self) -> bool {
        self.keep_highlight
    }

    pub fn selected(&self) -> Vec<String> {
        self.feed
            .data()
            .iter()
            .zip(&self.checked)
            .filter(|(_, checked)| **checked)
            .map(|(d, _)| d.label.clone())
            .collect()
    }

    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    pub fn selected_count(&self) -> usize {
        self.checked.iter().filter(|c| **c).count()
    }

    pub fn summary_text(&self) -> String {
        format!("Sectors selected ({})", self.selected_count())
    }

    /// The chart for the applied selection. Unapplied checkbox changes only
    /// show up in the summary.
    pub fn view(&self) -> SectorView {
        SectorView {
            bars: apply_filter(&self.feed, &self.applied, self.applied_keep_highlight),
            summary: self.summary_text(),
            selected_count: self.selected_count(),
        }
    }

    /// Makes the checkbox state the applied selection.
    pub fn apply(&mut self) -> SectorView {
        self.commit();
        let view = self.view();
        debug!(
            selected = view.selected_count,
            bars = view.bars.len(),
            keep_highlight = self.keep_highlight,
            "sector filter applied"
        );
        view
    }

    fn commit(&mut self) {
        self.applied = self.selected();
        self.applied_keep_highlight = self.keep_highlight;
    }
}

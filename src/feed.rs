use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorDatum {
    pub label: String,
    /// Probability in `[0, 1]`.
    pub value: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum FeedError {
    #[error("sector label at position {0} is empty")]
    EmptyLabel(usize),

    #[error("duplicate sector label: {0}")]
    DuplicateLabel(String),

    #[error("sector {label} has value {value} outside [0, 1]")]
    ValueOutOfRange { label: String, value: f64 },
}

/// The sector dataset the page is built from, checked once on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorFeed {
    data: Vec<SectorDatum>,
    highlight: Option<String>,
}

impl SectorFeed {
    pub fn new(data: Vec<SectorDatum>, highlight: Option<String>) -> Result<Self, FeedError> {
        let mut seen = HashSet::with_capacity(data.len());
        for (idx, datum) in data.iter().enumerate() {
            if datum.label.trim().is_empty() {
                return Err(FeedError::EmptyLabel(idx));
            }
            if !seen.insert(datum.label.as_str()) {
                return Err(FeedError::DuplicateLabel(datum.label.clone()));
            }
            if !datum.value.is_finite() || !(0.0..=1.0).contains(&datum.value) {
                return Err(FeedError::ValueOutOfRange {
                    label: datum.label.clone(),
                    value: datum.value,
                });
            }
        }

        let highlight = highlight.filter(|label| !label.is_empty());
        Ok(Self { data, highlight })
    }

    pub fn data(&self) -> &[SectorDatum] {
        &self.data
    }

    pub fn highlight(&self) -> Option<&str> {
        self.highlight.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datum(label: &str, value: f64) -> SectorDatum {
        SectorDatum {
            label: label.to_string(),
            value,
        }
    }

    #[test]
    fn accepts_well_formed_feed() {
        let feed = SectorFeed::new(
            vec![datum("A", 0.7), datum("B", 0.0), datum("H", 1.0)],
            Some("H".into()),
        )
        .unwrap();
        assert_eq!(feed.data().len(), 3);
        assert_eq!(feed.highlight(), Some("H"));
    }

    #[test]
    fn rejects_duplicate_labels() {
        let err = SectorFeed::new(vec![datum("A", 0.1), datum("A", 0.2)], None).unwrap_err();
        assert_eq!(err, FeedError::DuplicateLabel("A".into()));
    }

    #[test]
    fn rejects_out_of_range_and_nan_values() {
        assert!(matches!(
            SectorFeed::new(vec![datum("A", 1.5)], None),
            Err(FeedError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            SectorFeed::new(vec![datum("A", f64::NAN)], None),
            Err(FeedError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_blank_label() {
        let err = SectorFeed::new(vec![datum("A", 0.1), datum("  ", 0.2)], None).unwrap_err();
        assert_eq!(err, FeedError::EmptyLabel(1));
    }

    #[test]
    fn empty_highlight_is_treated_as_absent() {
        let feed = SectorFeed::new(vec![datum("A", 0.1)], Some(String::new())).unwrap();
        assert_eq!(feed.highlight(), None);
    }
}

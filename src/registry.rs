//! Live chart instances, at most one per page slot.

use crate::charts::ChartConfig;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::trace;

/// A fixed location on the page that holds one chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Gauge,
    Trend,
    Sector,
    Benchmark(usize),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Gauge => f.write_str("riskGaugeChart"),
            Slot::Trend => f.write_str("riskTrendChart"),
            Slot::Sector => f.write_str("sectorRiskChart"),
            Slot::Benchmark(index) => write!(f, "benchmarkChart_{index}"),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub trait ChartHandle {
    /// Releases the drawing context bound to this instance.
    fn destroy(self);
}

/// The charting library: turns a config into a live instance on a slot's
/// drawing surface.
pub trait ChartBackend {
    type Handle: ChartHandle;

    fn has_surface(&self, _slot: Slot) -> bool {
        true
    }

    fn create(&mut self, slot: Slot, config: ChartConfig) -> Self::Handle;
}

pub struct ChartRegistry<H> {
    live: BTreeMap<Slot, H>,
}

impl<H> Default for ChartRegistry<H> {
    fn default() -> Self {
        Self {
            live: BTreeMap::new(),
        }
    }
}

impl<H: ChartHandle> ChartRegistry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys the current occupant of `slot` before `create` runs, so two
    /// instances never coexist on one surface.
    pub fn rebind(&mut self, slot: Slot, create: impl FnOnce() -> H) {
        self.destroy(slot);
        self.live.insert(slot, create());
    }

    pub fn destroy(&mut self, slot: Slot) -> bool {
        match self.live.remove(&slot) {
            Some(handle) => {
                trace!(%slot, "destroyed chart");
                handle.destroy();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, slot: Slot) -> Option<&H> {
        self.live.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &H)> {
        self.live.iter().map(|(slot, handle)| (*slot, handle))
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

/// A chart materialized as its config, for shipping to the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub config: ChartConfig,
}

impl ChartHandle for RenderedChart {
    fn destroy(self) {}
}

/// Backend that records configs instead of drawing. `surfaces` restricts
/// rendering to the slots present on the page; `None` means all of them.
#[derive(Debug, Clone, Default)]
pub struct FrameBackend {
    surfaces: Option<BTreeSet<Slot>>,
}

impl FrameBackend {
    pub fn with_surfaces(surfaces: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            surfaces: Some(surfaces.into_iter().collect()),
        }
    }
}

impl ChartBackend for FrameBackend {
    type Handle = RenderedChart;

    fn has_surface(&self, slot: Slot) -> bool {
        self.surfaces
            .as_ref()
            .is_none_or(|surfaces| surfaces.contains(&slot))
    }

    fn create(&mut self, _slot: Slot, config: ChartConfig) -> RenderedChart {
        RenderedChart { config }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Events(RefCell<Vec<String>>);

    struct Marker {
        id: u32,
        events: Rc<Events>,
    }

    impl ChartHandle for Marker {
        fn destroy(self) {
            self.events.0.borrow_mut().push(format!("destroy {}", self.id));
        }
    }

    fn marker(id: u32, events: &Rc<Events>) -> Marker {
        events.0.borrow_mut().push(format!("create {id}"));
        Marker {
            id,
            events: Rc::clone(events),
        }
    }

    #[test]
    fn slot_ids_match_page_elements() {
        assert_eq!(Slot::Gauge.to_string(), "riskGaugeChart");
        assert_eq!(Slot::Trend.to_string(), "riskTrendChart");
        assert_eq!(Slot::Sector.to_string(), "sectorRiskChart");
        assert_eq!(Slot::Benchmark(3).to_string(), "benchmarkChart_3");
        assert_eq!(
            serde_json::to_value(Slot::Benchmark(0)).unwrap(),
            serde_json::json!("benchmarkChart_0")
        );
    }

    #[test]
    fn rebind_destroys_before_creating() {
        let events = Rc::new(Events::default());
        let mut registry = ChartRegistry::new();
        registry.rebind(Slot::Sector, || marker(1, &events));
        registry.rebind(Slot::Sector, || marker(2, &events));

        assert_eq!(
            *events.0.borrow(),
            vec!["create 1", "destroy 1", "create 2"]
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(Slot::Sector).map(|p| p.id), Some(2));
    }

    #[test]
    fn destroy_empties_slot_once() {
        let events = Rc::new(Events::default());
        let mut registry = ChartRegistry::new();
        registry.rebind(Slot::Gauge, || marker(1, &events));
        registry.rebind(Slot::Trend, || marker(2, &events));

        assert!(registry.destroy(Slot::Gauge));
        assert!(!registry.destroy(Slot::Gauge));
        assert!(registry.destroy(Slot::Trend));
        assert!(registry.is_empty());
        let destroyed = events
            .0
            .borrow()
            .iter()
            .filter(|e| e.starts_with("destroy"))
            .count();
        assert_eq!(destroyed, 2);
    }

    #[test]
    fn frame_backend_respects_surfaces() {
        let backend = FrameBackend::with_surfaces([Slot::Gauge]);
        assert!(backend.has_surface(Slot::Gauge));
        assert!(!backend.has_surface(Slot::Sector));
        assert!(FrameBackend::default().has_surface(Slot::Benchmark(9)));
    }
}

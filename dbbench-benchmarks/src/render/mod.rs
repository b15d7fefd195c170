//! Rendering primitive
//!
//! The engine never draws anything itself. It hands a declarative
//! [`ChartSpec`] to a [`ChartBackend`], mutates the returned [`LiveChart`]'s
//! buffers in place, asks it to redraw, and finally disposes it.

use dbbench_common::{Engine, EngineProfile, EngineProfiles};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::series::{EngineValues, NormalizedSeries};

pub mod html;
pub mod memory;

pub use html::{HtmlBackend, HtmlChart};
pub use memory::{MemoryBackend, MemoryChart, RenderEvent, RenderLog};

/// Chart type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

impl ChartKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One engine's series in a chart. `None` is a gap, never zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    pub values: Vec<Option<f64>>,
    pub color: String,
}

impl Dataset {
    pub fn for_engine(profile: &EngineProfile, values: Vec<Option<f64>>) -> Self {
        Self {
            label: profile.label.clone(),
            values,
            color: profile.color.clone(),
        }
    }
}

/// Declarative chart description: categories plus one dataset per engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub categories: Vec<String>,
    pub datasets: [Dataset; 2],
}

impl ChartSpec {
    /// A chart with empty buffers, ready to be grown point by point
    pub fn empty(kind: ChartKind, engines: &EngineProfiles) -> Self {
        Self {
            kind,
            categories: Vec::new(),
            datasets: Engine::ALL.map(|engine| Dataset::for_engine(engines.get(engine), Vec::new())),
        }
    }

    /// A chart whose categories and values are exactly `series`
    pub fn from_series(kind: ChartKind, series: &NormalizedSeries, engines: &EngineProfiles) -> Self {
        Self {
            kind,
            categories: series.categories().map(str::to_string).collect(),
            datasets: Engine::ALL
                .map(|engine| Dataset::for_engine(engines.get(engine), series.values_for(engine))),
        }
    }

    /// Append one category and its value pair to every buffer
    pub fn push_point(&mut self, category: impl Into<String>, values: EngineValues) {
        self.categories.push(category.into());
        for engine in Engine::ALL {
            self.datasets[engine.index()].values.push(values.get(engine));
        }
    }

    pub fn dataset(&self, engine: Engine) -> &Dataset {
        &self.datasets[engine.index()]
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// A rendered chart instance. At most one is alive per presenter.
pub trait LiveChart {
    fn spec(&self) -> &ChartSpec;

    /// Buffers for in-place mutation; call [`LiveChart::update`] afterwards
    fn spec_mut(&mut self) -> &mut ChartSpec;

    /// Redraw after the buffers changed
    fn update(&mut self);

    /// Release every resource held by the instance
    fn dispose(self);
}

/// Factory for live charts
pub trait ChartBackend {
    type Chart: LiveChart;

    fn render(&mut self, spec: ChartSpec) -> Self::Chart;
}

//! Chart presenter
//!
//! Owns the single live chart instance. Replace mode rebuilds it from scratch
//! for every result; append mode grows one trend chart by a point per call.
//! An instance is always disposed before its successor is rendered, so two
//! live instances never coexist.

use dbbench_common::EngineProfiles;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::render::{ChartBackend, ChartKind, ChartSpec, LiveChart};
use crate::series::NormalizedSeries;

/// How a result reaches the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentMode {
    /// Dispose the current chart and render the series as a fresh snapshot
    Replace,
    /// Push one point onto a running trend chart
    Append,
}

struct LivePlot<C> {
    chart: C,
    kind: ChartKind,
    mode: PresentMode,
}

pub struct ChartPresenter<B: ChartBackend> {
    backend: B,
    engines: EngineProfiles,
    live: Option<LivePlot<B::Chart>>,
}

impl<B: ChartBackend> ChartPresenter<B> {
    pub fn new(backend: B, engines: EngineProfiles) -> Self {
        Self {
            backend,
            engines,
            live: None,
        }
    }

    pub fn present(&mut self, series: &NormalizedSeries, kind: ChartKind, mode: PresentMode) {
        match mode {
            PresentMode::Replace => self.replace(series, kind),
            PresentMode::Append => self.append(series, kind),
        }
    }

    fn replace(&mut self, series: &NormalizedSeries, kind: ChartKind) {
        self.release();
        let chart = self
            .backend
            .render(ChartSpec::from_series(kind, series, &self.engines));
        debug!("Rendered {} chart with {} categories", kind, series.len());
        self.live = Some(LivePlot {
            chart,
            kind,
            mode: PresentMode::Replace,
        });
    }

    fn append(&mut self, series: &NormalizedSeries, kind: ChartKind) {
        let Some(point) = series.trend_point() else {
            debug!("Empty series, nothing to append");
            return;
        };

        let reusable = matches!(
            &self.live,
            Some(plot) if plot.mode == PresentMode::Append && plot.kind == kind
        );
        if !reusable {
            if let Some(plot) = &self.live {
                if plot.mode == PresentMode::Append {
                    warn!("Trend chart kind switched from {} to {}, starting over", plot.kind, kind);
                }
            }
            self.release();
            let chart = self.backend.render(ChartSpec::empty(kind, &self.engines));
            debug!("Started {} trend chart", kind);
            self.live = Some(LivePlot {
                chart,
                kind,
                mode: PresentMode::Append,
            });
        }

        if let Some(plot) = self.live.as_mut() {
            plot.chart.spec_mut().push_point(point.category, point.values);
            plot.chart.update();
            debug!("Trend chart now has {} points", plot.chart.spec().len());
        }
    }

    /// Dispose the live chart, if any
    pub fn release(&mut self) {
        if let Some(plot) = self.live.take() {
            plot.chart.dispose();
            debug!("Disposed {} chart", plot.kind);
        }
    }

    pub fn chart(&self) -> Option<&B::Chart> {
        self.live.as_ref().map(|plot| &plot.chart)
    }

    pub fn current_kind(&self) -> Option<ChartKind> {
        self.live.as_ref().map(|plot| plot.kind)
    }

    pub fn current_mode(&self) -> Option<PresentMode> {
        self.live.as_ref().map(|plot| plot.mode)
    }
}

impl<B: ChartBackend> Drop for ChartPresenter<B> {
    fn drop(&mut self) {
        self.release();
    }
}

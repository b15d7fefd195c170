//! Headless backend that records chart lifecycle events

use std::sync::{Arc, Mutex, MutexGuard};

use super::{ChartBackend, ChartKind, ChartSpec, LiveChart};

/// Lifecycle event of a memory chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    Render { id: u64, kind: ChartKind },
    Update { id: u64, points: usize },
    Dispose { id: u64 },
}

#[derive(Debug, Default)]
struct LogInner {
    next_id: u64,
    events: Vec<RenderEvent>,
}

/// Shared, cloneable record of everything a [`MemoryBackend`] did
#[derive(Debug, Clone, Default)]
pub struct RenderLog {
    inner: Arc<Mutex<LogInner>>,
}

impl RenderLog {
    fn lock(&self) -> MutexGuard<'_, LogInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, event: RenderEvent) {
        self.lock().events.push(event);
    }

    fn next_id(&self) -> u64 {
        let mut inner = self.lock();
        inner.next_id += 1;
        inner.next_id
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.lock().events.clone()
    }

    pub fn renders(&self) -> usize {
        self.count(|e| matches!(e, RenderEvent::Render { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|e| matches!(e, RenderEvent::Update { .. }))
    }

    pub fn disposes(&self) -> usize {
        self.count(|e| matches!(e, RenderEvent::Dispose { .. }))
    }

    /// Instances rendered but not yet disposed
    pub fn live(&self) -> usize {
        self.renders() - self.disposes()
    }

    fn count(&self, predicate: impl Fn(&RenderEvent) -> bool) -> usize {
        self.lock().events.iter().filter(|e| predicate(e)).count()
    }
}

/// Backend keeping charts in memory only
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    log: RenderLog,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the log; stays valid after the backend moves into a presenter
    pub fn log(&self) -> RenderLog {
        self.log.clone()
    }
}

impl ChartBackend for MemoryBackend {
    type Chart = MemoryChart;

    fn render(&mut self, spec: ChartSpec) -> MemoryChart {
        let id = self.log.next_id();
        self.log.record(RenderEvent::Render { id, kind: spec.kind });
        MemoryChart {
            id,
            spec,
            log: self.log.clone(),
        }
    }
}

#[derive(Debug)]
pub struct MemoryChart {
    id: u64,
    spec: ChartSpec,
    log: RenderLog,
}

impl MemoryChart {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl LiveChart for MemoryChart {
    fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut ChartSpec {
        &mut self.spec
    }

    fn update(&mut self) {
        self.log.record(RenderEvent::Update {
            id: self.id,
            points: self.spec.len(),
        });
    }

    fn dispose(self) {
        self.log.record(RenderEvent::Dispose { id: self.id });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbbench_common::EngineProfiles;

    #[test]
    fn test_log_tracks_lifecycle() {
        let mut backend = MemoryBackend::new();
        let log = backend.log();

        let mut first = backend.render(ChartSpec::empty(ChartKind::Line, &EngineProfiles::default()));
        first.update();
        assert_eq!(log.live(), 1);

        first.dispose();
        let second = backend.render(ChartSpec::empty(ChartKind::Bar, &EngineProfiles::default()));
        assert_eq!(second.id(), 2);
        assert_eq!(log.renders(), 2);
        assert_eq!(log.updates(), 1);
        assert_eq!(log.disposes(), 1);
        assert_eq!(log.live(), 1);
        assert_eq!(
            log.events()[..3],
            [
                RenderEvent::Render { id: 1, kind: ChartKind::Line },
                RenderEvent::Update { id: 1, points: 0 },
                RenderEvent::Dispose { id: 1 },
            ]
        );
    }
}

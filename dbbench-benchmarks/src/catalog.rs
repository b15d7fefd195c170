//! The test catalog: one authoritative table keyed by [`TestKind`].
//!
//! Each entry binds a kind to the remote operation that runs it, the shape
//! family its payload belongs to, the chart kind it is drawn with, and the
//! presentation mode. Dispatch, extraction and chart selection all read this
//! table instead of branching on the kind themselves.

use dbbench_common::{Engine, TestKind};

use crate::presenter::PresentMode;
use crate::render::ChartKind;
use crate::source::{RawResult, ResultSource, TransportError};

/// Payload field names carrying each engine's value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPair {
    pub engine_a: &'static str,
    pub engine_b: &'static str,
}

impl FieldPair {
    pub const fn new(engine_a: &'static str, engine_b: &'static str) -> Self {
        Self { engine_a, engine_b }
    }

    pub fn get(&self, engine: Engine) -> &'static str {
        match engine {
            Engine::A => self.engine_a,
            Engine::B => self.engine_b,
        }
    }
}

/// A fixed, axis-labeled sub-metric of a prefix-aggregated payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubMetric {
    pub label: &'static str,
    pub fields: FieldPair,
}

/// One measured condition of an asymmetric-engine payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub label: &'static str,
    pub field: &'static str,
}

/// Structural family of a raw result.
///
/// Payloads carry no type tag, so the family is fixed per kind here and the
/// extractor dispatches on it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeFamily {
    /// Trial name -> record with one field per engine; missing fields read as 0
    KeyedTrials { fields: FieldPair },
    /// Flat record scanned by engine prefix for the headline average, with a
    /// fixed list of sub-metrics for the chart axis
    PrefixAggregated { metrics: &'static [SubMetric] },
    /// Exactly one field per engine
    SinglePair {
        category: &'static str,
        fields: FieldPair,
    },
    /// Two conditions measured on a single engine; the other engine is absent
    AsymmetricEngine {
        engine: Engine,
        conditions: [Condition; 2],
    },
}

impl ShapeFamily {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeFamily::KeyedTrials { .. } => "keyed-map-of-trials",
            ShapeFamily::PrefixAggregated { .. } => "prefix-aggregated",
            ShapeFamily::SinglePair { .. } => "single-pair",
            ShapeFamily::AsymmetricEngine { .. } => "asymmetric-engine",
        }
    }
}

const ENGINE_TIME_FIELDS: FieldPair = FieldPair::new("postgresTimeMs", "mongoTimeMs");

/// Read sub-metrics in chart order
pub const READ_METRICS: [SubMetric; 4] = [
    SubMetric {
        label: "Find all",
        fields: FieldPair::new("postgresFindAllTimeMs", "mongoFindAllTimeMs"),
    },
    SubMetric {
        label: "Filter",
        fields: FieldPair::new("postgresWithFilterTimeMs", "mongoWithFilterTimeMs"),
    },
    SubMetric {
        label: "Filter + projection",
        fields: FieldPair::new(
            "postgresWithFilterAndProjectionTimeMs",
            "mongoWithFilterAndProjectionTimeMs",
        ),
    },
    SubMetric {
        label: "Filter + projection + sort",
        fields: FieldPair::new(
            "postgresWithFilterAndProjectionAndSortTimeMs",
            "mongoWithFilterAndProjectionAndSortTimeMs",
        ),
    },
];

/// Everything downstream needs to know about one test kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub kind: TestKind,
    /// Endpoint path relative to the configured base URL
    pub path: &'static str,
    /// Label identifying a run of this kind on a trend axis
    pub label: &'static str,
    pub description: &'static str,
    pub shape: ShapeFamily,
    pub chart: ChartKind,
    pub mode: PresentMode,
}

impl CatalogEntry {
    /// Invoke this kind's remote operation on `source`
    pub async fn invoke<S>(&self, source: &S) -> Result<RawResult, TransportError>
    where
        S: ResultSource + ?Sized,
    {
        source.fetch(self.path).await
    }
}

static WRITES: CatalogEntry = CatalogEntry {
    kind: TestKind::Writes,
    path: "writes",
    label: "WRITES",
    description: "Bulk insert timings per dataset scale",
    shape: ShapeFamily::KeyedTrials {
        fields: ENGINE_TIME_FIELDS,
    },
    chart: ChartKind::Bar,
    mode: PresentMode::Replace,
};

static READS: CatalogEntry = CatalogEntry {
    kind: TestKind::Reads,
    path: "reads",
    label: "READS",
    description: "Find-all, filter, projection and sort query timings",
    shape: ShapeFamily::PrefixAggregated {
        metrics: &READ_METRICS,
    },
    chart: ChartKind::Line,
    mode: PresentMode::Replace,
};

static UPDATES: CatalogEntry = CatalogEntry {
    kind: TestKind::Updates,
    path: "updates",
    label: "UPDATES",
    description: "Bulk update timing",
    shape: ShapeFamily::SinglePair {
        category: "Update",
        fields: ENGINE_TIME_FIELDS,
    },
    chart: ChartKind::Bar,
    mode: PresentMode::Replace,
};

static DELETES: CatalogEntry = CatalogEntry {
    kind: TestKind::Deletes,
    path: "deletes",
    label: "DELETES",
    description: "Delete-all timing",
    shape: ShapeFamily::SinglePair {
        category: "Delete",
        fields: ENGINE_TIME_FIELDS,
    },
    chart: ChartKind::Bar,
    mode: PresentMode::Replace,
};

static INDEX_COMPARISON: CatalogEntry = CatalogEntry {
    kind: TestKind::IndexComparison,
    path: "mongo-index",
    label: "INDEX",
    description: "MongoDB lookup latency without and with an index",
    shape: ShapeFamily::AsymmetricEngine {
        engine: Engine::B,
        conditions: [
            Condition {
                label: "Without index",
                field: "mongoWithoutIndexTimeMs",
            },
            Condition {
                label: "With index",
                field: "mongoWithIndexTimeMs",
            },
        ],
    },
    chart: ChartKind::Bar,
    mode: PresentMode::Replace,
};

static AGGREGATION: CatalogEntry = CatalogEntry {
    kind: TestKind::Aggregation,
    path: "aggregation",
    label: "AGGREGATION",
    description: "Aggregation pipeline timing",
    shape: ShapeFamily::SinglePair {
        category: "Aggregate",
        fields: ENGINE_TIME_FIELDS,
    },
    chart: ChartKind::Bar,
    mode: PresentMode::Replace,
};

/// Static mapping from test kind to its catalog entry
pub struct TestCatalog;

impl TestCatalog {
    pub fn resolve(kind: TestKind) -> &'static CatalogEntry {
        match kind {
            TestKind::Writes => &WRITES,
            TestKind::Reads => &READS,
            TestKind::Updates => &UPDATES,
            TestKind::Deletes => &DELETES,
            TestKind::IndexComparison => &INDEX_COMPARISON,
            TestKind::Aggregation => &AGGREGATION,
        }
    }

    /// All entries in catalog order
    pub fn entries() -> impl Iterator<Item = &'static CatalogEntry> {
        TestKind::ALL.into_iter().map(Self::resolve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_kind_resolves_to_itself() {
        for kind in TestKind::ALL {
            assert_eq!(TestCatalog::resolve(kind).kind, kind);
        }
    }

    #[test]
    fn test_paths_and_labels_are_unique() {
        let paths: HashSet<_> = TestCatalog::entries().map(|e| e.path).collect();
        let labels: HashSet<_> = TestCatalog::entries().map(|e| e.label).collect();
        assert_eq!(paths.len(), TestKind::ALL.len());
        assert_eq!(labels.len(), TestKind::ALL.len());
    }

    #[test]
    fn test_reads_is_the_only_line_chart() {
        for entry in TestCatalog::entries() {
            let expected = if entry.kind == TestKind::Reads {
                ChartKind::Line
            } else {
                ChartKind::Bar
            };
            assert_eq!(entry.chart, expected, "{}", entry.kind);
            assert_eq!(entry.mode, PresentMode::Replace);
        }
    }

    #[test]
    fn test_shape_families() {
        assert_eq!(TestCatalog::resolve(TestKind::Writes).shape.name(), "keyed-map-of-trials");
        assert_eq!(TestCatalog::resolve(TestKind::Reads).shape.name(), "prefix-aggregated");
        assert_eq!(TestCatalog::resolve(TestKind::Deletes).shape.name(), "single-pair");
        assert_eq!(
            TestCatalog::resolve(TestKind::IndexComparison).shape.name(),
            "asymmetric-engine"
        );
    }
}

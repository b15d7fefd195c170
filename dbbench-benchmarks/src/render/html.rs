//! Chart.js HTML backend
//!
//! Each live chart owns a self-contained HTML document with its spec embedded
//! as JSON. `update` regenerates the document from the current buffers.

use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, warn};

use super::{ChartBackend, ChartKind, ChartSpec, LiveChart};

#[derive(Debug, Clone)]
pub struct HtmlBackend {
    title: String,
}

impl HtmlBackend {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }
}

impl Default for HtmlBackend {
    fn default() -> Self {
        Self::new("Postgres vs MongoDB Benchmarks")
    }
}

impl ChartBackend for HtmlBackend {
    type Chart = HtmlChart;

    fn render(&mut self, spec: ChartSpec) -> HtmlChart {
        let mut chart = HtmlChart {
            title: self.title.clone(),
            spec,
            document: String::new(),
            revision: 0,
            generated_at: Utc::now(),
        };
        chart.redraw();
        chart
    }
}

#[derive(Debug)]
pub struct HtmlChart {
    title: String,
    spec: ChartSpec,
    document: String,
    revision: u32,
    generated_at: DateTime<Utc>,
}

impl HtmlChart {
    /// Current document
    pub fn to_html(&self) -> &str {
        &self.document
    }

    /// Number of redraws since the chart was rendered
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        std::fs::write(path, &self.document)
    }

    fn redraw(&mut self) {
        let chart_data = match serde_json::to_string(&self.spec) {
            Ok(json) => escape_script_json(&json),
            Err(e) => {
                warn!("Failed to serialize chart data, keeping previous document: {}", e);
                return;
            }
        };
        self.generated_at = Utc::now();
        self.document = generate_document(&self.title, self.spec.kind, &chart_data, self.generated_at);
    }
}

impl LiveChart for HtmlChart {
    fn spec(&self) -> &ChartSpec {
        &self.spec
    }

    fn spec_mut(&mut self) -> &mut ChartSpec {
        &mut self.spec
    }

    fn update(&mut self) {
        self.revision += 1;
        self.redraw();
        debug!("HTML chart redrawn (revision {}, {} points)", self.revision, self.spec.len());
    }

    fn dispose(self) {
        debug!("HTML chart disposed after {} revisions", self.revision);
    }
}

fn generate_document(title: &str, kind: ChartKind, chart_data: &str, generated_at: DateTime<Utc>) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <!-- Chart.js -->
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 2rem; }}
        .chart-container {{ position: relative; max-width: 960px; }}
        .generated {{ color: #6c757d; font-size: 0.85rem; }}
    </style>
</head>
<body>
    <h1>{title}</h1>
    <p class="generated">Generated {generated} &middot; {kind} chart</p>
    <div class="chart-container">
        <canvas id="benchmarkChart"></canvas>
    </div>
    <script>
        // Chart data
        const chartSpec = {chart_data};

        document.addEventListener('DOMContentLoaded', function() {{
            new Chart(document.getElementById('benchmarkChart'), {{
                type: chartSpec.kind,
                data: {{
                    labels: chartSpec.categories,
                    datasets: chartSpec.datasets.map(function(ds) {{
                        return {{
                            label: ds.label,
                            data: ds.values,
                            backgroundColor: ds.color,
                            borderColor: ds.color,
                            spanGaps: false
                        }};
                    }})
                }},
                options: {{
                    responsive: true,
                    scales: {{ y: {{ beginAtZero: true, title: {{ display: true, text: 'ms' }} }} }}
                }}
            }});
        }});
    </script>
</body>
</html>
"#,
        title = title,
        generated = generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        kind = kind,
        chart_data = chart_data,
    )
}

/// Make serialized JSON safe inside an inline `<script>` block.
///
/// `<`, `>` and `&` only occur inside JSON strings, where the `\u` escapes
/// decode to the same characters.
fn escape_script_json(json: &str) -> String {
    json.replace('&', "\\u0026")
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::EngineValues;
    use dbbench_common::EngineProfiles;
    use tempfile::TempDir;

    #[test]
    fn test_document_embeds_spec() {
        let mut backend = HtmlBackend::new("Nightly <run>");
        let mut spec = ChartSpec::empty(ChartKind::Line, &EngineProfiles::default());
        spec.push_point("READS #1", EngineValues::new(Some(50.0), None));
        let chart = backend.render(spec);

        let html = chart.to_html();
        assert!(html.contains("Nightly &lt;run&gt;"));
        assert!(html.contains(r#""kind":"line""#));
        assert!(html.contains(r#""values":[null]"#));
        assert!(html.contains("rgba(0, 180, 255, 0.9)"));
    }

    #[test]
    fn test_hostile_category_cannot_close_script_block() {
        let mut spec = ChartSpec::empty(ChartKind::Bar, &EngineProfiles::default());
        spec.push_point("</script><script>alert(1)</script>", EngineValues::new(Some(1.0), Some(2.0)));
        let chart = HtmlBackend::default().render(spec);

        let html = chart.to_html();
        // the CDN include and the inline data block
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains(r"\u003c/script\u003e\u003cscript\u003ealert(1)"));
    }

    #[test]
    fn test_update_redraws_document() {
        let mut chart = HtmlBackend::default().render(ChartSpec::empty(ChartKind::Line, &EngineProfiles::default()));
        assert!(!chart.to_html().contains("WRITES #1"));

        chart.spec_mut().push_point("WRITES #1", EngineValues::new(Some(1.0), Some(2.0)));
        chart.update();

        assert_eq!(chart.revision(), 1);
        assert!(chart.to_html().contains("WRITES #1"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("benchmark_chart.html");
        let chart = HtmlBackend::default().render(ChartSpec::empty(ChartKind::Bar, &EngineProfiles::default()));

        chart.write_to(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}

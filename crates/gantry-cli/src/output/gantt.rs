//! Static HTML gantt rendering. Consumes finished segments; all the logic
//! of interest happened upstream in the engine.

use chrono::DateTime;
use gantry_types::util::format_duration_ms;
use gantry_types::{CallCategory, Segment};

/// Bars narrower than this are floored so they stay visible. Purely a
/// rendering concern; the underlying segment keeps its real instants.
const MIN_BAR_WIDTH_PCT: f64 = 0.15;

pub fn render_html(source: &str, segments: &[Segment]) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>gantry - {}</title>\n", escape(source)));
    html.push_str("<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    html.push_str(&format!("<h1>Trace timeline: {}</h1>\n", escape(source)));

    if segments.is_empty() {
        html.push_str("<p class=\"empty\">No timeline-eligible calls in this trace.</p>\n");
        html.push_str("</body>\n</html>\n");
        return html;
    }

    let min_start = segments.iter().map(|s| s.start_ms.min(s.end_ms)).min().unwrap_or(0);
    let max_end = segments.iter().map(|s| s.start_ms.max(s.end_ms)).max().unwrap_or(0);
    let span = (max_end - min_start).max(1);

    html.push_str(&format!(
        "<p class=\"meta\">{} segments &middot; {} &rarr; {} &middot; span {}</p>\n",
        segments.len(),
        format_clock(min_start),
        format_clock(max_end),
        format_duration_ms(span)
    ));

    html.push_str("<div class=\"chart\">\n");
    for segment in segments {
        let start = segment.start_ms.min(segment.end_ms);
        let end = segment.start_ms.max(segment.end_ms);
        let left = (start - min_start) as f64 / span as f64 * 100.0;
        let width = ((end - start) as f64 / span as f64 * 100.0).max(MIN_BAR_WIDTH_PCT);
        let color = status_color(segment.category, &segment.status);

        html.push_str("<div class=\"row\">\n");
        html.push_str(&format!(
            "  <div class=\"label\">{}</div>\n",
            escape(&segment.label)
        ));
        html.push_str(&format!(
            "  <div class=\"track\"><div class=\"bar\" style=\"left:{:.3}%;width:{:.3}%;background:{}\" title=\"{}\"></div></div>\n",
            left,
            width,
            color,
            hover_text(segment)
        ));
        html.push_str(&format!(
            "  <div class=\"duration\">{}</div>\n",
            segment
                .duration_reported_ms
                .map(format_duration_ms)
                .unwrap_or_else(|| "-".to_string())
        ));
        html.push_str("</div>\n");
    }
    html.push_str("</div>\n");

    html.push_str("<div class=\"legend\">\n");
    for (label, color) in [
        ("LLM completed", "#1E90FF"),
        ("Tool completed", "#32CD32"),
        ("Awaiting approval", "#FF8C00"),
        ("Error", "#FF0000"),
        ("Cancelled", "#808080"),
    ] {
        html.push_str(&format!(
            "  <span class=\"swatch\" style=\"background:{}\"></span>{}\n",
            color,
            escape(label)
        ));
    }
    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// Status palette carried over from the upstream monitoring tooling.
fn status_color(category: CallCategory, status: &str) -> &'static str {
    match category {
        CallCategory::Tool => match status {
            "started" | "start" => "#FFE4B5",
            "validating" => "#FFA500",
            "awaiting_approval" => "#FF8C00",
            "scheduled" => "#FF6347",
            "executing" => "#FF4500",
            "completed" | "end" => "#32CD32",
            "error" => "#FF0000",
            "cancelled" => "#808080",
            _ => "#CCCCCC",
        },
        _ => match status {
            "started" | "start" => "#ADD8E6",
            "completed" | "end" => "#1E90FF",
            "error" => "#FF0000",
            "cancelled" => "#808080",
            _ => "#CCCCCC",
        },
    }
}

fn hover_text(segment: &Segment) -> String {
    let mut lines = vec![
        format!("{}: {}", segment.category.label(), segment.label),
        format!("id: {}", segment.id),
        format!("status: {}", segment.status),
        format!("start: {}", format_clock(segment.start_ms)),
        format!("end: {}", format_clock(segment.end_ms)),
    ];
    if let Some(duration) = segment.duration_reported_ms {
        lines.push(format!("duration: {}ms", duration));
    }
    if let Some(tokens) = segment.meta.total_tokens {
        lines.push(format!("tokens: {}", tokens));
    }
    if let Some(execution) = segment.meta.execution_ms {
        lines.push(format!("execution: {}ms", execution));
    }
    if let Some(wait) = segment.meta.approval_wait_ms {
        lines.push(format!("approval wait: {}ms", wait));
    }
    if let Some(count) = segment.meta.text_count {
        lines.push(format!("texts: {}", count));
    }
    if let Some(args) = &segment.meta.args_preview {
        lines.push(format!("args: {}", args));
    }
    if let Some(request) = &segment.meta.request_preview {
        lines.push(format!("request: {}", request));
    }
    if let Some(response) = &segment.meta.response_preview {
        lines.push(format!("response: {}", response));
    }
    if let Some(error) = &segment.meta.error {
        lines.push(format!("error: {}", error));
    }

    lines
        .iter()
        .map(|line| escape(line))
        .collect::<Vec<_>>()
        .join("&#10;")
}

fn format_clock(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.format("%H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const STYLE: &str = r#"
body { font-family: -apple-system, 'Segoe UI', sans-serif; margin: 24px; color: #1a1a1a; }
h1 { font-size: 18px; }
.meta { color: #666; font-size: 13px; }
.empty { color: #666; }
.chart { border: 1px solid #e0e0e0; border-radius: 4px; padding: 8px 0; }
.row { display: flex; align-items: center; height: 26px; }
.row:nth-child(odd) { background: #fafafa; }
.label { width: 220px; padding: 0 12px; font-size: 12px; white-space: nowrap;
         overflow: hidden; text-overflow: ellipsis; flex-shrink: 0; }
.track { position: relative; flex-grow: 1; height: 16px; }
.bar { position: absolute; top: 0; height: 100%; border-radius: 2px; min-width: 2px; }
.duration { width: 90px; padding: 0 12px; font-size: 11px; color: #666;
            text-align: right; flex-shrink: 0; }
.legend { margin-top: 16px; font-size: 12px; color: #444; }
.swatch { display: inline-block; width: 12px; height: 12px; border-radius: 2px;
          margin: 0 6px 0 16px; vertical-align: -1px; }
.legend .swatch:first-child { margin-left: 0; }
"#;

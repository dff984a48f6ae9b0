use crate::preview;
use crate::trace::TraceAnalysis;
use gantry_types::{CallCategory, Segment, SegmentMeta};

/// Build the ordered segment list consumed by the rendering layer.
///
/// Only records with both instants resolved are included; a record that
/// saw a start phase but no terminal event is dangling and stays out of
/// the timeline (it still counts toward the aggregator's totals). Ordering
/// is `start_ms` ascending with ties broken by (category, id), so output
/// is reproducible across runs on identical input. A segment whose end
/// precedes its start is emitted unmodified; visual flooring belongs to
/// the renderer.
pub fn build_timeline(analysis: &TraceAnalysis) -> Vec<Segment> {
    let mut segments = Vec::new();

    for call in analysis.models.iter() {
        let (Some(start), Some(end)) = (call.start_time_ms, call.end_time_ms) else {
            continue;
        };
        let model = call.model.as_deref().unwrap_or("unknown");
        segments.push(Segment {
            rank: 0,
            label: format!("LLM {}", short_model_name(model)),
            category: CallCategory::Model,
            id: call.id.clone(),
            start_ms: start,
            end_ms: end,
            duration_reported_ms: call.duration_ms,
            status: call.status.clone(),
            meta: SegmentMeta {
                model: call.model.clone(),
                total_tokens: call.total_tokens,
                request_preview: call.request_text.as_ref().and_then(preview::request_preview),
                response_preview: call
                    .response_text
                    .as_ref()
                    .and_then(preview::response_preview),
                error: call.error.clone(),
                ..SegmentMeta::default()
            },
        });
    }

    for call in analysis.tools.iter() {
        let (Some(start), Some(end)) = (call.start_time_ms, call.end_time_ms) else {
            continue;
        };
        let name = call.tool_name.as_deref().unwrap_or("unknown");
        segments.push(Segment {
            rank: 0,
            label: preview::title_case_tool(name),
            category: CallCategory::Tool,
            id: call.id.clone(),
            start_ms: start,
            end_ms: end,
            duration_reported_ms: call.duration_ms,
            status: call.status.clone(),
            meta: SegmentMeta {
                tool_name: call.tool_name.clone(),
                args_preview: call.args.as_ref().and_then(preview::args_preview),
                execution_ms: call
                    .pure_execution_duration_ms
                    .or(call.execution_duration_ms),
                approval_wait_ms: call.awaiting_approval_duration_ms.filter(|&ms| ms > 0),
                error: call.error.clone(),
                ..SegmentMeta::default()
            },
        });
    }

    for call in analysis.embeddings.iter() {
        let (Some(start), Some(end)) = (call.start_time_ms, call.end_time_ms) else {
            continue;
        };
        let model = call.model.as_deref().unwrap_or("unknown");
        segments.push(Segment {
            rank: 0,
            label: format!("Embed {}", short_model_name(model)),
            category: CallCategory::Embedding,
            id: call.id.clone(),
            start_ms: start,
            end_ms: end,
            duration_reported_ms: call.duration_ms,
            status: call.status.clone(),
            meta: SegmentMeta {
                model: call.model.clone(),
                text_count: call.text_count,
                error: call.error.clone(),
                ..SegmentMeta::default()
            },
        });
    }

    segments.sort_by(|a, b| {
        a.start_ms
            .cmp(&b.start_ms)
            .then(a.category.cmp(&b.category))
            .then(a.id.cmp(&b.id))
    });
    for (rank, segment) in segments.iter_mut().enumerate() {
        segment.rank = rank;
    }

    segments
}

/// Strip the vendor prefix models in these traces carry.
fn short_model_name(model: &str) -> &str {
    model.strip_prefix("gemini-").unwrap_or(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis_from(lines: &[&str]) -> TraceAnalysis {
        let mut analysis = TraceAnalysis::new();
        for (index, line) in lines.iter().enumerate() {
            analysis.ingest_line(index + 1, line);
        }
        analysis
    }

    #[test]
    fn dangling_records_are_excluded() {
        let analysis = analysis_from(&[
            r#"{"timestamp":1,"type":"llm_call","event":"start","data":{"id":"m1","startTime":100}}"#,
            r#"{"timestamp":2,"type":"tool_call","event":"completed","data":{"id":"t1","toolName":"grep","startTime":50,"endTime":80,"duration":30}}"#,
        ]);
        let segments = build_timeline(&analysis);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, "t1");
    }

    #[test]
    fn segments_sorted_by_start_then_category_then_id() {
        let analysis = analysis_from(&[
            r#"{"timestamp":1,"type":"tool_call","event":"completed","data":{"id":"t2","toolName":"b","startTime":100,"endTime":200}}"#,
            r#"{"timestamp":2,"type":"tool_call","event":"completed","data":{"id":"t1","toolName":"a","startTime":100,"endTime":150}}"#,
            r#"{"timestamp":3,"type":"llm_call","event":"completed","data":{"id":"m1","model":"x","startTime":100,"endTime":300}}"#,
            r#"{"timestamp":4,"type":"llm_call","event":"completed","data":{"id":"m0","model":"x","startTime":50,"endTime":90}}"#,
        ]);
        let segments = build_timeline(&analysis);
        let ids: Vec<&str> = segments.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["m0", "m1", "t1", "t2"]);

        let starts: Vec<i64> = segments.iter().map(|s| s.start_ms).collect();
        let mut sorted = starts.clone();
        sorted.sort_unstable();
        assert_eq!(starts, sorted);
    }

    #[test]
    fn ranks_are_dense_and_positional() {
        let analysis = analysis_from(&[
            r#"{"timestamp":1,"type":"tool_call","event":"completed","data":{"id":"t1","startTime":300,"endTime":400}}"#,
            r#"{"timestamp":2,"type":"tool_call","event":"completed","data":{"id":"t2","startTime":100,"endTime":200}}"#,
        ]);
        let segments = build_timeline(&analysis);
        assert_eq!(segments[0].id, "t2");
        assert_eq!(segments[0].rank, 0);
        assert_eq!(segments[1].rank, 1);
    }

    #[test]
    fn skewed_clock_segment_is_emitted_unmodified() {
        let analysis = analysis_from(&[
            r#"{"timestamp":1,"type":"tool_call","event":"completed","data":{"id":"t1","startTime":500,"endTime":400,"duration":10}}"#,
        ]);
        let segments = build_timeline(&analysis);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].start_ms, 500);
        assert_eq!(segments[0].end_ms, 400);
    }

    #[test]
    fn meta_prefers_pure_execution_duration() {
        let analysis = analysis_from(&[
            r#"{"timestamp":1,"type":"tool_call","event":"completed","data":{"id":"t1","startTime":0,"endTime":10,"executionDuration":9,"pureExecutionDuration":7}}"#,
        ]);
        let segments = build_timeline(&analysis);
        assert_eq!(segments[0].meta.execution_ms, Some(7));
    }

    #[test]
    fn zero_approval_wait_is_treated_as_absent() {
        let analysis = analysis_from(&[
            r#"{"timestamp":1,"type":"tool_call","event":"completed","data":{"id":"t1","startTime":0,"endTime":10,"awaitingApprovalDuration":0}}"#,
        ]);
        let segments = build_timeline(&analysis);
        assert_eq!(segments[0].meta.approval_wait_ms, None);
    }
}

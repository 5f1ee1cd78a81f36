//! Output formatters

use crate::app::OutputFormat;
use finroute_core::engine::AgentStep;
use finroute_core::{Classification, Collection};
use serde_json::json;

fn pretty(value: serde_json::Value) -> String {
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string()) + "\n"
}

pub fn format_classification(query: &str, classification: Classification, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => pretty(json!({
            "query": query,
            "classification": classification,
        })),
        OutputFormat::Cli => format!("{}\n", classification),
    }
}

pub fn format_answer(
    query: &str,
    classification: Option<Classification>,
    answer: &str,
    format: OutputFormat,
) -> String {
    match format {
        OutputFormat::Json => pretty(json!({
            "query": query,
            "classification": classification,
            "response": answer,
        })),
        OutputFormat::Cli => match classification {
            Some(c) => format!("Question type: {}\n\n{}\n", c, answer),
            None => format!("{}\n", answer),
        },
    }
}

/// Agent trace, one block per step
pub fn format_steps(steps: &[AgentStep]) -> String {
    let mut out = String::new();
    for (i, step) in steps.iter().enumerate() {
        out.push_str(&format!("Step {}\n", i + 1));
        if let Some(thought) = &step.thought {
            out.push_str(&format!("  Thought: {}\n", thought));
        }
        if let Some(action) = &step.action {
            let action = serde_json::to_string(action).unwrap_or_default();
            out.push_str(&format!("  Action: {}\n", action));
        }
        for line in step.observation.lines() {
            out.push_str(&format!("  | {}\n", line));
        }
    }
    out
}

pub fn format_import(counts: &[(Collection, usize)], format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => pretty(json!(counts
            .iter()
            .map(|(c, n)| json!({ "collection": c, "records": n }))
            .collect::<Vec<_>>())),
        OutputFormat::Cli => counts
            .iter()
            .map(|(c, n)| format!("{}: {} records\n", c, n))
            .collect(),
    }
}

//! Bounded plan/act agent over the analytical datasets
//!
//! Each turn the model replies with one JSON object: either a table
//! operation to run or a final answer. Operation output is fed back as an
//! observation until the model answers or the iteration budget runs out.

use super::QueryEngine;
use crate::data::{Datasets, TableOp};
use crate::error::{FinRouteError, Result};
use crate::llm::{ChatMessage, LLMClient};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

/// Returned verbatim when the budget is spent without a final answer
pub const ITERATION_LIMIT_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// One executed agent turn
#[derive(Debug, Clone)]
pub struct AgentStep {
    pub thought: Option<String>,
    pub action: Option<TableOp>,
    pub observation: String,
}

/// Result of a full agent run
#[derive(Debug, Clone)]
pub struct AgentRun {
    pub answer: String,
    pub steps: Vec<AgentStep>,
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
struct AgentReply {
    #[serde(default)]
    thought: Option<String>,
    #[serde(default)]
    action: Option<serde_json::Value>,
    #[serde(default)]
    final_answer: Option<String>,
}

#[derive(Debug)]
enum Decision {
    Act {
        thought: Option<String>,
        op: TableOp,
    },
    Finish(String),
}

pub struct AnalyticalQueryEngine {
    client: Arc<dyn LLMClient>,
    datasets: Arc<Datasets>,
    iteration_budget: usize,
}

impl AnalyticalQueryEngine {
    pub fn new(client: Arc<dyn LLMClient>, datasets: Arc<Datasets>, iteration_budget: usize) -> Self {
        Self {
            client,
            datasets,
            iteration_budget: iteration_budget.max(1),
        }
    }

    pub fn iteration_budget(&self) -> usize {
        self.iteration_budget
    }

    /// Run the agent and keep every intermediate step
    pub async fn run(&self, query: &str) -> Result<AgentRun> {
        let mut messages = vec![
            ChatMessage::system(build_system_prompt(&self.datasets.catalog())),
            ChatMessage::user(query),
        ];
        let mut steps = Vec::new();

        for iteration in 1..=self.iteration_budget {
            let reply = self.client.chat_completion(messages.clone()).await?;

            let step = match parse_agent_reply(&reply) {
                Ok(Decision::Finish(answer)) => {
                    tracing::info!("Agent finished after {} iteration(s)", iteration);
                    return Ok(AgentRun {
                        answer,
                        steps,
                        completed: true,
                    });
                }
                Ok(Decision::Act { thought, op }) => {
                    tracing::debug!("Iteration {}: {:?}", iteration, op);
                    let observation = match self.datasets.run(&op) {
                        Ok(output) => output,
                        Err(e) => format!("Error: {}", e),
                    };
                    AgentStep {
                        thought,
                        action: Some(op),
                        observation,
                    }
                }
                Err(e) => {
                    tracing::debug!("Iteration {}: unparseable reply: {}", iteration, e);
                    AgentStep {
                        thought: None,
                        action: None,
                        observation: format!(
                            "Could not parse your reply ({}). Reply with exactly one JSON object \
                             containing either \"action\" or \"final_answer\".",
                            e
                        ),
                    }
                }
            };

            messages.push(ChatMessage::assistant(reply));
            messages.push(ChatMessage::user(format!("Observation:\n{}", step.observation)));
            steps.push(step);
        }

        tracing::warn!(
            "Agent exhausted its budget of {} iterations",
            self.iteration_budget
        );
        Ok(AgentRun {
            answer: ITERATION_LIMIT_MESSAGE.to_string(),
            steps,
            completed: false,
        })
    }
}

#[async_trait]
impl QueryEngine for AnalyticalQueryEngine {
    async fn answer(&self, query: &str) -> Result<String> {
        Ok(self.run(query).await?.answer)
    }

    fn name(&self) -> &'static str {
        "analytical"
    }
}

fn build_system_prompt(catalog: &str) -> String {
    format!(
        r#"You are a data analyst answering questions about stocks using the tables below.

Datasets:
{catalog}

You cannot run code. Work step by step with these operations:
- {{"operation": "describe", "dataset": D}}
- {{"operation": "head", "dataset": D, "n": 5}}
- {{"operation": "filter", "dataset": D, "filters": [F, ...], "limit": 20}}
- {{"operation": "aggregate", "dataset": D, "filters": [F, ...], "column": C, "func": A}}
- {{"operation": "group_by", "dataset": D, "filters": [F, ...], "by": C, "date_part": P, "column": C, "func": A, "sort": "asc" | "desc", "limit": N}}
- {{"operation": "sort", "dataset": D, "filters": [F, ...], "column": C, "order": "asc" | "desc", "limit": 20}}

where F is {{"column": C, "op": "eq" | "ne" | "gt" | "gte" | "lt" | "lte" | "contains" | "starts_with", "value": V}},
A is "count" | "sum" | "mean" | "median" | "min" | "max",
and P (optional, for date columns) is "year" | "quarter" | "month" | "year_month".

Reply with exactly one JSON object and nothing else, either
{{"thought": "...", "action": {{"operation": ...}}}}
or, once you know the answer,
{{"thought": "...", "final_answer": "..."}}

The final answer should state the numbers you found."#
    )
}

/// Strip optional code fences around a JSON reply
fn extract_json(response: &str) -> &str {
    let fenced = if response.contains("```json") {
        response
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
    } else if response.contains("```") {
        response.split("```").nth(1)
    } else {
        None
    };

    let body = fenced.unwrap_or(response).trim();
    match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => body,
    }
}

fn parse_agent_reply(response: &str) -> Result<Decision> {
    let reply: AgentReply = serde_json::from_str(extract_json(response))
        .map_err(|e| FinRouteError::Llm(format!("invalid JSON: {}", e)))?;

    if let Some(answer) = reply.final_answer {
        return Ok(Decision::Finish(answer));
    }

    let action = reply.action.ok_or_else(|| {
        FinRouteError::Llm("reply has neither \"action\" nor \"final_answer\"".to_string())
    })?;
    let op: TableOp = serde_json::from_value(action)
        .map_err(|e| FinRouteError::Llm(format!("invalid action: {}", e)))?;

    Ok(Decision::Act {
        thought: reply.thought,
        op,
    })
}

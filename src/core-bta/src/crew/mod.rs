//! The medical agent crew.
//!
//! A crew runs its agents one after another on a single task. Each agent sees the patient's query,
//! the report text, and every section written before it. The sections are stitched together into
//! the final report, followed by a fixed disclaimer.

pub mod agents;
pub mod task;

use std::{path::PathBuf, time::Instant};

pub use agents::{Agent, doctor, exercise_specialist, nutritionist};
pub use task::{Task, help_patients};

use crate::{Error, llms::LlmProvider, report::read_report};

/// Used when the caller does not ask anything specific.
pub const DEFAULT_QUERY: &str = "Provide a comprehensive analysis of my blood test report";

pub const DISCLAIMER: &str = "Disclaimer: This analysis is for informational purposes only and is not a substitute for professional medical advice. Please consult a qualified healthcare professional about your results.";

/// Context given to the first agent, which has no previous sections to build on.
pub const NO_CONTEXT: &str = "(none yet)";

/// Falls back to `DEFAULT_QUERY` for a missing or blank query. Otherwise trims it.
pub fn normalize_query(query: Option<&str>) -> String {
    match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => DEFAULT_QUERY.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KickoffInputs {
    pub query: String,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOutput {
    pub role: String,
    pub section_title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrewOutput {
    pub sections: Vec<AgentOutput>,
}

impl CrewOutput {
    /// Every section under its heading, then the disclaimer.
    pub fn report(&self) -> String {
        let mut parts: Vec<String> = self
            .sections
            .iter()
            .map(|s| format!("## {}\n\n{}", s.section_title, s.content))
            .collect();
        parts.push(DISCLAIMER.to_string());
        parts.join("\n\n")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub analysis: String,
    pub processing_time_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Crew {
    agents: Vec<Agent>,
    task: Task,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, task: Task) -> Result<Self, Error> {
        if agents.is_empty() {
            return Err(Error::EmptyCrew);
        }
        Ok(Self { agents, task })
    }

    /// Doctor, then nutritionist, then exercise specialist, all helping patients.
    pub fn medical() -> Self {
        Self {
            agents: vec![doctor(), nutritionist(), exercise_specialist()],
            task: help_patients(),
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    /// Runs every agent in order. The first failure stops the crew.
    pub async fn kickoff<P: LlmProvider + ?Sized>(
        &self,
        provider: &P,
        inputs: &KickoffInputs,
    ) -> Result<CrewOutput, Error> {
        let mut sections: Vec<AgentOutput> = Vec::with_capacity(self.agents.len());

        for agent in &self.agents {
            let system = agent.persona(&inputs.query)?;
            let prompt = self
                .task
                .prompt(&inputs.query, &inputs.report, &agent.focus, &render_context(&sections))?;

            tracing::debug!("Agent '{}' is working on '{}'", agent.role, agent.section_title);
            let call = provider.complete(&system, &prompt);
            let response = match agent.max_execution_time {
                Some(limit) => tokio::time::timeout(limit, call)
                    .await
                    .map_err(|_| Error::AgentTimeout {
                        role: agent.role.clone(),
                        limit,
                    })??,
                None => call.await?,
            };

            let content = response.trim();
            if content.is_empty() {
                return Err(Error::NoResponse(agent.role.clone()));
            }
            tracing::debug!("Agent '{}' wrote {} characters", agent.role, content.len());

            sections.push(AgentOutput {
                role: agent.role.clone(),
                section_title: agent.section_title.clone(),
                content: content.to_string(),
            });
        }

        Ok(CrewOutput { sections })
    }
}

fn render_context(sections: &[AgentOutput]) -> String {
    if sections.is_empty() {
        return NO_CONTEXT.to_string();
    }
    sections
        .iter()
        .map(|s| format!("[{}]\n{}", s.section_title, s.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Reads the report at `path`, runs the crew on it and times the whole thing.
pub async fn analyze_report<P: LlmProvider + ?Sized>(
    provider: &P,
    crew: &Crew,
    path: impl Into<PathBuf>,
    query: &str,
) -> Result<AnalysisOutcome, Error> {
    let start = Instant::now();
    let report = read_report(path).await?;
    let output = crew
        .kickoff(
            provider,
            &KickoffInputs {
                query: query.to_string(),
                report,
            },
        )
        .await?;
    Ok(AnalysisOutcome {
        analysis: output.report(),
        processing_time_secs: start.elapsed().as_secs(),
    })
}

//! Coordinator loop
//!
//! Contains the `process` method and the delegation fan-out.

use super::delegation::{self, DelegationArgs};
use super::prompt::root_prompt;
use super::types::{ExecutionResult, ExecutionStatus, FailureKind, ToolCallRecord};
use super::{Orchestrator, OrchestratorInput};
use crate::agents::{AgentResponse, SubAgentKind};
use crate::cache::ResponseCache;
use crate::error::{format_error_for_chat, Error, Result, UserFriendlyError};
use crate::retry::complete_with_retry;
use crate::session::SessionContext;
use agrocam_data::utils::sanitize_input;
use agrocam_data::Region;
use agrocam_llm::{CompletionRequest, Message, ToolCall, ToolCompletionRequest};
use serde_json::json;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const CANCELLED_REPLY: &str = "La demande a été annulée.";
const NO_ANSWER_REPLY: &str =
    "Je n'ai pas pu obtenir de réponse des agents spécialisés. Veuillez reformuler ou réessayer plus tard.";

/// Why the loop stopped without a final text from the coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Answered,
    MaxIterations,
    Timeout,
    Failures,
}

/// One finished delegation
struct Delegation {
    kind: Option<SubAgentKind>,
    record: ToolCallRecord,
    outcome: std::result::Result<AgentResponse, String>,
}

/// Mutable state of one execution
struct Run {
    execution_id: Uuid,
    start: Instant,
    iterations: usize,
    agent_responses: Vec<AgentResponse>,
    tool_calls: Vec<ToolCallRecord>,
    consecutive_failures: usize,
    total_failures: usize,
    model: Option<String>,
}

impl Run {
    fn new(execution_id: Uuid) -> Self {
        Self {
            execution_id,
            start: Instant::now(),
            iterations: 0,
            agent_responses: Vec::new(),
            tool_calls: Vec::new(),
            consecutive_failures: 0,
            total_failures: 0,
            model: None,
        }
    }

    fn finish(
        self,
        status: ExecutionStatus,
        response: String,
        failure: Option<FailureKind>,
    ) -> ExecutionResult {
        ExecutionResult {
            execution_id: self.execution_id,
            status,
            response,
            agent_responses: self.agent_responses,
            tool_calls: self.tool_calls,
            iterations: self.iterations,
            duration_ms: self.start.elapsed().as_millis() as u64,
            model: self.model,
            failure,
            cached: false,
        }
    }
}

impl Orchestrator {
    /// Answer a farmer's question
    ///
    /// Provider failures of the coordinator itself do not surface as `Err`:
    /// they produce a `Failed` result carrying a French message and a
    /// [`FailureKind`]. `Err` is reserved for rejected input.
    #[instrument(skip(self, input), fields(session = %input.session_key()))]
    pub async fn process(&self, input: OrchestratorInput) -> Result<ExecutionResult> {
        let text = sanitize_input(&input.text);
        if text.is_empty() {
            return Err(Error::InvalidInput("la question est vide".to_string()));
        }
        let region = input.region.unwrap_or(self.agriculture.default_region);
        let language = input
            .language
            .clone()
            .unwrap_or_else(|| self.agriculture.language.clone());

        let session_key = input.session_key();
        let mut session = match self.sessions.get(&session_key).await {
            Ok(Some(session)) => session,
            Ok(None) => SessionContext::new(&session_key),
            Err(e) => {
                warn!(error = %e, "Session unavailable, starting fresh");
                SessionContext::new(&session_key)
            }
        };

        // Follow-ups depend on history, so only opening questions share answers
        let cache = self.cache.as_ref().filter(|_| session.message_count() == 0);
        let cache_key = ResponseCache::<ExecutionResult>::key(&text, region.name(), &language);
        if let Some(mut hit) = cache.and_then(|c| c.get(&cache_key)) {
            info!(execution_id = %hit.execution_id, "Serving cached answer");
            session.add_user_message(&text);
            session.add_assistant_message(&hit.response);
            self.save_session(&session).await;
            hit.cached = true;
            return Ok(hit);
        }

        let execution_id = Uuid::new_v4();
        let cancel_token = CancellationToken::new();
        self.active_executions
            .insert(execution_id, cancel_token.clone());

        info!(execution_id = %execution_id, region = %region, "Starting execution");
        let result = self
            .run(execution_id, session, &text, region, &language, &cancel_token)
            .await;
        self.active_executions.remove(&execution_id);

        info!(
            execution_id = %execution_id,
            status = ?result.status,
            agents = result.agent_responses.len(),
            iterations = result.iterations,
            duration_ms = result.duration_ms,
            "Execution finished"
        );

        if result.status == ExecutionStatus::Completed {
            if let Some(cache) = cache {
                cache.insert(cache_key, result.clone());
            }
        }
        Ok(result)
    }

    async fn run(
        &self,
        execution_id: Uuid,
        mut session: SessionContext,
        text: &str,
        region: Region,
        language: &str,
        cancel_token: &CancellationToken,
    ) -> ExecutionResult {
        let mut run = Run::new(execution_id);

        let history = session.history();
        let skip = history.len().saturating_sub(self.config.history_messages);
        let mut messages = Vec::with_capacity(history.len() - skip + 2);
        messages.push(Message::system(root_prompt(region, language)));
        messages.extend(history[skip..].iter().cloned());
        messages.push(Message::user(text));
        session.add_user_message(text);

        let tools = delegation::tool_definitions();
        let max_time = self.config.max_execution_time();
        let mut final_text: Option<String> = None;

        let stop = loop {
            run.iterations += 1;
            if run.iterations > self.config.max_iterations {
                warn!(execution_id = %execution_id, "Iteration limit reached");
                break Stop::MaxIterations;
            }
            if cancel_token.is_cancelled() {
                return run.finish(ExecutionStatus::Cancelled, CANCELLED_REPLY.to_string(), None);
            }
            let elapsed = run.start.elapsed();
            if elapsed >= max_time {
                warn!(execution_id = %execution_id, "Execution time limit reached");
                break Stop::Timeout;
            }
            if run.consecutive_failures >= self.config.max_consecutive_failures
                || run.total_failures >= self.config.max_total_failures
            {
                warn!(
                    execution_id = %execution_id,
                    consecutive = run.consecutive_failures,
                    total = run.total_failures,
                    "Delegation failure limit reached"
                );
                break Stop::Failures;
            }

            let request = ToolCompletionRequest::new(
                CompletionRequest::new(&self.agriculture.models.root)
                    .with_messages(messages.clone())
                    .with_temperature(self.config.root_temperature),
                tools.clone(),
            );
            let call = tokio::time::timeout(
                max_time.saturating_sub(elapsed),
                complete_with_retry(&self.provider, request, &self.retry),
            );
            let response = tokio::select! {
                _ = cancel_token.cancelled() => {
                    return run.finish(ExecutionStatus::Cancelled, CANCELLED_REPLY.to_string(), None);
                }
                response = call => response,
            };
            let response = match response {
                Err(_) => break Stop::Timeout,
                Ok(Err(e)) => {
                    error!(execution_id = %execution_id, error = %e, "Coordinator call failed");
                    let failure = FailureKind::from_llm(&e);
                    return run.finish(
                        ExecutionStatus::Failed,
                        format_error_for_chat(&e),
                        Some(failure),
                    );
                }
                Ok(Ok(response)) => response,
            };
            run.model = Some(response.model.clone());

            if !response.has_tool_calls() {
                final_text = response.content.filter(|c| !c.trim().is_empty());
                break Stop::Answered;
            }

            debug!(
                execution_id = %execution_id,
                iteration = run.iterations,
                delegations = response.tool_calls.len(),
                "Delegating"
            );
            messages.push(Message::assistant_with_tool_calls(
                response.content.clone().unwrap_or_default(),
                response.tool_calls.clone(),
            ));

            let fan_out = tokio::time::timeout(
                max_time.saturating_sub(run.start.elapsed()),
                self.delegate_all(&response.tool_calls, text, region, language),
            );
            let delegations = tokio::select! {
                _ = cancel_token.cancelled() => {
                    return run.finish(ExecutionStatus::Cancelled, CANCELLED_REPLY.to_string(), None);
                }
                delegations = fan_out => delegations,
            };
            let Ok(delegations) = delegations else {
                warn!(execution_id = %execution_id, "Execution time limit reached during delegation");
                break Stop::Timeout;
            };

            let mut round_failures = 0;
            for (call, delegation) in response.tool_calls.iter().zip(delegations) {
                let payload = match delegation.outcome {
                    Ok(answer) => {
                        if let Some(kind) = delegation.kind {
                            session.record_agent_response(kind, &answer);
                        }
                        let text = answer.response_text.clone();
                        run.agent_responses.push(answer);
                        text
                    }
                    Err(message) => {
                        round_failures += 1;
                        json!({ "error": message }).to_string()
                    }
                };
                messages.push(Message::tool_response_named(&call.id, &call.name, payload));
                run.tool_calls.push(delegation.record);
            }

            run.total_failures += round_failures;
            if round_failures == response.tool_calls.len() {
                run.consecutive_failures += 1;
            } else {
                run.consecutive_failures = 0;
            }
        };

        let had_failures = run.total_failures > 0;
        let (status, response, failure) = match (stop, final_text) {
            (Stop::Answered, Some(answer)) if !had_failures => {
                (ExecutionStatus::Completed, answer, None)
            }
            (Stop::Answered, Some(answer)) => (ExecutionStatus::PartialSuccess, answer, None),
            (_, _) if !run.agent_responses.is_empty() => (
                ExecutionStatus::PartialSuccess,
                merge_agent_answers(&run.agent_responses),
                None,
            ),
            (stop, _) => {
                let failure = match stop {
                    Stop::Timeout => FailureKind::Timeout,
                    Stop::Failures => FailureKind::AgentFailures,
                    Stop::MaxIterations => FailureKind::IterationLimit,
                    Stop::Answered => FailureKind::Internal,
                };
                (ExecutionStatus::Failed, NO_ANSWER_REPLY.to_string(), Some(failure))
            }
        };

        session.add_assistant_message(&response);
        self.save_session(&session).await;

        run.finish(status, response, failure)
    }

    async fn save_session(&self, session: &SessionContext) {
        if let Err(e) = self.sessions.save(session).await {
            warn!(error = %e, "Failed to save session");
        }
    }

    /// Run every requested delegation concurrently, keeping call order
    async fn delegate_all(
        &self,
        calls: &[ToolCall],
        question: &str,
        region: Region,
        language: &str,
    ) -> Vec<Delegation> {
        let futures = calls
            .iter()
            .map(|call| self.delegate(call, question, region, language));
        futures::future::join_all(futures).await
    }

    async fn delegate(
        &self,
        call: &ToolCall,
        question: &str,
        region: Region,
        language: &str,
    ) -> Delegation {
        let start = Instant::now();
        let failed = |kind: Option<SubAgentKind>, message: String| {
            warn!(tool = %call.name, error = %message, "Delegation failed");
            Delegation {
                kind,
                record: ToolCallRecord {
                    tool_name: call.name.clone(),
                    input: arguments_value(call),
                    success: false,
                    error: Some(message.clone()),
                    duration_ms: start.elapsed().as_millis() as u64,
                    agent: kind.map(|k| k.agent_name()),
                },
                outcome: Err(message),
            }
        };

        let Some(kind) = SubAgentKind::from_delegation_tool(&call.name) else {
            return failed(None, format!("outil inconnu: {}", call.name));
        };
        let args: DelegationArgs = match call.parse_arguments() {
            Ok(args) => args,
            Err(e) => return failed(Some(kind), format!("arguments invalides: {e}")),
        };

        let context = args.context(region, language);
        match self
            .sub_agent(kind)
            .answer(args.question_or(question), &context)
            .await
        {
            Ok(answer) => Delegation {
                kind: Some(kind),
                record: ToolCallRecord {
                    tool_name: call.name.clone(),
                    input: arguments_value(call),
                    success: true,
                    error: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                    agent: Some(kind.agent_name()),
                },
                outcome: Ok(answer),
            },
            Err(e) => failed(Some(kind), e.user_message()),
        }
    }
}

fn arguments_value(call: &ToolCall) -> serde_json::Value {
    serde_json::from_str(&call.arguments)
        .unwrap_or_else(|_| serde_json::Value::String(call.arguments.clone()))
}

/// Fallback answer built from the sub-agents when the coordinator gave none
fn merge_agent_answers(responses: &[AgentResponse]) -> String {
    responses
        .iter()
        .map(|r| {
            let label = r
                .agent_name
                .strip_suffix("_agent")
                .and_then(|d| d.parse::<SubAgentKind>().ok())
                .map_or(r.agent_name.as_str(), |k| k.label());
            format!("**{}**\n{}", label, r.response_text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_agent_answers_labels_each_agent() {
        let answer = |name: &str, text: &str| AgentResponse {
            agent_name: name.to_string(),
            response_text: text.to_string(),
            confidence_score: 0.6,
            recommendations: Vec::new(),
            metadata: serde_json::Map::new(),
            processing_time_seconds: None,
        };
        let merged = merge_agent_answers(&[
            answer("weather_agent", "Pluies attendues."),
            answer("economic_agent", "Prix stables."),
        ]);
        assert!(merged.starts_with("**Agent Météo**\nPluies attendues."));
        assert!(merged.contains("Prix stables."));
    }
}

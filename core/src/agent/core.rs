//! AgentCore implementation

use super::answer::{AgentAnswer, RunEvidence};
use super::config::AgentConfig;
use super::execution::{AgentRun, StopReason, ToolExecutionRecord};
use super::prompt::{build_custom_system_prompt, build_system_prompt, build_user_message};
use crate::config::Locale;
use crate::error::{Error, Result};
use crate::llm::{ChatOptions, ContentBlock, LlmClient, LlmMessage, LlmResponse, ToolDefinition, Usage};
use crate::output::{AgentEvent, AgentOutput, TokenUsage, ToolExecutionInfo};
use crate::query::SearchQuery;
use crate::retry::retry_with_backoff;
use crate::tools::{ToolCall, ToolExecutor, ToolKind};
use std::sync::Arc;
use std::time::Instant;

/// States of one run. Each pass through `AwaitingModel` is one turn.
enum LoopState {
    AwaitingModel,
    ExecutingTools(Vec<ToolCall>),
    Done(StopReason),
}

/// Mutable facts gathered while a run is in progress
#[derive(Default)]
struct RunState {
    turns: usize,
    usage: Usage,
    evidence: RunEvidence,
    executions: Vec<ToolExecutionRecord>,
    last_text: Option<String>,
    final_text: Option<String>,
}

/// The tool-calling agent
pub struct AgentCore {
    config: AgentConfig,
    llm_client: Arc<dyn LlmClient>,
    tool_executor: ToolExecutor,
    locale: Locale,
    chat_options: ChatOptions,
    conversation_history: Vec<LlmMessage>,
    output: Box<dyn AgentOutput>,
}

impl AgentCore {
    /// Assemble an agent from ready-made parts
    pub fn new(
        config: AgentConfig,
        llm_client: Arc<dyn LlmClient>,
        tool_executor: ToolExecutor,
        locale: Locale,
        output: Box<dyn AgentOutput>,
    ) -> Self {
        Self {
            config,
            llm_client,
            tool_executor,
            locale,
            chat_options: ChatOptions::default(),
            conversation_history: Vec::new(),
            output,
        }
    }

    pub fn with_chat_options(mut self, options: ChatOptions) -> Self {
        self.chat_options = options;
        self
    }

    /// Get agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Conversation of the most recent run
    pub fn conversation(&self) -> &[LlmMessage] {
        &self.conversation_history
    }

    /// Tools offered to the model: configured and actually registered
    fn offered_tools(&self) -> Vec<ToolKind> {
        self.tool_executor
            .kinds()
            .iter()
            .copied()
            .filter(|kind| self.config.tools.contains(kind))
            .collect()
    }

    fn system_prompt(&self, offered: &[ToolKind]) -> String {
        match &self.config.system_prompt {
            Some(custom) => build_custom_system_prompt(custom),
            None => build_system_prompt(&self.locale, offered),
        }
    }

    async fn emit(&self, event: AgentEvent) {
        if let Err(e) = self.output.emit_event(event).await {
            tracing::debug!("Failed to emit agent event: {}", e);
        }
    }

    /// Run a validated query to completion
    pub async fn run(&mut self, query: &SearchQuery) -> AgentRun {
        let prompt = build_user_message(query, &self.locale);
        self.run_prompt(&prompt).await
    }

    /// Run free text through the loop. Never fails: upstream problems end up
    /// as notes on the answer and in the stop reason.
    pub async fn run_prompt(&mut self, prompt: &str) -> AgentRun {
        let start_time = Instant::now();
        let max_turns = self.config.effective_max_turns();
        let offered = self.offered_tools();
        let definitions = self.tool_executor.get_tool_definitions(&offered);

        tracing::info!(
            model = self.llm_client.model_name(),
            tools = offered.len(),
            max_turns,
            "Starting agent run"
        );
        self.emit(AgentEvent::RunStarted {
            query: prompt.to_string(),
            model: self.llm_client.model_name().to_string(),
            max_turns,
        })
        .await;

        self.conversation_history.clear();
        self.conversation_history
            .push(LlmMessage::system(self.system_prompt(&offered)));
        self.conversation_history.push(LlmMessage::user(prompt));

        let mut run = RunState::default();
        let mut state = LoopState::AwaitingModel;

        let stop_reason = loop {
            state = match state {
                LoopState::AwaitingModel if run.turns >= max_turns => {
                    tracing::warn!(max_turns, "Turn limit reached without a final answer");
                    LoopState::Done(StopReason::TurnLimitExceeded { max_turns })
                }
                LoopState::AwaitingModel => {
                    run.turns += 1;
                    self.emit(AgentEvent::TurnStarted {
                        turn: run.turns,
                        max_turns,
                    })
                    .await;
                    self.await_model(&definitions, &mut run).await
                }
                LoopState::ExecutingTools(calls) => {
                    self.execute_tools(calls, &offered, &mut run).await;
                    LoopState::AwaitingModel
                }
                LoopState::Done(reason) => break reason,
            };
        };

        let answer = self.build_answer(prompt, &stop_reason, &run);
        let duration_ms = start_time.elapsed().as_millis() as u64;

        tracing::info!(
            turns = run.turns,
            tool_calls = run.executions.len(),
            duration_ms,
            "Agent run finished: {}",
            stop_reason
        );
        self.emit(AgentEvent::RunCompleted {
            stop_reason: stop_reason.clone(),
            turns: run.turns,
            token_usage: TokenUsage::from(run.usage),
            duration_ms,
        })
        .await;
        if let Err(e) = self.output.flush().await {
            tracing::debug!("Failed to flush agent output: {}", e);
        }

        AgentRun {
            answer,
            stop_reason,
            turns_used: run.turns,
            tool_executions: run.executions,
            usage: run.usage,
            duration_ms,
        }
    }

    /// One model call, retried on transient failures
    async fn request_model(&self, definitions: &[ToolDefinition]) -> Result<LlmResponse> {
        let policy = self.config.model_retry.to_policy();
        let tools = if definitions.is_empty() {
            None
        } else {
            Some(definitions.to_vec())
        };

        retry_with_backoff(
            &policy,
            || {
                self.llm_client.chat_completion(
                    self.conversation_history.clone(),
                    tools.clone(),
                    Some(self.chat_options.clone()),
                )
            },
            |e: &Error| matches!(e, Error::Llm(err) if err.is_transient()),
        )
        .await
    }

    async fn await_model(&mut self, definitions: &[ToolDefinition], run: &mut RunState) -> LoopState {
        let response = match self.request_model(definitions).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("LLM request failed in turn {}: {}", run.turns, e);
                return LoopState::Done(StopReason::ModelUnavailable {
                    message: e.to_string(),
                });
            }
        };

        if let Some(usage) = response.usage {
            run.usage += usage;
        }

        let text = response
            .message
            .get_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if text.is_some() {
            run.last_text = text.clone();
        }

        let calls: Vec<ToolCall> = response
            .message
            .get_tool_uses()
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolCall {
                    id: id.clone(),
                    name: name.clone(),
                    parameters: input.clone(),
                }),
                _ => None,
            })
            .collect();

        self.conversation_history.push(response.message);

        if calls.is_empty() {
            run.final_text = text;
            LoopState::Done(StopReason::Completed)
        } else {
            tracing::debug!("Model requested {} tool call(s) in turn {}", calls.len(), run.turns);
            LoopState::ExecutingTools(calls)
        }
    }

    /// Execute requested calls in order and feed every result back
    async fn execute_tools(&mut self, calls: Vec<ToolCall>, offered: &[ToolKind], run: &mut RunState) {
        for call in calls {
            self.emit(AgentEvent::ToolExecutionStarted {
                tool_info: ToolExecutionInfo::started(&call),
            })
            .await;

            let result = self.tool_executor.execute(call.clone(), offered).await;

            self.emit(AgentEvent::ToolExecutionCompleted {
                tool_info: ToolExecutionInfo::completed(&call, &result),
            })
            .await;

            let kind = call
                .name
                .parse::<ToolKind>()
                .ok()
                .filter(|kind| offered.contains(kind));
            run.evidence.record(kind, &result);
            run.executions.push(ToolExecutionRecord {
                turn: run.turns,
                name: call.name.clone(),
                arguments: call.parameters.clone(),
                success: result.success,
                error_kind: result.error_kind.clone(),
                duration_ms: result.duration_ms.unwrap_or_default(),
            });

            self.conversation_history.push(LlmMessage::tool_result(
                call.id,
                result.content,
                !result.success,
            ));
        }
    }

    fn build_answer(&self, prompt: &str, stop_reason: &StopReason, run: &RunState) -> AgentAnswer {
        let city = self.locale.city.as_str();
        let mut answer = match (stop_reason, &run.final_text) {
            (StopReason::Completed, Some(text)) => AgentAnswer::from_model_text(prompt, city, text),
            (StopReason::Completed, None) => {
                let mut answer = AgentAnswer::from_evidence(prompt, city, None, &run.evidence);
                answer.notes.push("The assistant returned an empty reply.".to_string());
                answer
            }
            (StopReason::TurnLimitExceeded { max_turns }, _) => {
                let mut answer =
                    AgentAnswer::from_evidence(prompt, city, run.last_text.clone(), &run.evidence);
                answer.notes.push(format!(
                    "The search stopped after {} turns without a final answer; showing what the searches found.",
                    max_turns
                ));
                answer
            }
            (StopReason::ModelUnavailable { message }, _) => {
                let mut answer =
                    AgentAnswer::from_evidence(prompt, city, run.last_text.clone(), &run.evidence);
                answer
                    .notes
                    .push(format!("The assistant could not be reached: {}", message));
                answer
            }
        };

        answer.finalize(&run.evidence);
        answer
    }
}

//! Agent bootstrap: a chat model, a tool set, a persona and a windowed memory
//! behind a single `run(input) -> answer` call.

mod memory;
mod prompt;
mod tool_loop;

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::error::Result;
use crate::openai::{ChatResult, Message, OpenAiClient, Tool};
use crate::tools::{ToolExecutor, ToolSettings};

pub use memory::{ConversationMemory, MemoryWindow, Turn};
pub use prompt::DEFAULT_SYSTEM_PROMPT;

/// A chat-completions backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: Vec<Message>, tools: Option<Vec<Tool>>) -> Result<ChatResult>;
}

/// Notified right before each tool runs, with the tool name and its raw
/// argument string, in invocation order.
pub trait ToolObserver: Send + Sync {
    fn on_tool_start(&self, tool: &str, input: &str);
}

/// Maps one user turn to one answer.
///
/// Every failure is reported the same way; callers are not expected to
/// distinguish causes.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run(&self, input: &str, on_tool_start: Option<&dyn ToolObserver>) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub system_prompt: String,
    pub memory_window: MemoryWindow,
    pub tools: ToolSettings,
}

/// Build the production agent from configuration.
pub fn build_agent(config: &AgentConfig) -> ToolAgent<OpenAiClient> {
    debug!("Initializing OpenAI client");
    let model = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
    );

    let http = reqwest::Client::new();
    let tools = ToolExecutor::from_settings(&config.tools, &http);

    info!(
        "Agent ready with model {} and memory window {}",
        config.openai_model, config.memory_window
    );

    ToolAgent::with_model(
        model,
        tools,
        config.memory_window,
        config.system_prompt.clone(),
    )
}

/// Tool-calling agent with one process-wide conversation memory.
///
/// The memory lock is held while reading the history and while recording the
/// finished turn, never across the model call.
pub struct ToolAgent<M> {
    model: M,
    tools: ToolExecutor,
    memory: Mutex<ConversationMemory>,
    system_prompt: String,
}

impl<M: ChatModel> ToolAgent<M> {
    pub fn with_model(
        model: M,
        tools: ToolExecutor,
        memory_window: MemoryWindow,
        system_prompt: String,
    ) -> Self {
        Self {
            model,
            tools,
            memory: Mutex::new(ConversationMemory::new(memory_window)),
            system_prompt,
        }
    }

    pub async fn clear_memory(&self) {
        self.memory.lock().await.clear();
    }

    pub async fn memory_len(&self) -> usize {
        self.memory.lock().await.len()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }
}

#[async_trait]
impl<M: ChatModel> Agent for ToolAgent<M> {
    async fn run(&self, input: &str, on_tool_start: Option<&dyn ToolObserver>) -> Result<String> {
        let history: Vec<Turn> = self.memory.lock().await.turns().cloned().collect();
        debug!("Running agent with {} remembered turns", history.len());

        let mut conversation =
            prompt::build_messages(&self.system_prompt, &history, input, Utc::now());

        let answer =
            tool_loop::run_tool_loop(&self.model, &self.tools, &mut conversation, on_tool_start)
                .await?;

        self.memory.lock().await.record(input, answer.clone());
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    use serde_json::{Value, json};

    use super::*;
    use crate::error::BotError;
    use crate::openai::{FunctionCall, ToolCall};
    use crate::tools::{Calculator, ToolHandler, ToolKind};
    use crate::types::MessageRole;

    /// Replays canned results and records every request it receives.
    #[derive(Default)]
    struct ScriptedModel {
        script: StdMutex<VecDeque<Result<ChatResult>>>,
        requests: StdMutex<Vec<Vec<Message>>>,
    }

    impl ScriptedModel {
        fn new(script: Vec<Result<ChatResult>>) -> Self {
            Self {
                script: StdMutex::new(script.into()),
                requests: StdMutex::default(),
            }
        }

        fn requests(&self) -> Vec<Vec<Message>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(
            &self,
            messages: Vec<Message>,
            _tools: Option<Vec<Tool>>,
        ) -> Result<ChatResult> {
            self.requests.lock().unwrap().push(messages);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ChatResult::TextResponse("default".to_string())))
        }
    }

    struct CannedTool {
        kind: ToolKind,
        reply: &'static str,
    }

    #[async_trait]
    impl ToolHandler for CannedTool {
        fn kind(&self) -> ToolKind {
            self.kind
        }

        fn description(&self) -> &'static str {
            "canned"
        }

        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        async fn execute(&self, _arguments: &str) -> Result<String> {
            Ok(self.reply.to_string())
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: StdMutex<Vec<(String, String)>>,
    }

    impl ToolObserver for RecordingObserver {
        fn on_tool_start(&self, tool: &str, input: &str) {
            self.events
                .lock()
                .unwrap()
                .push((tool.to_string(), input.to_string()));
        }
    }

    fn text(answer: &str) -> Result<ChatResult> {
        Ok(ChatResult::TextResponse(answer.to_string()))
    }

    fn calls(calls: &[(&str, &str, &str)]) -> Result<ChatResult> {
        let tool_calls: Vec<ToolCall> = calls
            .iter()
            .map(|(id, name, arguments)| ToolCall {
                id: (*id).to_string(),
                call_type: "function".to_string(),
                function: FunctionCall {
                    name: (*name).to_string(),
                    arguments: (*arguments).to_string(),
                },
            })
            .collect();
        Ok(ChatResult::ToolCalls {
            assistant_message: Message {
                role: MessageRole::Assistant,
                content: None,
                tool_calls: Some(tool_calls.clone()),
                tool_call_id: None,
            },
            tool_calls,
        })
    }

    fn agent(script: Vec<Result<ChatResult>>, window: MemoryWindow) -> ToolAgent<ScriptedModel> {
        let tools = ToolExecutor::new(vec![
            Box::new(Calculator::new()),
            Box::new(CannedTool {
                kind: ToolKind::Weather,
                reply: "The weather in Paris, France is 18.0°C and clear sky.",
            }),
        ]);
        ToolAgent::with_model(
            ScriptedModel::new(script),
            tools,
            window,
            "Be nice.".to_string(),
        )
    }

    #[tokio::test]
    async fn text_answer_is_returned_and_remembered() {
        let agent = agent(vec![text("4!")], MemoryWindow::default());

        let answer = agent.run("Ann: 2+2?", None).await.unwrap();

        assert_eq!(answer, "4!");
        let memory = agent.memory.lock().await;
        let turns: Vec<&Turn> = memory.turns().collect();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].input, "Ann: 2+2?");
        assert_eq!(turns[0].output, "4!");
    }

    #[tokio::test]
    async fn tools_run_in_order_and_observer_sees_each_call_first() {
        let agent = agent(
            vec![
                calls(&[
                    ("call_1", "calculator", r#"{"expression":"2+2"}"#),
                    ("call_2", "weather", r#"{"location":"Paris"}"#),
                ]),
                text("4, and it's sunny in Paris"),
            ],
            MemoryWindow::default(),
        );
        let observer = RecordingObserver::default();

        let answer = agent
            .run("Ann: What is 2+2 plus the weather in Paris?", Some(&observer))
            .await
            .unwrap();

        assert_eq!(answer, "4, and it's sunny in Paris");
        assert_eq!(
            *observer.events.lock().unwrap(),
            vec![
                (
                    "calculator".to_string(),
                    r#"{"expression":"2+2"}"#.to_string()
                ),
                ("weather".to_string(), r#"{"location":"Paris"}"#.to_string()),
            ]
        );

        let requests = agent.model.requests();
        assert_eq!(requests.len(), 2);
        let second = &requests[1];
        let tool_results: Vec<(&str, &str)> = second
            .iter()
            .filter(|m| m.role == MessageRole::Tool)
            .map(|m| {
                (
                    m.tool_call_id.as_deref().unwrap(),
                    m.content.as_deref().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            tool_results,
            vec![
                ("call_1", "2+2 = 4"),
                (
                    "call_2",
                    "The weather in Paris, France is 18.0°C and clear sky."
                ),
            ]
        );
    }

    #[tokio::test]
    async fn tool_errors_are_fed_back_to_the_model() {
        let agent = agent(
            vec![
                calls(&[("call_1", "teleport", "{}")]),
                text("I can't teleport, sorry"),
            ],
            MemoryWindow::default(),
        );

        let answer = agent.run("Ann: beam me up", None).await.unwrap();

        assert_eq!(answer, "I can't teleport, sorry");
        let requests = agent.model.requests();
        let last = requests[1].last().unwrap();
        assert_eq!(last.role, MessageRole::Tool);
        assert!(last.content.as_deref().unwrap().starts_with("Error: "));
    }

    #[tokio::test]
    async fn model_failure_leaves_memory_untouched() {
        let agent = agent(
            vec![Err(BotError::OpenAiResponse("boom".to_string()))],
            MemoryWindow::default(),
        );

        let err = agent.run("Ann: hi", None).await.unwrap_err();

        assert!(matches!(err, BotError::OpenAiResponse(_)));
        assert_eq!(agent.memory_len().await, 0);
    }

    #[tokio::test]
    async fn endless_tool_calls_hit_the_limit() {
        let script = (0..10)
            .map(|_| calls(&[("call", "calculator", r#"{"expression":"1+1"}"#)]))
            .collect();
        let agent = agent(script, MemoryWindow::default());

        let err = agent.run("Ann: loop", None).await.unwrap_err();

        assert!(matches!(err, BotError::ToolLoopLimit));
        assert_eq!(agent.model.requests().len(), 5);
        assert_eq!(agent.memory_len().await, 0);
    }

    #[tokio::test]
    async fn memory_is_bounded_and_replayed() {
        let agent = agent(
            vec![text("a1"), text("a2"), text("a3"), text("a4")],
            MemoryWindow::Last(2),
        );

        for i in 1..=4 {
            agent.run(&format!("Ann: q{i}"), None).await.unwrap();
            assert!(agent.memory_len().await <= 2);
        }

        let requests = agent.model.requests();
        // system + two remembered turns + the new input
        let last = &requests[3];
        assert_eq!(last.len(), 6);
        assert_eq!(last[1].content.as_deref(), Some("Ann: q2"));
        assert_eq!(last[2].content.as_deref(), Some("a2"));
        assert_eq!(last[5].content.as_deref(), Some("Ann: q4"));

        let memory = agent.memory.lock().await;
        let outputs: Vec<&str> = memory.turns().map(|t| t.output.as_str()).collect();
        assert_eq!(outputs, vec!["a3", "a4"]);
    }

    #[tokio::test]
    async fn clear_memory_forgets_everything() {
        let agent = agent(vec![text("a1")], MemoryWindow::Unbounded);
        agent.run("Ann: q1", None).await.unwrap();

        agent.clear_memory().await;

        assert_eq!(agent.memory_len().await, 0);
    }

    #[test]
    fn build_agent_skips_tools_without_keys() {
        let agent = build_agent(&AgentConfig {
            openai_api_key: "sk-test".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_base_url: "https://api.openai.com/v1".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            memory_window: MemoryWindow::default(),
            tools: ToolSettings {
                enabled: vec![ToolKind::Calculator, ToolKind::MovieSearch],
                ..ToolSettings::default()
            },
        });
        assert_eq!(agent.tool_names(), vec!["calculator"]);
    }
}

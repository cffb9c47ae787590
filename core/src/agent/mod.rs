//! Chat agent driving the LLM function-calling loop over MCP tools

use crate::error::{AgentError, Result};
use crate::llm::{ChatOptions, ContentBlock, LlmClient, LlmMessage};
use crate::mcp::adapter::{tool_definitions, ToolFunction};
use crate::mcp::client::McpClient;
use crate::mcp::envelope::{InvocationError, InvocationResult};
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an IT support assistant with access to a ticketing \
system through structured tools.\n\
\n\
You can create tickets, look them up, list and filter them, update their status and assignments, \
search them by keyword, and pull aggregate analytics. Always call the tools to get current \
information instead of guessing, include ticket IDs in your answers, and gather the details a \
new ticket needs (title, description, reporter) before creating it.";

/// Agent tuning knobs
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System prompt override; the default ticketing-assistant prompt is used
    /// when unset
    pub system_prompt: Option<String>,
    /// Maximum LLM round-trips per user turn before giving up
    pub max_steps: usize,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_steps: 8,
            max_tokens: Some(2048),
            temperature: Some(0.7),
        }
    }
}

/// Conversational agent: discovers tools once, offers them to the model as
/// function definitions, executes requested calls concurrently through the
/// adapters, and feeds the envelopes back until the model answers in text.
pub struct ChatAgent {
    llm: Arc<dyn LlmClient>,
    client: Arc<McpClient>,
    functions: Vec<ToolFunction>,
    history: Vec<LlmMessage>,
    config: AgentConfig,
}

impl ChatAgent {
    /// Build an agent, running discovery to populate the function adapters
    pub async fn new(
        llm: Arc<dyn LlmClient>,
        client: Arc<McpClient>,
        config: AgentConfig,
    ) -> Result<Self> {
        let functions = client.clone().functions(false).await?;
        tracing::info!(tools = functions.len(), "chat agent initialized");

        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self {
            llm,
            client,
            functions,
            history: vec![LlmMessage::system(system_prompt)],
            config,
        })
    }

    /// Re-run discovery and regenerate the function adapters
    pub async fn refresh_tools(&mut self) -> Result<()> {
        self.functions = self.client.clone().functions(true).await?;
        Ok(())
    }

    pub fn available_tools(&self) -> Vec<&str> {
        self.functions.iter().map(ToolFunction::name).collect()
    }

    pub fn history(&self) -> &[LlmMessage] {
        &self.history
    }

    /// Drop the conversation, keeping the system prompt
    pub fn reset(&mut self) {
        self.history.truncate(1);
    }

    /// Process one user message, running tool calls until the model answers
    pub async fn chat(&mut self, user_message: &str) -> Result<String> {
        self.history.push(LlmMessage::user(user_message));

        for _ in 0..self.config.max_steps {
            let options = ChatOptions {
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
                top_p: None,
            };
            let response = self
                .llm
                .chat_completion(
                    self.history.clone(),
                    Some(tool_definitions(&self.functions)),
                    Some(options),
                )
                .await?;

            let message = response.message;
            let calls: Vec<(String, String, Value)> = message
                .tool_uses()
                .into_iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            let text = message.text();
            self.history.push(message);

            if calls.is_empty() {
                return Ok(text.unwrap_or_default());
            }

            tracing::debug!(count = calls.len(), "executing requested tool calls");
            let invocations = calls.into_iter().map(|(id, name, input)| {
                let function = self.functions.iter().find(|f| f.name() == name).cloned();
                let client = self.client.clone();
                async move {
                    let result = Self::dispatch(function, client, &name, input).await;
                    (id, result)
                }
            });
            let results = futures::future::join_all(invocations).await;

            let blocks = results
                .into_iter()
                .map(|(id, result)| ContentBlock::ToolResult {
                    tool_use_id: id,
                    is_error: Some(!result.success),
                    content: serde_json::to_string(&result)
                        .unwrap_or_else(|_| "{}".to_string()),
                })
                .collect();
            self.history.push(LlmMessage::tool_results(blocks));
        }

        Err(AgentError::MaxStepsExceeded {
            max_steps: self.config.max_steps,
        }
        .into())
    }

    /// Route one model-requested call through its adapter, or straight
    /// through the client when the model names a tool discovery never saw
    async fn dispatch(
        function: Option<ToolFunction>,
        client: Arc<McpClient>,
        name: &str,
        input: Value,
    ) -> InvocationResult {
        match (function, input) {
            (Some(function), Value::Object(arguments)) => function.invoke(arguments).await,
            (Some(function), Value::Null) => function.invoke(JsonMap::new()).await,
            (Some(_), other) => InvocationResult::fail(InvocationError::validation(
                "arguments",
                format!("Tool arguments must be an object, got {}", other),
            )),
            (None, input) => client.invoke_value(name, input).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, TransportError};
    use crate::llm::{FinishReason, LlmResponse, MessageContent, MessageRole, ToolDefinition};
    use crate::mcp::envelope::InvocationRequest;
    use crate::mcp::executor::ToolExecutor;
    use crate::mcp::transport::McpTransport;
    use crate::tickets::store::TicketStore;
    use crate::tickets::tools::ticket_registry;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// LLM double returning a scripted sequence of responses
    struct ScriptedLlm {
        responses: Mutex<Vec<LlmResponse>>,
    }

    impl ScriptedLlm {
        fn new(mut responses: Vec<LlmResponse>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn chat_completion(
            &self,
            _messages: Vec<LlmMessage>,
            _tools: Option<Vec<ToolDefinition>>,
            _options: Option<ChatOptions>,
        ) -> Result<LlmResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| Error::Generic("script exhausted".to_string()))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }

        fn provider_name(&self) -> &str {
            "test"
        }
    }

    struct LoopbackTransport {
        executor: ToolExecutor,
    }

    #[async_trait]
    impl McpTransport for LoopbackTransport {
        async fn fetch_tools(
            &self,
        ) -> std::result::Result<Vec<crate::mcp::schema::ToolDescriptor>, TransportError>
        {
            Ok(self.executor.describe())
        }

        async fn call_tool(
            &self,
            request: InvocationRequest,
        ) -> std::result::Result<InvocationResult, TransportError> {
            Ok(self.executor.execute_request(request).await)
        }
    }

    fn ticket_client() -> Arc<McpClient> {
        let store = Arc::new(TicketStore::new());
        store.seed_demo();
        let executor = ToolExecutor::new(Arc::new(ticket_registry(store).unwrap()));
        Arc::new(McpClient::new(Arc::new(LoopbackTransport { executor })))
    }

    fn tool_call_response(calls: Vec<(&str, &str, Value)>) -> LlmResponse {
        let blocks = calls
            .into_iter()
            .map(|(id, name, input)| ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            })
            .collect();
        LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content: MessageContent::Blocks(blocks),
            },
            usage: None,
            model: "scripted".to_string(),
            finish_reason: Some(FinishReason::ToolCalls),
        }
    }

    fn text_response(text: &str) -> LlmResponse {
        LlmResponse {
            message: LlmMessage::assistant(text),
            usage: None,
            model: "scripted".to_string(),
            finish_reason: Some(FinishReason::Stop),
        }
    }

    #[tokio::test]
    async fn executes_tool_calls_and_returns_final_answer() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_call_response(vec![(
                "call_1",
                "get_ticket",
                json!({"ticket_id": 1}),
            )]),
            text_response("Ticket 1 is the VPN issue."),
        ]));
        let mut agent = ChatAgent::new(llm, ticket_client(), AgentConfig::default())
            .await
            .unwrap();

        let answer = agent.chat("What is ticket 1 about?").await.unwrap();
        assert_eq!(answer, "Ticket 1 is the VPN issue.");

        // system, user, assistant tool call, tool results, final assistant
        assert_eq!(agent.history().len(), 5);
        let tool_message = &agent.history()[3];
        assert_eq!(tool_message.role, MessageRole::Tool);
        match &tool_message.content {
            MessageContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult {
                    tool_use_id,
                    is_error,
                    content,
                } => {
                    assert_eq!(tool_use_id, "call_1");
                    assert_eq!(*is_error, Some(false));
                    let envelope: InvocationResult = serde_json::from_str(content).unwrap();
                    assert!(envelope.success);
                }
                other => panic!("expected tool result, got {:?}", other),
            },
            other => panic!("expected blocks, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn batched_tool_calls_run_together_and_fail_independently() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_call_response(vec![
                ("call_a", "get_ticket", json!({"ticket_id": 1})),
                ("call_b", "get_ticket", json!({"ticket_id": 999})),
            ]),
            text_response("done"),
        ]));
        let mut agent = ChatAgent::new(llm, ticket_client(), AgentConfig::default())
            .await
            .unwrap();
        agent.chat("Compare tickets 1 and 999").await.unwrap();

        let tool_message = &agent.history()[3];
        let blocks = match &tool_message.content {
            MessageContent::Blocks(blocks) => blocks,
            other => panic!("expected blocks, got {:?}", other),
        };
        assert_eq!(blocks.len(), 2);

        let envelope_for = |wanted: &str| {
            blocks.iter().find_map(|b| match b {
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } if tool_use_id == wanted => {
                    Some(serde_json::from_str::<InvocationResult>(content).unwrap())
                }
                _ => None,
            })
        };
        assert!(envelope_for("call_a").unwrap().success);
        let failed = envelope_for("call_b").unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error_kind(), Some("NotFound"));
    }

    #[tokio::test]
    async fn unknown_tool_request_feeds_back_an_error_envelope() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            tool_call_response(vec![("call_1", "suggest_resolution", json!({}))]),
            text_response("That tool is unavailable."),
        ]));
        let mut agent = ChatAgent::new(llm, ticket_client(), AgentConfig::default())
            .await
            .unwrap();
        let answer = agent.chat("Suggest a fix for ticket 1").await.unwrap();
        assert_eq!(answer, "That tool is unavailable.");

        let tool_message = &agent.history()[3];
        match &tool_message.content {
            MessageContent::Blocks(blocks) => match &blocks[0] {
                ContentBlock::ToolResult {
                    is_error, content, ..
                } => {
                    assert_eq!(*is_error, Some(true));
                    assert!(content.contains("UnknownTool"));
                }
                other => panic!("expected tool result, got {:?}", other),
            },
            other => panic!("expected blocks, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn runaway_tool_loop_hits_the_step_ceiling() {
        let responses: Vec<LlmResponse> = (0..4)
            .map(|i| {
                tool_call_response(vec![(
                    "call",
                    "get_ticket",
                    json!({"ticket_id": i + 1}),
                )])
            })
            .collect();
        let llm = Arc::new(ScriptedLlm::new(responses));
        let mut agent = ChatAgent::new(
            llm,
            ticket_client(),
            AgentConfig {
                max_steps: 2,
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = agent.chat("loop forever").await.unwrap_err();
        assert!(matches!(
            err,
            Error::Agent(AgentError::MaxStepsExceeded { max_steps: 2 })
        ));
    }

    #[tokio::test]
    async fn reset_keeps_only_the_system_prompt() {
        let llm = Arc::new(ScriptedLlm::new(vec![text_response("hello")]));
        let mut agent = ChatAgent::new(llm, ticket_client(), AgentConfig::default())
            .await
            .unwrap();
        agent.chat("hi").await.unwrap();
        assert!(agent.history().len() > 1);

        agent.reset();
        assert_eq!(agent.history().len(), 1);
        assert_eq!(agent.history()[0].role, MessageRole::System);
        assert_eq!(agent.available_tools().len(), 7);
    }
}

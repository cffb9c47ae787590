//! OpenAI-compatible chat client (plain OpenAI endpoints and Azure OpenAI)

use crate::config::{LlmProvider, LlmSettings};
use crate::error::{ConfigError, LlmError, Result};
use crate::llm::{
    ChatOptions, ContentBlock, FinishReason, LlmClient, LlmMessage, LlmResponse, MessageContent,
    MessageRole, ToolDefinition, Usage,
};
use async_openai::{
    config::{AzureConfig, OpenAIConfig},
    types::{
        ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessage,
        ChatCompletionRequestAssistantMessageContent, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessage,
        ChatCompletionRequestToolMessageContent, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs,
        FunctionObject,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::Value;

enum ApiClient {
    OpenAi(Client<OpenAIConfig>),
    Azure(Client<AzureConfig>),
}

/// Chat-completion client backed by async-openai
pub struct OpenAiClient {
    inner: ApiClient,
    model: String,
    provider: &'static str,
}

impl OpenAiClient {
    /// Build a client from LLM settings
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        match settings.provider {
            LlmProvider::OpenAi => Self::openai(
                &settings.api_key,
                settings.base_url.as_deref(),
                &settings.model,
            ),
            LlmProvider::Azure => {
                let endpoint = settings.endpoint.as_deref().ok_or_else(|| {
                    ConfigError::MissingField {
                        field: "llm.endpoint".to_string(),
                    }
                })?;
                let deployment = settings.deployment.as_deref().ok_or_else(|| {
                    ConfigError::MissingField {
                        field: "llm.deployment".to_string(),
                    }
                })?;
                Self::azure(
                    endpoint,
                    &settings.api_key,
                    deployment,
                    settings.api_version.as_deref(),
                    &settings.model,
                )
            }
        }
    }

    /// Client for api.openai.com or any OpenAI-compatible base URL
    pub fn openai(api_key: &str, base_url: Option<&str>, model: &str) -> Result<Self> {
        if api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key configured".to_string(),
            }
            .into());
        }

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        Ok(Self {
            inner: ApiClient::OpenAi(Client::with_config(config)),
            model: model.to_string(),
            provider: "openai",
        })
    }

    /// Client for an Azure OpenAI deployment
    pub fn azure(
        endpoint: &str,
        api_key: &str,
        deployment: &str,
        api_version: Option<&str>,
        model: &str,
    ) -> Result<Self> {
        if api_key.is_empty() {
            return Err(LlmError::Authentication {
                message: "No API key configured".to_string(),
            }
            .into());
        }

        let config = AzureConfig::new()
            .with_api_base(endpoint)
            .with_api_key(api_key)
            .with_deployment_id(deployment)
            .with_api_version(api_version.unwrap_or("2024-02-15-preview"));

        Ok(Self {
            inner: ApiClient::Azure(Client::with_config(config)),
            model: model.to_string(),
            provider: "azure_openai",
        })
    }

    /// Convert our message format to the async-openai request types
    fn convert_messages(
        &self,
        messages: Vec<LlmMessage>,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut converted = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => {
                    let content = message.text().unwrap_or_default();
                    converted.push(ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::User => {
                    let content = message.text().unwrap_or_default();
                    converted.push(ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage {
                            content: content.into(),
                            name: None,
                        },
                    ));
                }
                MessageRole::Assistant => {
                    let text = message.text();
                    let mut tool_calls = Vec::new();
                    if let MessageContent::Blocks(blocks) = &message.content {
                        for block in blocks {
                            if let ContentBlock::ToolUse { id, name, input } = block {
                                tool_calls.push(ChatCompletionMessageToolCall {
                                    id: id.clone(),
                                    r#type: ChatCompletionToolType::Function,
                                    function: async_openai::types::FunctionCall {
                                        name: name.clone(),
                                        arguments: input.to_string(),
                                    },
                                });
                            }
                        }
                    }

                    converted.push(ChatCompletionRequestMessage::Assistant(
                        ChatCompletionRequestAssistantMessage {
                            content: text
                                .map(ChatCompletionRequestAssistantMessageContent::Text),
                            name: None,
                            tool_calls: if tool_calls.is_empty() {
                                None
                            } else {
                                Some(tool_calls)
                            },
                            audio: None,
                            refusal: None,
                            ..Default::default()
                        },
                    ));
                }
                MessageRole::Tool => {
                    let mut pushed_any = false;
                    if let MessageContent::Blocks(blocks) = &message.content {
                        for block in blocks {
                            if let ContentBlock::ToolResult {
                                tool_use_id,
                                content,
                                ..
                            } = block
                            {
                                converted.push(ChatCompletionRequestMessage::Tool(
                                    ChatCompletionRequestToolMessage {
                                        content: ChatCompletionRequestToolMessageContent::Text(
                                            content.clone(),
                                        ),
                                        tool_call_id: tool_use_id.clone(),
                                    },
                                ));
                                pushed_any = true;
                            }
                        }
                    }
                    if !pushed_any {
                        return Err(LlmError::InvalidRequest {
                            message: "Tool message must contain at least one ToolResult"
                                .to_string(),
                        }
                        .into());
                    }
                }
            }
        }

        Ok(converted)
    }

    fn convert_tools(&self, tools: Vec<ToolDefinition>) -> Vec<ChatCompletionTool> {
        tools
            .into_iter()
            .map(|tool| ChatCompletionTool {
                r#type: ChatCompletionToolType::Function,
                function: FunctionObject {
                    name: tool.function.name,
                    description: Some(tool.function.description),
                    parameters: Some(tool.function.parameters),
                    strict: None,
                },
            })
            .collect()
    }

    fn convert_response(
        &self,
        response: async_openai::types::CreateChatCompletionResponse,
    ) -> Result<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Api {
                message: "No choices in response".to_string(),
            })?;

        let mut blocks = Vec::new();
        if let Some(text) = choice.message.content {
            if !text.is_empty() {
                blocks.push(ContentBlock::Text { text });
            }
        }
        if let Some(tool_calls) = choice.message.tool_calls {
            for tool_call in tool_calls {
                let function = &tool_call.function;
                let input: Value = serde_json::from_str(&function.arguments)
                    .unwrap_or_else(|_| Value::String(function.arguments.clone()));
                blocks.push(ContentBlock::ToolUse {
                    id: tool_call.id,
                    name: function.name.clone(),
                    input,
                });
            }
        }

        let content = match blocks.len() {
            0 => MessageContent::Text(String::new()),
            1 => match blocks.pop() {
                Some(ContentBlock::Text { text }) => MessageContent::Text(text),
                Some(block) => MessageContent::Blocks(vec![block]),
                None => MessageContent::Text(String::new()),
            },
            _ => MessageContent::Blocks(blocks),
        };

        let usage = response.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let finish_reason = choice.finish_reason.map(|reason| match reason {
            async_openai::types::FinishReason::Stop => FinishReason::Stop,
            async_openai::types::FinishReason::Length => FinishReason::Length,
            async_openai::types::FinishReason::ToolCalls => FinishReason::ToolCalls,
            async_openai::types::FinishReason::ContentFilter => FinishReason::ContentFilter,
            async_openai::types::FinishReason::FunctionCall => FinishReason::ToolCalls,
        });

        Ok(LlmResponse {
            message: LlmMessage {
                role: MessageRole::Assistant,
                content,
            },
            usage,
            model: response.model,
            finish_reason,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat_completion(
        &self,
        messages: Vec<LlmMessage>,
        tools: Option<Vec<ToolDefinition>>,
        options: Option<ChatOptions>,
    ) -> Result<LlmResponse> {
        let converted_messages = self.convert_messages(messages)?;
        let converted_tools = tools.map(|t| self.convert_tools(t));

        if let Some(tools) = &converted_tools {
            tracing::debug!(tools = tools.len(), "chat completion with function calling");
        }

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model);
        request_builder.messages(converted_messages);
        if let Some(tools) = converted_tools {
            request_builder.tools(tools);
        }
        if let Some(options) = options {
            if let Some(max_tokens) = options.max_tokens {
                request_builder.max_tokens(max_tokens);
            }
            if let Some(temperature) = options.temperature {
                request_builder.temperature(temperature);
            }
            if let Some(top_p) = options.top_p {
                request_builder.top_p(top_p);
            }
        }

        let request = request_builder
            .build()
            .map_err(|e| LlmError::InvalidRequest {
                message: format!("Failed to build request: {}", e),
            })?;

        let response = match &self.inner {
            ApiClient::OpenAi(client) => client.chat().create(request).await,
            ApiClient::Azure(client) => client.chat().create(request).await,
        }
        .map_err(|e| LlmError::Api {
            message: e.to_string(),
        })?;

        let response = self.convert_response(response)?;
        if let Some(FinishReason::ToolCalls) = response.finish_reason {
            tracing::debug!(
                tool_calls = response.message.tool_uses().len(),
                "model requested tool calls"
            );
        }
        Ok(response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        self.provider
    }
}

//! Remote invocation client: cached discovery and enveloped invocation

use crate::error::TransportError;
use crate::mcp::envelope::{InvocationError, InvocationRequest, InvocationResult};
use crate::mcp::schema::ToolDescriptor;
use crate::mcp::transport::McpTransport;
use serde_json::{Map as JsonMap, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, Semaphore};

/// Client-side tuning knobs
#[derive(Debug, Clone)]
pub struct McpClientConfig {
    /// Per-invocation timeout; on expiry a `TransportError` envelope is
    /// synthesized locally
    pub timeout: Duration,

    /// How long a fetched tool list stays warm
    pub cache_ttl: Duration,

    /// Ceiling on concurrently in-flight invocations
    pub max_concurrency: usize,
}

impl Default for McpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
            max_concurrency: 8,
        }
    }
}

/// Snapshot of one discovery round-trip.
///
/// Refreshes replace the whole snapshot atomically; the generation counter
/// ties function adapters to the discovery that produced them.
struct ToolCache {
    tools: Arc<Vec<ToolDescriptor>>,
    fetched_at: Instant,
    generation: u64,
}

/// Client for a remote MCP server.
///
/// `discover` caches the tool list until the TTL expires; `invoke` always
/// returns the uniform envelope, synthesizing a `TransportError` entry on
/// network failure or timeout instead of raising.
pub struct McpClient {
    transport: Arc<dyn McpTransport>,
    config: McpClientConfig,
    cache: RwLock<Option<ToolCache>>,
    limiter: Semaphore,
}

impl McpClient {
    pub fn new(transport: Arc<dyn McpTransport>) -> Self {
        Self::with_config(transport, McpClientConfig::default())
    }

    pub fn with_config(transport: Arc<dyn McpTransport>, config: McpClientConfig) -> Self {
        let limiter = Semaphore::new(config.max_concurrency.max(1));
        Self {
            transport,
            config,
            cache: RwLock::new(None),
            limiter,
        }
    }

    pub fn config(&self) -> &McpClientConfig {
        &self.config
    }

    /// Discover the server's tools.
    ///
    /// A warm, unexpired cache short-circuits with no transport round-trip
    /// unless `force_refresh` is set. On fetch failure a populated cache is
    /// served stale; with no cache the failure propagates.
    pub async fn discover(
        &self,
        force_refresh: bool,
    ) -> std::result::Result<Arc<Vec<ToolDescriptor>>, TransportError> {
        if !force_refresh {
            let guard = self.cache.read().await;
            if let Some(cache) = guard.as_ref() {
                if cache.fetched_at.elapsed() < self.config.cache_ttl {
                    return Ok(cache.tools.clone());
                }
            }
        }

        match self.transport.fetch_tools().await {
            Ok(tools) => {
                let tools = Arc::new(tools);
                let mut guard = self.cache.write().await;
                let generation = guard.as_ref().map(|c| c.generation + 1).unwrap_or(0);
                *guard = Some(ToolCache {
                    tools: tools.clone(),
                    fetched_at: Instant::now(),
                    generation,
                });
                tracing::debug!(count = tools.len(), generation, "tool list refreshed");
                Ok(tools)
            }
            Err(error) => {
                let guard = self.cache.read().await;
                if let Some(cache) = guard.as_ref() {
                    tracing::warn!(%error, "discovery failed, serving stale tool list");
                    Ok(cache.tools.clone())
                } else {
                    Err(error)
                }
            }
        }
    }

    /// Drop the cached tool list; the next `discover` refetches
    pub async fn invalidate(&self) {
        *self.cache.write().await = None;
    }

    /// Generation of the current cache snapshot, if any
    pub async fn generation(&self) -> Option<u64> {
        self.cache.read().await.as_ref().map(|c| c.generation)
    }

    /// Invoke a named tool on the remote executor.
    ///
    /// Always returns an envelope: timeout and transport failures become a
    /// local `TransportError` entry. Concurrent calls are admitted up to the
    /// configured ceiling.
    pub async fn invoke(&self, tool_name: &str, arguments: JsonMap<String, Value>) -> InvocationResult {
        let request = InvocationRequest::new(tool_name, arguments);

        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return InvocationResult::fail(InvocationError::transport(
                    "invocation client is shut down",
                ))
            }
        };

        tracing::debug!(tool = %tool_name, "invocation in flight");
        match tokio::time::timeout(self.config.timeout, self.transport.call_tool(request)).await {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                tracing::warn!(tool = %tool_name, %error, "invocation transport failure");
                InvocationResult::fail(InvocationError::transport(error.to_string()))
            }
            Err(_) => {
                tracing::warn!(tool = %tool_name, timeout = ?self.config.timeout, "invocation timed out");
                InvocationResult::fail(InvocationError::transport(format!(
                    "Invocation of '{}' timed out after {:?}",
                    tool_name, self.config.timeout
                )))
            }
        }
    }

    /// Invoke with a JSON value; non-object arguments are a validation error
    pub async fn invoke_value(&self, tool_name: &str, arguments: Value) -> InvocationResult {
        match arguments {
            Value::Object(map) => self.invoke(tool_name, map).await,
            Value::Null => self.invoke(tool_name, JsonMap::new()).await,
            other => InvocationResult::fail(InvocationError::validation(
                "arguments",
                format!("Tool arguments must be an object, got {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::transport::McpTransport;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Configurable in-memory transport for exercising the client
    struct MockTransport {
        tools: Vec<ToolDescriptor>,
        fetches: AtomicUsize,
        calls: AtomicUsize,
        fail_fetch: AtomicBool,
        call_delay: Option<Duration>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl MockTransport {
        fn new(tools: Vec<ToolDescriptor>) -> Self {
            Self {
                tools,
                fetches: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                fail_fetch: AtomicBool::new(false),
                call_delay: None,
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn slow(tools: Vec<ToolDescriptor>, delay: Duration) -> Self {
            let mut transport = Self::new(tools);
            transport.call_delay = Some(delay);
            transport
        }
    }

    #[async_trait]
    impl McpTransport for MockTransport {
        async fn fetch_tools(&self) -> std::result::Result<Vec<ToolDescriptor>, TransportError> {
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(TransportError::Connect {
                    message: "connection refused".to_string(),
                });
            }
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.tools.clone())
        }

        async fn call_tool(
            &self,
            request: InvocationRequest,
        ) -> std::result::Result<InvocationResult, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            if let Some(delay) = self.call_delay {
                tokio::time::sleep(delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            Ok(InvocationResult::ok(json!({"echoed": request.name})))
        }
    }

    fn sample_tools() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("create_ticket", "Create a ticket"),
            ToolDescriptor::new("search_tickets", "Search tickets"),
        ]
    }

    #[tokio::test]
    async fn warm_cache_skips_the_transport() {
        let transport = Arc::new(MockTransport::new(sample_tools()));
        let client = McpClient::new(transport.clone());

        let first = client.discover(false).await.unwrap();
        let second = client.discover(false).await.unwrap();

        assert_eq!(transport.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(*first, *second);
        assert_eq!(client.generation().await, Some(0));
    }

    #[tokio::test]
    async fn force_refresh_refetches_and_bumps_generation() {
        let transport = Arc::new(MockTransport::new(sample_tools()));
        let client = McpClient::new(transport.clone());

        client.discover(false).await.unwrap();
        client.discover(true).await.unwrap();

        assert_eq!(transport.fetches.load(Ordering::SeqCst), 2);
        assert_eq!(client.generation().await, Some(1));
    }

    #[tokio::test]
    async fn fetch_failure_serves_stale_cache() {
        let transport = Arc::new(MockTransport::new(sample_tools()));
        let client = McpClient::new(transport.clone());

        let fresh = client.discover(false).await.unwrap();
        transport.fail_fetch.store(true, Ordering::SeqCst);

        let stale = client.discover(true).await.unwrap();
        assert_eq!(*fresh, *stale);
        assert_eq!(client.generation().await, Some(0));
    }

    #[tokio::test]
    async fn fetch_failure_without_cache_propagates() {
        let transport = Arc::new(MockTransport::new(sample_tools()));
        transport.fail_fetch.store(true, Ordering::SeqCst);
        let client = McpClient::new(transport);

        let err = client.discover(false).await.unwrap_err();
        assert!(matches!(err, TransportError::Connect { .. }));
    }

    #[tokio::test]
    async fn invalidate_forces_a_refetch() {
        let transport = Arc::new(MockTransport::new(sample_tools()));
        let client = McpClient::new(transport.clone());

        client.discover(false).await.unwrap();
        client.invalidate().await;
        client.discover(false).await.unwrap();

        assert_eq!(transport.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn timeout_synthesizes_transport_error_envelope() {
        let transport = Arc::new(MockTransport::slow(
            sample_tools(),
            Duration::from_millis(200),
        ));
        let client = McpClient::with_config(
            transport,
            McpClientConfig {
                timeout: Duration::from_millis(20),
                ..Default::default()
            },
        );

        let result = client.invoke("create_ticket", JsonMap::new()).await;
        assert!(!result.success);
        assert_eq!(result.error_kind(), Some("TransportError"));
    }

    #[tokio::test]
    async fn concurrency_ceiling_is_enforced() {
        let transport = Arc::new(MockTransport::slow(
            sample_tools(),
            Duration::from_millis(30),
        ));
        let client = Arc::new(McpClient::with_config(
            transport.clone(),
            McpClientConfig {
                max_concurrency: 2,
                ..Default::default()
            },
        ));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.invoke("search_tickets", JsonMap::new()).await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().success);
        }

        assert_eq!(transport.calls.load(Ordering::SeqCst), 6);
        assert!(transport.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn non_object_arguments_are_rejected_locally() {
        let transport = Arc::new(MockTransport::new(sample_tools()));
        let client = McpClient::new(transport.clone());

        let result = client.invoke_value("create_ticket", json!([1, 2])).await;
        assert!(!result.success);
        assert_eq!(result.error_kind(), Some("ValidationError"));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }
}

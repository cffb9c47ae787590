//! End-to-end loopback test: registry -> axum server -> HTTP client -> envelope

use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;
use ticket_mcp_core::mcp::{HttpTransport, McpClient, McpServer, McpServerConfig, ToolExecutor};
use ticket_mcp_core::tickets::{ticket_registry, TicketStore};
use url::Url;

fn args(value: Value) -> JsonMap<String, Value> {
    value.as_object().cloned().expect("object literal")
}

async fn spawn_server() -> Url {
    let store = Arc::new(TicketStore::new());
    store.seed_demo();
    let registry = ticket_registry(store).unwrap();
    let executor = Arc::new(ToolExecutor::new(Arc::new(registry)));
    let server = McpServer::new(McpServerConfig::default(), executor);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server.build_app()).await.unwrap();
    });

    Url::parse(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn discovery_and_invocation_round_trip_over_http() {
    let base_url = spawn_server().await;
    let client = Arc::new(McpClient::new(Arc::new(HttpTransport::new(base_url))));

    // Discovery lists every registered tool, in registration order
    let tools = client.discover(false).await.unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "create_ticket",
            "get_ticket",
            "list_tickets",
            "update_ticket",
            "delete_ticket",
            "search_tickets",
            "get_ticket_analytics",
        ]
    );

    // A second discovery without refresh is served from cache
    let cached = client.discover(false).await.unwrap();
    assert_eq!(*tools, *cached);
    assert_eq!(client.generation().await, Some(0));

    // Missing required argument comes back as a validation envelope
    let invalid = client
        .invoke("create_ticket", args(json!({"title": "X"})))
        .await;
    assert!(!invalid.success);
    let error = invalid.error.unwrap();
    assert_eq!(error.kind, "ValidationError");
    assert_eq!(error.field.as_deref(), Some("description"));

    // Valid invocation succeeds and returns the created ticket
    let created = client
        .invoke(
            "create_ticket",
            args(json!({
                "title": "Monitor flickering",
                "description": "External monitor flickers when docked",
                "reporter": "grace@example.com",
                "priority": "HIGH"
            })),
        )
        .await;
    assert!(created.success);
    let payload = created.result.unwrap();
    assert_eq!(payload["ticket"]["priority"], "high");
    let ticket_id = payload["ticket"]["id"].as_u64().unwrap();

    let fetched = client
        .invoke("get_ticket", args(json!({"ticket_id": ticket_id})))
        .await;
    assert!(fetched.success);
    assert_eq!(
        fetched.result.unwrap()["ticket"]["title"],
        "Monitor flickering"
    );

    // Search over the fixtures stays within the requested bound
    let search = client
        .invoke(
            "search_tickets",
            args(json!({"query": "network", "limit": 5})),
        )
        .await;
    assert!(search.success);
    let payload = search.result.unwrap();
    let count = payload["count"].as_u64().unwrap();
    assert!(count >= 1 && count <= 5);

    // Unknown tools are an envelope, not a protocol fault
    let unknown = client.invoke("generate_report", JsonMap::new()).await;
    assert!(!unknown.success);
    assert_eq!(unknown.error_kind(), Some("UnknownTool"));
}

#[tokio::test]
async fn adapters_built_over_http_invoke_their_tools() {
    let base_url = spawn_server().await;
    let client = Arc::new(McpClient::new(Arc::new(HttpTransport::new(base_url))));

    let functions = client.functions(false).await.unwrap();
    assert_eq!(functions.len(), 7);

    let analytics = functions
        .iter()
        .find(|f| f.name() == "get_ticket_analytics")
        .unwrap();
    let result = analytics.invoke(JsonMap::new()).await;
    assert!(result.success);
    assert_eq!(result.result.unwrap()["total_tickets"], 5);
}

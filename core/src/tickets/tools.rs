//! MCP tool bindings for the ticket store

use crate::error::{HandlerError, TicketError, ToolError};
use crate::mcp::registry::{ToolHandler, ToolRegistry};
use crate::mcp::schema::{ParameterSpec, ToolDescriptor};
use crate::tickets::model::{
    SearchMatch, TicketCategory, TicketCreate, TicketFilter, TicketPriority, TicketStatus,
    TicketSummary, TicketUpdate,
};
use crate::tickets::store::TicketStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map as JsonMap, Value};
use std::sync::Arc;

/// Build a registry carrying every ticket tool, bound to the given store
pub fn ticket_registry(store: Arc<TicketStore>) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(
        create_ticket_descriptor(),
        Arc::new(CreateTicketTool {
            store: store.clone(),
        }),
    )?;
    registry.register(
        get_ticket_descriptor(),
        Arc::new(GetTicketTool {
            store: store.clone(),
        }),
    )?;
    registry.register(
        list_tickets_descriptor(),
        Arc::new(ListTicketsTool {
            store: store.clone(),
        }),
    )?;
    registry.register(
        update_ticket_descriptor(),
        Arc::new(UpdateTicketTool {
            store: store.clone(),
        }),
    )?;
    registry.register(
        delete_ticket_descriptor(),
        Arc::new(DeleteTicketTool {
            store: store.clone(),
        }),
    )?;
    registry.register(
        search_tickets_descriptor(),
        Arc::new(SearchTicketsTool {
            store: store.clone(),
        }),
    )?;
    registry.register(
        analytics_descriptor(),
        Arc::new(TicketAnalyticsTool { store }),
    )?;
    Ok(registry)
}

fn priorities() -> Vec<&'static str> {
    TicketPriority::ALL.iter().map(|p| p.as_str()).collect()
}

fn categories() -> Vec<&'static str> {
    TicketCategory::ALL.iter().map(|c| c.as_str()).collect()
}

fn statuses() -> Vec<&'static str> {
    TicketStatus::ALL.iter().map(|s| s.as_str()).collect()
}

/// Deserialize validated arguments into a typed parameter struct
fn parse<T: DeserializeOwned>(arguments: JsonMap<String, Value>) -> Result<T, HandlerError> {
    serde_json::from_value(Value::Object(arguments))
        .map_err(|e| HandlerError::new("InvalidArgument", e.to_string()))
}

// ── create_ticket ────────────────────────────────────────────────────────────

fn create_ticket_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("create_ticket", "Create a new incident ticket")
        .required("title", ParameterSpec::string("Ticket title"))
        .required(
            "description",
            ParameterSpec::string("Detailed description of the issue"),
        )
        .optional(
            "priority",
            ParameterSpec::enumeration("Priority level", priorities())
                .with_default(json!("medium")),
        )
        .optional(
            "category",
            ParameterSpec::enumeration("Issue category", categories())
                .with_default(json!("other")),
        )
        .optional("assignee", ParameterSpec::string("Assigned user"))
        .required("reporter", ParameterSpec::string("Reporting user"))
        .optional(
            "tags",
            ParameterSpec::array("Tags list", json!({"type": "string"})),
        )
}

#[derive(Deserialize)]
struct CreateTicketParams {
    title: String,
    description: String,
    #[serde(default)]
    priority: TicketPriority,
    #[serde(default)]
    category: TicketCategory,
    #[serde(default)]
    assignee: Option<String>,
    reporter: String,
    #[serde(default)]
    tags: Vec<String>,
}

struct CreateTicketTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for CreateTicketTool {
    async fn call(&self, arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let params: CreateTicketParams = parse(arguments)?;
        let ticket = self.store.create(TicketCreate {
            title: params.title,
            description: params.description,
            priority: params.priority,
            category: params.category,
            assignee: params.assignee,
            reporter: params.reporter,
            tags: params.tags,
        })?;

        Ok(json!({
            "message": format!("Ticket created successfully with ID {}", ticket.id),
            "ticket": ticket,
        }))
    }
}

// ── get_ticket ───────────────────────────────────────────────────────────────

fn get_ticket_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("get_ticket", "Get detailed information about a ticket")
        .required("ticket_id", ParameterSpec::integer("Ticket ID"))
}

#[derive(Deserialize)]
struct GetTicketParams {
    ticket_id: u64,
}

struct GetTicketTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for GetTicketTool {
    async fn call(&self, arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let params: GetTicketParams = parse(arguments)?;
        let ticket = self
            .store
            .get(params.ticket_id)
            .ok_or(TicketError::NotFound {
                id: params.ticket_id,
            })?;

        Ok(json!({"ticket": ticket}))
    }
}

// ── list_tickets ─────────────────────────────────────────────────────────────

fn list_tickets_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("list_tickets", "List tickets with optional filtering")
        .optional(
            "status",
            ParameterSpec::array(
                "Filter by status",
                json!({"type": "string", "enum": statuses()}),
            ),
        )
        .optional(
            "priority",
            ParameterSpec::array(
                "Filter by priority",
                json!({"type": "string", "enum": priorities()}),
            ),
        )
        .optional(
            "category",
            ParameterSpec::array(
                "Filter by category",
                json!({"type": "string", "enum": categories()}),
            ),
        )
        .optional("assignee", ParameterSpec::string("Filter by assignee"))
        .optional("reporter", ParameterSpec::string("Filter by reporter"))
        .optional(
            "limit",
            ParameterSpec::integer("Maximum results").with_default(json!(10)),
        )
}

#[derive(Deserialize)]
struct ListTicketsParams {
    #[serde(default)]
    status: Option<Vec<TicketStatus>>,
    #[serde(default)]
    priority: Option<Vec<TicketPriority>>,
    #[serde(default)]
    category: Option<Vec<TicketCategory>>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    reporter: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
}

struct ListTicketsTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for ListTicketsTool {
    async fn call(&self, arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let params: ListTicketsParams = parse(arguments)?;
        let tickets = self.store.list(&TicketFilter {
            status: params.status,
            priority: params.priority,
            category: params.category,
            assignee: params.assignee,
            reporter: params.reporter,
            limit: params.limit,
        });
        let summaries: Vec<TicketSummary> = tickets.iter().map(TicketSummary::from).collect();

        Ok(json!({
            "message": format!("Found {} tickets", summaries.len()),
            "tickets": summaries,
            "count": summaries.len(),
        }))
    }
}

// ── update_ticket ────────────────────────────────────────────────────────────

fn update_ticket_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("update_ticket", "Update an existing ticket")
        .required("ticket_id", ParameterSpec::integer("Ticket ID"))
        .optional("title", ParameterSpec::string("New title"))
        .optional("description", ParameterSpec::string("New description"))
        .optional(
            "status",
            ParameterSpec::enumeration("New status", statuses()),
        )
        .optional(
            "priority",
            ParameterSpec::enumeration("New priority", priorities()),
        )
        .optional(
            "category",
            ParameterSpec::enumeration("New category", categories()),
        )
        .optional("assignee", ParameterSpec::string("New assignee"))
        .optional(
            "resolution_notes",
            ParameterSpec::string("Resolution notes"),
        )
        .optional(
            "tags",
            ParameterSpec::array("New tags", json!({"type": "string"})),
        )
}

#[derive(Deserialize)]
struct UpdateTicketParams {
    ticket_id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<TicketStatus>,
    #[serde(default)]
    priority: Option<TicketPriority>,
    #[serde(default)]
    category: Option<TicketCategory>,
    #[serde(default)]
    assignee: Option<String>,
    #[serde(default)]
    resolution_notes: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

struct UpdateTicketTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for UpdateTicketTool {
    async fn call(&self, arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let params: UpdateTicketParams = parse(arguments)?;
        let ticket = self.store.update(
            params.ticket_id,
            TicketUpdate {
                title: params.title,
                description: params.description,
                status: params.status,
                priority: params.priority,
                category: params.category,
                assignee: params.assignee,
                tags: params.tags,
                resolution_notes: params.resolution_notes,
            },
        )?;

        Ok(json!({
            "message": format!("Ticket {} updated successfully", ticket.id),
            "ticket": ticket,
        }))
    }
}

// ── delete_ticket ────────────────────────────────────────────────────────────

fn delete_ticket_descriptor() -> ToolDescriptor {
    ToolDescriptor::new("delete_ticket", "Delete a ticket")
        .required("ticket_id", ParameterSpec::integer("Ticket ID"))
}

struct DeleteTicketTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for DeleteTicketTool {
    async fn call(&self, arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let params: GetTicketParams = parse(arguments)?;
        if !self.store.delete(params.ticket_id) {
            return Err(TicketError::NotFound {
                id: params.ticket_id,
            }
            .into());
        }

        Ok(json!({
            "message": format!("Ticket {} deleted", params.ticket_id),
            "ticket_id": params.ticket_id,
        }))
    }
}

// ── search_tickets ───────────────────────────────────────────────────────────

fn search_tickets_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "search_tickets",
        "Search tickets by keyword relevance over title, description, and tags",
    )
    .required("query", ParameterSpec::string("Search query"))
    .optional(
        "limit",
        ParameterSpec::integer("Maximum results").with_default(json!(10)),
    )
}

#[derive(Deserialize)]
struct SearchTicketsParams {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

struct SearchTicketsTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for SearchTicketsTool {
    async fn call(&self, arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let params: SearchTicketsParams = parse(arguments)?;
        let limit = params.limit.unwrap_or(10);
        let matches: Vec<SearchMatch> = self
            .store
            .search(&params.query, limit)
            .iter()
            .map(|(ticket, score)| SearchMatch {
                ticket: TicketSummary::from(ticket),
                score: *score,
            })
            .collect();

        Ok(json!({
            "message": format!("Found {} tickets matching '{}'", matches.len(), params.query),
            "matches": matches,
            "count": matches.len(),
            "query": params.query,
        }))
    }
}

// ── get_ticket_analytics ─────────────────────────────────────────────────────

fn analytics_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        "get_ticket_analytics",
        "Get ticket statistics and analytics",
    )
}

struct TicketAnalyticsTool {
    store: Arc<TicketStore>,
}

#[async_trait]
impl ToolHandler for TicketAnalyticsTool {
    async fn call(&self, _arguments: JsonMap<String, Value>) -> Result<Value, HandlerError> {
        let analytics = self.store.analytics();
        serde_json::to_value(analytics)
            .map_err(|e| HandlerError::new("Internal", e.to_string()))
    }
}

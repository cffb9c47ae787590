//! Ticket data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 5] = [
        TicketStatus::Open,
        TicketStatus::InProgress,
        TicketStatus::Pending,
        TicketStatus::Resolved,
        TicketStatus::Closed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Pending => "pending",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
        }
    }

    /// Resolved and closed tickets count as finished in analytics
    pub fn is_finished(&self) -> bool {
        matches!(self, TicketStatus::Resolved | TicketStatus::Closed)
    }
}

/// Ticket priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 4] = [
        TicketPriority::Low,
        TicketPriority::Medium,
        TicketPriority::High,
        TicketPriority::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Critical => "critical",
        }
    }
}

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TicketCategory {
    Hardware,
    Software,
    Network,
    Access,
    Performance,
    Security,
    #[default]
    Other,
}

impl TicketCategory {
    pub const ALL: [TicketCategory; 7] = [
        TicketCategory::Hardware,
        TicketCategory::Software,
        TicketCategory::Network,
        TicketCategory::Access,
        TicketCategory::Performance,
        TicketCategory::Security,
        TicketCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketCategory::Hardware => "hardware",
            TicketCategory::Software => "software",
            TicketCategory::Network => "network",
            TicketCategory::Access => "access",
            TicketCategory::Performance => "performance",
            TicketCategory::Security => "security",
            TicketCategory::Other => "other",
        }
    }
}

/// A complete ticket record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub assignee: Option<String>,
    pub reporter: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub resolution_notes: Option<String>,
}

impl Ticket {
    /// Most recent activity instant, for ordering and analytics
    pub fn last_activity(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Fields for creating a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCreate {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub category: TicketCategory,
    #[serde(default)]
    pub assignee: Option<String>,
    pub reporter: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub category: Option<TicketCategory>,
    pub assignee: Option<String>,
    pub tags: Option<Vec<String>>,
    pub resolution_notes: Option<String>,
}

impl TicketUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.category.is_none()
            && self.assignee.is_none()
            && self.tags.is_none()
            && self.resolution_notes.is_none()
    }
}

/// Filter for listing tickets
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<Vec<TicketStatus>>,
    pub priority: Option<Vec<TicketPriority>>,
    pub category: Option<Vec<TicketCategory>>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub limit: Option<usize>,
}

/// Compact ticket projection used in list and search payloads.
///
/// Long descriptions are truncated the same way the API has always shown
/// them: 200 characters plus an ellipsis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketSummary {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: TicketCategory,
    pub assignee: Option<String>,
    pub reporter: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<&Ticket> for TicketSummary {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            title: ticket.title.clone(),
            description: truncate(&ticket.description, 200),
            status: ticket.status,
            priority: ticket.priority,
            category: ticket.category,
            assignee: ticket.assignee.clone(),
            reporter: ticket.reporter.clone(),
            created_at: ticket.created_at,
            tags: ticket.tags.clone(),
        }
    }
}

/// A search hit with its relevance score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(flatten)]
    pub ticket: TicketSummary,
    pub score: f64,
}

/// Aggregate ticket statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketAnalytics {
    pub total_tickets: usize,
    pub open_tickets: usize,
    pub closed_tickets: usize,
    pub avg_resolution_time_hours: Option<f64>,
    pub tickets_by_status: HashMap<String, usize>,
    pub tickets_by_priority: HashMap<String, usize>,
    pub tickets_by_category: HashMap<String, usize>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// One line of the recent-activity feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub ticket_id: u64,
    pub title: String,
    pub status: TicketStatus,
    pub updated_at: DateTime<Utc>,
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}

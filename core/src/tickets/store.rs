//! In-memory ticket store with filtering, keyword search, and analytics

use crate::error::TicketError;
use crate::tickets::model::{
    ActivityEntry, Ticket, TicketAnalytics, TicketCategory, TicketCreate, TicketFilter,
    TicketPriority, TicketStatus, TicketUpdate,
};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

const DEFAULT_LIST_LIMIT: usize = 100;

struct StoreInner {
    tickets: BTreeMap<u64, Ticket>,
    next_id: u64,
}

/// Thread-safe in-memory ticket store.
///
/// Lock scopes are short and never span an await point, so the store is safe
/// to call from async handlers.
pub struct TicketStore {
    inner: RwLock<StoreInner>,
}

impl TicketStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                tickets: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.read().tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().tickets.is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a ticket; title and description must be non-blank
    pub fn create(&self, data: TicketCreate) -> Result<Ticket, TicketError> {
        let title = data.title.trim().to_string();
        if title.is_empty() {
            return Err(TicketError::EmptyField { field: "title" });
        }
        let description = data.description.trim().to_string();
        if description.is_empty() {
            return Err(TicketError::EmptyField {
                field: "description",
            });
        }

        let mut inner = self.write();
        let id = inner.next_id;
        inner.next_id += 1;

        let ticket = Ticket {
            id,
            title,
            description,
            status: TicketStatus::Open,
            priority: data.priority,
            category: data.category,
            assignee: data.assignee,
            reporter: data.reporter,
            created_at: Utc::now(),
            updated_at: None,
            resolved_at: None,
            tags: data.tags,
            resolution_notes: None,
        };
        inner.tickets.insert(id, ticket.clone());

        tracing::info!(ticket_id = id, "created ticket");
        Ok(ticket)
    }

    pub fn get(&self, id: u64) -> Option<Ticket> {
        self.read().tickets.get(&id).cloned()
    }

    /// List tickets matching the filter, newest first
    pub fn list(&self, filter: &TicketFilter) -> Vec<Ticket> {
        let inner = self.read();
        let mut matched: Vec<Ticket> = inner
            .tickets
            .values()
            .filter(|t| {
                filter
                    .status
                    .as_ref()
                    .map_or(true, |wanted| wanted.contains(&t.status))
                    && filter
                        .priority
                        .as_ref()
                        .map_or(true, |wanted| wanted.contains(&t.priority))
                    && filter
                        .category
                        .as_ref()
                        .map_or(true, |wanted| wanted.contains(&t.category))
                    && filter
                        .assignee
                        .as_ref()
                        .map_or(true, |a| t.assignee.as_deref() == Some(a.as_str()))
                    && filter
                        .reporter
                        .as_ref()
                        .map_or(true, |r| t.reporter == *r)
            })
            .cloned()
            .collect();

        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        matched.truncate(filter.limit.unwrap_or(DEFAULT_LIST_LIMIT));
        matched
    }

    /// Apply a partial update.
    ///
    /// The first transition into resolved/closed stamps `resolved_at`; later
    /// updates leave the stamp untouched.
    pub fn update(&self, id: u64, update: TicketUpdate) -> Result<Ticket, TicketError> {
        if update.is_empty() {
            return Err(TicketError::EmptyUpdate);
        }

        // Validate before touching the ticket so a failed update changes nothing
        let title = match update.title {
            Some(title) => {
                let title = title.trim().to_string();
                if title.is_empty() {
                    return Err(TicketError::EmptyField { field: "title" });
                }
                Some(title)
            }
            None => None,
        };
        let description = match update.description {
            Some(description) => {
                let description = description.trim().to_string();
                if description.is_empty() {
                    return Err(TicketError::EmptyField {
                        field: "description",
                    });
                }
                Some(description)
            }
            None => None,
        };

        let mut inner = self.write();
        let ticket = inner
            .tickets
            .get_mut(&id)
            .ok_or(TicketError::NotFound { id })?;

        if let Some(title) = title {
            ticket.title = title;
        }
        if let Some(description) = description {
            ticket.description = description;
        }
        if let Some(status) = update.status {
            ticket.status = status;
            if status.is_finished() && ticket.resolved_at.is_none() {
                ticket.resolved_at = Some(Utc::now());
            }
        }
        if let Some(priority) = update.priority {
            ticket.priority = priority;
        }
        if let Some(category) = update.category {
            ticket.category = category;
        }
        if let Some(assignee) = update.assignee {
            ticket.assignee = Some(assignee);
        }
        if let Some(tags) = update.tags {
            ticket.tags = tags;
        }
        if let Some(notes) = update.resolution_notes {
            ticket.resolution_notes = Some(notes);
        }
        ticket.updated_at = Some(Utc::now());

        tracing::info!(ticket_id = id, "updated ticket");
        Ok(ticket.clone())
    }

    pub fn delete(&self, id: u64) -> bool {
        let removed = self.write().tickets.remove(&id).is_some();
        if removed {
            tracing::info!(ticket_id = id, "deleted ticket");
        }
        removed
    }

    /// Keyword-relevance search over title, description, and tags.
    ///
    /// Scores are the fraction of query terms found in the ticket text;
    /// zero-score tickets are omitted and results come back best-first.
    pub fn search(&self, query: &str, limit: usize) -> Vec<(Ticket, f64)> {
        let terms: Vec<String> = query
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let inner = self.read();
        let mut scored: Vec<(Ticket, f64)> = inner
            .tickets
            .values()
            .filter_map(|ticket| {
                let haystack = format!(
                    "{} {} {}",
                    ticket.title,
                    ticket.description,
                    ticket.tags.join(" ")
                )
                .to_lowercase();
                let hits = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
                if hits == 0 {
                    None
                } else {
                    Some((ticket.clone(), hits as f64 / terms.len() as f64))
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.0.created_at.cmp(&a.0.created_at))
        });
        scored.truncate(limit);
        scored
    }

    /// Aggregate statistics over the whole store
    pub fn analytics(&self) -> TicketAnalytics {
        let inner = self.read();
        let tickets: Vec<&Ticket> = inner.tickets.values().collect();

        let mut by_status: HashMap<String, usize> = TicketStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        let mut by_priority: HashMap<String, usize> = TicketPriority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        let mut by_category: HashMap<String, usize> = TicketCategory::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();

        for ticket in &tickets {
            *by_status.entry(ticket.status.as_str().to_string()).or_default() += 1;
            *by_priority
                .entry(ticket.priority.as_str().to_string())
                .or_default() += 1;
            *by_category
                .entry(ticket.category.as_str().to_string())
                .or_default() += 1;
        }

        let resolution_hours: Vec<f64> = tickets
            .iter()
            .filter_map(|t| {
                t.resolved_at
                    .map(|resolved| (resolved - t.created_at).num_seconds() as f64 / 3600.0)
            })
            .collect();
        let avg_resolution_time_hours = if resolution_hours.is_empty() {
            None
        } else {
            Some(resolution_hours.iter().sum::<f64>() / resolution_hours.len() as f64)
        };

        let mut recent: Vec<&Ticket> = tickets.clone();
        recent.sort_by(|a, b| b.last_activity().cmp(&a.last_activity()));
        let recent_activity = recent
            .iter()
            .take(10)
            .map(|t| ActivityEntry {
                ticket_id: t.id,
                title: t.title.clone(),
                status: t.status,
                updated_at: t.last_activity(),
            })
            .collect();

        TicketAnalytics {
            total_tickets: tickets.len(),
            open_tickets: tickets.iter().filter(|t| !t.status.is_finished()).count(),
            closed_tickets: tickets.iter().filter(|t| t.status.is_finished()).count(),
            avg_resolution_time_hours,
            tickets_by_status: by_status,
            tickets_by_priority: by_priority,
            tickets_by_category: by_category,
            recent_activity,
        }
    }

    /// Seed a handful of demo tickets; returns how many were created
    pub fn seed_demo(&self) -> usize {
        let fixtures = [
            (
                "VPN connection drops every hour",
                "Remote users report the corporate VPN disconnecting roughly once an hour. Network logs show tunnel renegotiation failures.",
                TicketPriority::High,
                TicketCategory::Network,
                "alice@example.com",
                vec!["vpn", "network"],
            ),
            (
                "Laptop will not boot after update",
                "Workstation shows a blank screen after the latest firmware update was applied.",
                TicketPriority::Critical,
                TicketCategory::Hardware,
                "bob@example.com",
                vec!["laptop", "boot"],
            ),
            (
                "Cannot access shared network drive",
                "Finance team cannot reach the shared network drive since this morning. Mapped drive times out.",
                TicketPriority::Medium,
                TicketCategory::Network,
                "carol@example.com",
                vec!["network", "storage"],
            ),
            (
                "Password reset request",
                "User is locked out of the HR portal and needs a password reset.",
                TicketPriority::Low,
                TicketCategory::Access,
                "dave@example.com",
                vec!["account"],
            ),
            (
                "CRM search is slow",
                "Searching customers in the CRM takes over thirty seconds during peak hours.",
                TicketPriority::Medium,
                TicketCategory::Performance,
                "erin@example.com",
                vec!["crm", "latency"],
            ),
        ];

        let mut created = 0;
        for (title, description, priority, category, reporter, tags) in fixtures {
            let result = self.create(TicketCreate {
                title: title.to_string(),
                description: description.to_string(),
                priority,
                category,
                assignee: None,
                reporter: reporter.to_string(),
                tags: tags.into_iter().map(str::to_string).collect(),
            });
            if result.is_ok() {
                created += 1;
            }
        }
        created
    }
}

impl Default for TicketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_data(title: &str, description: &str) -> TicketCreate {
        TicketCreate {
            title: title.to_string(),
            description: description.to_string(),
            priority: TicketPriority::Medium,
            category: TicketCategory::Other,
            assignee: None,
            reporter: "tester@example.com".to_string(),
            tags: vec![],
        }
    }

    #[test]
    fn create_assigns_sequential_ids_and_opens_the_ticket() {
        let store = TicketStore::new();
        let first = store.create(create_data("A", "first")).unwrap();
        let second = store.create(create_data("B", "second")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.status, TicketStatus::Open);
        assert!(first.resolved_at.is_none());
    }

    #[test]
    fn create_rejects_blank_fields() {
        let store = TicketStore::new();
        let err = store.create(create_data("   ", "desc")).unwrap_err();
        assert_eq!(err, TicketError::EmptyField { field: "title" });

        let err = store.create(create_data("title", " ")).unwrap_err();
        assert_eq!(err, TicketError::EmptyField { field: "description" });
        assert!(store.is_empty());
    }

    #[test]
    fn update_stamps_resolved_at_exactly_once() {
        let store = TicketStore::new();
        let ticket = store.create(create_data("A", "desc")).unwrap();

        let resolved = store
            .update(
                ticket.id,
                TicketUpdate {
                    status: Some(TicketStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();
        let stamp = resolved.resolved_at.expect("resolved_at set");

        let closed = store
            .update(
                ticket.id,
                TicketUpdate {
                    status: Some(TicketStatus::Closed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(closed.resolved_at, Some(stamp));
        assert!(closed.updated_at.is_some());
    }

    #[test]
    fn update_requires_at_least_one_field() {
        let store = TicketStore::new();
        let ticket = store.create(create_data("A", "desc")).unwrap();
        let err = store.update(ticket.id, TicketUpdate::default()).unwrap_err();
        assert_eq!(err, TicketError::EmptyUpdate);
    }

    #[test]
    fn update_unknown_ticket_fails() {
        let store = TicketStore::new();
        let err = store
            .update(
                99,
                TicketUpdate {
                    title: Some("new".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, TicketError::NotFound { id: 99 });
    }

    #[test]
    fn list_applies_filters_and_limit() {
        let store = TicketStore::new();
        store.seed_demo();

        let all = store.list(&TicketFilter::default());
        assert_eq!(all.len(), 5);

        let network = store.list(&TicketFilter {
            category: Some(vec![TicketCategory::Network]),
            ..Default::default()
        });
        assert_eq!(network.len(), 2);
        assert!(network.iter().all(|t| t.category == TicketCategory::Network));

        let limited = store.list(&TicketFilter {
            limit: Some(2),
            ..Default::default()
        });
        assert_eq!(limited.len(), 2);

        let by_reporter = store.list(&TicketFilter {
            reporter: Some("alice@example.com".to_string()),
            ..Default::default()
        });
        assert_eq!(by_reporter.len(), 1);
    }

    #[test]
    fn delete_removes_the_ticket() {
        let store = TicketStore::new();
        let ticket = store.create(create_data("A", "desc")).unwrap();
        assert!(store.delete(ticket.id));
        assert!(!store.delete(ticket.id));
        assert!(store.get(ticket.id).is_none());
    }

    #[test]
    fn search_ranks_by_term_overlap() {
        let store = TicketStore::new();
        store.seed_demo();

        let results = store.search("network drive", 10);
        assert!(!results.is_empty());
        // Best match mentions both terms
        assert!(results[0].0.title.contains("network drive"));
        assert!((results[0].1 - 1.0).abs() < f64::EPSILON);
        // Scores are non-increasing
        for pair in results.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }

        assert!(store.search("zzzzz", 10).is_empty());
        assert_eq!(store.search("network", 1).len(), 1);
    }

    #[test]
    fn analytics_counts_match_the_store() {
        let store = TicketStore::new();
        store.seed_demo();
        store
            .update(
                1,
                TicketUpdate {
                    status: Some(TicketStatus::Resolved),
                    ..Default::default()
                },
            )
            .unwrap();

        let analytics = store.analytics();
        assert_eq!(analytics.total_tickets, 5);
        assert_eq!(analytics.open_tickets, 4);
        assert_eq!(analytics.closed_tickets, 1);
        assert_eq!(analytics.tickets_by_status["resolved"], 1);
        assert_eq!(analytics.tickets_by_status["open"], 4);
        assert_eq!(analytics.tickets_by_category["network"], 2);
        assert!(analytics.avg_resolution_time_hours.is_some());
        assert_eq!(analytics.recent_activity.len(), 5);
        // Most recently touched ticket first
        assert_eq!(analytics.recent_activity[0].ticket_id, 1);
    }
}

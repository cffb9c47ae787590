//! Ticket domain: data model, in-memory store, and MCP tool bindings

pub mod model;
pub mod store;
pub mod tools;

pub use model::{
    ActivityEntry, SearchMatch, Ticket, TicketAnalytics, TicketCategory, TicketCreate,
    TicketFilter, TicketPriority, TicketStatus, TicketSummary, TicketUpdate,
};
pub use store::TicketStore;
pub use tools::ticket_registry;

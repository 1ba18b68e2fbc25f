//! The functions served by edge-crud
//!
//! Each function owns one table. The function to run is resolved once from
//! the route into a [`FunctionKind`]; the request path is never searched
//! for keywords.

pub mod crud;
pub mod tickets_posts;
pub mod user;

use edge_crud_sdk::handler::HandlerFn;

pub use tickets_posts::TicketSchema;

/// Functions addressable under `/functions/v1/{function}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    TicketsPosts,
    User,
}

impl FunctionKind {
    pub fn name(&self) -> &'static str {
        match self {
            FunctionKind::TicketsPosts => "tickets-posts",
            FunctionKind::User => "user",
        }
    }
}

impl std::fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for FunctionKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tickets-posts" | "tickets" | "posts" => Ok(FunctionKind::TicketsPosts),
            "user" | "users" => Ok(FunctionKind::User),
            _ => Err(format!("Unknown function: {}", s)),
        }
    }
}

/// Handler table, fixed at startup
#[derive(Clone, Copy)]
pub struct FunctionRegistry {
    tickets_posts: HandlerFn,
    user: HandlerFn,
}

impl FunctionRegistry {
    pub fn new(ticket_schema: TicketSchema) -> Self {
        Self {
            tickets_posts: ticket_schema.handler(),
            user: user::handle,
        }
    }

    pub fn get(&self, kind: FunctionKind) -> HandlerFn {
        match kind {
            FunctionKind::TicketsPosts => self.tickets_posts,
            FunctionKind::User => self.user,
        }
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry").finish_non_exhaustive()
    }
}

//! The `tickets-posts` function: CRUD on the `Name` table
//!
//! Two iterations of this table's handler exist. The canonical one requires
//! `status` and `email` next to the name and task columns; the earlier one
//! only required `column_name` and `column_tasks`. The profile is picked at
//! startup through [`TicketSchema`].

use edge_crud_sdk::prelude::*;

use super::crud::{self, EntitySchema};

pub const TICKETS_FULL: EntitySchema = EntitySchema {
    table: "Name",
    required: &["column_name", "column_tasks", "status", "email"],
    optional: &[],
};

pub const TICKETS_BASIC: EntitySchema = EntitySchema {
    table: "Name",
    required: &["column_name", "column_tasks"],
    optional: &["status", "email"],
};

/// Which field requirements apply to the `Name` table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketSchema {
    #[default]
    Full,
    Basic,
}

impl TicketSchema {
    /// The handler enforcing this profile
    pub fn handler(&self) -> HandlerFn {
        match self {
            TicketSchema::Full => handle_full,
            TicketSchema::Basic => handle_basic,
        }
    }
}

impl std::fmt::Display for TicketSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TicketSchema::Full => write!(f, "full"),
            TicketSchema::Basic => write!(f, "basic"),
        }
    }
}

impl std::str::FromStr for TicketSchema {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(TicketSchema::Full),
            "basic" => Ok(TicketSchema::Basic),
            _ => Err(format!("Unknown ticket schema: {}", s)),
        }
    }
}

handler_result!(pub async fn handle_full(ctx: &Context, req: Request) -> Result<Response, HandlerError> {
    crud::dispatch(ctx, req, &TICKETS_FULL).await
});

handler_result!(pub async fn handle_basic(ctx: &Context, req: Request) -> Result<Response, HandlerError> {
    crud::dispatch(ctx, req, &TICKETS_BASIC).await
});

//! The `user` function: CRUD on the `User` table

use edge_crud_sdk::prelude::*;

use super::crud::{self, EntitySchema};

pub const USER: EntitySchema = EntitySchema {
    table: "User",
    required: &["first_name", "last_name"],
    optional: &["email"],
};

handler_result!(pub async fn handle(ctx: &Context, req: Request) -> Result<Response, HandlerError> {
    crud::dispatch(ctx, req, &USER).await
});

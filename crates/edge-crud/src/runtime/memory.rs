//! In-memory store actor
//!
//! Keeps every table in process memory behind a single actor task. Used for
//! local development and as the substitute store in tests. Identifiers are
//! assigned per table, start at 1 and are never reused.

use async_trait::async_trait;
use edge_crud_sdk::{Row, Store, StoreError};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{mpsc, oneshot};

use super::actor::{spawn_actor, ActorError, ActorHandle, ActorMessage};

type Reply<T> = oneshot::Sender<Result<T, StoreError>>;

/// Commands sent to the memory store actor
pub enum MemoryCommand {
    Insert {
        table: String,
        row: Row,
        reply: Reply<Vec<Row>>,
    },
    SelectAll {
        table: String,
        reply: Reply<Vec<Row>>,
    },
    Update {
        table: String,
        id: Value,
        changes: Row,
        reply: Reply<Vec<Row>>,
    },
    Delete {
        table: String,
        id: Value,
        reply: Reply<()>,
    },
}

impl ActorMessage for MemoryCommand {}

/// Memory store handle - cheap to clone, send commands to the actor
#[derive(Clone, Debug)]
pub struct MemoryStore {
    handle: ActorHandle<MemoryCommand>,
}

impl MemoryStore {
    /// Start the store actor. Must be called from within a tokio runtime.
    pub fn start() -> Self {
        let handle = spawn_actor(100, memory_actor);
        Self { handle }
    }

    async fn call<T, F>(&self, make: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(Reply<T>) -> MemoryCommand,
    {
        self.handle
            .request(make)
            .await
            .map_err(|e: ActorError| StoreError::new(format!("memory store unavailable: {}", e)))?
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, table: &str, row: Row) -> Result<Vec<Row>, StoreError> {
        let table = table.to_string();
        self.call(|reply| MemoryCommand::Insert { table, row, reply }).await
    }

    async fn select_all(&self, table: &str) -> Result<Vec<Row>, StoreError> {
        let table = table.to_string();
        self.call(|reply| MemoryCommand::SelectAll { table, reply }).await
    }

    async fn update(&self, table: &str, id: &Value, changes: Row) -> Result<Vec<Row>, StoreError> {
        let table = table.to_string();
        let id = id.clone();
        self.call(|reply| MemoryCommand::Update { table, id, changes, reply }).await
    }

    async fn delete(&self, table: &str, id: &Value) -> Result<(), StoreError> {
        let table = table.to_string();
        let id = id.clone();
        self.call(|reply| MemoryCommand::Delete { table, id, reply }).await
    }
}

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: BTreeMap<i64, Row>,
}

impl Table {
    fn insert(&mut self, mut row: Row) -> Row {
        self.next_id += 1;
        row.insert("id".to_string(), Value::from(self.next_id));
        self.rows.insert(self.next_id, row.clone());
        row
    }

    fn update(&mut self, id: i64, changes: Row) -> Option<Row> {
        let row = self.rows.get_mut(&id)?;
        for (column, value) in changes {
            if column != "id" {
                row.insert(column, value);
            }
        }
        Some(row.clone())
    }
}

/// Interpret a client supplied identifier the way a bigint primary key would
fn parse_id(id: &Value) -> Result<i64, StoreError> {
    let parsed = match id {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        let shown = match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        StoreError::new(format!("invalid input syntax for type bigint: \"{}\"", shown))
            .with_code("22P02")
    })
}

/// The actor loop - owns every table and processes commands in order
async fn memory_actor(mut rx: mpsc::Receiver<MemoryCommand>) {
    tracing::info!("Starting in-memory store actor");

    let mut tables: HashMap<String, Table> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            MemoryCommand::Insert { table, row, reply } => {
                let stored = tables.entry(table).or_default().insert(row);
                let _ = reply.send(Ok(vec![stored]));
            }
            MemoryCommand::SelectAll { table, reply } => {
                let rows = tables
                    .get(&table)
                    .map(|t| t.rows.values().cloned().collect())
                    .unwrap_or_default();
                let _ = reply.send(Ok(rows));
            }
            MemoryCommand::Update { table, id, changes, reply } => {
                let result = parse_id(&id).map(|id| {
                    tables
                        .get_mut(&table)
                        .and_then(|t| t.update(id, changes))
                        .into_iter()
                        .collect()
                });
                let _ = reply.send(result);
            }
            MemoryCommand::Delete { table, id, reply } => {
                let result = parse_id(&id).map(|id| {
                    if let Some(t) = tables.get_mut(&table) {
                        t.rows.remove(&id);
                    }
                });
                let _ = reply.send(result);
            }
        }
    }

    tracing::info!("In-memory store actor stopped");
}

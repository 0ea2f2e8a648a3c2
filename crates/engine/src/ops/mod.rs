use std::{collections::HashMap, sync::Arc};

use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::EngineConfig;

mod access;
mod badges;
mod balances;
mod expenses;
mod groups;
mod netting;
mod transfers;

pub use expenses::ExpensePatch;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    config: EngineConfig,
    // One async mutex per group serializes aggregate -> match -> reconcile
    // (and completion + re-net). Locks are created lazily and never removed;
    // the map only grows with the number of groups ever netted.
    group_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Thresholds the engine was built with.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub(crate) async fn group_lock(&self, group_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.group_locks.lock().await;
        locks.entry(group_id).or_default().clone()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    config: Option<EngineConfig>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default thresholds (epsilon, badge windows).
    pub fn config(mut self, config: EngineConfig) -> EngineBuilder {
        self.config = Some(config);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            config: self.config.unwrap_or_default(),
            group_locks: Mutex::new(HashMap::new()),
        }
    }
}

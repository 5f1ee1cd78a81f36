use finroute_core::{Config, Database, QueryRouter};
use std::sync::{Arc, Mutex};

/// Shared state passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub(crate) router: Arc<QueryRouter>,
    pub(crate) db: Arc<Mutex<Database>>,
}

impl AppState {
    pub fn new(router: QueryRouter, db: Database) -> Self {
        Self {
            router: Arc::new(router),
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Load the index, datasets, and document store named in the config
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let router = QueryRouter::from_config(config)?;

        let db = Database::open(&config.database_path)?;
        db.initialize()?;
        tracing::info!("Document store at {:?}", config.database_path);

        Ok(Self::new(router, db))
    }
}

use std::collections::HashSet;

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait, QuerySelect, Set, SqlErr};
use tracing::debug;

use crate::{db, entities::seen_link, error::StoreError};

/// Append-only record of links that have already been processed.
#[async_trait]
pub trait LinkStore {
    /// Ensures the schema and the uniqueness constraint on `link` exist.
    async fn initialize(&self) -> Result<(), StoreError>;

    async fn load_all(&self) -> Result<HashSet<String>, StoreError>;

    /// Fails with [`StoreError::DuplicateLink`] when the link is already stored.
    async fn record(&self, link: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct SeenLinkStore {
    db: DatabaseConnection,
}

impl SeenLinkStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LinkStore for SeenLinkStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        db::migrate(&self.db).await
    }

    async fn load_all(&self) -> Result<HashSet<String>, StoreError> {
        let links: Vec<String> = seen_link::Entity::find()
            .select_only()
            .column(seen_link::Column::Link)
            .into_tuple()
            .all(&self.db)
            .await?;
        debug!(count = links.len(), "loaded seen links");
        Ok(links.into_iter().collect())
    }

    async fn record(&self, link: &str) -> Result<(), StoreError> {
        let model = seen_link::ActiveModel {
            id: Default::default(),
            link: Set(link.to_string()),
            seen_at: Set(now_sec()),
        };

        match seen_link::Entity::insert(model).exec(&self.db).await {
            Ok(_) => Ok(()),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    Err(StoreError::DuplicateLink(link.to_string()))
                },
                _ => Err(err.into()),
            },
        }
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

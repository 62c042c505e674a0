//! Spare part catalog service

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use shared::models::{to_currency, NewSparePart, SparePart};
use shared::validation::validate_unit_price;

use crate::error::AppResult;
use crate::ledger::{LedgerError, LedgerResult};
use crate::store::postgres::SparePartRow;
use crate::store::{settle, LedgerStore};

#[derive(Clone)]
pub struct SparePartService {
    db: PgPool,
    store: Arc<dyn LedgerStore>,
}

impl SparePartService {
    pub fn new(db: PgPool, store: Arc<dyn LedgerStore>) -> Self {
        Self { db, store }
    }

    /// Register a spare part with its opening quantity
    pub async fn register(&self, input: NewSparePart) -> LedgerResult<SparePart> {
        let input = NewSparePart {
            name: input.name.trim().to_string(),
            category: input.category.trim().to_string(),
            ..input
        };
        input.validate()?;
        validate_unit_price(input.unit_price).map_err(|m| LedgerError::invalid("unit_price", m))?;
        let input = NewSparePart {
            unit_price: to_currency(input.unit_price),
            ..input
        };

        let mut tx = self.store.begin().await?;
        let outcome = tx.insert_spare_part(&input).await.map_err(LedgerError::from);
        settle(tx, outcome).await
    }

    pub async fn get(&self, id: Uuid) -> LedgerResult<SparePart> {
        self.store
            .spare_part(id)
            .await?
            .ok_or_else(|| LedgerError::spare_part_not_found(id))
    }

    /// All spare parts ordered by name
    pub async fn list(&self) -> AppResult<Vec<SparePart>> {
        let rows = sqlx::query_as::<_, SparePartRow>(
            r#"
            SELECT id, name, category, quantity, unit_price, created_at
            FROM spare_parts
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

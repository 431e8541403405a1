use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use vitrine_model::{
    ColorID, ColorSummary, ProductColorID, ProductID, ProductSummary,
    SearchTerm, ids::to_uuids,
};

use crate::database::ports::product_colors::{
    ProductColorRecord, ProductColorsRepository,
};
use crate::error::Result;
use crate::listing::narrowing::candidate_budget;

#[derive(Clone)]
pub struct PostgresProductColorsRepository {
    pool: PgPool,
}

impl PostgresProductColorsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl fmt::Debug for PostgresProductColorsRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresProductColorsRepository")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .finish()
    }
}

#[derive(sqlx::FromRow)]
struct ProductColorRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    product_id: Uuid,
    product_code: String,
    product_name: String,
    color_id: Uuid,
    color_name: String,
    color_code: Option<String>,
}

impl From<ProductColorRow> for ProductColorRecord {
    fn from(row: ProductColorRow) -> Self {
        ProductColorRecord {
            id: ProductColorID(row.id),
            product: ProductSummary {
                id: ProductID(row.product_id),
                code: row.product_code,
                name: row.product_name,
            },
            color: ColorSummary {
                id: ColorID(row.color_id),
                name: row.color_name,
                code: row.color_code,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Append `(p.code ILIKE $n OR p.name ILIKE $n)` for the product alias `p`.
fn push_product_search(
    sql_builder: &mut QueryBuilder<'_, Postgres>,
    search: &SearchTerm,
) {
    let pattern = search.like_pattern();
    sql_builder
        .push("(p.code ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR p.name ILIKE ")
        .push_bind(pattern)
        .push(")");
}

/// Offset page over a materialized candidate set. Only products with at
/// least one product color are ranked, so every candidate slot yields rows.
fn offset_page_query(
    search: Option<&SearchTerm>,
    skip: u32,
    limit: u32,
) -> QueryBuilder<'static, Postgres> {
    let mut sql_builder = QueryBuilder::<Postgres>::new(
        "WITH p_ordered AS MATERIALIZED (\
         SELECT p.id, p.name FROM products p \
         WHERE EXISTS (SELECT 1 FROM product_colors pc2 \
         WHERE pc2.product_id = p.id)",
    );
    if let Some(search) = search {
        sql_builder.push(" AND ");
        push_product_search(&mut sql_builder, search);
    }
    sql_builder
        .push(" ORDER BY p.name ASC, p.id ASC LIMIT ")
        .push_bind(i64::from(candidate_budget(skip, limit)))
        .push(
            ") SELECT pc.id FROM product_colors pc \
             INNER JOIN p_ordered ON p_ordered.id = pc.product_id \
             ORDER BY p_ordered.name ASC, pc.id ASC LIMIT ",
        )
        .push_bind(i64::from(limit))
        .push(" OFFSET ")
        .push_bind(i64::from(skip));
    sql_builder
}

#[async_trait]
impl ProductColorsRepository for PostgresProductColorsRepository {
    async fn page_ids_by_offset(
        &self,
        search: Option<&SearchTerm>,
        skip: u32,
        limit: u32,
    ) -> Result<Vec<ProductColorID>> {
        let mut sql_builder = offset_page_query(search, skip, limit);

        let ids: Vec<Uuid> = sql_builder
            .build_query_scalar()
            .fetch_all(self.pool())
            .await?;

        Ok(ids.into_iter().map(ProductColorID).collect())
    }

    async fn page_ids_after(
        &self,
        search: Option<&SearchTerm>,
        cursor: ProductColorID,
        limit: u32,
    ) -> Result<Vec<ProductColorID>> {
        let mut sql_builder = QueryBuilder::<Postgres>::new(
            "SELECT pc.id FROM product_colors pc \
             INNER JOIN products p ON p.id = pc.product_id \
             WHERE pc.id > ",
        );
        sql_builder.push_bind(cursor.to_uuid());
        if let Some(search) = search {
            sql_builder.push(" AND ");
            push_product_search(&mut sql_builder, search);
        }
        sql_builder
            .push(" ORDER BY pc.id ASC LIMIT ")
            .push_bind(i64::from(limit));

        let ids: Vec<Uuid> = sql_builder
            .build_query_scalar()
            .fetch_all(self.pool())
            .await?;

        Ok(ids.into_iter().map(ProductColorID).collect())
    }

    async fn hydrate(
        &self,
        ids: &[ProductColorID],
    ) -> Result<Vec<ProductColorRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, ProductColorRow>(
            r#"
            SELECT pc.id, pc.created_at, pc.updated_at,
                   p.id AS product_id, p.code AS product_code,
                   p.name AS product_name,
                   c.id AS color_id, c.name AS color_name,
                   c.code AS color_code
            FROM product_colors pc
            INNER JOIN products p ON p.id = pc.product_id
            INNER JOIN colors c ON c.id = pc.color_id
            WHERE pc.id = ANY($1)
            "#,
        )
        .bind(to_uuids(ids))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(ProductColorRecord::from).collect())
    }

    async fn min_prices(
        &self,
        ids: &[ProductColorID],
    ) -> Result<HashMap<ProductColorID, f64>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (Uuid, Option<f64>)>(
            r#"
            SELECT sku.product_color_id, MIN(sku.price)::float8
            FROM skus sku
            WHERE sku.product_color_id = ANY($1)
            GROUP BY sku.product_color_id
            "#,
        )
        .bind(to_uuids(ids))
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, price)| (ProductColorID(id), price.unwrap_or(0.0)))
            .collect())
    }

    async fn count_matching(&self, search: &SearchTerm) -> Result<u64> {
        let mut sql_builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM product_colors pc \
             INNER JOIN products p ON p.id = pc.product_id WHERE ",
        );
        push_product_search(&mut sql_builder, search);

        let count: i64 = sql_builder
            .build_query_scalar()
            .fetch_one(self.pool())
            .await?;

        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_clause_binds_the_escaped_pattern_twice() {
        let term = SearchTerm::parse(Some("50%")).unwrap();
        let mut sql_builder =
            QueryBuilder::<Postgres>::new("SELECT 1 FROM products p WHERE ");
        push_product_search(&mut sql_builder, &term);
        assert_eq!(
            sql_builder.sql(),
            "SELECT 1 FROM products p \
             WHERE (p.code ILIKE $1 OR p.name ILIKE $2)"
        );
    }

    #[test]
    fn candidates_exclude_products_without_colors() {
        let term = SearchTerm::parse(Some("tote")).unwrap();
        let sql_builder = offset_page_query(Some(&term), 0, 12);
        let sql = sql_builder.sql();
        assert!(sql.contains(
            "WHERE EXISTS (SELECT 1 FROM product_colors pc2 \
             WHERE pc2.product_id = p.id) AND (p.code ILIKE $1"
        ));
        assert!(sql.contains("ORDER BY p.name ASC, p.id ASC LIMIT $3)"));

        let unfiltered = offset_page_query(None, 0, 12);
        assert!(unfiltered.sql().contains(
            "WHERE pc2.product_id = p.id) ORDER BY p.name ASC"
        ));
    }
}

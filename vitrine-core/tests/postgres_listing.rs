//! Listing behaviour against a real PostgreSQL. Run with
//! `DATABASE_URL=... cargo test -p vitrine-core -- --ignored`.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use vitrine_core::database::NoopCache;
use vitrine_core::database::PostgresDatabase;
use vitrine_core::database::ports::statistics::{
    CatalogTable, TableStatisticsPort,
};
use vitrine_core::{AppUnitOfWork, CatalogServices, ListingCache, ListingTtls};
use vitrine_model::{ListingRequest, OrderID, OrderStatus, SearchTerm};

async fn insert_product_color(
    pool: &PgPool,
    code: &str,
    name: &str,
    prices: &[f64],
) -> Uuid {
    let product_id: Uuid = sqlx::query_scalar(
        "INSERT INTO products (code, name) VALUES ($1, $2) RETURNING id",
    )
    .bind(code)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap();
    let color_id: Uuid = sqlx::query_scalar(
        "INSERT INTO colors (name, code) VALUES ('Black', 'BLK') RETURNING id",
    )
    .fetch_one(pool)
    .await
    .unwrap();
    let product_color_id: Uuid = sqlx::query_scalar(
        "INSERT INTO product_colors (product_id, color_id) \
         VALUES ($1, $2) RETURNING id",
    )
    .bind(product_id)
    .bind(color_id)
    .fetch_one(pool)
    .await
    .unwrap();
    for price in prices {
        sqlx::query(
            "INSERT INTO skus (product_color_id, size, price) \
             VALUES ($1, 'M', $2::float8::numeric)",
        )
        .bind(product_color_id)
        .bind(price)
        .execute(pool)
        .await
        .unwrap();
    }
    product_color_id
}

fn services(pool: PgPool) -> CatalogServices {
    let db = PostgresDatabase::from_pool(pool);
    let uow = AppUnitOfWork::from_postgres(&db).unwrap();
    CatalogServices::new(
        &uow,
        ListingCache::new(Arc::new(NoopCache), ListingTtls::default()),
    )
}

#[sqlx::test(migrator = "vitrine_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn narrowed_offset_page_orders_by_product_name(pool: PgPool) {
    let zebra =
        insert_product_color(&pool, "Z-1", "Zebra", &[10.0, 8.5]).await;
    let apple = insert_product_color(&pool, "A-1", "Apple", &[3.0]).await;
    let bare = insert_product_color(&pool, "M-1", "Mango", &[]).await;

    let page = services(pool)
        .product_colors
        .list(&ListingRequest::offset(None, 10, 0))
        .await
        .unwrap();

    let ids: Vec<Uuid> = page.data.iter().map(|i| i.id.to_uuid()).collect();
    assert_eq!(ids, vec![apple, bare, zebra]);
    assert_eq!(page.data[2].price, 8.5);
    assert_eq!(page.data[1].price, 0.0);
    assert!(page.count.is_some());
}

#[sqlx::test(migrator = "vitrine_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn filtered_count_is_exact(pool: PgPool) {
    insert_product_color(&pool, "SH-01", "Shirt", &[20.0]).await;
    insert_product_color(&pool, "SH-02", "Short", &[15.0]).await;
    insert_product_color(&pool, "HT-01", "Hat", &[9.0]).await;

    let page = services(pool)
        .product_colors
        .list(&ListingRequest::offset(SearchTerm::parse(Some("sh")), 1, 0))
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page.count, Some(2));
}

#[sqlx::test(migrator = "vitrine_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn search_treats_like_wildcards_literally(pool: PgPool) {
    insert_product_color(&pool, "P-1", "100% cotton", &[1.0]).await;
    insert_product_color(&pool, "P-2", "1000 threads", &[1.0]).await;

    let page = services(pool)
        .product_colors
        .list(&ListingRequest::offset(SearchTerm::parse(Some("0%")), 10, 0))
        .await
        .unwrap();

    assert_eq!(page.count, Some(1));
    assert_eq!(page.data[0].product.name, "100% cotton");
}

#[sqlx::test(migrator = "vitrine_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn statistics_follow_analyze(pool: PgPool) {
    for index in 0..5 {
        insert_product_color(&pool, &format!("C-{index}"), "Coat", &[]).await;
    }
    sqlx::query("ANALYZE product_colors")
        .execute(&pool)
        .await
        .unwrap();

    let db = PostgresDatabase::from_pool(pool);
    let estimate = db
        .statistics()
        .approximate_row_count(CatalogTable::ProductColors)
        .await
        .unwrap();
    assert_eq!(estimate, 5);
}

#[sqlx::test(migrator = "vitrine_core::MIGRATOR")]
#[ignore = "requires DATABASE_URL"]
async fn order_totals_and_status_updates(pool: PgPool) {
    let pc = insert_product_color(&pool, "T-1", "Tee", &[10.0]).await;
    let sku: Uuid =
        sqlx::query_scalar("SELECT id FROM skus WHERE product_color_id = $1")
            .bind(pc)
            .fetch_one(&pool)
            .await
            .unwrap();
    let customer: Uuid = sqlx::query_scalar(
        "INSERT INTO customers (name, email) \
         VALUES ('Ana', 'ana@example.com') RETURNING id",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    let order: Uuid = sqlx::query_scalar(
        "INSERT INTO orders (customer_id) VALUES ($1) RETURNING id",
    )
    .bind(customer)
    .fetch_one(&pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO order_items (order_id, sku_id, quantity) \
         VALUES ($1, $2, 3)",
    )
    .bind(order)
    .bind(sku)
    .execute(&pool)
    .await
    .unwrap();

    let services = services(pool);
    let page = services
        .orders
        .list(&ListingRequest::offset(SearchTerm::parse(Some("ANA")), 10, 0))
        .await
        .unwrap();
    assert_eq!(page.count, Some(1));
    assert_eq!(page.data[0].total_value, 30.0);
    assert_eq!(page.data[0].average_value_per_unit, 10.0);

    services
        .orders
        .update_status(OrderID(order), OrderStatus::Shipped)
        .await
        .unwrap();
    let page = services
        .orders
        .list(&ListingRequest::offset(None, 10, 0))
        .await
        .unwrap();
    assert_eq!(page.data[0].status, OrderStatus::Shipped);
}

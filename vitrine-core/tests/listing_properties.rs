use std::sync::Arc;

use vitrine_core::database::ports::cache::CacheStore;
use vitrine_core::database::ports::statistics::CatalogTable;
use vitrine_core::testing::{FailingCache, InMemoryCatalog, MemoryCache};
use vitrine_core::{
    AppUnitOfWork, CatalogError, CatalogServices, ListingCache, ListingTtls,
};
use vitrine_model::{
    ListingRequest, OrderID, OrderStatus, ProductColorID, SearchTerm,
};

const PRODUCT_NAMES: [&str; 10] = [
    "Parka", "Anorak", "Boot", "Cap", "Anorak", "Denim", "Espadrille",
    "Fleece", "Boot", "Gilet",
];

/// Ten products (two name collisions), three colors each: 30 product
/// colors, every one with two SKUs.
async fn seeded_catalog() -> Arc<InMemoryCatalog> {
    let catalog = Arc::new(InMemoryCatalog::new());
    for (index, name) in PRODUCT_NAMES.iter().enumerate() {
        let product =
            catalog.add_product(&format!("SKU-{index:03}"), name).await;
        for color in ["Black", "Sand", "Olive"] {
            let pc = catalog.add_product_color(&product, color).await;
            catalog.add_sku(pc, "M", 49.9 + index as f64).await;
            catalog.add_sku(pc, "L", 59.9 + index as f64).await;
        }
    }
    catalog
}

fn services(
    catalog: &Arc<InMemoryCatalog>,
    store: Arc<dyn CacheStore>,
) -> CatalogServices {
    let uow: AppUnitOfWork = InMemoryCatalog::unit_of_work(catalog);
    CatalogServices::new(&uow, ListingCache::new(store, ListingTtls::default()))
}

async fn full_offset_scan(
    services: &CatalogServices,
    search: Option<SearchTerm>,
) -> Vec<ProductColorID> {
    services
        .product_colors
        .list(&ListingRequest::offset(search, 1_000, 0))
        .await
        .unwrap()
        .data
        .into_iter()
        .map(|item| item.id)
        .collect()
}

#[tokio::test]
async fn offset_pages_concatenate_to_one_ordered_scan() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));
    let full = full_offset_scan(&services, None).await;
    assert_eq!(full.len(), 30);

    for limit in [1_u32, 4, 7, 12] {
        let mut paged = Vec::new();
        let mut skip = 0;
        loop {
            let page = services
                .product_colors
                .list(&ListingRequest::offset(None, limit, skip))
                .await
                .unwrap();
            if page.is_empty() {
                break;
            }
            paged.extend(page.data.iter().map(|item| item.id));
            skip += limit;
        }
        assert_eq!(paged, full, "limit {limit}");
    }
}

#[tokio::test]
async fn offset_order_is_product_name_then_id() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));
    let page = services
        .product_colors
        .list(&ListingRequest::offset(None, 30, 0))
        .await
        .unwrap();

    let keys: Vec<(String, ProductColorID)> = page
        .data
        .iter()
        .map(|item| (item.product.name.clone(), item.id))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(page.data[0].product.name, "Anorak");
}

#[tokio::test]
async fn cursor_pages_continue_strictly_after_the_cursor() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));

    let mut all_ids = full_offset_scan(&services, None).await;
    all_ids.sort();

    let first = services
        .product_colors
        .list(&ListingRequest::offset(None, 5, 0))
        .await
        .unwrap();
    let mut cursor = all_ids[4];
    let mut continued = Vec::new();
    loop {
        let page = services
            .product_colors
            .list(&ListingRequest::after(None, 5, cursor))
            .await
            .unwrap();
        assert_eq!(page.count, None);
        let Some(last) = page.data.last() else {
            break;
        };
        assert!(page.data.iter().all(|item| item.id > cursor));
        assert!(page.data.windows(2).all(|w| w[0].id < w[1].id));
        continued.extend(page.data.iter().map(|item| item.id));
        cursor = last.id;
    }

    assert_eq!(first.len(), 5);
    assert_eq!(continued, all_ids[5..].to_vec());
}

#[tokio::test]
async fn cursor_mode_reapplies_the_search() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));
    let term = SearchTerm::parse(Some("boot"));

    let mut expected = full_offset_scan(&services, term.clone()).await;
    expected.sort();
    assert_eq!(expected.len(), 6);

    let page = services
        .product_colors
        .list(&ListingRequest::after(term, 10, expected[1]))
        .await
        .unwrap();
    let ids: Vec<ProductColorID> = page.data.iter().map(|i| i.id).collect();
    assert_eq!(ids, expected[2..].to_vec());
    assert!(page.data.iter().all(|item| item.product.name == "Boot"));
}

#[tokio::test]
async fn count_is_present_only_on_first_pages() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));
    let any_id = full_offset_scan(&services, None).await[3];

    let first = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 0))
        .await
        .unwrap();
    let deeper = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 12))
        .await
        .unwrap();
    let cursor = services
        .product_colors
        .list(&ListingRequest::after(None, 12, any_id))
        .await
        .unwrap();

    assert_eq!(first.count, Some(30));
    assert_eq!(deeper.count, None);
    assert_eq!(cursor.count, None);
}

#[tokio::test]
async fn thirty_rows_paged_by_twelve() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));
    let full = full_offset_scan(&services, None).await;

    let first = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 0))
        .await
        .unwrap();
    assert_eq!(first.count, Some(30));
    let first_ids: Vec<_> = first.data.iter().map(|i| i.id).collect();
    assert_eq!(first_ids, full[..12].to_vec());

    let last = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 24))
        .await
        .unwrap();
    assert_eq!(last.count, None);
    let last_ids: Vec<_> = last.data.iter().map(|i| i.id).collect();
    assert_eq!(last_ids, full[24..].to_vec());
    assert_eq!(last_ids.len(), 6);
}

#[tokio::test]
async fn empty_catalog_yields_empty_first_page_with_zero_count() {
    let catalog = Arc::new(InMemoryCatalog::new());
    let services = services(&catalog, Arc::new(MemoryCache::new()));

    let page = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 0))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.count, Some(0));

    let orders = services
        .orders
        .list(&ListingRequest::offset(None, 10, 0))
        .await
        .unwrap();
    assert!(orders.is_empty());
    assert_eq!(orders.count, Some(0));
}

#[tokio::test]
async fn colorless_products_do_not_crowd_out_the_first_page() {
    let catalog = Arc::new(InMemoryCatalog::new());
    for index in 0..100 {
        let name = format!("A{index:03}");
        catalog.add_product(&format!("BARE-{index:03}"), &name).await;
    }
    let zebra = catalog.add_product("ZEB-001", "Zebra").await;
    for color in ["Black", "White", "Grey"] {
        catalog.add_product_color(&zebra, color).await;
    }
    let services = services(&catalog, Arc::new(MemoryCache::new()));

    let page = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 0))
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page.count, Some(3));
    assert!(page.data.iter().all(|item| item.product.name == "Zebra"));
}

#[tokio::test]
async fn blank_search_uses_the_statistics_count() {
    let catalog = seeded_catalog().await;
    // Stale statistics make the two count paths distinguishable.
    catalog.set_row_estimate(CatalogTable::ProductColors, 28).await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));

    for raw in [None, Some(""), Some("   ")] {
        let page = services
            .product_colors
            .list(&ListingRequest::offset(SearchTerm::parse(raw), 12, 0))
            .await
            .unwrap();
        assert_eq!(page.count, Some(28));
        assert_eq!(page.len(), 12);
    }
    assert_eq!(catalog.exact_count_calls(), 0);
    assert_eq!(catalog.approximate_count_calls(), 1);
}

#[tokio::test]
async fn identical_requests_are_served_from_cache() {
    let catalog = seeded_catalog().await;
    let cache = Arc::new(MemoryCache::new());
    let services = services(&catalog, cache.clone());
    let request =
        ListingRequest::offset(SearchTerm::parse(Some("an")), 12, 0);

    let first = services.product_colors.list(&request).await.unwrap();
    let queries = catalog.page_query_calls();
    let second = services.product_colors.list(&request).await.unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(catalog.page_query_calls(), queries);
    assert!(cache.hits() >= 1);
}

#[tokio::test]
async fn failing_cache_is_transparent() {
    let catalog = seeded_catalog().await;
    let healthy = services(&catalog, Arc::new(MemoryCache::new()));
    let failing_store = Arc::new(FailingCache::default());
    let failing = services(&catalog, failing_store.clone());

    let requests = [
        ListingRequest::offset(None, 12, 0),
        ListingRequest::offset(None, 12, 24),
        ListingRequest::offset(SearchTerm::parse(Some("cap")), 5, 0),
    ];
    for request in &requests {
        let expected = healthy.product_colors.list(request).await.unwrap();
        let actual = failing.product_colors.list(request).await.unwrap();
        assert_eq!(actual, expected);
    }
    assert!(failing_store.calls() > 0);
    assert_eq!(failing_store.writes(), 0);
}

#[tokio::test]
async fn store_failures_fail_the_request() {
    let catalog = seeded_catalog().await;
    let services = services(&catalog, Arc::new(MemoryCache::new()));
    catalog.set_store_down(true);

    let result = services
        .product_colors
        .list(&ListingRequest::offset(None, 12, 0))
        .await;
    assert!(matches!(result, Err(CatalogError::Database(_))));
}

#[tokio::test]
async fn order_pages_mirror_the_product_color_shape() {
    let catalog = seeded_catalog().await;
    let sku = {
        let product = catalog.add_product("ORD", "Order stock").await;
        let pc = catalog.add_product_color(&product, "Grey").await;
        catalog.add_sku(pc, "U", 10.0).await
    };
    let ana = catalog.add_customer("Ana Souza", "ana@example.com").await;
    let bruno = catalog.add_customer("Bruno Lima", "bruno@example.com").await;
    let mut ids: Vec<OrderID> = Vec::new();
    for index in 0..7 {
        let customer = if index % 2 == 0 { &ana } else { &bruno };
        let order =
            catalog.add_order(Some(customer), OrderStatus::Pending).await;
        catalog.add_order_item(order, sku, index + 1).await;
        ids.push(order);
    }
    let services = services(&catalog, Arc::new(MemoryCache::new()));

    let first = services
        .orders
        .list(&ListingRequest::offset(None, 3, 0))
        .await
        .unwrap();
    assert_eq!(first.count, Some(7));
    let first_ids: Vec<_> = first.data.iter().map(|o| o.id).collect();
    assert_eq!(first_ids, ids[..3].to_vec());
    assert_eq!(first.data[2].total_value, 30.0);

    let next = services
        .orders
        .list(&ListingRequest::after(None, 3, ids[2]))
        .await
        .unwrap();
    assert_eq!(next.count, None);
    let next_ids: Vec<_> = next.data.iter().map(|o| o.id).collect();
    assert_eq!(next_ids, ids[3..6].to_vec());

    let by_email = services
        .orders
        .list(&ListingRequest::offset(
            SearchTerm::parse(Some("BRUNO@")),
            10,
            0,
        ))
        .await
        .unwrap();
    assert_eq!(by_email.count, Some(3));
    assert!(by_email.data.iter().all(|o| o.customer.name == "Bruno Lima"));
}

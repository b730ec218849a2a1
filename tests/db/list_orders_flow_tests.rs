//! Lists, orders, prices and public links over real SQL

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::common::TestApp;

/// A group with Milk and Bread priced at Market, and Eggs unpriced.
struct Pantry {
    token: String,
    group: String,
    list: String,
    milk: String,
    bread: String,
    orders: Vec<Value>,
}

impl Pantry {
    async fn new(app: &TestApp) -> Self {
        let (_, token, _) = app.register("Ana").await;
        let group = app.create("/api/v1/groups", &token, json!({"name": "Flat"})).await;
        let products = format!("/api/v1/groups/{}/products", group);
        let milk = app.create(&products, &token, json!({"name": "Milk"})).await;
        let bread = app.create(&products, &token, json!({"name": "Bread"})).await;
        let eggs = app.create(&products, &token, json!({"name": "Eggs"})).await;
        let shop = app
            .create(&format!("/api/v1/groups/{}/shops", group), &token, json!({"name": "Market"}))
            .await;

        for (product, price) in [(&milk, 1.5), (&bread, 2.0)] {
            let (status, body) = app
                .call(
                    "PUT",
                    &format!("{}/{}/shops", products, product),
                    &token,
                    Some(json!({"shops": [{"shop_id": shop, "price": price}]})),
                )
                .await;
            assert_eq!(status, StatusCode::OK, "{}", body);
        }

        let list = app
            .create(
                &format!("/api/v1/groups/{}/list-orders", group),
                &token,
                json!({"name": "Weekly"}),
            )
            .await;
        let (status, orders) = app
            .call(
                "POST",
                &format!("/api/v1/groups/{}/list-orders/{}/orders", group, list),
                &token,
                Some(json!({"orders": [
                    {"product_id": milk, "shop_id": shop, "amount": 2.0},
                    {"product_id": bread, "shop_id": shop, "amount": 3.0},
                    {"product_id": eggs, "amount": 1.0},
                ]})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", orders);

        Self {
            token,
            group,
            list,
            milk,
            bread,
            orders: orders.as_array().unwrap().clone(),
        }
    }

    fn order_id(&self, product_id: &str) -> String {
        self.orders
            .iter()
            .find(|o| o["product_id"] == json!(product_id))
            .map(|o| o["id"].as_str().unwrap().to_string())
            .unwrap()
    }

    async fn price(&self, app: &TestApp, list: &str) -> Value {
        let (status, body) = app
            .call(
                "GET",
                &format!("/api/v1/groups/{}/list-orders/{}/price", self.group, list),
                &self.token,
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_price_counts_priced_orders_only(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let pantry = Pantry::new(&app).await;

    let (status, _) = app
        .call(
            "PUT",
            &format!("/api/v1/groups/{}/orders/{}/bought", pantry.group, pantry.order_id(&pantry.bread)),
            &pantry.token,
            Some(json!({"bought": true})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let price = pantry.price(&app, &pantry.list).await;
    assert_eq!(price["total"], json!(9.0));
    assert_eq!(price["bought"], json!(6.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_copy_duplicates_orders_unbought(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let pantry = Pantry::new(&app).await;
    app.call(
        "PUT",
        &format!("/api/v1/groups/{}/orders/{}/bought", pantry.group, pantry.order_id(&pantry.milk)),
        &pantry.token,
        Some(json!({"bought": true})),
    )
    .await;

    let copy = app
        .create(
            &format!("/api/v1/groups/{}/list-orders/{}/copy", pantry.group, pantry.list),
            &pantry.token,
            json!({"name": "Weekly copy"}),
        )
        .await;
    assert_ne!(copy, pantry.list);

    let (status, body) = app
        .call(
            "GET",
            &format!("/api/v1/groups/{}/list-orders/{}/orders", pantry.group, copy),
            &pantry.token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["items"].as_array().unwrap();
    assert_eq!(orders.len(), 3);
    for order in orders {
        assert_eq!(order["bought"], json!(false));
        assert_eq!(order["list_orders_id"], json!(copy));
        assert!(pantry.orders.iter().all(|o| o["id"] != order["id"]));
    }

    let price = pantry.price(&app, &copy).await;
    assert_eq!(price["total"], json!(9.0));
    assert_eq!(price["bought"], json!(0.0));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_name_filters_treat_wildcards_literally(pool: PgPool) {
    let app = TestApp::with_database(pool).await;
    let (_, token, _) = app.register("Ana").await;
    let group = app.create("/api/v1/groups", &token, json!({"name": "Flat"})).await;
    let products = format!("/api/v1/groups/{}/products", group);
    app.create(&products, &token, json!({"name": "a_b"})).await;
    app.create(&products, &token, json!({"name": "axb"})).await;

    let names = |query: &'static str| {
        let app = app.clone();
        let uri = format!("{}?{}", products, query);
        let token = token.clone();
        async move {
            let (status, body) = app.call("GET", &uri, &token, None).await;
            assert_eq!(status, StatusCode::OK, "{}", body);
            let mut names: Vec<String> = body["items"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["name"].as_str().unwrap().to_string())
                .collect();
            names.sort();
            names
        }
    };

    assert_eq!(names("filter_text=_&filter_type=contains").await, vec!["a_b"]);
    assert!(names("filter_text=%25&filter_type=contains").await.is_empty());
    assert_eq!(names("filter_text=A&filter_type=starts_with").await, vec!["a_b", "axb"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_expired_share_is_not_found(pool: PgPool) {
    let app = TestApp::with_database(pool.clone()).await;
    let pantry = Pantry::new(&app).await;

    let (status, share) = app
        .call(
            "POST",
            &format!("/api/v1/groups/{}/list-orders/{}/share", pantry.group, pantry.list),
            &pantry.token,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", share);
    let uri = format!("/api/v1/shares/{}", share["id"].as_str().unwrap());

    let response = app.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::OK);

    sqlx::query("UPDATE share_list_orders SET expires_at = NOW() - INTERVAL '1 minute'")
        .execute(&pool)
        .await
        .unwrap();
    let response = app.get(&uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

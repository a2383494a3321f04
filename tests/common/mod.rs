#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, routing::get};
use axum_test::TestServer;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use carvo::api::handlers::health_handler;
use carvo::api::routes::api_router;
use carvo::domain::email_job::{EmailJob, EmailQueue};
use carvo::infrastructure::cache::{CacheResult, CacheService, NullCache};
use carvo::state::{AppState, JwtSettings};

pub const PASSWORD: &str = "correct-horse";

/// In-process cache so tests can observe what the handlers cache.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn keys(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl_seconds: Option<u64>) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn invalidate_prefix(&self, prefix: &str) -> CacheResult<()> {
        self.entries
            .lock()
            .unwrap()
            .retain(|k, _| !k.starts_with(prefix));
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

fn jwt() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret".to_string(),
        access_ttl_seconds: 300,
        refresh_ttl_seconds: 86_400,
    }
}

pub fn create_test_state_with_cache(
    pool: PgPool,
    cache: Arc<dyn CacheService>,
) -> (AppState, mpsc::Receiver<EmailJob>) {
    let (queue, rx) = EmailQueue::channel(100);
    let state = AppState::new(Arc::new(pool), cache, 300, queue, &jwt());
    (state, rx)
}

pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<EmailJob>) {
    create_test_state_with_cache(pool, Arc::new(NullCache::new()))
}

/// Full application router without rate limiting.
pub fn app(state: AppState) -> Router {
    let api = api_router(&state);
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
}

pub fn make_server(pool: PgPool) -> (TestServer, mpsc::Receiver<EmailJob>) {
    let (state, rx) = create_test_state(pool);
    (TestServer::new(app(state)).unwrap(), rx)
}

pub async fn create_user(pool: &PgPool, username: &str, is_staff: bool) -> i64 {
    let hash = bcrypt::hash(PASSWORD, 4).unwrap();
    sqlx::query_scalar(
        "INSERT INTO users (username, email, password_hash, is_staff) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(username)
    .bind(format!("{}@example.com", username))
    .bind(hash)
    .bind(is_staff)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn deactivate_user(pool: &PgPool, user_id: i64) {
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn create_car(pool: &PgPool, brand: &str, name: &str, price_cents: i64) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO cars (name, brand, model_year, car_type, transmission, fuel_type, seats, price_per_day)
        VALUES ($1, $2, 2022, 'Sedan', 'Automatic', 'Petrol', 5, $3)
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(brand)
    .bind(Decimal::new(price_cents, 2))
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn set_car_available(pool: &PgPool, car_id: i64, available: bool) {
    sqlx::query("UPDATE cars SET is_available = $2 WHERE id = $1")
        .bind(car_id)
        .bind(available)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn add_car_image(pool: &PgPool, car_id: i64, image: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO car_images (car_id, image) VALUES ($1, $2) RETURNING id")
        .bind(car_id)
        .bind(image)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Inserts a rental directly; dates are `YYYY-MM-DD`.
pub async fn create_rental(
    pool: &PgPool,
    user_id: i64,
    car_id: i64,
    start: &str,
    end: &str,
    status: &str,
) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO rentals (user_id, car_id, start_date, end_date, total_price, status)
        VALUES ($1, $2, $3::date, $4::date, 100.00, $5)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(car_id)
    .bind(start)
    .bind(end)
    .bind(status)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_payment(pool: &PgPool, rental_id: i64, is_paid: bool) -> i64 {
    sqlx::query_scalar(
        r#"
        INSERT INTO payments (rental_id, amount, payment_method, is_paid, paid_at)
        VALUES ($1, 100.00, 'cash', $2, CASE WHEN $2 THEN NOW() END)
        RETURNING id
        "#,
    )
    .bind(rental_id)
    .bind(is_paid)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn rental_status(pool: &PgPool, rental_id: i64) -> String {
    sqlx::query_scalar("SELECT status FROM rentals WHERE id = $1")
        .bind(rental_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Logs in through the API and returns the access token.
pub async fn login(server: &TestServer, username: &str) -> String {
    let response = server
        .post("/api/token")
        .json(&json!({ "username": username, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    response.json::<serde_json::Value>()["access"]
        .as_str()
        .unwrap()
        .to_string()
}

//! Cart flows over the public API with in-memory collaborators: mutation,
//! persistence, and checkout side effects, without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use storefront_api::cart::checkout::{
    self, Catalog, CheckoutError, NewOrder, OrderGateway,
};
use storefront_api::cart::registry::CartRegistry;
use storefront_api::cart::storage::CartStorage;
use storefront_api::cart::{CartLine, ProductSnapshot};
use storefront_api::models::Product;

#[derive(Default)]
struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    fn raw(&self, key: &str) -> Option<String> {
        self.slots.lock().expect("lock").get(key).cloned()
    }
}

#[async_trait]
impl CartStorage for MemoryStorage {
    async fn load(&self, key: &str) -> anyhow::Result<Option<Vec<CartLine>>> {
        match self.slots.lock().expect("lock").get(key) {
            None => Ok(None),
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
        }
    }

    async fn save(&self, key: &str, lines: &[CartLine]) -> anyhow::Result<()> {
        let raw = serde_json::to_string(lines)?;
        self.slots.lock().expect("lock").insert(key.to_string(), raw);
        Ok(())
    }
}

struct QuotaExceededStorage;

#[async_trait]
impl CartStorage for QuotaExceededStorage {
    async fn load(&self, _key: &str) -> anyhow::Result<Option<Vec<CartLine>>> {
        Ok(None)
    }

    async fn save(&self, _key: &str, _lines: &[CartLine]) -> anyhow::Result<()> {
        anyhow::bail!("storage quota exceeded")
    }
}

struct FixedCatalog {
    products: Vec<Product>,
}

#[async_trait]
impl Catalog for FixedCatalog {
    async fn list_all(&self) -> anyhow::Result<Vec<Product>> {
        Ok(self.products.clone())
    }
}

#[derive(Default)]
struct RecordingGateway {
    orders: Mutex<Vec<NewOrder>>,
}

#[async_trait]
impl OrderGateway for RecordingGateway {
    async fn create(&self, order: NewOrder) -> anyhow::Result<Uuid> {
        self.orders.lock().expect("lock").push(order);
        Ok(Uuid::new_v4())
    }
}

struct RejectingGateway;

#[async_trait]
impl OrderGateway for RejectingGateway {
    async fn create(&self, _order: NewOrder) -> anyhow::Result<Uuid> {
        anyhow::bail!("order store unavailable")
    }
}

fn product(title: &str, price: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: Some(format!("{title} description")),
        price,
        category: "electronics".to_string(),
        image: format!("https://img.example/{title}.jpg"),
        rating_rate: 4.5,
        rating_count: 150,
        created_at: now,
        updated_at: now,
    }
}

fn snapshot_of(product: &Product) -> ProductSnapshot {
    ProductSnapshot {
        id: product.id,
        title: product.title.clone(),
        price: product.price,
        image: product.image.clone(),
    }
}

#[tokio::test]
async fn adds_aggregate_and_survive_a_restart() {
    let storage = Arc::new(MemoryStorage::default());
    let phone = product("Smartphone", 59999);
    let laptop = product("Laptop", 129999);

    {
        let carts = CartRegistry::new(storage.clone());
        carts.add("s1", snapshot_of(&phone)).await;
        carts.add("s1", snapshot_of(&laptop)).await;
        let cart = carts.add("s1", snapshot_of(&phone)).await;

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), 249997);
    }

    // A fresh registry over the same storage sees the same cart.
    let carts = CartRegistry::new(storage);
    let cart = carts.view("s1").await;
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_price(), 249997);
    assert_eq!(cart.lines()[0].title, "Smartphone");
}

#[tokio::test]
async fn add_succeeds_even_when_every_save_fails() {
    let carts = CartRegistry::new(Arc::new(QuotaExceededStorage));
    let phone = product("Smartphone", 59999);

    let cart = carts.add("s1", snapshot_of(&phone)).await;
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.lines()[0].title, "Smartphone");

    let cart = carts.view("s1").await;
    assert_eq!(cart.total_items(), 1);
}

#[tokio::test]
async fn successful_checkout_clears_cart_and_durable_snapshot() {
    let storage = Arc::new(MemoryStorage::default());
    let carts = CartRegistry::new(storage.clone());
    let phone = product("Smartphone", 59999);
    carts.add("s1", snapshot_of(&phone)).await;

    let gateway = RecordingGateway::default();
    let outcome = checkout::submit(
        &carts,
        &FixedCatalog {
            products: vec![phone],
        },
        &gateway,
        Uuid::new_v4(),
        "s1",
    )
    .await
    .expect("checkout succeeds");

    assert_eq!(outcome.total_amount, 59999);
    assert!(carts.view("s1").await.is_empty());
    // The cleared state is what ended up in durable storage.
    assert_eq!(storage.raw("s1").expect("snapshot written"), "[]");
}

#[tokio::test]
async fn failed_submission_keeps_cart_and_snapshot_intact() {
    let storage = Arc::new(MemoryStorage::default());
    let carts = CartRegistry::new(storage.clone());
    let phone = product("Smartphone", 59999);
    carts.add("s1", snapshot_of(&phone)).await;
    carts.add("s1", snapshot_of(&phone)).await;
    let before = storage.raw("s1").expect("snapshot written");

    let result = checkout::submit(
        &carts,
        &FixedCatalog {
            products: vec![phone],
        },
        &RejectingGateway,
        Uuid::new_v4(),
        "s1",
    )
    .await;

    assert!(matches!(result, Err(CheckoutError::Collaborator(_))));
    let cart = carts.view("s1").await;
    assert_eq!(cart.total_items(), 2);
    assert_eq!(cart.total_price(), 119998);
    assert_eq!(storage.raw("s1").expect("snapshot kept"), before);
}

#[tokio::test]
async fn empty_cart_never_reaches_the_order_store() {
    let carts = CartRegistry::new(Arc::new(MemoryStorage::default()));
    let gateway = RecordingGateway::default();

    let result = checkout::submit(
        &carts,
        &FixedCatalog {
            products: Vec::new(),
        },
        &gateway,
        Uuid::new_v4(),
        "s1",
    )
    .await;

    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert!(gateway.orders.lock().expect("lock").is_empty());
}

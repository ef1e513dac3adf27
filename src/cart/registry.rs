//! Session-keyed cart registry: the one place that owns live [`Cart`]
//! values. Constructed once at startup and handed around by reference, so
//! there is no ambient global cart anywhere.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use tokio::sync::Mutex;
use uuid::Uuid;

use super::storage::CartStorage;
use super::{Cart, ProductSnapshot};

pub struct CartRegistry {
    carts: Mutex<HashMap<String, Cart>>,
    storage: Arc<dyn CartStorage>,
    in_flight: StdMutex<HashSet<String>>,
}

impl CartRegistry {
    pub fn new(storage: Arc<dyn CartStorage>) -> Self {
        Self {
            carts: Mutex::new(HashMap::new()),
            storage,
            in_flight: StdMutex::new(HashSet::new()),
        }
    }

    /// Read-only projection of a session's cart.
    pub async fn view(&self, key: &str) -> Cart {
        let mut carts = self.carts.lock().await;
        self.get_or_load(&mut carts, key).await.clone()
    }

    pub async fn add(&self, key: &str, item: ProductSnapshot) -> Cart {
        self.mutate(key, |cart| cart.add(item)).await
    }

    pub async fn remove(&self, key: &str, id: Uuid) -> Cart {
        self.mutate(key, |cart| cart.remove(id)).await
    }

    pub async fn clear(&self, key: &str) -> Cart {
        self.mutate(key, Cart::clear).await
    }

    /// Mark a session's checkout as in-flight. Returns `None` while a
    /// previous checkout for the same session has not finished, which is
    /// what keeps a double-submitted checkout from creating two orders.
    pub fn begin_checkout(&self, key: &str) -> Option<CheckoutGuard<'_>> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(key.to_string()) {
            return None;
        }
        Some(CheckoutGuard {
            registry: self,
            key: key.to_string(),
        })
    }

    /// Apply a mutation, then persist the result within the same operation
    /// so snapshots land in mutation order. The in-memory cart is the
    /// authoritative outcome: a failed save is logged and otherwise ignored.
    async fn mutate(&self, key: &str, op: impl FnOnce(&mut Cart)) -> Cart {
        let mut carts = self.carts.lock().await;
        let cart = self.get_or_load(&mut carts, key).await;
        op(cart);
        let result = cart.clone();

        if let Err(err) = self.storage.save(key, result.lines()).await {
            tracing::warn!(error = %err, session = %key, "cart snapshot save failed");
        }
        result
    }

    /// Materialize a session's cart on first touch. A missing snapshot,
    /// an unreadable one, or a storage error all start the session empty.
    async fn get_or_load<'a>(
        &self,
        carts: &'a mut HashMap<String, Cart>,
        key: &str,
    ) -> &'a mut Cart {
        match carts.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let cart = match self.storage.load(key).await {
                    Ok(Some(lines)) => Cart::from_lines(lines),
                    Ok(None) => Cart::new(),
                    Err(err) => {
                        tracing::warn!(error = %err, session = %key, "cart snapshot load failed");
                        Cart::new()
                    }
                };
                entry.insert(cart)
            }
        }
    }
}

/// Releases the session's in-flight checkout mark on every exit path.
pub struct CheckoutGuard<'a> {
    registry: &'a CartRegistry,
    key: String,
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.registry
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::cart::CartLine;
    use crate::cart::storage::CartStorage;

    /// Storage fake over a plain map of serialized snapshots.
    #[derive(Default)]
    pub struct MemoryStorage {
        slots: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        pub fn raw(&self, key: &str) -> Option<String> {
            self.slots.lock().expect("lock").get(key).cloned()
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            self.slots
                .lock()
                .expect("lock")
                .insert(key.to_string(), value.to_string());
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

    /// Storage fake whose every operation fails.
    pub struct BrokenStorage;

    #[async_trait]
    impl CartStorage for BrokenStorage {
        async fn load(&self, _key: &str) -> anyhow::Result<Option<Vec<CartLine>>> {
            anyhow::bail!("storage unavailable")
        }

        async fn save(&self, _key: &str, _lines: &[CartLine]) -> anyhow::Result<()> {
            anyhow::bail!("storage quota exceeded")
        }
    }
}

use std::sync::Arc;

use crate::{
    cart::{
        checkout::{Catalog, OrderGateway},
        registry::CartRegistry,
        storage::PgCartStorage,
    },
    db::{DbPool, OrmConn},
    services::{order_service::PgOrderGateway, product_service::PgCatalog},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub carts: Arc<CartRegistry>,
    pub catalog: Arc<dyn Catalog>,
    pub orders: Arc<dyn OrderGateway>,
}

impl AppState {
    /// Wire the production collaborators: carts persist snapshots through
    /// sqlx, catalog and order submission go through SeaORM.
    pub fn new(pool: DbPool, orm: OrmConn) -> Self {
        let storage = Arc::new(PgCartStorage::new(pool.clone()));
        let carts = Arc::new(CartRegistry::new(storage));
        let catalog = Arc::new(PgCatalog::new(orm.clone()));
        let orders = Arc::new(PgOrderGateway::new(orm.clone()));
        Self {
            pool,
            orm,
            carts,
            catalog,
            orders,
        }
    }
}

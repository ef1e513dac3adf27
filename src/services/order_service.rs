use async_trait::async_trait;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    cart::checkout::{NewOrder, OrderGateway},
    db::OrmConn,
    dto::orders::{OrderList, OrderWithItems},
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Order, OrderItem, OrderStatus},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn list_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);

    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Ok",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find()
        .filter(
            Condition::all()
                .add(OrderCol::UserId.eq(user.user_id))
                .add(OrderCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems {
            order: order_from_entity(order),
            items,
        },
        Some(Meta::empty()),
    ))
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        // The status column carries a CHECK constraint, so an unparsable
        // value cannot come out of the store.
        status: OrderStatus::parse(&model.status).unwrap_or(OrderStatus::Pending),
        total_amount: model.total_amount,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        title: model.title,
        price: model.price,
        quantity: model.quantity,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

/// Order collaborator over the orders tables. One `create` call persists the
/// whole aggregate; a failure rolls everything back so the caller can leave
/// the cart as it was.
pub struct PgOrderGateway {
    orm: OrmConn,
}

impl PgOrderGateway {
    pub fn new(orm: OrmConn) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl OrderGateway for PgOrderGateway {
    async fn create(&self, order: NewOrder) -> anyhow::Result<Uuid> {
        let txn = self.orm.begin().await?;

        let order_id = Uuid::new_v4();
        OrderActive {
            id: Set(order_id),
            user_id: Set(order.user_id),
            total_amount: Set(order.total_amount),
            status: Set(order.status.as_str().to_string()),
            created_at: NotSet,
            updated_at: NotSet,
        }
        .insert(&txn)
        .await?;

        for item in &order.items {
            OrderItemActive {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product.id),
                title: Set(item.product.title.clone()),
                price: Set(item.product.price),
                quantity: Set(item.quantity),
                created_at: NotSet,
            }
            .insert(&txn)
            .await?;
        }

        txn.commit().await?;
        Ok(order_id)
    }
}

use crate::{
    db::DbPool,
    entities::{
        article::Entity as ArticleEntity,
        customer::Entity as CustomerEntity,
        order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
        order_item::{self, ActiveModel as OrderItemActiveModel, Entity as OrderItemEntity},
        price_list::Entity as PriceListEntity,
        EntityStatus, OrderItemModel, OrderModel, OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::catalog::ArticleSummary,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AddItemInput {
    pub article_id: Uuid,
    /// Quantity to add; defaults to 1
    pub quantity: Option<Decimal>,
}

/// A cart or order line with its article resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartItemView {
    pub id: Uuid,
    pub article: ArticleSummary,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// The customer's open cart. The total is computed from the lines at
/// read time; the persisted order total is refreshed on every write.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CartView {
    pub order_id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub items: Vec<CartItemView>,
    pub total: Decimal,
}

/// A confirmed order with its lines.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderDetail {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub total: Decimal,
    pub items: Vec<CartItemView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderHistoryPage {
    pub orders: Vec<OrderModel>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service managing the per-customer cart and the order lifecycle.
///
/// Every customer has at most one pending order (the cart) at a time;
/// a partial unique index on the orders table enforces this across
/// concurrent requests and across processes.
#[derive(Clone)]
pub struct CartService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CartService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event).await;
        }
    }

    /// Returns the customer's pending order, creating it when none
    /// exists. Safe to call concurrently: a losing insert falls back to
    /// reselecting the row the winner created.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn open_cart(&self, customer_id: Uuid) -> Result<OrderModel, ServiceError> {
        let customer = CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?;
        if customer.is_none() {
            return Err(ServiceError::NotFound(format!(
                "Customer {} not found",
                customer_id
            )));
        }

        if let Some(existing) = self.find_pending(customer_id).await? {
            return Ok(existing);
        }

        let order_id = Uuid::new_v4();
        let insert = OrderActiveModel {
            id: Set(order_id),
            customer_id: Set(customer_id),
            order_date: Set(Utc::now()),
            total: Set(Decimal::ZERO),
            status: Set(OrderStatus::Pending),
        }
        .insert(&*self.db_pool)
        .await;

        match insert {
            Ok(order) => {
                info!(order_id = %order.id, "Cart opened");
                self.emit(Event::CartOpened {
                    order_id: order.id,
                    customer_id,
                })
                .await;
                Ok(order)
            }
            Err(err) => {
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    // A concurrent request created the pending order first.
                    warn!(customer_id = %customer_id, "Lost cart-open race, reusing existing cart");
                    self.find_pending(customer_id).await?.ok_or_else(|| {
                        ServiceError::InternalError(
                            "Pending order vanished after unique conflict".to_string(),
                        )
                    })
                } else {
                    Err(ServiceError::DatabaseError(err))
                }
            }
        }
    }

    /// Adds an article to the customer's cart, opening the cart first
    /// when needed.
    ///
    /// The line snapshots the article's current sale price; adding the
    /// same article again only bumps the quantity and keeps the price
    /// captured by the first add.
    #[instrument(skip(self, input), fields(customer_id = %customer_id, article_id = %input.article_id))]
    pub async fn add_item(
        &self,
        customer_id: Uuid,
        input: AddItemInput,
    ) -> Result<OrderItemModel, ServiceError> {
        let quantity = input.quantity.unwrap_or(Decimal::ONE);
        if quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantity must be greater than zero".to_string(),
            ));
        }

        let article = ArticleEntity::find_by_id(input.article_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Article {} not found", input.article_id))
            })?;
        if article.status != EntityStatus::Active {
            return Err(ServiceError::ValidationError(format!(
                "Article {} is inactive",
                article.id
            )));
        }

        let prices = PriceListEntity::find_by_id(article.id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Price list for article {} not found", article.id))
            })?;
        if prices.price_1 <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Article {} has no sale price",
                article.id
            )));
        }

        let order = self.open_cart(customer_id).await?;

        // A concurrent add of the same new article can lose the unique
        // (order, article) race; the retry lands on the increment path.
        let mut attempts = 0;
        loop {
            match self
                .upsert_item(order.id, article.id, quantity, prices.price_1)
                .await
            {
                Ok(item) => {
                    self.emit(Event::CartItemAdded {
                        order_id: order.id,
                        article_id: article.id,
                    })
                    .await;
                    return Ok(item);
                }
                Err(ServiceError::DatabaseError(err))
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
                        && attempts == 0 =>
                {
                    attempts += 1;
                    warn!(order_id = %order.id, article_id = %article.id, "Retrying cart add after unique conflict");
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn upsert_item(
        &self,
        order_id: Uuid,
        article_id: Uuid,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Result<OrderItemModel, ServiceError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for cart add");
            ServiceError::DatabaseError(e)
        })?;

        // The cart may have been confirmed between lookup and write.
        let order = OrderEntity::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        if order.status != OrderStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Order {} is no longer open",
                order_id
            )));
        }

        let existing = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .filter(order_item::Column::ArticleId.eq(article_id))
            .one(&txn)
            .await?;

        let item = match existing {
            Some(item) => {
                let new_quantity = item.quantity + quantity;
                let stored_price = item.unit_price;
                let mut active: OrderItemActiveModel = item.into();
                active.quantity = Set(new_quantity);
                active.line_total = Set(new_quantity * stored_price);
                active.update(&txn).await?
            }
            None => {
                OrderItemActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order_id),
                    article_id: Set(article_id),
                    quantity: Set(quantity),
                    unit_price: Set(unit_price),
                    line_total: Set(quantity * unit_price),
                }
                .insert(&txn)
                .await?
            }
        };

        self.persist_total(&txn, order_id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit cart add");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order_id, article_id = %article_id, "Cart line upserted");
        Ok(item)
    }

    /// Removes a line from the customer's open cart.
    ///
    /// The line may belong to any order of the caller; a line whose
    /// order has left Pending is a state conflict, a line of another
    /// customer (or no line at all) is missing. The ownership and
    /// status checks run inside the transaction so a racing confirm
    /// cannot slip between lookup and delete.
    #[instrument(skip(self), fields(customer_id = %customer_id, item_id = %item_id))]
    pub async fn remove_item(&self, customer_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for cart remove");
            ServiceError::DatabaseError(e)
        })?;

        let (item, order) = OrderItemEntity::find_by_id(item_id)
            .find_also_related(OrderEntity)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Cart item {} not found", item_id)))?;
        let order = order.ok_or_else(|| {
            ServiceError::InternalError(format!("Order item {} has no order", item.id))
        })?;

        if order.customer_id != customer_id {
            return Err(ServiceError::NotFound(format!(
                "Cart item {} not found",
                item_id
            )));
        }
        if order.status != OrderStatus::Pending {
            return Err(ServiceError::Conflict(format!(
                "Order {} is no longer open",
                order.id
            )));
        }

        OrderItemEntity::delete_by_id(item.id).exec(&txn).await?;
        self.persist_total(&txn, order.id).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order.id, "Failed to commit cart remove");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %order.id, item_id = %item_id, "Cart line removed");
        self.emit(Event::CartItemRemoved {
            order_id: order.id,
            item_id,
        })
        .await;
        Ok(())
    }

    /// Returns the customer's open cart with its lines and a total
    /// computed from them. Nothing is written.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_cart(&self, customer_id: Uuid) -> Result<CartView, ServiceError> {
        let order = self
            .find_pending(customer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No open cart".to_string()))?;

        let items = self.load_items(order.id).await?;
        let total = items.iter().map(|i| i.line_total).sum();

        Ok(CartView {
            order_id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            order_date: order.order_date,
            items,
            total,
        })
    }

    /// Confirms the open cart, moving it to processing. Empty carts
    /// cannot be confirmed.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn confirm(&self, customer_id: Uuid) -> Result<OrderModel, ServiceError> {
        let order = self
            .find_pending(customer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("No open cart".to_string()))?;

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for order confirmation");
            ServiceError::DatabaseError(e)
        })?;

        let item_count = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order.id))
            .count(&txn)
            .await?;
        if item_count == 0 {
            return Err(ServiceError::ValidationError(
                "Cannot confirm an empty cart".to_string(),
            ));
        }

        let total = self.persist_total(&txn, order.id).await?;

        let mut active: OrderActiveModel = order.into();
        active.status = Set(OrderStatus::Processing);
        let confirmed = active.update(&txn).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %confirmed.id, "Failed to commit order confirmation");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %confirmed.id, %total, "Order confirmed");
        self.emit(Event::OrderConfirmed(confirmed.id)).await;
        Ok(confirmed)
    }

    /// Lists the customer's past orders (everything but the open
    /// cart), most recent first.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn list_orders(
        &self,
        customer_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> Result<OrderHistoryPage, ServiceError> {
        let paginator = OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(order::Column::Status.ne(OrderStatus::Pending))
            .order_by_desc(order::Column::OrderDate)
            .paginate(&*self.db_pool, per_page.max(1));

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(OrderHistoryPage {
            orders,
            total,
            page,
            per_page,
        })
    }

    /// Fetches one of the customer's orders with its lines. Orders
    /// belonging to other customers are reported as missing.
    #[instrument(skip(self), fields(customer_id = %customer_id, order_id = %order_id))]
    pub async fn get_order(
        &self,
        customer_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderDetail, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .filter(order::Column::CustomerId.eq(customer_id))
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let items = self.load_items(order.id).await?;

        Ok(OrderDetail {
            id: order.id,
            customer_id: order.customer_id,
            status: order.status,
            order_date: order.order_date,
            total: order.total,
            items,
        })
    }

    // ----- internals -----

    async fn find_pending(&self, customer_id: Uuid) -> Result<Option<OrderModel>, ServiceError> {
        let order = OrderEntity::find()
            .filter(order::Column::CustomerId.eq(customer_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .one(&*self.db_pool)
            .await?;
        Ok(order)
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<CartItemView>, ServiceError> {
        use crate::entities::article;

        let rows = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .find_also_related(ArticleEntity)
            .order_by_asc(article::Column::Description)
            .all(&*self.db_pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (item, article) in rows {
            let article = article.ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Order item {} references a missing article",
                    item.id
                ))
            })?;
            items.push(CartItemView {
                id: item.id,
                article: ArticleSummary::from_model(article, None),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total,
            });
        }
        Ok(items)
    }

    /// Recomputes the order total from its lines and writes it back.
    async fn persist_total(
        &self,
        txn: &DatabaseTransaction,
        order_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        let items = OrderItemEntity::find()
            .filter(order_item::Column::OrderId.eq(order_id))
            .all(txn)
            .await?;
        let total: Decimal = items.iter().map(|i| i.line_total).sum();

        let order = OrderEntity::find_by_id(order_id)
            .one(txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;
        let mut active: OrderActiveModel = order.into();
        active.total = Set(total);
        active.update(txn).await?;
        Ok(total)
    }
}

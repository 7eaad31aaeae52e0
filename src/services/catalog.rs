use crate::{
    db::DbPool,
    entities::{
        article::{self, ActiveModel as ArticleActiveModel, Entity as ArticleEntity},
        article_group::{self, ActiveModel as GroupActiveModel, Entity as GroupEntity},
        article_line::{self, ActiveModel as LineActiveModel, Entity as LineEntity},
        order_item::{self, Entity as OrderItemEntity},
        price_list::{ActiveModel as PriceListActiveModel, Entity as PriceListEntity},
        ArticleGroupModel, ArticleLineModel, ArticleModel, EntityStatus, PriceListModel,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Input for creating or renaming an article group.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct GroupInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub status: Option<EntityStatus>,
}

/// Input for creating or renaming an article line within a group.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LineInput {
    pub group_id: Uuid,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub status: Option<EntityStatus>,
}

/// Price tiers attached to an article. All six values must be
/// non-negative.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct PriceInput {
    pub price_1: Decimal,
    pub price_2: Decimal,
    pub price_3: Decimal,
    pub price_4: Decimal,
    pub purchase_price: Decimal,
    pub cost_price: Decimal,
}

impl PriceInput {
    fn validate_non_negative(&self) -> Result<(), ServiceError> {
        let tiers = [
            ("price_1", self.price_1),
            ("price_2", self.price_2),
            ("price_3", self.price_3),
            ("price_4", self.price_4),
            ("purchase_price", self.purchase_price),
            ("cost_price", self.cost_price),
        ];
        for (name, value) in tiers {
            if value < Decimal::ZERO {
                return Err(ServiceError::ValidationError(format!(
                    "{} must not be negative",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for PriceInput {
    fn default() -> Self {
        Self {
            price_1: Decimal::ZERO,
            price_2: Decimal::ZERO,
            price_3: Decimal::ZERO,
            price_4: Decimal::ZERO,
            purchase_price: Decimal::ZERO,
            cost_price: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateArticleInput {
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,
    pub barcode: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub presentation: Option<String>,
    pub group_id: Uuid,
    pub line_id: Uuid,
    pub stock: Option<Decimal>,
    pub status: Option<EntityStatus>,
    pub prices: Option<PriceInput>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateArticleInput {
    pub code: Option<String>,
    pub barcode: Option<Option<String>>,
    pub description: Option<String>,
    pub presentation: Option<Option<String>>,
    pub group_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
    pub stock: Option<Decimal>,
    pub status: Option<EntityStatus>,
}

/// Filters accepted by the article listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleFilter {
    /// Case-sensitive substring match on the description
    pub q: Option<String>,
    pub group_id: Option<Uuid>,
    pub line_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GroupRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineRef {
    pub id: Uuid,
    pub name: String,
}

/// Full article projection with its group, line and price tiers
/// resolved. Served by the single-article endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleDetail {
    pub id: Uuid,
    pub code: String,
    pub barcode: Option<String>,
    pub description: String,
    pub presentation: Option<String>,
    pub group: GroupRef,
    pub line: LineRef,
    pub stock: Decimal,
    pub status: EntityStatus,
    pub prices: PriceView,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PriceView {
    pub price_1: Decimal,
    pub price_2: Decimal,
    pub price_3: Decimal,
    pub price_4: Decimal,
    pub purchase_price: Decimal,
    pub cost_price: Decimal,
}

impl From<PriceListModel> for PriceView {
    fn from(model: PriceListModel) -> Self {
        Self {
            price_1: model.price_1,
            price_2: model.price_2,
            price_3: model.price_3,
            price_4: model.price_4,
            purchase_price: model.purchase_price,
            cost_price: model.cost_price,
        }
    }
}

/// Flat article projection used by listings and cart lines.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArticleSummary {
    pub id: Uuid,
    pub code: String,
    pub barcode: Option<String>,
    pub description: String,
    pub presentation: Option<String>,
    pub group_id: Uuid,
    pub line_id: Uuid,
    pub stock: Decimal,
    pub status: EntityStatus,
    pub price_1: Option<Decimal>,
}

impl ArticleSummary {
    pub fn from_model(article: ArticleModel, prices: Option<PriceListModel>) -> Self {
        Self {
            id: article.id,
            code: article.code,
            barcode: article.barcode,
            description: article.description,
            presentation: article.presentation,
            group_id: article.group_id,
            line_id: article.line_id,
            stock: article.stock,
            status: article.status,
            price_1: prices.map(|p| p.price_1),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArticleListPage {
    pub articles: Vec<ArticleSummary>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service managing groups, lines, articles and their price lists.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CatalogService {
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

    // ----- groups -----

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_group(&self, input: GroupInput) -> Result<ArticleGroupModel, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let group = GroupActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            status: Set(input.status.unwrap_or(EntityStatus::Active)),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(group_id = %group.id, "Article group created");
        self.emit(Event::GroupCreated(group.id)).await;
        Ok(group)
    }

    pub async fn get_group(&self, group_id: Uuid) -> Result<ArticleGroupModel, ServiceError> {
        GroupEntity::find_by_id(group_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Group {} not found", group_id)))
    }

    pub async fn list_groups(&self) -> Result<Vec<ArticleGroupModel>, ServiceError> {
        let groups = GroupEntity::find()
            .order_by_asc(article_group::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(groups)
    }

    #[instrument(skip(self, input), fields(group_id = %group_id))]
    pub async fn update_group(
        &self,
        group_id: Uuid,
        input: GroupInput,
    ) -> Result<ArticleGroupModel, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_group(group_id).await?;
        let mut active: GroupActiveModel = existing.into();
        active.name = Set(input.name);
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        let updated = active.update(&*self.db_pool).await?;
        info!(group_id = %group_id, "Article group updated");
        Ok(updated)
    }

    /// Deletes a group and, through the schema, every line under it.
    /// Refused while any article still belongs to the group.
    #[instrument(skip(self), fields(group_id = %group_id))]
    pub async fn delete_group(&self, group_id: Uuid) -> Result<(), ServiceError> {
        let group = self.get_group(group_id).await?;

        let referencing = ArticleEntity::find()
            .filter(article::Column::GroupId.eq(group_id))
            .count(&*self.db_pool)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Group {} still has {} article(s)",
                group_id, referencing
            )));
        }

        GroupEntity::delete_by_id(group.id)
            .exec(&*self.db_pool)
            .await?;
        info!(group_id = %group_id, "Article group deleted");
        self.emit(Event::GroupDeleted(group_id)).await;
        Ok(())
    }

    // ----- lines -----

    #[instrument(skip(self, input), fields(group_id = %input.group_id, name = %input.name))]
    pub async fn create_line(&self, input: LineInput) -> Result<ArticleLineModel, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        // The parent group must exist before a line can hang off it.
        self.get_group(input.group_id).await?;

        let line = LineActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(input.group_id),
            name: Set(input.name),
            status: Set(input.status.unwrap_or(EntityStatus::Active)),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(line_id = %line.id, "Article line created");
        self.emit(Event::LineCreated(line.id)).await;
        Ok(line)
    }

    pub async fn get_line(&self, line_id: Uuid) -> Result<ArticleLineModel, ServiceError> {
        LineEntity::find_by_id(line_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Line {} not found", line_id)))
    }

    /// Lists the active lines of a group, ordered by name. Inactive
    /// lines are hidden from pickers but keep their articles.
    pub async fn list_lines_by_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<ArticleLineModel>, ServiceError> {
        self.get_group(group_id).await?;
        let lines = LineEntity::find()
            .filter(article_line::Column::GroupId.eq(group_id))
            .filter(article_line::Column::Status.eq(EntityStatus::Active))
            .order_by_asc(article_line::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(lines)
    }

    #[instrument(skip(self, input), fields(line_id = %line_id))]
    pub async fn update_line(
        &self,
        line_id: Uuid,
        input: LineInput,
    ) -> Result<ArticleLineModel, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let existing = self.get_line(line_id).await?;

        if input.group_id != existing.group_id {
            // Moving a line between groups would silently re-parent its
            // articles; require articles to be moved explicitly instead.
            let referencing = ArticleEntity::find()
                .filter(article::Column::LineId.eq(line_id))
                .count(&*self.db_pool)
                .await?;
            if referencing > 0 {
                return Err(ServiceError::Conflict(format!(
                    "Line {} still has {} article(s) and cannot change group",
                    line_id, referencing
                )));
            }
            self.get_group(input.group_id).await?;
        }

        let mut active: LineActiveModel = existing.into();
        active.group_id = Set(input.group_id);
        active.name = Set(input.name);
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        let updated = active.update(&*self.db_pool).await?;
        info!(line_id = %line_id, "Article line updated");
        Ok(updated)
    }

    #[instrument(skip(self), fields(line_id = %line_id))]
    pub async fn delete_line(&self, line_id: Uuid) -> Result<(), ServiceError> {
        let line = self.get_line(line_id).await?;

        let referencing = ArticleEntity::find()
            .filter(article::Column::LineId.eq(line_id))
            .count(&*self.db_pool)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Line {} still has {} article(s)",
                line_id, referencing
            )));
        }

        LineEntity::delete_by_id(line.id)
            .exec(&*self.db_pool)
            .await?;
        info!(line_id = %line_id, "Article line deleted");
        self.emit(Event::LineDeleted(line_id)).await;
        Ok(())
    }

    // ----- articles -----

    /// Creates an article together with its price list in one
    /// transaction. The line must belong to the given group.
    #[instrument(skip(self, input), fields(code = %input.code))]
    pub async fn create_article(
        &self,
        input: CreateArticleInput,
    ) -> Result<ArticleDetail, ServiceError> {
        input
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let stock = input.stock.unwrap_or(Decimal::ZERO);
        if stock < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "stock must not be negative".to_string(),
            ));
        }
        let prices = input.prices.unwrap_or_default();
        prices.validate_non_negative()?;

        let group = self.get_group(input.group_id).await?;
        let line = self.get_line(input.line_id).await?;
        if line.group_id != group.id {
            return Err(ServiceError::ValidationError(format!(
                "Line {} does not belong to group {}",
                line.id, group.id
            )));
        }

        let duplicate = ArticleEntity::find()
            .filter(article::Column::Code.eq(input.code.clone()))
            .count(&*self.db_pool)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "Article code '{}' is already in use",
                input.code
            )));
        }

        let article_id = Uuid::new_v4();
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for article creation");
            ServiceError::DatabaseError(e)
        })?;

        let article = ArticleActiveModel {
            id: Set(article_id),
            code: Set(input.code),
            barcode: Set(input.barcode),
            description: Set(input.description),
            presentation: Set(input.presentation),
            group_id: Set(group.id),
            line_id: Set(line.id),
            stock: Set(stock),
            status: Set(input.status.unwrap_or(EntityStatus::Active)),
        }
        .insert(&txn)
        .await?;

        let price_list = PriceListActiveModel {
            article_id: Set(article_id),
            price_1: Set(prices.price_1),
            price_2: Set(prices.price_2),
            price_3: Set(prices.price_3),
            price_4: Set(prices.price_4),
            purchase_price: Set(prices.purchase_price),
            cost_price: Set(prices.cost_price),
        }
        .insert(&txn)
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, article_id = %article_id, "Failed to commit article creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(article_id = %article_id, "Article created");
        self.emit(Event::ArticleCreated(article_id)).await;

        Ok(ArticleDetail {
            id: article.id,
            code: article.code,
            barcode: article.barcode,
            description: article.description,
            presentation: article.presentation,
            group: GroupRef {
                id: group.id,
                name: group.name,
            },
            line: LineRef {
                id: line.id,
                name: line.name,
            },
            stock: article.stock,
            status: article.status,
            prices: price_list.into(),
        })
    }

    pub async fn get_article(&self, article_id: Uuid) -> Result<ArticleDetail, ServiceError> {
        let article = self.find_article(article_id).await?;
        self.to_detail(article).await
    }

    /// Lists articles, optionally filtered by description substring,
    /// group, or line. Ordered by description.
    #[instrument(skip(self, filter))]
    pub async fn list_articles(
        &self,
        filter: ArticleFilter,
        page: u64,
        per_page: u64,
    ) -> Result<ArticleListPage, ServiceError> {
        let mut query = ArticleEntity::find();
        if let Some(q) = filter.q.filter(|q| !q.is_empty()) {
            query = query.filter(article::Column::Description.contains(&q));
        }
        if let Some(group_id) = filter.group_id {
            query = query.filter(article::Column::GroupId.eq(group_id));
        }
        if let Some(line_id) = filter.line_id {
            query = query.filter(article::Column::LineId.eq(line_id));
        }

        let paginator = query
            .find_also_related(PriceListEntity)
            .order_by_asc(article::Column::Description)
            .paginate(&*self.db_pool, per_page.max(1));

        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;

        let articles = rows
            .into_iter()
            .map(|(article, prices)| ArticleSummary::from_model(article, prices))
            .collect();

        Ok(ArticleListPage {
            articles,
            total,
            page,
            per_page,
        })
    }

    #[instrument(skip(self, input), fields(article_id = %article_id))]
    pub async fn update_article(
        &self,
        article_id: Uuid,
        input: UpdateArticleInput,
    ) -> Result<ArticleDetail, ServiceError> {
        let existing = self.find_article(article_id).await?;

        // Validate the group/line pair that would result from the update.
        let target_group_id = input.group_id.unwrap_or(existing.group_id);
        let target_line_id = input.line_id.unwrap_or(existing.line_id);
        let line = self.get_line(target_line_id).await?;
        if line.group_id != target_group_id {
            return Err(ServiceError::ValidationError(format!(
                "Line {} does not belong to group {}",
                target_line_id, target_group_id
            )));
        }

        if let Some(code) = &input.code {
            if code.is_empty() {
                return Err(ServiceError::ValidationError("Code is required".to_string()));
            }
            if *code != existing.code {
                let duplicate = ArticleEntity::find()
                    .filter(article::Column::Code.eq(code.clone()))
                    .count(&*self.db_pool)
                    .await?;
                if duplicate > 0 {
                    return Err(ServiceError::Conflict(format!(
                        "Article code '{}' is already in use",
                        code
                    )));
                }
            }
        }
        if let Some(stock) = input.stock {
            if stock < Decimal::ZERO {
                return Err(ServiceError::ValidationError(
                    "stock must not be negative".to_string(),
                ));
            }
        }

        let mut active: ArticleActiveModel = existing.into();
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(barcode) = input.barcode {
            active.barcode = Set(barcode);
        }
        if let Some(description) = input.description {
            if description.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Description is required".to_string(),
                ));
            }
            active.description = Set(description);
        }
        if let Some(presentation) = input.presentation {
            active.presentation = Set(presentation);
        }
        active.group_id = Set(target_group_id);
        active.line_id = Set(target_line_id);
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }

        let updated = active.update(&*self.db_pool).await?;
        info!(article_id = %article_id, "Article updated");
        self.emit(Event::ArticleUpdated(article_id)).await;
        self.to_detail(updated).await
    }

    /// Deletes an article and its price list. Refused while any order
    /// line still references it, since order lines snapshot catalog
    /// rows they must keep resolvable.
    #[instrument(skip(self), fields(article_id = %article_id))]
    pub async fn delete_article(&self, article_id: Uuid) -> Result<(), ServiceError> {
        let article = self.find_article(article_id).await?;

        let referencing = OrderItemEntity::find()
            .filter(order_item::Column::ArticleId.eq(article_id))
            .count(&*self.db_pool)
            .await?;
        if referencing > 0 {
            return Err(ServiceError::Conflict(format!(
                "Article {} is referenced by {} order line(s)",
                article_id, referencing
            )));
        }

        ArticleEntity::delete_by_id(article.id)
            .exec(&*self.db_pool)
            .await?;
        info!(article_id = %article_id, "Article deleted");
        self.emit(Event::ArticleDeleted(article_id)).await;
        Ok(())
    }

    // ----- prices -----

    pub async fn get_prices(&self, article_id: Uuid) -> Result<PriceView, ServiceError> {
        self.find_article(article_id).await?;
        let prices = self.find_price_list(article_id).await?;
        Ok(prices.into())
    }

    #[instrument(skip(self, input), fields(article_id = %article_id))]
    pub async fn update_prices(
        &self,
        article_id: Uuid,
        input: PriceInput,
    ) -> Result<PriceView, ServiceError> {
        input.validate_non_negative()?;
        self.find_article(article_id).await?;
        let existing = self.find_price_list(article_id).await?;

        let mut active: PriceListActiveModel = existing.into();
        active.price_1 = Set(input.price_1);
        active.price_2 = Set(input.price_2);
        active.price_3 = Set(input.price_3);
        active.price_4 = Set(input.price_4);
        active.purchase_price = Set(input.purchase_price);
        active.cost_price = Set(input.cost_price);

        let updated = active.update(&*self.db_pool).await?;
        info!(article_id = %article_id, "Article prices updated");
        self.emit(Event::PricesUpdated(article_id)).await;
        Ok(updated.into())
    }

    // ----- internals -----

    async fn find_article(&self, article_id: Uuid) -> Result<ArticleModel, ServiceError> {
        ArticleEntity::find_by_id(article_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Article {} not found", article_id)))
    }

    async fn find_price_list(&self, article_id: Uuid) -> Result<PriceListModel, ServiceError> {
        PriceListEntity::find_by_id(article_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Price list for article {} not found", article_id))
            })
    }

    async fn to_detail(&self, article: ArticleModel) -> Result<ArticleDetail, ServiceError> {
        let group = self.get_group(article.group_id).await?;
        let line = self.get_line(article.line_id).await?;
        let prices = self.find_price_list(article.id).await?;

        Ok(ArticleDetail {
            id: article.id,
            code: article.code,
            barcode: article.barcode,
            description: article.description,
            presentation: article.presentation,
            group: GroupRef {
                id: group.id,
                name: group.name,
            },
            line: LineRef {
                id: line.id,
                name: line.name,
            },
            stock: article.stock,
            status: article.status,
            prices: prices.into(),
        })
    }
}

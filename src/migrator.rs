use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_catalog_tables::Migration),
            Box::new(m20240101_000002_create_customers_table::Migration),
            Box::new(m20240101_000003_create_orders_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ArticleGroups::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ArticleGroups::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ArticleGroups::Name).string().not_null())
                        .col(ColumnDef::new(ArticleGroups::Status).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ArticleLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ArticleLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ArticleLines::GroupId).uuid().not_null())
                        .col(ColumnDef::new(ArticleLines::Name).string().not_null())
                        .col(ColumnDef::new(ArticleLines::Status).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_article_lines_group")
                                .from(ArticleLines::Table, ArticleLines::GroupId)
                                .to(ArticleGroups::Table, ArticleGroups::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_article_lines_group_id")
                        .table(ArticleLines::Table)
                        .col(ArticleLines::GroupId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Articles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Articles::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Articles::Code)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Articles::Barcode).string().null())
                        .col(ColumnDef::new(Articles::Description).string().not_null())
                        .col(ColumnDef::new(Articles::Presentation).string().null())
                        .col(ColumnDef::new(Articles::GroupId).uuid().not_null())
                        .col(ColumnDef::new(Articles::LineId).uuid().not_null())
                        .col(
                            ColumnDef::new(Articles::Stock)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Articles::Status).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_articles_group")
                                .from(Articles::Table, Articles::GroupId)
                                .to(ArticleGroups::Table, ArticleGroups::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_articles_line")
                                .from(Articles::Table, Articles::LineId)
                                .to(ArticleLines::Table, ArticleLines::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_articles_group_id")
                        .table(Articles::Table)
                        .col(Articles::GroupId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_articles_line_id")
                        .table(Articles::Table)
                        .col(Articles::LineId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PriceLists::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PriceLists::ArticleId)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PriceLists::Price1)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PriceLists::Price2)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PriceLists::Price3)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PriceLists::Price4)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PriceLists::PurchasePrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PriceLists::CostPrice)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_price_lists_article")
                                .from(PriceLists::Table, PriceLists::ArticleId)
                                .to(Articles::Table, Articles::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PriceLists::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Articles::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ArticleLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ArticleGroups::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ArticleGroups {
        Table,
        Id,
        Name,
        Status,
    }

    #[derive(DeriveIden)]
    pub(super) enum ArticleLines {
        Table,
        Id,
        GroupId,
        Name,
        Status,
    }

    #[derive(DeriveIden)]
    pub(super) enum Articles {
        Table,
        Id,
        Code,
        Barcode,
        Description,
        Presentation,
        GroupId,
        LineId,
        Stock,
        Status,
    }

    #[derive(DeriveIden)]
    pub(super) enum PriceLists {
        Table,
        ArticleId,
        // DeriveIden would render these as "price1".."price4"; the
        // entity columns carry the underscore.
        #[sea_orm(iden = "price_1")]
        Price1,
        #[sea_orm(iden = "price_2")]
        Price2,
        #[sea_orm(iden = "price_3")]
        Price3,
        #[sea_orm(iden = "price_4")]
        Price4,
        PurchasePrice,
        CostPrice,
    }
}

mod m20240101_000002_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(
                            ColumnDef::new(Customers::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Email,
    }
}

mod m20240101_000003_create_orders_tables {

    use sea_orm_migration::prelude::*;

    use super::m20240101_000001_create_catalog_tables::Articles;
    use super::m20240101_000002_create_customers_table::Customers;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().not_null())
                        .col(ColumnDef::new(Orders::OrderDate).timestamp().not_null())
                        .col(
                            ColumnDef::new(Orders::Total)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            // Partial unique index guaranteeing at most one pending order
            // per customer, enforced at the database so concurrent cart
            // opens cannot race. Supported by both SQLite and Postgres.
            manager
                .get_connection()
                .execute_unprepared(
                    "CREATE UNIQUE INDEX IF NOT EXISTS ux_orders_customer_pending \
                     ON orders (customer_id) WHERE status = 'pending'",
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ArticleId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderItems::Quantity)
                                .decimal_len(10, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::UnitPrice)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::LineTotal)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_article")
                                .from(OrderItems::Table, OrderItems::ArticleId)
                                .to(Articles::Table, Articles::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("ux_order_items_order_article")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .col(OrderItems::ArticleId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        OrderDate,
        Total,
        Status,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        ArticleId,
        Quantity,
        UnitPrice,
        LineTotal,
    }
}

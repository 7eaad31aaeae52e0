//! Bulk catalog import from CSV files.
//!
//! Reads `groups.csv`, `lines.csv` and `articles.csv` from a directory
//! and loads them into the database. Rows are matched by natural key
//! (group name, group+line name, article code), so re-running the
//! import over the same files is a no-op.
//!
//! Usage: `import-catalog <dir>` with `APP__DATABASE_URL` set.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use pos_api::config;
use pos_api::db;
use pos_api::entities::{
    article::{self, ActiveModel as ArticleActiveModel, Entity as ArticleEntity},
    article_group::{self, ActiveModel as GroupActiveModel, Entity as GroupEntity},
    article_line::{self, ActiveModel as LineActiveModel, Entity as LineEntity},
    price_list::ActiveModel as PriceListActiveModel,
    EntityStatus,
};

#[derive(Debug, Deserialize)]
struct GroupRecord {
    name: String,
    #[serde(default)]
    inactive: bool,
}

#[derive(Debug, Deserialize)]
struct LineRecord {
    group: String,
    name: String,
    #[serde(default)]
    inactive: bool,
}

#[derive(Debug, Deserialize)]
struct ArticleRecord {
    code: String,
    #[serde(default)]
    barcode: Option<String>,
    description: String,
    #[serde(default)]
    presentation: Option<String>,
    group: String,
    line: String,
    #[serde(default)]
    stock: Option<Decimal>,
    #[serde(default)]
    price_1: Option<Decimal>,
    #[serde(default)]
    price_2: Option<Decimal>,
    #[serde(default)]
    price_3: Option<Decimal>,
    #[serde(default)]
    price_4: Option<Decimal>,
    #[serde(default)]
    purchase_price: Option<Decimal>,
    #[serde(default)]
    cost_price: Option<Decimal>,
}

#[derive(Debug, Default)]
struct ImportSummary {
    groups_created: usize,
    lines_created: usize,
    articles_created: usize,
    skipped: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    config::init_tracing("info", false);

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: import-catalog <dir>")?;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let cfg = config::load_config()?;
    let db = db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        db::run_migrations(&db).await?;
    }

    let mut summary = ImportSummary::default();

    import_groups(&db, &dir.join("groups.csv"), &mut summary).await?;
    import_lines(&db, &dir.join("lines.csv"), &mut summary).await?;
    import_articles(&db, &dir.join("articles.csv"), &mut summary).await?;

    info!(
        groups = summary.groups_created,
        lines = summary.lines_created,
        articles = summary.articles_created,
        skipped = summary.skipped,
        "Import finished"
    );
    println!(
        "Imported {} group(s), {} line(s), {} article(s); {} row(s) already present",
        summary.groups_created, summary.lines_created, summary.articles_created, summary.skipped
    );
    Ok(())
}

fn status_of(inactive: bool) -> EntityStatus {
    if inactive {
        EntityStatus::Inactive
    } else {
        EntityStatus::Active
    }
}

async fn import_groups(
    db: &sea_orm::DatabaseConnection,
    path: &Path,
    summary: &mut ImportSummary,
) -> Result<()> {
    if !path.exists() {
        info!("No groups.csv, skipping");
        return Ok(());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    for record in reader.deserialize() {
        let record: GroupRecord = record.context("malformed group row")?;
        let existing = GroupEntity::find()
            .filter(article_group::Column::Name.eq(record.name.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            summary.skipped += 1;
            continue;
        }
        GroupActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(record.name),
            status: Set(status_of(record.inactive)),
        }
        .insert(db)
        .await?;
        summary.groups_created += 1;
    }
    Ok(())
}

async fn import_lines(
    db: &sea_orm::DatabaseConnection,
    path: &Path,
    summary: &mut ImportSummary,
) -> Result<()> {
    if !path.exists() {
        info!("No lines.csv, skipping");
        return Ok(());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    for record in reader.deserialize() {
        let record: LineRecord = record.context("malformed line row")?;
        let group = find_group(db, &record.group).await?;
        let existing = LineEntity::find()
            .filter(article_line::Column::GroupId.eq(group.id))
            .filter(article_line::Column::Name.eq(record.name.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            summary.skipped += 1;
            continue;
        }
        LineActiveModel {
            id: Set(Uuid::new_v4()),
            group_id: Set(group.id),
            name: Set(record.name),
            status: Set(status_of(record.inactive)),
        }
        .insert(db)
        .await?;
        summary.lines_created += 1;
    }
    Ok(())
}

async fn import_articles(
    db: &sea_orm::DatabaseConnection,
    path: &Path,
    summary: &mut ImportSummary,
) -> Result<()> {
    if !path.exists() {
        info!("No articles.csv, skipping");
        return Ok(());
    }
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    for record in reader.deserialize() {
        let record: ArticleRecord = record.context("malformed article row")?;
        let existing = ArticleEntity::find()
            .filter(article::Column::Code.eq(record.code.clone()))
            .one(db)
            .await?;
        if existing.is_some() {
            summary.skipped += 1;
            continue;
        }

        let group = find_group(db, &record.group).await?;
        let line = LineEntity::find()
            .filter(article_line::Column::GroupId.eq(group.id))
            .filter(article_line::Column::Name.eq(record.line.clone()))
            .one(db)
            .await?
            .with_context(|| {
                format!("unknown line '{}' in group '{}'", record.line, record.group)
            })?;

        let article_id = Uuid::new_v4();
        ArticleActiveModel {
            id: Set(article_id),
            code: Set(record.code),
            barcode: Set(record.barcode),
            description: Set(record.description),
            presentation: Set(record.presentation),
            group_id: Set(group.id),
            line_id: Set(line.id),
            stock: Set(record.stock.unwrap_or(Decimal::ZERO)),
            status: Set(EntityStatus::Active),
        }
        .insert(db)
        .await?;

        PriceListActiveModel {
            article_id: Set(article_id),
            price_1: Set(record.price_1.unwrap_or(Decimal::ZERO)),
            price_2: Set(record.price_2.unwrap_or(Decimal::ZERO)),
            price_3: Set(record.price_3.unwrap_or(Decimal::ZERO)),
            price_4: Set(record.price_4.unwrap_or(Decimal::ZERO)),
            purchase_price: Set(record.purchase_price.unwrap_or(Decimal::ZERO)),
            cost_price: Set(record.cost_price.unwrap_or(Decimal::ZERO)),
        }
        .insert(db)
        .await?;
        summary.articles_created += 1;
    }
    Ok(())
}

async fn find_group(
    db: &sea_orm::DatabaseConnection,
    name: &str,
) -> Result<pos_api::entities::ArticleGroupModel> {
    GroupEntity::find()
        .filter(article_group::Column::Name.eq(name.to_owned()))
        .one(db)
        .await?
        .with_context(|| format!("unknown group '{}'", name))
}

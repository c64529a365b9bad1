#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use paramfilter::{Constrain, Filter, FilterError, FilterRequest, columns};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    Select, Set,
};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use uuid::Uuid;

pub mod user_entity;

use user_entity as user;

pub type UserSelect = Select<user::Entity>;

pub const STATUSES: [&str; 3] = ["active", "pending", "suspended"];

pub struct Companies {
    pub acme: Uuid,
    pub globex: Uuid,
}

/// Send filter traces to the captured test output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();

    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Two companies, two users each.
pub async fn seed_users(db: &DatabaseConnection) -> Result<Companies, DbErr> {
    let companies = Companies {
        acme: Uuid::new_v4(),
        globex: Uuid::new_v4(),
    };

    let rows = [
        ("Alice Moreau", "alice@acme.test", "active", 90, (2024, 1, 10), companies.acme),
        ("Bob Tanaka", "bob@acme.test", "pending", 40, (2024, 2, 15), companies.acme),
        ("Carol Diaz", "carol@globex.test", "active", 75, (2024, 3, 1), companies.globex),
        ("Dave Vanburen", "dave@globex.test", "suspended", 10, (2023, 12, 20), companies.globex),
    ];

    for (name, email, status, score, (y, m, d), company) in rows {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_uuid: Set(company),
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            status: Set(status.to_string()),
            score: Set(score),
            created_at: Set(chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap()),
        }
        .insert(db)
        .await?;
    }

    Ok(companies)
}

/// Handlers every resource shares.
pub fn base_filter() -> Filter<UserSelect> {
    Filter::<UserSelect>::new()
        .on("query", columns::contains(user::Column::Name))
        .between("created_at", columns::between(user::Column::CreatedAt))
}

pub fn status(select: &mut UserSelect, value: Option<&Value>) -> Result<(), FilterError> {
    let Some(value) = value else {
        return Ok(());
    };
    let status = value
        .as_str()
        .ok_or_else(|| FilterError::invalid_value("status", "expected a string"))?;
    if !STATUSES.contains(&status) {
        return Err(FilterError::invalid_value(
            "status",
            format!("unknown status '{status}'"),
        ));
    }

    select.constrain(user::Column::Status.eq(status));
    Ok(())
}

/// Filter for the users resource, scoped to `company` on internal requests.
pub fn user_filter(company: Uuid) -> Filter<UserSelect> {
    Filter::new()
        .on("status", status)
        .on("email", columns::exact(user::Column::Email))
        .on("companyUuid", columns::exact(user::Column::CompanyUuid))
        .between("score", columns::between(user::Column::Score))
        .for_internal(move |select| {
            select.constrain(user::Column::CompanyUuid.eq(company));
            Ok(())
        })
        .inherit(base_filter())
}

pub fn ordered_users() -> UserSelect {
    user::Entity::find().order_by_asc(user::Column::Name)
}

pub fn names(users: &[user::Model]) -> Vec<&str> {
    users.iter().map(|u| u.name.as_str()).collect()
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    /// Company of the signed-in console user
    pub company: Uuid,
}

async fn list_users(
    State(state): State<AppState>,
    request: FilterRequest,
) -> Result<Json<Vec<user::Model>>, FilterError> {
    let select = user_filter(state.company).apply_request(&request, ordered_users())?;
    Ok(Json(select.all(&state.db).await?))
}

pub fn setup_test_app(state: AppState) -> Router {
    let internal = Router::new().route("/users", get(list_users));

    Router::new()
        .route("/v1/users", get(list_users))
        .nest("/int/v1", internal)
        .with_state(state)
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateUserTable)]
    }
}

pub struct CreateUserTable;

#[async_trait::async_trait]
impl MigrationName for CreateUserTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_users_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateUserTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(user::Entity)
            .if_not_exists()
            .col(
                ColumnDef::new(user::Column::Id)
                    .uuid()
                    .not_null()
                    .primary_key(),
            )
            .col(ColumnDef::new(user::Column::CompanyUuid).uuid().not_null())
            .col(ColumnDef::new(user::Column::Name).string().not_null())
            .col(ColumnDef::new(user::Column::Email).string().not_null())
            .col(ColumnDef::new(user::Column::Status).string().not_null())
            .col(ColumnDef::new(user::Column::Score).integer().not_null())
            .col(ColumnDef::new(user::Column::CreatedAt).date().not_null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(user::Entity).to_owned())
            .await?;
        Ok(())
    }
}

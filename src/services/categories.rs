use common::{CategoryDto, CategoryQuery, CreateCategoryRequest, UpdateCategoryRequest};
use model::entities::{category, pending_payment, planned_transaction, transaction};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::{debug, info, instrument, trace};

use super::{ServiceError, ServiceResult};

pub(crate) async fn find_category<C: ConnectionTrait>(
    conn: &C,
    category_id: i32,
) -> ServiceResult<category::Model> {
    category::Entity::find_by_id(category_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Category", category_id))
}

/// Rejects references to categories that do not exist.
pub(crate) async fn ensure_category<C: ConnectionTrait>(
    conn: &C,
    category_id: Option<i32>,
) -> ServiceResult<()> {
    if let Some(id) = category_id {
        if category::Entity::find_by_id(id).one(conn).await?.is_none() {
            return Err(ServiceError::Validation(format!(
                "Category {} does not exist",
                id
            )));
        }
    }
    Ok(())
}

async fn ensure_unique_name<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    except: Option<i32>,
) -> ServiceResult<()> {
    let mut query = category::Entity::find().filter(category::Column::Name.eq(name));
    if let Some(id) = except {
        query = query.filter(category::Column::Id.ne(id));
    }
    if query.count(conn).await? > 0 {
        return Err(ServiceError::Conflict(format!(
            "Category '{}' already exists",
            name
        )));
    }
    Ok(())
}

#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    request: CreateCategoryRequest,
) -> ServiceResult<CategoryDto> {
    trace!("Entering create_category function");
    ensure_unique_name(db, &request.name, None).await?;

    let model = category::ActiveModel {
        name: Set(request.name),
        category_type: Set(request.category_type),
        description: Set(request.description),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Category created with ID: {}", model.id);
    Ok(CategoryDto::from(model))
}

#[instrument(skip(db))]
pub async fn get_category(db: &DatabaseConnection, category_id: i32) -> ServiceResult<CategoryDto> {
    Ok(CategoryDto::from(find_category(db, category_id).await?))
}

#[instrument(skip(db))]
pub async fn list_categories(
    db: &DatabaseConnection,
    query: CategoryQuery,
) -> ServiceResult<Vec<CategoryDto>> {
    let mut select = category::Entity::find();
    if let Some(category_type) = query.category_type {
        select = select.filter(category::Column::CategoryType.eq(category_type));
    }
    let categories = select
        .order_by_asc(category::Column::Name)
        .all(db)
        .await?;

    debug!("Retrieved {} categories", categories.len());
    Ok(categories.into_iter().map(CategoryDto::from).collect())
}

#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    category_id: i32,
    request: UpdateCategoryRequest,
) -> ServiceResult<CategoryDto> {
    let existing = find_category(db, category_id).await?;
    if let Some(name) = &request.name {
        ensure_unique_name(db, name, Some(category_id)).await?;
    }

    let mut active: category::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(category_type) = request.category_type {
        active.category_type = Set(category_type);
    }
    if let Some(description) = request.description {
        active.description = Set(Some(description));
    }

    let updated = active.update(db).await?;
    info!("Category {} updated", updated.id);
    Ok(CategoryDto::from(updated))
}

/// Deletes a category that nothing references.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, category_id: i32) -> ServiceResult<()> {
    let existing = find_category(db, category_id).await?;

    let transactions = existing.find_related(transaction::Entity).count(db).await?;
    let plans = existing
        .find_related(planned_transaction::Entity)
        .count(db)
        .await?;
    let pending = existing
        .find_related(pending_payment::Entity)
        .count(db)
        .await?;
    if transactions + plans + pending > 0 {
        return Err(ServiceError::Conflict(format!(
            "Category {} is used by {} transactions, {} planned transactions and {} pending payments",
            category_id, transactions, plans, pending
        )));
    }

    existing.delete(db).await?;
    info!("Category {} deleted", category_id);
    Ok(())
}

use super::models::{
    BrandItem, Brandbook, BrandbookResponse, CreateBrandbookRequest, CreateFileRequest,
    CreateItemRequest, UploadedFile,
};
use super::validators::{slugify, BrandbookValidator, FileValidator, ItemValidator};
use crate::common::{
    generate_brandbook_id, generate_file_id, generate_item_id, generate_raw_id, ApiError,
    Validator,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

const BRANDBOOK_COLUMNS: &str = "id, user_id, title, slug, description, created_at, updated_at";
const ITEM_COLUMNS: &str =
    "id, brandbook_id, item_type, name, link, colour, position, created_at";
const FILE_COLUMNS: &str = "id, brandbook_id, file_url, file_type, label, created_at";

const SLUG_SUFFIX_LENGTH: usize = 6;

fn not_found() -> ApiError {
    ApiError::NotFound("Brandbook not found".to_string())
}

/// Brandbook store access. Every operation is scoped to an owner; a
/// brandbook owned by someone else behaves exactly like a missing one.
pub struct BrandbooksService {
    db: SqlitePool,
}

impl BrandbooksService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Newest first
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<BrandbookResponse>, ApiError> {
        let brandbooks = sqlx::query_as::<_, Brandbook>(&format!(
            "SELECT {} FROM brandbooks WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            BRANDBOOK_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        let mut responses = Vec::with_capacity(brandbooks.len());
        for brandbook in brandbooks {
            responses.push(self.with_children(brandbook).await?);
        }
        Ok(responses)
    }

    pub async fn get_for_owner(
        &self,
        owner_id: &str,
        brandbook_id: &str,
    ) -> Result<BrandbookResponse, ApiError> {
        let brandbook = self.find_owned(owner_id, brandbook_id).await?;
        self.with_children(brandbook).await
    }

    pub async fn create(
        &self,
        owner_id: &str,
        request: CreateBrandbookRequest,
    ) -> Result<BrandbookResponse, ApiError> {
        BrandbookValidator.validate(&request).into_result()?;

        let brandbook_id = generate_brandbook_id();
        let slug = match request.slug {
            Some(slug) => slug,
            None => format!(
                "{}-{}",
                slugify(&request.title),
                generate_raw_id(SLUG_SUFFIX_LENGTH).to_lowercase()
            ),
        };
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO brandbooks (id, user_id, title, slug, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&brandbook_id)
        .bind(owner_id)
        .bind(request.title.trim())
        .bind(&slug)
        .bind(&description)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::from_write(e, "Slug already in use"))?;

        info!(brandbook_id = %brandbook_id, user_id = %owner_id, slug = %slug, "Created brandbook");

        self.get_for_owner(owner_id, &brandbook_id).await
    }

    /// Removes the brandbook together with its items and files
    pub async fn delete(&self, owner_id: &str, brandbook_id: &str) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM brandbooks WHERE id = ? AND user_id = ?")
            .bind(brandbook_id)
            .bind(owner_id)
            .execute(&self.db)
            .await
            .map_err(ApiError::DatabaseError)?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }

        info!(brandbook_id = %brandbook_id, user_id = %owner_id, "Deleted brandbook");
        Ok(())
    }

    /// Appends an item. Without an explicit position it goes after the
    /// current last item.
    pub async fn add_item(
        &self,
        owner_id: &str,
        brandbook_id: &str,
        request: CreateItemRequest,
    ) -> Result<BrandItem, ApiError> {
        let brandbook = self.find_owned(owner_id, brandbook_id).await?;
        ItemValidator.validate(&request).into_result()?;

        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        let position = match request.position {
            Some(position) => position,
            None => sqlx::query_scalar::<_, i64>(
                "SELECT COALESCE(MAX(position) + 1, 0) FROM brand_items WHERE brandbook_id = ?",
            )
            .bind(&brandbook.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?,
        };

        let item = BrandItem {
            id: generate_item_id(),
            brandbook_id: brandbook.id.clone(),
            item_type: request.item_type,
            name: request
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            link: request.link.trim().to_string(),
            colour: request.colour,
            position,
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        sqlx::query(
            r#"
            INSERT INTO brand_items (id, brandbook_id, item_type, name, link, colour, position, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.brandbook_id)
        .bind(&item.item_type)
        .bind(&item.name)
        .bind(&item.link)
        .bind(&item.colour)
        .bind(item.position)
        .bind(&item.created_at)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        touch(&mut tx, &brandbook.id, &item.created_at).await?;
        tx.commit().await.map_err(ApiError::DatabaseError)?;

        debug!(
            item_id = %item.id,
            brandbook_id = %item.brandbook_id,
            item_type = %item.item_type,
            "Added brandbook item"
        );
        Ok(item)
    }

    pub async fn add_file(
        &self,
        owner_id: &str,
        brandbook_id: &str,
        request: CreateFileRequest,
    ) -> Result<UploadedFile, ApiError> {
        let brandbook = self.find_owned(owner_id, brandbook_id).await?;
        FileValidator.validate(&request).into_result()?;

        let file = UploadedFile {
            id: generate_file_id(),
            brandbook_id: brandbook.id.clone(),
            file_url: request.file_url.trim().to_string(),
            file_type: request.file_type.filter(|t| !t.trim().is_empty()),
            label: request.label.filter(|l| !l.trim().is_empty()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        let mut tx = self.db.begin().await.map_err(ApiError::DatabaseError)?;

        sqlx::query(
            r#"
            INSERT INTO uploaded_files (id, brandbook_id, file_url, file_type, label, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&file.id)
        .bind(&file.brandbook_id)
        .bind(&file.file_url)
        .bind(&file.file_type)
        .bind(&file.label)
        .bind(&file.created_at)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        touch(&mut tx, &brandbook.id, &file.created_at).await?;
        tx.commit().await.map_err(ApiError::DatabaseError)?;

        debug!(file_id = %file.id, brandbook_id = %file.brandbook_id, "Attached file to brandbook");
        Ok(file)
    }

    async fn find_owned(&self, owner_id: &str, brandbook_id: &str) -> Result<Brandbook, ApiError> {
        sqlx::query_as::<_, Brandbook>(&format!(
            "SELECT {} FROM brandbooks WHERE id = ? AND user_id = ?",
            BRANDBOOK_COLUMNS
        ))
        .bind(brandbook_id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?
        .ok_or_else(not_found)
    }

    async fn with_children(&self, brandbook: Brandbook) -> Result<BrandbookResponse, ApiError> {
        let items = sqlx::query_as::<_, BrandItem>(&format!(
            "SELECT {} FROM brand_items WHERE brandbook_id = ? ORDER BY position, created_at",
            ITEM_COLUMNS
        ))
        .bind(&brandbook.id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        let files = sqlx::query_as::<_, UploadedFile>(&format!(
            "SELECT {} FROM uploaded_files WHERE brandbook_id = ? ORDER BY created_at, id",
            FILE_COLUMNS
        ))
        .bind(&brandbook.id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(BrandbookResponse {
            brandbook,
            items,
            files,
        })
    }
}

async fn touch(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    brandbook_id: &str,
    updated_at: &str,
) -> Result<(), ApiError> {
    sqlx::query("UPDATE brandbooks SET updated_at = ? WHERE id = ?")
        .bind(updated_at)
        .bind(brandbook_id)
        .execute(&mut **tx)
        .await
        .map_err(ApiError::DatabaseError)?;
    Ok(())
}

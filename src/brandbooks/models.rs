use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Brandbook {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct BrandItem {
    pub id: String,
    pub brandbook_id: String,
    #[serde(rename = "type")]
    pub item_type: String, // 'logo', 'font', 'colour' or 'merch'
    pub name: Option<String>,
    pub link: String,
    pub colour: Option<String>, // "#RRGGBB" or "#RGB"
    pub position: i64,
    pub created_at: String,
}

/// Externally hosted file attached to a brandbook
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct UploadedFile {
    pub id: String,
    pub brandbook_id: String,
    pub file_url: String,
    pub file_type: Option<String>, // 'image', 'pdf', ...
    pub label: Option<String>,
    pub created_at: String,
}

/// Brandbook with its children, as returned by every brandbook endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct BrandbookResponse {
    #[serde(flatten)]
    pub brandbook: Brandbook,
    pub items: Vec<BrandItem>,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBrandbookRequest {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: Option<String>,
    pub link: String,
    pub colour: Option<String>,
    pub position: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateFileRequest {
    pub file_url: String,
    pub file_type: Option<String>,
    pub label: Option<String>,
}

use super::models::{CreateBrandbookRequest, CreateFileRequest, CreateItemRequest};
use crate::common::{ValidationResult, Validator};

pub const ITEM_TYPES: [&str; 4] = ["logo", "font", "colour", "merch"];

const MAX_TITLE_LENGTH: usize = 200;
const MAX_SLUG_LENGTH: usize = 100;
const MAX_DESCRIPTION_LENGTH: usize = 2000;
const MAX_LINK_LENGTH: usize = 2048;
const MAX_LABEL_LENGTH: usize = 255;
/// Keeps `max(position) + 1` far from integer overflow
pub const MAX_POSITION: i64 = i32::MAX as i64;

pub struct BrandbookValidator;
pub struct ItemValidator;
pub struct FileValidator;

impl Validator<CreateBrandbookRequest> for BrandbookValidator {
    fn validate(&self, data: &CreateBrandbookRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.title.trim().is_empty() {
            result.add_error("title", "Title is required");
        } else if data.title.chars().count() > MAX_TITLE_LENGTH {
            result.add_error("title", "Title must not exceed 200 characters");
        }

        if let Some(slug) = &data.slug {
            if !is_valid_slug(slug) {
                result.add_error(
                    "slug",
                    "Slug must be 1-100 characters of lowercase letters, digits and '-'",
                );
            }
        }

        if let Some(description) = &data.description {
            if description.chars().count() > MAX_DESCRIPTION_LENGTH {
                result.add_error("description", "Description must not exceed 2000 characters");
            }
        }

        result
    }
}

impl Validator<CreateItemRequest> for ItemValidator {
    fn validate(&self, data: &CreateItemRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if let Err(message) = validate_item_type(&data.item_type) {
            result.add_error("type", &message);
        }

        if data.link.trim().is_empty() {
            result.add_error("link", "Link is required");
        } else if data.link.len() > MAX_LINK_LENGTH {
            result.add_error("link", "Link must not exceed 2048 characters");
        }

        if let Some(name) = &data.name {
            if name.chars().count() > MAX_LABEL_LENGTH {
                result.add_error("name", "Name must not exceed 255 characters");
            }
        }

        if let Some(colour) = &data.colour {
            if !is_hex_colour(colour) {
                result.add_error("colour", "Colour must be a hex value like #1A2B3C or #ABC");
            }
        }

        if matches!(data.position, Some(p) if !(0..=MAX_POSITION).contains(&p)) {
            result.add_error("position", "Position must be between 0 and 2147483647");
        }

        result
    }
}

impl Validator<CreateFileRequest> for FileValidator {
    fn validate(&self, data: &CreateFileRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let url = data.file_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            result.add_error(
                "file_url",
                "File URL must be a valid URL starting with http:// or https://",
            );
        } else if url.len() > MAX_LINK_LENGTH {
            result.add_error("file_url", "File URL must not exceed 2048 characters");
        }

        if let Some(label) = &data.label {
            if label.chars().count() > MAX_LABEL_LENGTH {
                result.add_error("label", "Label must not exceed 255 characters");
            }
        }

        result
    }
}

/// Validates item type
pub fn validate_item_type(item_type: &str) -> Result<(), String> {
    if !ITEM_TYPES.contains(&item_type) {
        return Err("Type must be one of 'logo', 'font', 'colour', 'merch'".to_string());
    }
    Ok(())
}

pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LENGTH
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

pub fn is_hex_colour(colour: &str) -> bool {
    colour
        .strip_prefix('#')
        .map_or(false, |hex| {
            matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit())
        })
}

/// Lowercase ASCII slug of a title, runs of other characters become one '-'
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }

    let slug: String = slug.trim_end_matches('-').chars().take(80).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "brandbook".to_string()
    } else {
        slug.to_string()
    }
}

//! JSON-or-multipart extractors for catalog creation.
//!
//! Category and product creation accept either a JSON body (image URL
//! lists) or `multipart/form-data` (image files plus text fields). Both
//! paths are normalized into one submission shape with raw string fields;
//! numeric parsing happens in `services::catalog` where it is tested.

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// An image file pulled out of a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Normalized category-creation submission.
#[derive(Debug, Clone, Default)]
pub struct CategorySubmission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_urls: Vec<String>,
    pub files: Vec<UploadedImage>,
}

/// Normalized product-creation submission.
#[derive(Debug, Clone, Default)]
pub struct ProductSubmission {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub quantity: Option<String>,
    pub dimension: Option<String>,
    pub material_care: Option<String>,
    pub image_urls: Vec<String>,
    pub files: Vec<UploadedImage>,
}

/// A JSON field that may arrive as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(serde_json::Number),
    Text(String),
}

impl RawField {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Accept `images` as either a single URL string or a list of them.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let images = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(url)) => vec![url],
        Some(OneOrMany::Many(urls)) => urls,
    };

    Ok(images
        .into_iter()
        .map(|url| url.trim().to_owned())
        .filter(|url| !url.is_empty())
        .collect())
}

/// JSON body for category creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryBody {
    name: Option<String>,
    description: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    images: Vec<String>,
}

/// JSON body for product creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductBody {
    name: Option<String>,
    description: Option<String>,
    category: Option<RawField>,
    price: Option<RawField>,
    quantity: Option<RawField>,
    dimension: Option<String>,
    #[serde(alias = "material", alias = "care")]
    material_care: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    images: Vec<String>,
}

/// Whether the request body is `multipart/form-data`.
fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(format!("Invalid multipart payload: {err}"))
}

/// Read one multipart field as text, trimmed, empty collapsed to `None`.
async fn text_field(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<String>, AppError> {
    let value = field.text().await.map_err(multipart_error)?;
    let value = value.trim();
    Ok(if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    })
}

/// Collect an `images` multipart entry: a file part becomes an upload, a
/// bare text part is treated as a URL. Empty files are skipped.
async fn image_field(
    field: axum::extract::multipart::Field<'_>,
    urls: &mut Vec<String>,
    files: &mut Vec<UploadedImage>,
) -> Result<(), AppError> {
    if field.file_name().is_some() {
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if !bytes.is_empty() {
            files.push(UploadedImage {
                file_name,
                bytes: bytes.to_vec(),
            });
        }
    } else if let Some(url) = text_field(field).await? {
        urls.push(url);
    }
    Ok(())
}

impl<S> FromRequest<S> for CategorySubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let mut submission = Self::default();

            while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
                let name = field.name().unwrap_or_default().to_owned();
                match name.as_str() {
                    "name" => submission.name = text_field(field).await?,
                    "description" => submission.description = text_field(field).await?,
                    "images" => {
                        image_field(field, &mut submission.image_urls, &mut submission.files)
                            .await?;
                    }
                    _ => {}
                }
            }

            Ok(submission)
        } else {
            let Json(body) = Json::<CategoryBody>::from_request(req, state)
                .await
                .map_err(|_| AppError::BadRequest("Invalid JSON payload.".to_owned()))?;
            Ok(Self {
                name: body.name,
                description: body.description,
                image_urls: body.images,
                files: Vec::new(),
            })
        }
    }
}

impl<S> FromRequest<S> for ProductSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_multipart(&req) {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let mut submission = Self::default();

            while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
                let name = field.name().unwrap_or_default().to_owned();
                match name.as_str() {
                    "name" => submission.name = text_field(field).await?,
                    "description" => submission.description = text_field(field).await?,
                    "category" => submission.category = text_field(field).await?,
                    "price" => submission.price = text_field(field).await?,
                    "quantity" => submission.quantity = text_field(field).await?,
                    "dimension" => submission.dimension = text_field(field).await?,
                    // Older admin forms posted these under different names.
                    "materialCare" | "material" | "care" => {
                        if submission.material_care.is_none() {
                            submission.material_care = text_field(field).await?;
                        }
                    }
                    "images" => {
                        image_field(field, &mut submission.image_urls, &mut submission.files)
                            .await?;
                    }
                    _ => {}
                }
            }

            Ok(submission)
        } else {
            let Json(body) = Json::<ProductBody>::from_request(req, state)
                .await
                .map_err(|_| AppError::BadRequest("Invalid JSON payload.".to_owned()))?;
            Ok(Self {
                name: body.name,
                description: body.description,
                category: body.category.map(RawField::into_string),
                price: body.price.map(RawField::into_string),
                quantity: body.quantity.map(RawField::into_string),
                dimension: body.dimension,
                material_care: body.material_care,
                image_urls: body.images,
                files: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_body_accepts_numbers_or_strings() {
        let body: ProductBody = serde_json::from_str(
            r#"{"name":"Oak Shelf","category":3,"price":"129.00","quantity":4}"#,
        )
        .unwrap();
        assert_eq!(body.category.unwrap().into_string(), "3");
        assert_eq!(body.price.unwrap().into_string(), "129.00");
        assert_eq!(body.quantity.unwrap().into_string(), "4");
    }

    #[test]
    fn test_images_accepts_single_string() {
        let body: CategoryBody =
            serde_json::from_str(r#"{"name":"Shelving","images":" /uploads/a.jpg "}"#).unwrap();
        assert_eq!(body.images, vec!["/uploads/a.jpg"]);
    }

    #[test]
    fn test_images_accepts_list_and_drops_blanks() {
        let body: CategoryBody =
            serde_json::from_str(r#"{"name":"Shelving","images":["/a.jpg","  ","/b.jpg"]}"#)
                .unwrap();
        assert_eq!(body.images, vec!["/a.jpg", "/b.jpg"]);
    }

    #[test]
    fn test_images_defaults_to_empty() {
        let body: CategoryBody = serde_json::from_str(r#"{"name":"Shelving"}"#).unwrap();
        assert!(body.images.is_empty());
    }

    #[test]
    fn test_material_care_aliases() {
        let body: ProductBody =
            serde_json::from_str(r#"{"name":"x","material":"wipe with dry cloth"}"#).unwrap();
        assert_eq!(body.material_care.as_deref(), Some("wipe with dry cloth"));
    }
}

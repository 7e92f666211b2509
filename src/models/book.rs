use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DATA_IMAGE_PREFIX: &str = "data:image";

/// Catalog book as returned by the storefront API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(deserialize_with = "super::deserialize_amount")]
    pub price: f64,
    pub stock: u32,
    pub category: BookCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_form_level: Option<String>,
    /// Encoded image payload, either a full data URI or a bare base64 body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Book {
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Cover payload as something a renderer can display directly.
    pub fn cover_data_uri(&self) -> Option<String> {
        let cover = self.cover_image.as_deref()?;
        if cover.starts_with(DATA_IMAGE_PREFIX) {
            Some(cover.to_string())
        } else {
            Some(format!("data:image/jpeg;base64,{}", cover))
        }
    }

    /// Raw image bytes of the cover, if there is one and it decodes.
    pub fn decode_cover(&self) -> Option<Vec<u8>> {
        let cover = self.cover_image.as_deref()?;
        let body = if cover.starts_with(DATA_IMAGE_PREFIX) {
            cover.split_once(',').map(|(_, body)| body)?
        } else {
            cover
        };
        BASE64.decode(body.trim()).ok()
    }

    /// Case-insensitive match against title or author
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.author.to_lowercase().contains(&term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookCategory {
    Textbook,
    Manual,
    Guide,
    #[serde(rename = "Past Paper")]
    PastPaper,
}

impl BookCategory {
    pub const ALL: [BookCategory; 4] = [
        BookCategory::Textbook,
        BookCategory::Manual,
        BookCategory::Guide,
        BookCategory::PastPaper,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookCategory::Textbook => "Textbook",
            BookCategory::Manual => "Manual",
            BookCategory::Guide => "Guide",
            BookCategory::PastPaper => "Past Paper",
        }
    }
}

impl fmt::Display for BookCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "textbook" => Ok(BookCategory::Textbook),
            "manual" => Ok(BookCategory::Manual),
            "guide" => Ok(BookCategory::Guide),
            "pastpaper" => Ok(BookCategory::PastPaper),
            _ => Err(format!(
                "unknown category '{}' (expected Textbook, Manual, Guide or Past Paper)",
                s
            )),
        }
    }
}

/// Admin create/update payload, sent as multipart form data
#[derive(Debug, Clone, PartialEq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub price: f64,
    pub category: Option<BookCategory>,
    pub class_form_level: Option<String>,
    pub stock: u32,
    pub cover: Option<CoverUpload>,
}

impl BookForm {
    /// Checks the fields the admin form marks as required.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.author.trim().is_empty() {
            return Err("Author is required".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Price must be a non-negative amount".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, PartialEq)]
pub struct CoverUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CoverUpload {
    /// Guess the MIME type from the file extension; the API only accepts images.
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime_type = match extension.as_str() {
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            _ => "image/jpeg",
        }
        .to_string();

        Self {
            file_name,
            mime_type,
            bytes,
        }
    }
}

impl fmt::Debug for CoverUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoverUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> serde_json::Value {
        serde_json::json!({
            "_id": "b1",
            "title": "Engineering Mathematics",
            "author": "K. A. Stroud",
            "price": "2500.00",
            "stock": 4,
            "category": "Past Paper",
            "classFormLevel": "200L",
            "createdAt": "2025-01-10T09:00:00.000Z"
        })
    }

    #[test]
    fn test_book_parses_api_shape() {
        let book: Book = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(book.id, "b1");
        assert_eq!(book.price, 2500.0);
        assert_eq!(book.category, BookCategory::PastPaper);
        assert_eq!(book.class_form_level.as_deref(), Some("200L"));
        assert!(book.cover_image.is_none());
        assert!(book.in_stock());
    }

    #[test]
    fn test_cover_data_uri_and_decode() {
        let mut book: Book = serde_json::from_value(sample_json()).unwrap();
        book.cover_image = Some(BASE64.encode(b"jpeg-bytes"));
        assert_eq!(
            book.cover_data_uri().unwrap(),
            format!("data:image/jpeg;base64,{}", BASE64.encode(b"jpeg-bytes"))
        );
        assert_eq!(book.decode_cover().unwrap(), b"jpeg-bytes");

        book.cover_image = Some(format!("data:image/png;base64,{}", BASE64.encode(b"png")));
        assert!(book.cover_data_uri().unwrap().starts_with("data:image/png"));
        assert_eq!(book.decode_cover().unwrap(), b"png");
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("past-paper".parse::<BookCategory>(), Ok(BookCategory::PastPaper));
        assert_eq!("Past Paper".parse::<BookCategory>(), Ok(BookCategory::PastPaper));
        assert_eq!("TEXTBOOK".parse::<BookCategory>(), Ok(BookCategory::Textbook));
        assert!("novel".parse::<BookCategory>().is_err());
    }

    #[test]
    fn test_search_matches_title_or_author() {
        let book: Book = serde_json::from_value(sample_json()).unwrap();
        assert!(book.matches_search("mathem"));
        assert!(book.matches_search("STROUD"));
        assert!(!book.matches_search("physics"));
    }

    #[test]
    fn test_book_form_validation() {
        let mut form = BookForm {
            title: "Guide to CSC 201".to_string(),
            author: "Dept. of Computer Science".to_string(),
            price: 800.0,
            category: Some(BookCategory::Guide),
            class_form_level: None,
            stock: 10,
            cover: None,
        };
        assert!(form.validate().is_ok());

        form.price = -1.0;
        assert!(form.validate().is_err());

        form.price = 800.0;
        form.title = "  ".to_string();
        assert_eq!(form.validate().unwrap_err(), "Title is required");
    }
}

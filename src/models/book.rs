//! Book model, book form input and form validation

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::author::Author;

pub const TITLE_MAX_LEN: usize = 200;

/// Full book model from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub publication_year: Option<i32>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Book row joined with its author's name, used by list pages
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookListing {
    pub id: i32,
    pub title: String,
    pub author_id: i32,
    pub author_name: String,
    pub publication_year: Option<i32>,
}

/// A form field submitted either as a string or as a bare number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Number(i64),
    Text(String),
}

impl FormValue {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            FormValue::Number(n) => Cow::Owned(n.to_string()),
            FormValue::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// Raw book form submission (add and edit).
///
/// Every field is optional so that a missing field reaches validation
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct BookForm {
    pub title: Option<String>,
    /// Author id, as submitted by a select input
    #[schema(value_type = Option<String>)]
    pub author: Option<FormValue>,
    #[schema(value_type = Option<String>)]
    pub publication_year: Option<FormValue>,
}

/// Validated book form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanBook {
    pub title: String,
    pub author_id: i32,
    pub publication_year: Option<i32>,
}

pub const AUTHOR_NOT_FOUND: &str = "Author not found";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl BookForm {
    /// Check required fields and parse them.
    ///
    /// The returned author id is not yet known to exist; a malformed
    /// id reports the same message as an unknown one.
    pub fn clean(&self) -> Result<CleanBook, String> {
        let title = non_blank(self.title.as_deref()).ok_or("Title is required")?;
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(format!("Title must be at most {} characters", TITLE_MAX_LEN));
        }

        let author = self.author.as_ref().map(FormValue::text);
        let author = non_blank(author.as_deref()).ok_or("Author is required")?;
        let author_id = author.parse::<i32>().map_err(|_| AUTHOR_NOT_FOUND.to_string())?;

        let year = self.publication_year.as_ref().map(FormValue::text);
        let publication_year = match non_blank(year.as_deref()) {
            Some(year) => Some(
                year.parse::<i32>()
                    .map_err(|_| "Publication year must be a number".to_string())?,
            ),
            None => None,
        };

        Ok(CleanBook {
            title: title.to_string(),
            author_id,
            publication_year,
        })
    }
}

/// Context of the add/edit book page
#[derive(Debug, Serialize, ToSchema)]
pub struct BookFormPage {
    /// Book being edited; absent on the add page
    pub book: Option<Book>,
    pub authors: Vec<Author>,
    pub error: Option<String>,
}

/// Context of the delete confirmation page
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteBookPage {
    pub book: Book,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: Option<&str>, author: Option<&str>, year: Option<&str>) -> BookForm {
        BookForm {
            title: title.map(String::from),
            author: author.map(|a| FormValue::Text(a.to_string())),
            publication_year: year.map(|y| FormValue::Text(y.to_string())),
        }
    }

    #[test]
    fn clean_trims_and_parses() {
        let clean = form(Some("  Sample  "), Some("3"), Some("1999")).clean().unwrap();
        assert_eq!(
            clean,
            CleanBook {
                title: "Sample".to_string(),
                author_id: 3,
                publication_year: Some(1999),
            }
        );
    }

    #[test]
    fn numeric_author_and_year_are_accepted() {
        let form: BookForm =
            serde_json::from_str(r#"{"title": "Sample", "author": 3, "publication_year": 1999}"#).unwrap();
        let clean = form.clean().unwrap();
        assert_eq!(clean.author_id, 3);
        assert_eq!(clean.publication_year, Some(1999));

        let form: BookForm = serde_json::from_str(r#"{"title": "Sample", "author": "3", "publication_year": null}"#).unwrap();
        assert_eq!(form.clean().unwrap().publication_year, None);
    }

    #[test]
    fn missing_or_blank_title_is_rejected() {
        assert_eq!(form(None, Some("1"), None).clean().unwrap_err(), "Title is required");
        assert_eq!(form(Some("   "), Some("1"), None).clean().unwrap_err(), "Title is required");
    }

    #[test]
    fn missing_author_is_rejected() {
        assert_eq!(form(Some("Sample"), None, None).clean().unwrap_err(), "Author is required");
        assert_eq!(form(Some("Sample"), Some(""), None).clean().unwrap_err(), "Author is required");
    }

    #[test]
    fn malformed_author_reads_as_not_found() {
        assert_eq!(form(Some("Sample"), Some("abc"), None).clean().unwrap_err(), AUTHOR_NOT_FOUND);
    }

    #[test]
    fn publication_year_is_optional_but_numeric() {
        assert_eq!(form(Some("Sample"), Some("1"), Some("")).clean().unwrap().publication_year, None);
        assert!(form(Some("Sample"), Some("1"), Some("nineteen")).clean().is_err());
    }

    #[test]
    fn overlong_title_is_rejected() {
        let title = "x".repeat(TITLE_MAX_LEN + 1);
        assert!(form(Some(&title), Some("1"), None).clean().is_err());
    }
}

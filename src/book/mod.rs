use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};
use validator::{Validate, ValidationErrors};

mod document;

pub use document::BookDocument;

/// A stored book as it is sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "whole_number_as_integer"
    )]
    pub publisher_year: Option<f64>,
}

/// Writes `1965.0` as `1965` so integral years keep their JSON form.
fn whole_number_as_integer<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(number) if number.fract() == 0.0 && number.abs() < i64::MAX as f64 => {
            serializer.serialize_some(&(*number as i64))
        }
        Some(number) => serializer.serialize_some(number),
        None => serializer.serialize_none(),
    }
}

/// Fields accepted when creating a book.
///
/// The advertised schema has no required fields. Presence and bounds are only
/// checked under the strict validation policy, see [`Validate`].
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub publisher_year: Option<f64>,
}

/// Fields accepted when updating a book. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub publisher_year: Option<f64>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.publisher_year.is_none()
    }
}

#[derive(Validate)]
struct NewBookRules {
    #[validate(required, length(min = 1, max = 512))]
    title: Option<String>,
    #[validate(required, length(min = 1, max = 512))]
    author: Option<String>,
    #[validate(length(max = 8192))]
    description: Option<String>,
    #[validate(range(min = 0.0, max = 9999.0))]
    publisher_year: Option<f64>,
}

#[derive(Validate)]
struct BookPatchRules {
    #[validate(length(min = 1, max = 512))]
    title: Option<String>,
    #[validate(length(min = 1, max = 512))]
    author: Option<String>,
    #[validate(length(max = 8192))]
    description: Option<String>,
    #[validate(range(min = 0.0, max = 9999.0))]
    publisher_year: Option<f64>,
}

impl Validate for NewBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        NewBookRules {
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            publisher_year: self.publisher_year,
        }
        .validate()
    }
}

impl Validate for BookPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        BookPatchRules {
            title: self.title.clone(),
            author: self.author.clone(),
            description: self.description.clone(),
            publisher_year: self.publisher_year,
        }
        .validate()
    }
}

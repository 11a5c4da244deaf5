use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

use super::{Book, BookPatch, NewBook};

/// A book as it is persisted in the `books` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        rename = "publisherYear",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub publisher_year: Option<f64>,
}

impl BookDocument {
    pub fn new(id: ObjectId, new_book: NewBook) -> Self {
        BookDocument {
            id,
            title: new_book.title,
            author: new_book.author,
            description: new_book.description,
            publisher_year: new_book.publisher_year,
        }
    }

    /// Overwrites every field that is present in `patch`.
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = Some(title);
        }
        if let Some(author) = patch.author {
            self.author = Some(author);
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(publisher_year) = patch.publisher_year {
            self.publisher_year = Some(publisher_year);
        }
    }

    /// Builds the `$set` document for `patch`, using the persisted field names.
    pub fn set_document(patch: &BookPatch) -> Document {
        let mut set = Document::new();

        if let Some(title) = &patch.title {
            set.insert("title", title.as_str());
        }
        if let Some(author) = &patch.author {
            set.insert("author", author.as_str());
        }
        if let Some(description) = &patch.description {
            set.insert("description", description.as_str());
        }
        if let Some(publisher_year) = patch.publisher_year {
            set.insert("publisherYear", publisher_year);
        }

        set
    }
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Book {
            id: document.id.to_hex(),
            title: document.title,
            author: document.author,
            description: document.description,
            publisher_year: document.publisher_year,
        }
    }
}

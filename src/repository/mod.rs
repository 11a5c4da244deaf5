use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::{
    book::{Book, BookPatch, NewBook},
    config::StorageConfig,
};

mod memory;
mod mongo;

pub use memory::InMemoryBookRepository;
pub use mongo::MongoBookRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Book {id} not found")]
    NotFound { id: String },
    #[error("{0}")]
    Database(#[from] mongodb::error::Error),
    #[error("{0}")]
    Other(String),
}

/// Persistence operations over the `books` collection.
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Stores a new book and returns it with its assigned id.
    async fn insert(&self, new_book: NewBook) -> Result<Book, RepositoryError>;

    /// Returns every stored book in the store's default order.
    async fn list_all(&self) -> Result<Vec<Book>, RepositoryError>;

    async fn get_by_id(&self, id: &str) -> Result<Book, RepositoryError>;

    /// Applies the present fields of `patch` and returns the updated book.
    async fn update_by_id(&self, id: &str, patch: BookPatch) -> Result<Book, RepositoryError>;

    async fn delete_by_id(&self, id: &str) -> Result<(), RepositoryError>;

    /// Returns the books whose title contains `pattern`, ignoring case.
    ///
    /// `pattern` is literal text.
    async fn find_by_title_pattern(&self, pattern: &str) -> Result<Vec<Book>, RepositoryError>;
}

/// Connects the backend described by `config`.
pub async fn connect(config: &StorageConfig) -> Result<Box<dyn BookRepository>, RepositoryError> {
    match config {
        StorageConfig::Mongo(mongo) => {
            let repository = MongoBookRepository::connect(
                &mongo.uri,
                mongo.database.as_deref(),
                &mongo.collection,
            )
            .await?;

            Ok(Box::new(repository))
        }
        StorageConfig::Memory => {
            tracing::warn!("Using the in-memory backend, books are lost on shutdown");

            Ok(Box::new(InMemoryBookRepository::new()))
        }
    }
}

/// An id that is not a valid [`ObjectId`] can not name a stored book.
fn parse_id(id: &str) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id).map_err(|_| RepositoryError::NotFound { id: id.to_string() })
}

/// Case-insensitive regex matching `pattern` literally.
fn title_regex(pattern: &str) -> String {
    regex::escape(pattern)
}

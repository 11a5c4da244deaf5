use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use regex::RegexBuilder;
use tokio::sync::RwLock;

use super::{parse_id, title_regex, BookRepository, RepositoryError};
use crate::book::{Book, BookDocument, BookPatch, NewBook};

/// Keeps books in process memory, in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: RwLock<Vec<BookDocument>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn insert(&self, new_book: NewBook) -> Result<Book, RepositoryError> {
        let document = BookDocument::new(ObjectId::new(), new_book);

        self.books.write().await.push(document.clone());

        Ok(document.into())
    }

    async fn list_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let books = self.books.read().await;

        Ok(books.iter().cloned().map(Book::from).collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Book, RepositoryError> {
        let object_id = parse_id(id)?;
        let books = self.books.read().await;

        books
            .iter()
            .find(|document| document.id == object_id)
            .cloned()
            .map(Book::from)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    async fn update_by_id(&self, id: &str, patch: BookPatch) -> Result<Book, RepositoryError> {
        let object_id = parse_id(id)?;
        let mut books = self.books.write().await;

        let document = books
            .iter_mut()
            .find(|document| document.id == object_id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })?;

        document.apply(patch);

        Ok(document.clone().into())
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), RepositoryError> {
        let object_id = parse_id(id)?;
        let mut books = self.books.write().await;

        let position = books
            .iter()
            .position(|document| document.id == object_id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })?;

        books.remove(position);

        Ok(())
    }

    async fn find_by_title_pattern(&self, pattern: &str) -> Result<Vec<Book>, RepositoryError> {
        let regex = RegexBuilder::new(&title_regex(pattern))
            .case_insensitive(true)
            .build()
            .map_err(|err| RepositoryError::Other(err.to_string()))?;

        let books = self.books.read().await;

        Ok(books
            .iter()
            .filter(|document| {
                document
                    .title
                    .as_deref()
                    .is_some_and(|title| regex.is_match(title))
            })
            .cloned()
            .map(Book::from)
            .collect())
    }
}

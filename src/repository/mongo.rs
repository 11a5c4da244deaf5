use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId},
    options::{FindOneAndUpdateOptions, ReturnDocument},
    Client, Collection,
};

use super::{parse_id, title_regex, BookRepository, RepositoryError};
use crate::book::{Book, BookDocument, BookPatch, NewBook};

const FALLBACK_DATABASE: &str = "test";

pub struct MongoBookRepository {
    collection: Collection<BookDocument>,
}

impl MongoBookRepository {
    /// Connects to the server behind `uri` and pings it once.
    ///
    /// Uses `database` if given, otherwise the database named in `uri`.
    #[tracing::instrument(name = "mongo_connect", skip_all, fields(%collection))]
    pub async fn connect(
        uri: &str,
        database: Option<&str>,
        collection: &str,
    ) -> Result<Self, RepositoryError> {
        let client = Client::with_uri_str(uri).await?;

        let database = match database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(FALLBACK_DATABASE)),
        };

        database.run_command(doc! { "ping": 1 }, None).await?;

        tracing::info!(database = %database.name(), "Successfully connected to MongoDB");

        Ok(Self {
            collection: database.collection(collection),
        })
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    #[tracing::instrument(skip_all)]
    async fn insert(&self, new_book: NewBook) -> Result<Book, RepositoryError> {
        let document = BookDocument::new(ObjectId::new(), new_book);

        self.collection.insert_one(&document, None).await?;

        Ok(document.into())
    }

    #[tracing::instrument(skip_all)]
    async fn list_all(&self) -> Result<Vec<Book>, RepositoryError> {
        let documents: Vec<BookDocument> = self.collection.find(None, None).await?.try_collect().await?;

        Ok(documents.into_iter().map(Book::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> Result<Book, RepositoryError> {
        let object_id = parse_id(id)?;

        self.collection
            .find_one(doc! { "_id": object_id }, None)
            .await?
            .map(Book::from)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    #[tracing::instrument(skip(self))]
    async fn update_by_id(&self, id: &str, patch: BookPatch) -> Result<Book, RepositoryError> {
        if patch.is_empty() {
            return self.get_by_id(id).await;
        }

        let object_id = parse_id(id)?;
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(
                doc! { "_id": object_id },
                doc! { "$set": BookDocument::set_document(&patch) },
                options,
            )
            .await?
            .map(Book::from)
            .ok_or_else(|| RepositoryError::NotFound { id: id.to_string() })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> Result<(), RepositoryError> {
        let object_id = parse_id(id)?;

        let result = self
            .collection
            .delete_one(doc! { "_id": object_id }, None)
            .await?;

        match result.deleted_count {
            0 => Err(RepositoryError::NotFound { id: id.to_string() }),
            _ => Ok(()),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_title_pattern(&self, pattern: &str) -> Result<Vec<Book>, RepositoryError> {
        let filter = doc! {
            "title": { "$regex": title_regex(pattern), "$options": "i" }
        };

        let documents: Vec<BookDocument> = self.collection.find(filter, None).await?.try_collect().await?;

        Ok(documents.into_iter().map(Book::from).collect())
    }
}

use schemars::JsonSchema;
use serde::Deserialize;

pub mod app;
pub mod create_book;
pub mod delete_book;
pub mod get_book;
pub mod list_books;
pub mod update_book;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct BookIdPath {
    pub id: String,
}

pub mod app;
pub mod search_books;

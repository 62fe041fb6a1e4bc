pub mod books;
pub mod catalog;

pub mod substring;

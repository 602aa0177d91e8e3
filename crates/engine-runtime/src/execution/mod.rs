pub mod engine;
pub mod reporter;

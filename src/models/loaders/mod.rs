pub mod queries_loader;

pub use queries_loader::load_queries;

pub mod loaders;
pub mod query;
pub mod record;

pub use loaders::load_queries;
pub use query::{default_queries, QuerySpec};
pub use record::{BusinessRecord, CandidateCard};

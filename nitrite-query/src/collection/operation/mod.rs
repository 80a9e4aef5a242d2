mod collection_operations;
mod find_optimizer;
mod index_operations;
mod read_operations;
mod write_operations;
mod write_result;

pub(crate) use collection_operations::*;
pub use write_result::*;

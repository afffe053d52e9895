// Library interface for tablegrep
// Exposes the filter-to-query compiler and row evaluator for embedding
// and for the CLI binary

pub mod filter;
pub mod schema;
pub mod source;
pub mod sql;

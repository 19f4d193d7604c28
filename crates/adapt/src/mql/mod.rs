pub mod ast;
pub mod cache;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod projection;
pub mod properties;
pub mod query;
pub mod store;

pub use ast::{Comparison, Filter, Literal, Operator};
pub use cache::FilterCache;
pub use error::{QueryError, SyntaxError};
pub use eval::{eval_filter, eval_filter_with, Comparator, StrictComparator};
pub use parser::parse_filter;
pub use projection::{project, Document, Projection};
pub use properties::{collect_properties, AttributeInfo, DataType, Properties};
pub use query::{execute_query, QueryExecutor, QueryRequest, QueryResponse};
pub use store::{load_json_file, InMemoryRecordStore, RecordId, RecordStore, StoreError};

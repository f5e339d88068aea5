mod canonical;
mod extract;
mod group;
mod pipeline;
mod resolve;
mod static_source;

pub use canonical::{interface_signature, signature_string, type_string};
pub use extract::{extract_declarations, extract_scope};
pub use group::group_table;
pub use pipeline::generate_tables;
pub use resolve::PriorityResolver;
pub use static_source::StaticSource;

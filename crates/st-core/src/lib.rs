pub mod error;
pub mod scope;
pub mod source;
pub mod table;
pub mod types;

pub use error::SigTableError;
pub use scope::*;
pub use source::*;
pub use table::*;
pub use types::*;

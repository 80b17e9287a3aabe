pub mod error;
pub mod submission;
pub mod types;
pub mod value;

pub use error::DndError;
pub use submission::*;
pub use types::*;
pub use value::*;

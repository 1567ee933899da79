pub mod path;
pub mod pathkey;

pub use path::{CollectionPath, ROOT_SEGMENT};
pub use pathkey::PathKey;

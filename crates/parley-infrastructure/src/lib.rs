pub mod paths;
pub mod storage;

pub use paths::ParleyPaths;
pub use storage::{ConfigStorage, TokenStorage};

pub mod analysis;
pub mod config;
pub mod errors;
pub mod files;

pub use analysis::*;
pub use config::*;
pub use errors::*;
pub use files::*;

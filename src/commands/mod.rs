//! CLI commands implementation

pub mod collect;
pub mod compare;
pub mod dashboard;
pub mod init;
pub mod status;

pub use collect::*;
pub use compare::*;
pub use dashboard::*;
pub use init::*;
pub use status::*;

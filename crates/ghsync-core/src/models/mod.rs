pub mod dest;
pub mod import;
pub mod mirror;
pub mod service;
pub mod source;
pub mod sync_state;

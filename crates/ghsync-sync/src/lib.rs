pub mod driver;
pub mod poll;

pub use driver::{SyncDriver, SyncOptions};
pub use poll::{wait_for_import, PollSettings};

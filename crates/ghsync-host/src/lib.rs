pub mod github;
pub mod gitlab;
pub mod memory;
pub mod pagination;
pub mod transport;

pub use github::GitHubClient;
pub use gitlab::GitLabClient;
pub use memory::MemoryTransport;
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};

pub mod cli;
pub mod config;
pub mod node;
pub mod scheduler;
pub mod service;
pub mod service_handle;

pub use cli::run_cli;
pub use config::AuthorityConfig;
pub use node::Node;
pub use scheduler::SealScheduler;
pub use service::AuthorityService;
pub use service_handle::ServiceHandle;

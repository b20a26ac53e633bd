pub mod audit_log;
pub mod page_fetcher;
pub mod tor_transport;

pub use audit_log::*;
pub use page_fetcher::*;
pub use tor_transport::*;

pub mod dashboard;
mod dto;
pub mod memory;
pub mod rest;

pub use dashboard::load_dashboard;
pub use memory::InMemorySource;
pub use rest::RestClient;

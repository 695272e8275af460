//! Host platform capability surface.

pub mod memory;
pub mod traits;

pub use memory::InMemoryHost;
pub use traits::{EditRequest, EmployeePass, Host, ItemRequest, Judgment};

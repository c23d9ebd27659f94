pub mod memory;
pub mod mongo;
pub mod repositories;

pub use memory::*;
pub use mongo::*;
pub use repositories::*;

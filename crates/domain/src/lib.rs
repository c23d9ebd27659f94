pub mod errors;
pub mod log;

pub use errors::*;
pub use log::*;

pub mod handler_failed;

pub use handler_failed::*;

pub mod attachment_handlers;

pub use attachment_handlers::*;

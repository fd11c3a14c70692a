//! Request and response types for the HTTP shell

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

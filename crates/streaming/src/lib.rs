pub mod error;
pub mod protocol;
pub mod worker;

pub use error::*;
pub use protocol::*;
pub use worker::*;

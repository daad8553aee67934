pub mod budget;
pub mod frame;
pub mod work_queue;

pub use budget::*;
pub use frame::*;
pub use work_queue::*;

pub mod buffer;
pub mod session;
pub mod pipeline;

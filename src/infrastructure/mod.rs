pub mod memory;
pub mod shutdown;

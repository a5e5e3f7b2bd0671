pub mod email;
pub mod memory;
pub mod mock;
pub mod postgres;

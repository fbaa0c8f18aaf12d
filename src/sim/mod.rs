pub mod connections;
pub mod cursor;
pub mod engine;
pub mod event;
pub mod log;
pub mod round;
pub mod session;

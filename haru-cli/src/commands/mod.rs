pub mod ask;
pub mod chat;
pub mod list;
pub mod memory;
pub mod remove;

pub mod common;
pub mod path;
pub mod resolve;
pub mod view;

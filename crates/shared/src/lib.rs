//! Quiz domain types and the JSON documents exchanged with the quiz API.

pub mod domain;
pub mod error;
pub mod protocol;

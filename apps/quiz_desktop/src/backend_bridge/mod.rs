//! Bridge between the egui thread and the worker that talks to the quiz API.

pub mod commands;
pub mod runtime;

//! UI layer for the quiz desktop: app shell and pages.

pub mod app;

pub use app::QuizDeskApp;

// Feed module - Typed match/question models and the reconciled live view
pub mod board;
pub mod models;

pub use board::LiveBoard;
pub use models::{Match, Question};

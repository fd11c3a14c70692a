//! Question answering over session indexes with a direct-context fallback

mod engine;

pub use engine::{AnswerMode, QueryAnswer, QueryEngine};

pub mod engine;
pub mod validation;

pub use engine::{score, NeutralPolicy};
pub use validation::{validate_answers, ValidationError};

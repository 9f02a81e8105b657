pub mod extract;
pub mod validation;
pub mod wire;

pub use extract::ApiJson;
pub use validation::{FieldErrors, Validate};

// Public handlers: no authentication, no role gate.
pub mod health;

// Request handlers, split by security tier:
// public (no token) and protected (bearer token + role gate).
pub mod protected;
pub mod public;

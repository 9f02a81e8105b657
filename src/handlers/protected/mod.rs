// Protected handlers: every route here sits behind `jwt_auth_middleware`
// and has an entry in the role gate's route table.
pub mod audit;
pub mod entities;
pub mod export;
pub mod reports;
pub mod upload;
pub mod users;

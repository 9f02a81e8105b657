pub mod assignment;
pub mod audit_log;
pub mod client;
pub mod invoice;
pub mod profile;
pub mod proposal;
pub mod receipt;

pub use assignment::{Assignment, AssignmentCreate, AssignmentUpdate};
pub use audit_log::AuditLogEntry;
pub use client::{Client, ClientCreate, ClientUpdate};
pub use invoice::{Invoice, InvoiceCreate, InvoiceUpdate};
pub use profile::{Profile, RoleUpdate};
pub use proposal::{Proposal, ProposalCreate, ProposalUpdate};
pub use receipt::{Receipt, ReceiptCreate};

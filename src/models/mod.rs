mod audit_event;
mod membership;
mod project;

pub use audit_event::AuditEvent;
pub use membership::{ProjectMembership, ROLE_OWNER};
pub use project::{NewProject, Project};

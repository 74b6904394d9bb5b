//! ResourceService: generic CRUD using the safe SQL builder.

mod crud;
pub use crud::{ListParams, ResourceService, DEFAULT_LIMIT, MAX_LIMIT};

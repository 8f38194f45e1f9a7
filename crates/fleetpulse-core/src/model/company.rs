use serde::{Deserialize, Serialize};

use super::ids::CompanyId;

/// A company that owns devices. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

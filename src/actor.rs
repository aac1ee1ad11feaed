//! Actor identity and the two role vocabularies
use crate::error::{EngineError, EngineResult};

/// The four operational roles the permission table is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Approver,
    Affiliate,
    Viewer,
}

/// The coarser vocabulary used by the role-management surface. Maps
/// many-to-one onto [`Role`]; it is an alias table only and no permission
/// is ever keyed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagementRole {
    Admin,
    Cfo,
    Affiliate,
    Finance,
}

impl ManagementRole {
    pub fn operational(&self) -> Role {
        match self {
            Self::Admin => Role::Admin,
            Self::Cfo => Role::Approver,
            Self::Affiliate => Role::Affiliate,
            Self::Finance => Role::Viewer,
        }
    }
}

/// The authenticated identity performing an operation. The engine is
/// agnostic to how actors authenticate; it only requires a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    pub owned_affiliate_id: Option<String>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            owned_affiliate_id: None,
        }
    }

    pub fn affiliate(id: impl Into<String>, owned_affiliate_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Affiliate,
            owned_affiliate_id: Some(owned_affiliate_id.into()),
        }
    }

    /// An affiliate-role actor without an owning affiliate is a
    /// data-integrity fault. Callers resolving actors from an external
    /// identity source should reject them here; the visibility filter still
    /// fails closed if one slips through.
    pub fn validate(&self) -> EngineResult<()> {
        if self.role == Role::Affiliate && self.owned_affiliate_id.is_none() {
            return Err(EngineError::Validation(
                "affiliate actor is missing an owning affiliate id".into(),
            ));
        }
        Ok(())
    }
}

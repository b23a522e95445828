//! Viewer identity - the deduplication key for view counting

mod resolver;

pub use resolver::{resolve_identity, RequestSignals, MAX_SESSION_ID_LEN};

use serde::Serialize;

/// Which signal produced the viewer identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Session,
    Ip,
}

impl IdentityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Session => "session",
            Self::Ip => "ip",
        }
    }
}

impl std::fmt::Display for IdentityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IdentityKind {
    type Err = crate::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "session" => Ok(Self::Session),
            "ip" => Ok(Self::Ip),
            other => Err(crate::DomainError::ValidationError(format!(
                "unknown identity kind: {other}"
            ))),
        }
    }
}

/// A resolved viewer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewerIdentity {
    pub kind: IdentityKind,
    pub key: String,
}

impl ViewerIdentity {
    pub fn new(kind: IdentityKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// Kind-qualified key stored in the view ledger, e.g. `session:abc`
    pub fn storage_key(&self) -> String {
        format!("{}:{}", self.kind, self.key)
    }
}

impl std::fmt::Display for ViewerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_is_kind_qualified() {
        let user = ViewerIdentity::new(IdentityKind::User, "42");
        let session = ViewerIdentity::new(IdentityKind::Session, "42");
        assert_eq!(user.storage_key(), "user:42");
        assert_eq!(session.storage_key(), "session:42");
        assert_ne!(user.storage_key(), session.storage_key());
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("ip".parse::<IdentityKind>().unwrap(), IdentityKind::Ip);
        assert!("device".parse::<IdentityKind>().is_err());
    }
}

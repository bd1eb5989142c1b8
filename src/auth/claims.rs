use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tokens come in two kinds from the issuing service; only `Access` opens
/// the protected user routes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[serde(alias = "Access")]
    Access,
    #[serde(alias = "Refresh")]
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Caller id, only logged by the gate.
    pub sub: Uuid,
    pub iat: usize,
    /// Checked by `jsonwebtoken` with its default leeway.
    pub exp: usize,
    pub iss: String,
    pub aud: String,
    pub kind: TokenKind,
}

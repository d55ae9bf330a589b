use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Payload of both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// Role at issuance time. Authorization re-reads the role from the store.
    pub role: String,
    pub kind: TokenKind,
    /// Expiration (Unix seconds)
    pub exp: i64,
    /// Issued-at (Unix seconds)
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_serialize_kind_lowercase() {
        let claims = Claims {
            sub: Uuid::nil().to_string(),
            role: "student".to_string(),
            kind: TokenKind::Refresh,
            exp: 1_700_086_400,
            iat: 1_700_000_000,
        };
        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""kind":"refresh""#));
        assert!(serialized.contains(r#""role":"student""#));
    }

    #[test]
    fn test_user_id_parses_subject() {
        let id = Uuid::new_v4();
        let claims = Claims {
            sub: id.to_string(),
            role: "admin".to_string(),
            kind: TokenKind::Access,
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), Some(id));
    }

    #[test]
    fn test_user_id_rejects_garbage_subject() {
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            role: "admin".to_string(),
            kind: TokenKind::Access,
            exp: 0,
            iat: 0,
        };
        assert_eq!(claims.user_id(), None);
    }
}

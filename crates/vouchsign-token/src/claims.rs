//! Redemption claims carried by a voucher token.

use crate::error::TokenError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a token authorizes, discriminated by `typ`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "typ", rename_all = "lowercase")]
pub enum RedemptionClaims {
    /// Redemption by one specific end user.
    User {
        /// Voucher ID.
        vid: String,
        /// User ID.
        uid: String,
    },

    /// Anonymous redemption from a print run.
    Print {
        /// Voucher ID.
        vid: String,
        /// Print batch code.
        btc: String,
        /// Redemption limit for the batch.
        lmt: u32,
    },
}

/// The `typ` discriminator on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimKind {
    User,
    Print,
}

impl fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimKind::User => f.write_str("user"),
            ClaimKind::Print => f.write_str("print"),
        }
    }
}

impl RedemptionClaims {
    /// Claims for a voucher claimed by a user.
    pub fn user(vid: impl Into<String>, uid: impl Into<String>) -> Self {
        RedemptionClaims::User {
            vid: vid.into(),
            uid: uid.into(),
        }
    }

    /// Claims for a voucher printed in a batch.
    pub fn print(vid: impl Into<String>, btc: impl Into<String>, lmt: u32) -> Self {
        RedemptionClaims::Print {
            vid: vid.into(),
            btc: btc.into(),
            lmt,
        }
    }

    /// Parse claims from loosely typed JSON, enforcing the `typ` shape.
    pub fn from_json(value: serde_json::Value) -> Result<Self, TokenError> {
        let raw: UnvalidatedClaims = serde_json::from_value(value)
            .map_err(|e| TokenError::ClaimsValidation(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn kind(&self) -> ClaimKind {
        match self {
            RedemptionClaims::User { .. } => ClaimKind::User,
            RedemptionClaims::Print { .. } => ClaimKind::Print,
        }
    }

    pub fn vid(&self) -> &str {
        match self {
            RedemptionClaims::User { vid, .. } | RedemptionClaims::Print { vid, .. } => vid,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            RedemptionClaims::User { uid, .. } => Some(uid),
            RedemptionClaims::Print { .. } => None,
        }
    }

    pub fn batch(&self) -> Option<&str> {
        match self {
            RedemptionClaims::Print { btc, .. } => Some(btc),
            RedemptionClaims::User { .. } => None,
        }
    }

    pub fn limit(&self) -> Option<u32> {
        match self {
            RedemptionClaims::Print { lmt, .. } => Some(*lmt),
            RedemptionClaims::User { .. } => None,
        }
    }

    /// Check field contents before signing.
    pub fn validate(&self) -> Result<(), TokenError> {
        require_non_empty("vid", self.vid())?;
        match self {
            RedemptionClaims::User { uid, .. } => require_non_empty("uid", uid),
            RedemptionClaims::Print { btc, lmt, .. } => {
                require_non_empty("btc", btc)?;
                if *lmt == 0 {
                    return Err(TokenError::ClaimsValidation(
                        "print claims need lmt of at least 1".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<(), TokenError> {
    if value.trim().is_empty() {
        return Err(TokenError::ClaimsValidation(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}

/// Claims as received from outside the type system (request bodies, CLI flags).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnvalidatedClaims {
    pub vid: String,
    pub typ: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub btc: Option<String>,
    #[serde(default)]
    pub lmt: Option<u32>,
}

impl TryFrom<UnvalidatedClaims> for RedemptionClaims {
    type Error = TokenError;

    fn try_from(raw: UnvalidatedClaims) -> Result<Self, Self::Error> {
        let claims = match raw.typ.as_str() {
            "user" => {
                if raw.btc.is_some() || raw.lmt.is_some() {
                    return Err(TokenError::ClaimsValidation(
                        "user claims must not carry btc or lmt".to_string(),
                    ));
                }
                let uid = raw.uid.ok_or_else(|| {
                    TokenError::ClaimsValidation("user claims require uid".to_string())
                })?;
                RedemptionClaims::User { vid: raw.vid, uid }
            }
            "print" => {
                if raw.uid.is_some() {
                    return Err(TokenError::ClaimsValidation(
                        "print claims must not carry uid".to_string(),
                    ));
                }
                let btc = raw.btc.ok_or_else(|| {
                    TokenError::ClaimsValidation("print claims require btc".to_string())
                })?;
                let lmt = raw.lmt.ok_or_else(|| {
                    TokenError::ClaimsValidation("print claims require lmt".to_string())
                })?;
                RedemptionClaims::Print {
                    vid: raw.vid,
                    btc,
                    lmt,
                }
            }
            other => {
                return Err(TokenError::ClaimsValidation(format!(
                    "unknown typ '{}', expected 'user' or 'print'",
                    other
                )));
            }
        };

        claims.validate()?;
        Ok(claims)
    }
}

/// Signed token body: the redemption claims plus registered claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    #[serde(flatten)]
    pub claims: RedemptionClaims,

    /// Issuer.
    pub iss: String,

    /// Audience.
    pub aud: String,

    /// Issued at, seconds since the Unix epoch.
    pub iat: i64,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl TokenPayload {
    pub fn vid(&self) -> &str {
        self.claims.vid()
    }

    pub fn uid(&self) -> Option<&str> {
        self.claims.uid()
    }

    pub fn btc(&self) -> Option<&str> {
        self.claims.batch()
    }

    pub fn lmt(&self) -> Option<u32> {
        self.claims.limit()
    }

    pub fn typ(&self) -> ClaimKind {
        self.claims.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let user = serde_json::to_value(RedemptionClaims::user("voucher-001", "user-123")).unwrap();
        assert_eq!(
            user,
            json!({"typ": "user", "vid": "voucher-001", "uid": "user-123"})
        );

        let print =
            serde_json::to_value(RedemptionClaims::print("voucher-print-001", "BATCH2024Q1", 100))
                .unwrap();
        assert_eq!(
            print,
            json!({"typ": "print", "vid": "voucher-print-001", "btc": "BATCH2024Q1", "lmt": 100})
        );
    }

    #[test]
    fn test_user_without_uid_rejected() {
        let err = RedemptionClaims::from_json(json!({"vid": "v1", "typ": "user"})).unwrap_err();
        assert!(matches!(err, TokenError::ClaimsValidation(_)));
    }

    #[test]
    fn test_print_without_btc_or_lmt_rejected() {
        let no_btc = RedemptionClaims::from_json(json!({"vid": "v1", "typ": "print", "lmt": 5}));
        assert!(matches!(no_btc, Err(TokenError::ClaimsValidation(_))));

        let no_lmt =
            RedemptionClaims::from_json(json!({"vid": "v1", "typ": "print", "btc": "B1"}));
        assert!(matches!(no_lmt, Err(TokenError::ClaimsValidation(_))));
    }

    #[test]
    fn test_mixed_shape_rejected() {
        let raw = UnvalidatedClaims {
            vid: "v1".into(),
            typ: "print".into(),
            uid: Some("u1".into()),
            btc: Some("B1".into()),
            lmt: Some(3),
        };
        assert!(RedemptionClaims::try_from(raw).is_err());
    }

    #[test]
    fn test_unknown_typ_rejected() {
        let err = RedemptionClaims::from_json(json!({"vid": "v1", "typ": "gift"})).unwrap_err();
        assert!(err.to_string().contains("gift"));
    }

    #[test]
    fn test_validate_contents() {
        assert!(RedemptionClaims::user("", "u1").validate().is_err());
        assert!(RedemptionClaims::user("v1", "  ").validate().is_err());
        assert!(RedemptionClaims::print("v1", "B1", 0).validate().is_err());
        assert!(RedemptionClaims::print("v1", "B1", 1).validate().is_ok());
    }

    #[test]
    fn test_accessors() {
        let claims = RedemptionClaims::print("v1", "B1", 7);
        assert_eq!(claims.kind(), ClaimKind::Print);
        assert_eq!(claims.vid(), "v1");
        assert_eq!(claims.uid(), None);
        assert_eq!(claims.batch(), Some("B1"));
        assert_eq!(claims.limit(), Some(7));
    }

    #[test]
    fn test_payload_flattens_claims() {
        let payload = TokenPayload {
            claims: RedemptionClaims::print("v1", "B1", 100),
            iss: "issuer".into(),
            aud: "scanners".into(),
            iat: 1_700_000_000,
            exp: 1_702_592_000,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["typ"], "print");
        assert_eq!(value["lmt"], 100);
        assert_eq!(value["exp"], 1_702_592_000i64);

        let back: TokenPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.btc(), Some("B1"));
        assert_eq!(back.uid(), None);
    }
}

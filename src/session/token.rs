use crate::error::{Result, SyncError};
use crate::models::{Credential, TokenPair, User};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
struct AccessClaims {
    #[serde(alias = "id")]
    user_id: u64,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    exp: i64,
}

/// Build a credential from a freshly issued pair by reading the access token's claims.
///
/// The signature is not checked; the server is the only party that validates tokens.
pub fn decode_credential(pair: TokenPair) -> Result<Credential> {
    let claims = decode_claims(&pair.access)?;
    let expiry = DateTime::<Utc>::from_timestamp(claims.exp, 0)
        .ok_or_else(|| SyncError::Auth(format!("access token has invalid exp {}", claims.exp)))?;

    Ok(Credential {
        access_token: pair.access,
        refresh_token: pair.refresh,
        expiry,
        user: User {
            id: claims.user_id,
            username: claims.username.unwrap_or_default(),
            email: claims.email.filter(|e| !e.is_empty()),
        },
    })
}

fn decode_claims(token: &str) -> Result<AccessClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| SyncError::Auth("access token is not a JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| SyncError::Auth(format!("access token payload is not base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| SyncError::Auth(format!("access token claims are malformed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token_with(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn test_decode_credential_reads_user_claims() {
        let access = token_with(json!({
            "user_id": 7,
            "username": "ada",
            "email": "ada@example.com",
            "exp": 1_900_000_000
        }));
        let credential = decode_credential(TokenPair {
            access: access.clone(),
            refresh: "r1".to_string(),
        })
        .unwrap();

        assert_eq!(credential.user.id, 7);
        assert_eq!(credential.user.username, "ada");
        assert_eq!(credential.user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(credential.expiry.timestamp(), 1_900_000_000);
        assert_eq!(credential.access_token, access);
        assert_eq!(credential.refresh_token, "r1");
    }

    #[test]
    fn test_decode_credential_treats_empty_email_as_missing() {
        let access = token_with(json!({"user_id": 1, "username": "bo", "email": "", "exp": 10}));
        let credential = decode_credential(TokenPair {
            access,
            refresh: "r".to_string(),
        })
        .unwrap();
        assert_eq!(credential.user.email, None);
    }

    #[test]
    fn test_decode_credential_rejects_opaque_token() {
        let result = decode_credential(TokenPair {
            access: "not-a-jwt".to_string(),
            refresh: "r".to_string(),
        });
        assert!(matches!(result, Err(SyncError::Auth(_))));
    }

    #[test]
    fn test_decode_credential_rejects_missing_exp() {
        let access = token_with(json!({"user_id": 1}));
        let result = decode_credential(TokenPair {
            access,
            refresh: "r".to_string(),
        });
        assert!(result.is_err());
    }
}

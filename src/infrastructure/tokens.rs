use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::id::RecordId;
use crate::domain::personnel::{Credential, TokenScope};
use crate::domain::ports::CredentialIssuer;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    scope: String,
    #[serde(rename = "tokenVersion")]
    token_version: i32,
    iat: u64,
    exp: u64,
}

/// HS256 bearer tokens bound to a subject, its account scope and a token
/// epoch.
pub struct JwtCredentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtCredentials {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }
}

impl CredentialIssuer for JwtCredentials {
    fn issue(
        &self,
        scope: TokenScope,
        subject: &RecordId,
        token_version: i32,
    ) -> Result<String, DomainError> {
        let now = Utc::now().timestamp().max(0) as u64;
        let claims = Claims {
            sub: subject.to_string(),
            scope: scope.as_str().to_string(),
            token_version,
            iat: now,
            exp: now + self.ttl.as_secs(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::Internal(format!("token encoding failed: {}", e)))
    }

    fn verify(&self, token: &str) -> Result<Credential, DomainError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            log::warn!("Rejected bearer token: {}", e);
            DomainError::Unauthorized("Not authorized, token failed".to_string())
        })?;

        let failed = || DomainError::Unauthorized("Not authorized, token failed".to_string());
        let subject = data.claims.sub.parse().map_err(|_| failed())?;
        let scope = data.claims.scope.parse().map_err(|_| failed())?;
        Ok(Credential {
            scope,
            subject,
            token_version: data.claims.token_version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let tokens = JwtCredentials::new(SECRET, Duration::from_secs(600));
        let id = RecordId::generate();

        let token = tokens.issue(TokenScope::Personnel, &id, 3).unwrap();
        let credential = tokens.verify(&token).unwrap();

        assert_eq!(credential.scope, TokenScope::Personnel);
        assert_eq!(credential.subject, id);
        assert_eq!(credential.token_version, 3);
    }

    #[test]
    fn token_signed_with_other_secret_is_unauthorized() {
        let issuer = JwtCredentials::new(b"someone-else", Duration::from_secs(600));
        let verifier = JwtCredentials::new(SECRET, Duration::from_secs(600));
        let token = issuer.issue(TokenScope::User, &RecordId::generate(), 1).unwrap();

        assert!(matches!(verifier.verify(&token), Err(DomainError::Unauthorized(_))));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let tokens = JwtCredentials::new(SECRET, Duration::from_secs(600));
        let now = Utc::now().timestamp() as u64;
        let stale = encode(
            &Header::new(Algorithm::HS256),
            &Claims {
                sub: RecordId::generate().to_string(),
                scope: "personnel".into(),
                token_version: 1,
                iat: now - 7200,
                exp: now - 3600,
            },
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(matches!(tokens.verify(&stale), Err(DomainError::Unauthorized(_))));
    }

    #[test]
    fn garbage_is_unauthorized() {
        let tokens = JwtCredentials::new(SECRET, Duration::from_secs(600));
        assert!(matches!(tokens.verify("not.a.jwt"), Err(DomainError::Unauthorized(_))));
    }

    #[test]
    fn user_scope_survives_the_roundtrip() {
        let tokens = JwtCredentials::new(SECRET, Duration::from_secs(600));
        let id = RecordId::generate();

        let credential = tokens
            .verify(&tokens.issue(TokenScope::User, &id, 0).unwrap())
            .unwrap();

        assert_eq!(credential.scope, TokenScope::User);
        assert_eq!(credential.subject, id);
    }
}

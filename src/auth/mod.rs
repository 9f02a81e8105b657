use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Signing algorithm shared with the identity provider
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Portal roles, highest privilege first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Partner,
    Director,
    Manager,
}

impl Role {
    pub const ALL: &'static [Role] = &[Role::Partner, Role::Director, Role::Manager];

    /// Applied when a token carries no role claim
    pub const LOWEST: Role = Role::Manager;

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Partner => "PARTNER",
            Role::Director => "DIRECTOR",
            Role::Manager => "MANAGER",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PARTNER" => Ok(Role::Partner),
            "DIRECTOR" => Ok(Role::Director),
            "MANAGER" => Ok(Role::Manager),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Token claims. Everything is optional at the serde level so that a missing
/// subject surfaces as `AuthError::MissingSubject` rather than a decode error.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    pub fn new(subject: impl Into<String>, role: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: Some(subject.into()),
            role,
            exp: Some(exp),
            iat: Some(now.timestamp()),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Token signing secret is not configured")]
    InvalidSecret,

    #[error("Could not validate credentials: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid authentication credentials")]
    MissingSubject,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
}

/// Caller identity extracted from a verified token.
///
/// `role` keeps the literal claim value: identity providers may put values
/// like `authenticated` there, which pass "any role" routes but no role list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub role: String,
}

impl AuthUser {
    pub fn known_role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

fn validation() -> Validation {
    let mut validation = Validation::new(ALGORITHM);
    validation.validate_aud = false;
    // `exp` is still checked when present
    validation.set_required_spec_claims::<&str>(&[]);
    validation
}

/// Verify a bearer token and extract the caller. Pure function of token and secret.
pub fn validate_token(token: &str, secret: &str) -> Result<AuthUser, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<Claims>(token, &decoding_key, &validation())?;
    let claims = token_data.claims;

    let id = claims
        .sub
        .filter(|s| !s.trim().is_empty())
        .ok_or(AuthError::MissingSubject)?;
    let role = claims.role.unwrap_or_else(|| Role::LOWEST.as_str().to_string());

    Ok(AuthUser { id, role })
}

/// Mint a token the validator accepts. Used by local tooling and tests;
/// production tokens come from the identity provider.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::new(ALGORITHM), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    fn token_for(sub: Option<&str>, role: Option<&str>) -> String {
        let claims = Claims {
            sub: sub.map(String::from),
            role: role.map(String::from),
            exp: Some((Utc::now() + Duration::hours(1)).timestamp()),
            iat: None,
        };
        issue_token(&claims, SECRET).unwrap()
    }

    #[test]
    fn valid_token_yields_subject_and_role() {
        let user = validate_token(&token_for(Some("user-1"), Some("PARTNER")), SECRET).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.known_role(), Some(Role::Partner));
    }

    #[test]
    fn missing_role_defaults_to_manager() {
        let user = validate_token(&token_for(Some("user-2"), None), SECRET).unwrap();
        assert_eq!(user.role, "MANAGER");
    }

    #[test]
    fn missing_or_blank_subject_is_rejected() {
        assert!(matches!(
            validate_token(&token_for(None, Some("PARTNER")), SECRET),
            Err(AuthError::MissingSubject)
        ));
        assert!(matches!(
            validate_token(&token_for(Some("  "), Some("PARTNER")), SECRET),
            Err(AuthError::MissingSubject)
        ));
    }

    #[test]
    fn altered_signature_is_rejected() {
        let token = token_for(Some("user-3"), Some("DIRECTOR"));
        let (head, sig) = token.rsplit_once('.').unwrap();
        let first = if sig.starts_with('A') { 'B' } else { 'A' };
        let tampered = format!("{}.{}{}", head, first, &sig[1..]);
        assert!(matches!(validate_token(&tampered, SECRET), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn wrong_secret_and_garbage_are_rejected() {
        let token = token_for(Some("user-4"), None);
        assert!(validate_token(&token, "another-secret").is_err());
        assert!(validate_token("not-a-jwt", SECRET).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: Some("user-5".into()),
            role: None,
            exp: Some((Utc::now() - Duration::hours(2)).timestamp()),
            iat: None,
        };
        let token = issue_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }

    #[test]
    fn token_without_expiry_is_accepted() {
        let claims = Claims { sub: Some("user-6".into()), role: None, exp: None, iat: None };
        let token = issue_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, SECRET).is_ok());
    }

    #[test]
    fn audience_claim_is_ignored() {
        #[derive(Serialize)]
        struct WithAud<'a> { sub: &'a str, aud: &'a str }
        let token = encode(
            &Header::new(ALGORITHM),
            &WithAud { sub: "user-7", aud: "authenticated" },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert_eq!(validate_token(&token, SECRET).unwrap().id, "user-7");
    }

    #[test]
    fn role_parsing() {
        assert_eq!("DIRECTOR".parse::<Role>(), Ok(Role::Director));
        assert!("director".parse::<Role>().is_err());
        assert!("ADMIN".parse::<Role>().is_err());
    }
}

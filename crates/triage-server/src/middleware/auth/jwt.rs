//! JWT encoding and decoding utilities.

use super::types::Claims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

/// Encode claims into a JWT token.
pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a JWT token.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_common_core::UserId;
    use triage_policy::{Principal, Role};

    const SECRET: &str = "test_secret_key_32_chars_long!!!";

    #[test]
    fn test_encode_decode_roundtrip() {
        let principal = Principal::new(UserId::new(), "doc.mora", Role::Admin);
        let claims = Claims::for_principal(&principal, 3600);

        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.username, claims.username);
        assert_eq!(decoded.role, "admin");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let principal = Principal::new(UserId::new(), "doc.mora", Role::Admin);
        let claims = Claims::for_principal(&principal, 3600);

        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "another_secret_32_chars_long!!!!").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let principal = Principal::new(UserId::new(), "doc.mora", Role::Admin);
        let mut claims = Claims::for_principal(&principal, 3600);
        claims.iat -= 7200;
        claims.exp -= 7200;

        let token = encode_token(&claims, SECRET).unwrap();
        let err = decode_token(&token, SECRET).unwrap_err();
        assert_eq!(
            err.kind(),
            &jsonwebtoken::errors::ErrorKind::ExpiredSignature
        );
    }
}

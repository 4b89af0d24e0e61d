use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Verifies an HS256 access token and returns its claims.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
pub(crate) fn issue_test_token(secret: &str, role: u8, ttl_secs: i64) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = chrono::Utc::now().timestamp() + ttl_secs;
    let claims = Claims {
        user_id: 1,
        sub: "hr.manager".into(),
        role,
        exp: exp.max(0) as usize,
        employee_id: Some(7),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

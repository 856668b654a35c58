use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Checks signature and expiry. Tokens are issued by the identity service.
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
pub fn sign_token(claims: &Claims, secret: &str) -> String {
    use jsonwebtoken::{EncodingKey, Header, encode};

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("claims serialize")
}

#[cfg(test)]
pub fn claims_for(role: crate::model::role::Role, id: u64) -> Claims {
    use crate::model::role::Role;
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_secs() as usize;

    Claims {
        sub: format!("{id}@school.cl"),
        role: role.id(),
        exp: now + 900,
        worker_id: (role == Role::Worker).then_some(id),
        manager_id: (role == Role::Manager).then_some(id),
    }
}

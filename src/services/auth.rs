// src/services/auth.rs

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Claims};

// Só valida tokens: login e cadastro ficam no provedor de identidade.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
    jwt_audience: String,
}

impl AuthService {
    pub fn new(jwt_secret: String, jwt_audience: String) -> Self {
        Self { jwt_secret, jwt_audience }
    }

    /// Confere assinatura, expiração e audiência. Devolve o ID do agente (`sub`).
    pub fn validate_token(&self, token: &str) -> Result<Uuid, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.jwt_audience.as_str()]);

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|e| {
            tracing::debug!("Token rejeitado: {}", e);
            AppError::InvalidToken
        })?;

        Ok(token_data.claims.sub)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    pub(crate) const SECRET: &str = "segredo-de-teste";

    pub(crate) fn token_for(agent_id: Uuid, audience: &str, ttl: Duration) -> String {
        let now = Utc::now();
        let claims = json!({
            "sub": agent_id,
            "aud": audience,
            "iat": now.timestamp(),
            "exp": (now + ttl).timestamp(),
        });
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap()
    }

    fn service() -> AuthService {
        AuthService::new(SECRET.into(), "authenticated".into())
    }

    #[test]
    fn accepts_valid_token_and_returns_subject() {
        let agent = Uuid::new_v4();
        let token = token_for(agent, "authenticated", Duration::hours(1));
        assert_eq!(service().validate_token(&token).unwrap(), agent);
    }

    #[test]
    fn rejects_wrong_audience_expired_and_garbage() {
        let agent = Uuid::new_v4();
        let wrong_aud = token_for(agent, "anon", Duration::hours(1));
        let expired = token_for(agent, "authenticated", Duration::hours(-2));

        assert!(matches!(service().validate_token(&wrong_aud), Err(AppError::InvalidToken)));
        assert!(matches!(service().validate_token(&expired), Err(AppError::InvalidToken)));
        assert!(matches!(service().validate_token("nao-e-um-jwt"), Err(AppError::InvalidToken)));
    }
}

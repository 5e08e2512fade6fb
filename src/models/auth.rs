// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// "Claims" do JWT emitido pelo serviço de autenticação.
// A audiência ("aud") é conferida pelo jsonwebtoken na validação.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do agente)
    pub exp: usize, // Expiration time
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub email: Option<String>,
}

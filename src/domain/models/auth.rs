use serde::{Deserialize, Serialize};

/// Claims of the bearer token a member presents. The token is signed with the
/// service's shared secret (HS256).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub exp: usize,
}

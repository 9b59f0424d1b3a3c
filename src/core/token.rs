//! Cosmetic decoding of the bearer token.
//!
//! The token is a JWT. We read the payload segment only to show a username
//! in the title bar. The signature is NOT checked here; authorization is the
//! server's job and nothing in the client depends on these claims.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use log::debug;
use serde::Deserialize;

/// Label shown when the token can't be decoded.
pub const FALLBACK_USERNAME: &str = "User";

#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decode the payload segment of `token` without verifying it.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| debug!("Token payload is not base64url: {}", e))
        .ok()?;
    serde_json::from_slice(&bytes)
        .map_err(|e| debug!("Token payload is not JSON claims: {}", e))
        .ok()
}

/// Username for display: `sub`, then `username`, then [`FALLBACK_USERNAME`].
pub fn display_name(token: &str) -> String {
    decode_claims(token)
        .and_then(|c| c.sub.or(c.username))
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_USERNAME.to_string())
}

#[cfg(test)]
pub(crate) fn fake_jwt(payload_json: &str) -> String {
    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
        URL_SAFE_NO_PAD.encode(payload_json)
    )
}

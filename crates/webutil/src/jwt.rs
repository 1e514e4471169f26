use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload is not base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode the claims of a JWT. The signature is not checked.
///
/// Accepts the payload in either base64 alphabet, padded or not.
pub fn parse_jwt(token: &str) -> Result<serde_json::Value, JwtError> {
    let payload = token
        .split('.')
        .nth(1)
        .filter(|p| !p.is_empty())
        .ok_or(JwtError::MissingPayload)?;
    let normalized: String = payload
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized)?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    fn token_with(payload: &str) -> String {
        format!("eyJhbGciOiJIUzI1NiJ9.{payload}.c2ln")
    }

    #[test]
    fn decodes_claims() {
        let claims = json!({"sub": "42", "name": "Jane", "admin": true});
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        assert_eq!(parse_jwt(&token_with(&payload)).unwrap(), claims);
    }

    #[test]
    fn tolerates_padding_and_standard_alphabet() {
        // Encodes with a '+' and trailing padding.
        let claims = json!({"k": "??>>~~"});
        let standard = STANDARD.encode(claims.to_string());
        assert!(standard.ends_with('='));
        assert_eq!(parse_jwt(&token_with(&standard)).unwrap(), claims);
    }

    #[test]
    fn reports_malformed_tokens() {
        assert!(matches!(parse_jwt("no-dots"), Err(JwtError::MissingPayload)));
        assert!(matches!(parse_jwt("a..b"), Err(JwtError::MissingPayload)));
        assert!(matches!(parse_jwt("a.***.b"), Err(JwtError::Base64(_))));
        let not_json = URL_SAFE_NO_PAD.encode("plain");
        assert!(matches!(parse_jwt(&token_with(&not_json)), Err(JwtError::Json(_))));
    }
}

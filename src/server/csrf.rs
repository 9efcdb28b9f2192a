//! Signed, time-limited form tokens.
//!
//! A token is `"<nonce>.<issued_at>.<signature>"` where `signature` is the
//! hex HMAC-SHA256 of `"<nonce>.<issued_at>"` under the server secret. Tokens
//! are stateless: any token carrying a valid signature and an `issued_at` no
//! older than the TTL is accepted.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Generate a random 32-byte secret, hex encoded.
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

/// Issues and verifies form tokens for one secret.
#[derive(Clone)]
pub struct CsrfSigner {
    secret: String,
    ttl_secs: i64,
}

impl std::fmt::Debug for CsrfSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsrfSigner")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl CsrfSigner {
    pub fn new(secret: impl Into<String>, ttl_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Issue a token stamped with the current time.
    pub fn issue(&self) -> String {
        self.issue_at(chrono::Utc::now().timestamp())
    }

    pub fn issue_at(&self, issued_at: i64) -> String {
        let nonce: [u8; 16] = rand::thread_rng().gen();
        let payload = format!("{}.{issued_at}", hex::encode(nonce));
        let signature = self.sign(&payload);
        format!("{payload}.{signature}")
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> bool {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> bool {
        let mut parts = token.trim().splitn(3, '.');
        let (Some(nonce), Some(issued_at), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        let Ok(issued) = issued_at.parse::<i64>() else {
            return false;
        };
        // Reject tokens from the future as well as expired ones.
        if issued > now || now.saturating_sub(issued) > self.ttl_secs {
            return false;
        }

        let Ok(expected) = hex::decode(signature) else {
            return false;
        };
        let Some(mut mac) = self.mac() else {
            return false;
        };
        mac.update(format!("{nonce}.{issued_at}").as_bytes());
        mac.verify_slice(&expected).is_ok()
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(self.secret.as_bytes()).ok()
    }

    fn sign(&self, payload: &str) -> String {
        match self.mac() {
            Some(mut mac) => {
                mac.update(payload.as_bytes());
                hex::encode(mac.finalize().into_bytes())
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn issued_token_verifies() {
        let signer = CsrfSigner::new("secret", 3600);
        let token = signer.issue();
        assert!(signer.verify(&token));
    }

    #[test]
    fn token_has_three_parts() {
        let signer = CsrfSigner::new("secret", 3600);
        let token = signer.issue_at(NOW);
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1], NOW.to_string());
        assert_eq!(parts[2].len(), 64);
    }

    #[test]
    fn other_secret_rejected() {
        let token = CsrfSigner::new("secret-a", 3600).issue_at(NOW);
        assert!(!CsrfSigner::new("secret-b", 3600).verify_at(&token, NOW));
    }

    #[test]
    fn expired_token_rejected() {
        let signer = CsrfSigner::new("secret", 60);
        let token = signer.issue_at(NOW);
        assert!(signer.verify_at(&token, NOW + 60));
        assert!(!signer.verify_at(&token, NOW + 61));
    }

    #[test]
    fn future_token_rejected() {
        let signer = CsrfSigner::new("secret", 60);
        let token = signer.issue_at(NOW + 10);
        assert!(!signer.verify_at(&token, NOW));
    }

    #[test]
    fn tampered_timestamp_rejected() {
        let signer = CsrfSigner::new("secret", 60);
        let token = signer.issue_at(NOW - 600);
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        parts[1] = NOW.to_string();
        assert!(!signer.verify_at(&parts.join("."), NOW));
    }

    #[test]
    fn garbage_rejected() {
        let signer = CsrfSigner::new("secret", 60);
        assert!(!signer.verify_at("", NOW));
        assert!(!signer.verify_at("abc", NOW));
        assert!(!signer.verify_at("abc.notanumber.00", NOW));
        assert!(!signer.verify_at(&format!("abc.{NOW}.zz"), NOW));
    }

    #[test]
    fn generated_secret_is_hex() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(secret, generate_secret());
    }
}

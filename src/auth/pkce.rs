use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Verifier/challenge pair binding an authorization code to this process.
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

fn random_urlsafe(len: usize) -> String {
    let mut buf = vec![0u8; len];
    rand::Rng::fill_bytes(&mut rand::rng(), &mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

pub fn generate_pkce() -> PkceChallenge {
    let code_verifier = random_urlsafe(32);

    let mut hasher = Sha256::new();
    hasher.update(code_verifier.as_bytes());
    let code_challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

    PkceChallenge {
        code_verifier,
        code_challenge,
    }
}

/// Opaque `state` value for the authorize request.
pub fn generate_state() -> String {
    random_urlsafe(16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkce_verifier_length() {
        // 32 bytes base64url without padding: 43 chars
        assert_eq!(generate_pkce().code_verifier.len(), 43);
    }

    #[test]
    fn pkce_challenge_is_sha256_of_verifier() {
        let pkce = generate_pkce();
        let mut hasher = Sha256::new();
        hasher.update(pkce.code_verifier.as_bytes());
        assert_eq!(pkce.code_challenge, URL_SAFE_NO_PAD.encode(hasher.finalize()));
    }

    #[test]
    fn values_are_unique_and_url_safe() {
        let a = generate_pkce();
        let b = generate_pkce();
        assert_ne!(a.code_verifier, b.code_verifier);
        let state = generate_state();
        assert_eq!(state.len(), 22);
        for ch in a.code_challenge.chars().chain(state.chars()) {
            assert!(
                ch.is_ascii_alphanumeric() || ch == '-' || ch == '_',
                "Invalid char: '{ch}'"
            );
        }
    }
}

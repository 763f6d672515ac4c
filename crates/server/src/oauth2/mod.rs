//! OAuth2 collaborators for the OTP flow.
//!
//! A deliberately small slice of an authorization server: client lookup by
//! client_id, user resolution, and access/refresh token pairs minted once an
//! email has been proven via OTP. No authorization-code or consent flows.

pub mod identity;
pub mod password;
pub mod tokens;

pub use identity::IdentityService;
pub use tokens::{TOKEN_SCOPE, TokenPairResponse, issue_token_pair};

/// OpenAPI tag for authentication endpoints.
pub const AUTH_TAG: &str = "Authentication";

/// Generate a secure random token.
pub fn generate_token() -> String {
    use base64::Engine;
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).expect("Failed to generate random bytes");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let token1 = generate_token();
        let token2 = generate_token();

        assert_ne!(token1, token2);
        assert!(!token1.contains('+'));
        assert!(!token1.contains('/'));
        assert!(!token1.contains('='));
        // 32 bytes base64-encoded without padding.
        assert_eq!(token1.len(), 43);
    }
}

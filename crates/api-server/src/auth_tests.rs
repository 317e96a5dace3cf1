#[cfg(test)]
mod tests {
    use super::super::*;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn test_mask_token() {
        let token = "abcd1234efgh5678";
        assert_eq!(mask_token(token), "abcd...5678");
    }

    #[test]
    fn test_mask_short_token() {
        assert_eq!(mask_token("short"), "****");
    }

    #[test]
    fn test_generate_token_is_random() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert!(a.len() > 40); // base64 of 32 bytes
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let h1 = hash_token("token");
        let h2 = hash_token("token");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
        assert_ne!(h1, hash_token("other"));
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
    }

    #[test]
    fn test_extract_token_from_x_api_token_header() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Api-Token", HeaderValue::from_static("tok_123"));
        assert_eq!(extract_token(&headers).as_deref(), Some("tok_123"));
    }

    #[test]
    fn test_extract_token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Bearer tok_456"));
        assert_eq!(extract_token(&headers).as_deref(), Some("tok_456"));
    }

    #[test]
    fn test_extract_token_missing() {
        let headers = HeaderMap::new();
        assert_eq!(extract_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_token(&headers), None);
    }
}

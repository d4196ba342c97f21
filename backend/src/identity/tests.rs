use super::*;
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use serde_json::{json, Value};

const SECRET: &[u8] = b"test-signing-secret";
const ISSUER: &str = "https://cognito-idp.us-east-1.amazonaws.com/us-east-1_test";
const CLIENT_ID: &str = "test-client";

mod test_helpers {
    use super::*;

    pub fn verifier(client_id: Option<&str>) -> IdentityVerifier {
        IdentityVerifier::with_static_key(
            ISSUER,
            client_id.map(ToString::to_string),
            DecodingKey::from_secret(SECRET),
            Algorithm::HS256,
        )
    }

    pub fn id_token_claims(username: &str) -> Value {
        json!({
            "sub": "3f9a7c1e-0000-0000-0000-000000000000",
            "cognito:username": username,
            "token_use": "id",
            "aud": CLIENT_ID,
            "iss": ISSUER,
            "exp": get_current_timestamp() + 3600,
        })
    }

    pub fn sign(claims: &Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap()
    }
}

mod claims {
    use super::test_helpers::*;
    use super::*;

    #[tokio::test]
    async fn test_id_token_yields_cognito_username() {
        let token = sign(&id_token_claims("alice"));

        let identity = verifier(Some(CLIENT_ID)).verify(&token).await.unwrap();

        assert_eq!(identity, CallerIdentity::new("alice"));
    }

    #[tokio::test]
    async fn test_access_token_yields_username() {
        let token = sign(&json!({
            "username": "bob",
            "token_use": "access",
            "client_id": CLIENT_ID,
            "iss": ISSUER,
            "exp": get_current_timestamp() + 3600,
        }));

        let identity = verifier(Some(CLIENT_ID)).verify(&token).await.unwrap();

        assert_eq!(identity.username, "bob");
    }

    #[tokio::test]
    async fn test_reject_unknown_token_use() {
        let mut claims = id_token_claims("alice");
        claims["token_use"] = json!("refresh");

        let result = verifier(None).verify(&sign(&claims)).await;

        assert!(matches!(result, Err(IdentityError::UnsupportedTokenUse(_))));
    }

    #[tokio::test]
    async fn test_reject_token_for_other_client() {
        let mut claims = id_token_claims("alice");
        claims["aud"] = json!("some-other-client");

        let result = verifier(Some(CLIENT_ID)).verify(&sign(&claims)).await;
        assert!(matches!(result, Err(IdentityError::AudienceMismatch)));

        // Without a configured client any audience is accepted
        let result = verifier(None).verify(&sign(&claims)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reject_missing_username() {
        let mut claims = id_token_claims("alice");
        claims
            .as_object_mut()
            .unwrap()
            .remove("cognito:username");

        let result = verifier(None).verify(&sign(&claims)).await;

        assert!(matches!(result, Err(IdentityError::MissingUsername)));
    }
}

mod validation {
    use super::test_helpers::*;
    use super::*;

    #[tokio::test]
    async fn test_reject_expired_token() {
        let mut claims = id_token_claims("alice");
        claims["exp"] = json!(get_current_timestamp() - 3600);

        let result = verifier(None).verify(&sign(&claims)).await;

        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_reject_foreign_issuer() {
        let mut claims = id_token_claims("alice");
        claims["iss"] = json!("https://cognito-idp.us-east-1.amazonaws.com/someone-else");

        let result = verifier(None).verify(&sign(&claims)).await;

        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_reject_wrong_signature() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &id_token_claims("alice"),
            &EncodingKey::from_secret(b"not-the-secret"),
        )
        .unwrap();

        let result = verifier(None).verify(&token).await;

        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_reject_unexpected_algorithm() {
        let token = encode(
            &Header::new(Algorithm::HS384),
            &id_token_claims("alice"),
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        let result = verifier(None).verify(&token).await;

        assert!(matches!(result, Err(IdentityError::UnexpectedAlgorithm)));
    }

    #[tokio::test]
    async fn test_reject_malformed_tokens() {
        for malformed in ["", "not-a-jwt", "a.b.c", ".."] {
            let result = verifier(None).verify(malformed).await;
            assert!(
                matches!(result, Err(IdentityError::MalformedToken(_))),
                "Should reject malformed token: {malformed:?}"
            );
        }
    }
}

mod config {
    use super::*;

    #[test]
    fn test_cognito_urls() {
        let config = IdentityConfig {
            region: "us-east-2".to_string(),
            user_pool_id: "us-east-2_AbC".to_string(),
            client_id: None,
        };

        assert_eq!(
            config.issuer(),
            "https://cognito-idp.us-east-2.amazonaws.com/us-east-2_AbC"
        );
        assert_eq!(
            config.jwks_url(),
            "https://cognito-idp.us-east-2.amazonaws.com/us-east-2_AbC/.well-known/jwks.json"
        );
    }
}

mod jwks {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{routing::get, Json, Router};
    use tokio::net::TcpListener;

    use super::*;

    const KNOWN_KID: &str = "signing-key-1";
    const MODULUS: &str = "l8yfN9a7Cj0HB41mbXA8UwOOE2bPvxoU1HbmCSXawu_xTWt_6VrpE3av_ZPOpgpp3o0QJCRB7uRk8gjckr1qYEDTrfuibAGpxLAc2FV5NebgR_nbzPPY10_zr3B8qLDNA0zRzLx0uvcEvZO8RL9T2sMaKNQg3Lkga82CB0urEcbDc1IOPQineK9Q26MJVOMbf3KAvw8f8JIrRWQHqoiKeBDludROaeOUlPTlT3mvKL32MSlO60nQi0Qg_EboYhDl-kg7WLhEP2OVi8lhuxYCdzE3gDuLigEly_3LhuPxFTeFF_cdLgw5UK1WD8rCXYz9MX13F4_qkaoN33YrnmKj2Q";

    /// Serves a one-key JWKS on a local port and counts downloads
    async fn jwks_server() -> (String, Arc<AtomicUsize>) {
        let downloads = Arc::new(AtomicUsize::new(0));
        let counter = downloads.clone();
        let jwks = json!({
            "keys": [{
                "kty": "RSA",
                "use": "sig",
                "alg": "RS256",
                "kid": KNOWN_KID,
                "n": MODULUS,
                "e": "AQAB",
            }]
        });

        let app = Router::new().route(
            "/.well-known/jwks.json",
            get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                let jwks = jwks.clone();
                async move { Json(jwks) }
            }),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/.well-known/jwks.json"), downloads)
    }

    fn token_with_kid(kid: &str) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(kid.to_string());

        encode(
            &header,
            &json!({ "cognito:username": "mallory", "token_use": "id", "iss": ISSUER }),
            &EncodingKey::from_secret(b"forged"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_kids_share_one_download() {
        let (url, downloads) = jwks_server().await;
        let verifier = Arc::new(IdentityVerifier::with_jwks_url(
            ISSUER,
            None,
            url,
            JWKS_REFRESH_INTERVAL,
        ));

        let mut requests = tokio::task::JoinSet::new();
        for i in 0..30 {
            let verifier = verifier.clone();
            let token = token_with_kid(&format!("unknown-{}", i % 3));
            requests.spawn(async move { verifier.verify(&token).await });
        }

        while let Some(result) = requests.join_next().await {
            assert!(matches!(result.unwrap(), Err(IdentityError::UnknownKeyId(_))));
        }
        assert_eq!(downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_known_kid_is_cached() {
        let (url, downloads) = jwks_server().await;
        let verifier =
            IdentityVerifier::with_jwks_url(ISSUER, None, url, JWKS_REFRESH_INTERVAL);

        for _ in 0..3 {
            // The key is found, but the token is not RS256 signed
            let result = verifier.verify(&token_with_kid(KNOWN_KID)).await;
            assert!(matches!(result, Err(IdentityError::UnexpectedAlgorithm)));
        }

        assert_eq!(downloads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetches_after_interval() {
        let (url, downloads) = jwks_server().await;
        let verifier = IdentityVerifier::with_jwks_url(ISSUER, None, url, Duration::ZERO);

        for _ in 0..2 {
            let result = verifier.verify(&token_with_kid("rotated-key")).await;
            assert!(matches!(result, Err(IdentityError::UnknownKeyId(_))));
        }

        assert_eq!(downloads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_unreachable_jwks_is_rate_limited() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/jwks.json", listener.local_addr().unwrap());
        drop(listener);
        let verifier = IdentityVerifier::with_jwks_url(ISSUER, None, url, JWKS_REFRESH_INTERVAL);

        let first = verifier.verify(&token_with_kid(KNOWN_KID)).await;
        let second = verifier.verify(&token_with_kid(KNOWN_KID)).await;

        assert!(matches!(first, Err(IdentityError::JwksFetch(_))));
        assert!(matches!(second, Err(IdentityError::UnknownKeyId(_))));
    }
}

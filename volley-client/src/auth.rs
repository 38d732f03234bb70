use std::sync::Arc;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};

use crate::{ApiRequest, ApiResponse, ClientError, Transport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Token pair shared by every clone of a client.
#[derive(Clone, Default)]
pub struct Session {
    tokens: Arc<RwLock<Option<Tokens>>>,
}

impl Session {
    pub async fn set(&self, tokens: Tokens) {
        *self.tokens.write().await = Some(tokens);
    }

    pub async fn clear(&self) {
        *self.tokens.write().await = None;
    }

    pub async fn access_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.tokens
            .read()
            .await
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.tokens.read().await.is_some()
    }
}

#[async_trait::async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<Tokens, ClientError>;
}

/// Exchanges a refresh token at `POST /auth/refresh`.
#[derive(Clone)]
pub struct RefreshEndpoint<T> {
    transport: T,
}

impl<T: Transport> RefreshEndpoint<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait::async_trait]
impl<T: Transport> TokenRefresher for RefreshEndpoint<T> {
    async fn refresh(&self, refresh_token: &str) -> Result<Tokens, ClientError> {
        let request =
            ApiRequest::post("/auth/refresh").with_json(json!({ "refreshToken": refresh_token }));
        self.transport.send(&request).await?.json()
    }
}

/// Attaches the session's bearer token. A 401 triggers one token refresh and a
/// single replay; if the refresh fails the session is cleared. Refreshes are
/// serialized, and a request rejected with a token that has since been
/// replaced replays with the new one instead of refreshing again.
pub struct AuthTransport<T, R> {
    inner: T,
    refresher: R,
    session: Session,
    refreshing: Mutex<()>,
}

impl<T: Transport, R: TokenRefresher> AuthTransport<T, R> {
    pub fn new(inner: T, refresher: R, session: Session) -> Self {
        Self {
            inner,
            refresher,
            session,
            refreshing: Mutex::new(()),
        }
    }

    async fn send_with_token(
        &self,
        request: &ApiRequest,
        token: Option<String>,
    ) -> Result<ApiResponse, ClientError> {
        let authorized = request.clone().with_bearer(token);
        self.inner.send(&authorized).await
    }

    /// Returns the access token to replay with after `rejected` got a 401.
    async fn renew_token(&self, rejected: Option<String>) -> Result<String, ClientError> {
        let _guard = self.refreshing.lock().await;
        if let Some(current) = self.session.access_token().await {
            if rejected.as_deref() != Some(current.as_str()) {
                return Ok(current);
            }
        }
        self.refresh_session().await
    }

    async fn refresh_session(&self) -> Result<String, ClientError> {
        let Some(refresh_token) = self.session.refresh_token().await else {
            self.session.clear().await;
            return Err(ClientError::Unauthorized);
        };
        match self.refresher.refresh(&refresh_token).await {
            Ok(tokens) => {
                info!("Access token refreshed");
                let access_token = tokens.access_token.clone();
                self.session.set(tokens).await;
                Ok(access_token)
            }
            Err(e) => {
                warn!("Token refresh failed, signing out: {}", e);
                self.session.clear().await;
                Err(ClientError::Unauthorized)
            }
        }
    }
}

#[async_trait::async_trait]
impl<T: Transport, R: TokenRefresher> Transport for AuthTransport<T, R> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let token = self.session.access_token().await;
        let resp = self.send_with_token(request, token.clone()).await?;
        if resp.status != 401 {
            return Ok(resp);
        }
        let token = self.renew_token(token).await?;
        let resp = self.send_with_token(request, Some(token)).await?;
        if resp.status == 401 {
            self.session.clear().await;
            return Err(ClientError::Unauthorized);
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::transport::MockTransport;

    #[derive(Default)]
    struct MockRefresher {
        calls: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl TokenRefresher for MockRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<Tokens, ClientError> {
            let reused = {
                let mut calls = self.calls.lock().unwrap();
                let reused = calls.iter().any(|c| c == refresh_token);
                calls.push(refresh_token.to_string());
                reused
            };
            if self.fail || reused {
                return Err(ClientError::Status {
                    status: 400,
                    message: "refresh token expired".to_string(),
                });
            }
            Ok(Tokens {
                access_token: "fresh".to_string(),
                refresh_token: Some("r2".to_string()),
            })
        }
    }

    async fn signed_in() -> Session {
        let session = Session::default();
        session
            .set(Tokens {
                access_token: "stale".to_string(),
                refresh_token: Some("r1".to_string()),
            })
            .await;
        session
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let mock = MockTransport::default();
        mock.respond(200, "{}");
        let session = signed_in().await;
        let transport = AuthTransport::new(mock.clone(), MockRefresher::default(), session);
        transport.send(&ApiRequest::get("/users")).await.unwrap();
        assert_eq!(mock.get_requests()[0].bearer.as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn test_refreshes_once_and_replays() {
        let mock = MockTransport::default();
        mock.respond(401, "").respond(200, r#"{"ok": true}"#);
        let session = signed_in().await;
        let refresher = MockRefresher::default();
        let transport = AuthTransport::new(mock.clone(), refresher, session.clone());

        let resp = transport.send(&ApiRequest::get("/players")).await.unwrap();
        assert_eq!(resp.status, 200);
        let requests = mock.get_requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].bearer.as_deref(), Some("fresh"));
        assert_eq!(*transport.refresher.calls.lock().unwrap(), vec!["r1".to_string()]);
        assert_eq!(session.refresh_token().await.as_deref(), Some("r2"));
    }

    /// Holds every request sent with `stale` until the barrier fills,
    /// then rejects them; any other token is accepted.
    struct StaleGate {
        barrier: tokio::sync::Barrier,
        requests: Mutex<Vec<ApiRequest>>,
    }

    #[async_trait::async_trait]
    impl Transport for StaleGate {
        async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
            self.requests.lock().unwrap().push(request.clone());
            if request.bearer.as_deref() == Some("stale") {
                self.barrier.wait().await;
                return Ok(ApiResponse::new(401, ""));
            }
            Ok(ApiResponse::new(200, "{}"))
        }
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let gate = StaleGate {
            barrier: tokio::sync::Barrier::new(2),
            requests: Mutex::new(Vec::new()),
        };
        let session = signed_in().await;
        let transport = AuthTransport::new(gate, MockRefresher::default(), session.clone());

        let players_req = ApiRequest::get("/players");
        let teams_req = ApiRequest::get("/teams");
        let (a, b) = tokio::join!(
            transport.send(&players_req),
            transport.send(&teams_req),
        );
        assert_eq!(a.unwrap().status, 200);
        assert_eq!(b.unwrap().status, 200);
        assert_eq!(*transport.refresher.calls.lock().unwrap(), vec!["r1".to_string()]);
        assert!(session.is_authenticated().await);
        assert_eq!(session.access_token().await.as_deref(), Some("fresh"));

        let requests = transport.inner.requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert_eq!(
            requests.iter().filter(|r| r.bearer.as_deref() == Some("fresh")).count(),
            2
        );
    }

    #[tokio::test]
    async fn test_reused_refresh_token_is_rejected() {
        let refresher = MockRefresher::default();
        assert!(refresher.refresh("r1").await.is_ok());
        assert!(refresher.refresh("r1").await.is_err());
    }

    #[tokio::test]
    async fn test_failed_refresh_signs_out() {
        let mock = MockTransport::default();
        mock.respond(401, "");
        let session = signed_in().await;
        let refresher = MockRefresher {
            fail: true,
            ..Default::default()
        };
        let transport = AuthTransport::new(mock.clone(), refresher, session.clone());

        assert!(matches!(
            transport.send(&ApiRequest::get("/players")).await,
            Err(ClientError::Unauthorized)
        ));
        assert!(!session.is_authenticated().await);
        assert_eq!(mock.get_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_second_401_is_final() {
        let mock = MockTransport::default();
        mock.respond(401, "").respond(401, "").respond(200, "{}");
        let session = signed_in().await;
        let transport = AuthTransport::new(mock.clone(), MockRefresher::default(), session.clone());

        assert!(matches!(
            transport.send(&ApiRequest::get("/players")).await,
            Err(ClientError::Unauthorized)
        ));
        assert_eq!(mock.get_requests().len(), 2);
        assert_eq!(transport.refresher.calls.lock().unwrap().len(), 1);
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_anonymous_401_without_refresh_token() {
        let mock = MockTransport::default();
        mock.respond(401, r#"{"message": "Invalid credentials"}"#);
        let transport =
            AuthTransport::new(mock.clone(), MockRefresher::default(), Session::default());
        assert!(matches!(
            transport.send(&ApiRequest::post("/auth/login")).await,
            Err(ClientError::Unauthorized)
        ));
        assert!(transport.refresher.calls.lock().unwrap().is_empty());
        assert_eq!(mock.get_requests()[0].bearer, None);
    }

    #[tokio::test]
    async fn test_refresh_endpoint() {
        let mock = MockTransport::default();
        mock.respond(200, r#"{"accessToken": "a2", "refreshToken": "r2"}"#);
        let endpoint = RefreshEndpoint::new(mock.clone());
        let tokens = endpoint.refresh("r1").await.unwrap();
        assert_eq!(tokens.access_token, "a2");
        let request = &mock.get_requests()[0];
        assert_eq!(request.path, "/auth/refresh");
        assert_eq!(request.body, Some(json!({"refreshToken": "r1"})));
    }
}

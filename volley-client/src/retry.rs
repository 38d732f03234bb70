use std::time::Duration;

use log::warn;

use crate::{ApiRequest, ApiResponse, ClientError, Transport};

/// Replays a request after connection failures and 5xx responses, waiting
/// `backoff * attempt` between attempts.
#[derive(Clone)]
pub struct RetryTransport<T> {
    inner: T,
    max_retries: u32,
    backoff: Duration,
}

impl<T: Transport> RetryTransport<T> {
    pub fn new(inner: T, max_retries: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_retries,
            backoff,
        }
    }
}

#[async_trait::async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ClientError> {
        let mut attempt = 0;
        loop {
            let result = self.inner.send(request).await;
            let retryable = match &result {
                Ok(resp) => resp.status >= 500,
                Err(e) => e.is_retryable(),
            };
            if !retryable || attempt >= self.max_retries {
                return result;
            }
            attempt += 1;
            match &result {
                Ok(resp) => warn!(
                    "{} {} returned {}, retrying ({}/{})",
                    request.method, request.path, resp.status, attempt, self.max_retries
                ),
                Err(e) => warn!(
                    "{} {} failed: {}, retrying ({}/{})",
                    request.method, request.path, e, attempt, self.max_retries
                ),
            }
            tokio::time::sleep(self.backoff * attempt).await;
        }
    }
}

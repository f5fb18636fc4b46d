//! Backoff schedule for key service requests.
//!
//! A key fetch is read-only, so a request that never produced a response
//! can be repeated. Any response, including 4xx and 5xx, ends the loop and
//! is handed back for the caller to classify. Wallet calls do not use this.

use std::time::Duration;

use url::Url;

/// A bounded doubling backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Backoff {
    retries: u32,
    first_delay: Duration,
}

impl Backoff {
    /// Three retries after 200ms, 400ms and 800ms.
    pub(crate) const KEY_SERVICE: Self = Self::new(3, Duration::from_millis(200));

    pub(crate) const fn new(retries: u32, first_delay: Duration) -> Self {
        Self {
            retries,
            first_delay,
        }
    }

    /// The pause before each retry, in order.
    pub(crate) fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.retries).map(move |n| self.first_delay.saturating_mul(1u32 << n.min(31)))
    }

    /// Issue `request` until it yields a response, the error is not a
    /// transport failure, or the schedule runs out.
    pub(crate) async fn send<F, Fut>(
        &self,
        url: &Url,
        request: F,
    ) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut delays = self.delays();
        let mut attempt = 1u32;
        loop {
            let err = match request().await {
                Ok(resp) => return Ok(resp),
                Err(e) if !is_transport(&e) => return Err(e),
                Err(e) => e,
            };
            let Some(delay) = delays.next() else {
                return Err(err);
            };
            tracing::warn!(
                %url,
                attempt,
                retries = self.retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "key service unreachable, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Failures where no response arrived. Malformed requests and redirect
/// loops would fail the same way again.
fn is_transport(err: &reqwest::Error) -> bool {
    !(err.is_builder() || err.is_redirect() || err.is_status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn key_service_schedule_doubles() {
        let delays: Vec<_> = Backoff::KEY_SERVICE.delays().collect();
        assert_eq!(
            delays,
            [
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800)
            ]
        );
        assert_eq!(Backoff::new(0, Duration::from_secs(1)).delays().count(), 0);
    }

    #[tokio::test]
    async fn unreachable_host_uses_every_retry() {
        let calls = AtomicU32::new(0);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let url = Url::parse("http://127.0.0.1:1/v1/keys/1/0x00").unwrap();

        let backoff = Backoff::new(2, Duration::from_millis(1));
        let result = backoff
            .send(&url, || {
                calls.fetch_add(1, Ordering::SeqCst);
                client.get(url.clone()).send()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn any_status_ends_the_loop() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = Url::parse(&server.uri()).unwrap();
        let resp = Backoff::KEY_SERVICE
            .send(&url, || client.get(url.clone()).send())
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 503);
    }
}

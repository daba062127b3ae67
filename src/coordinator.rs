use crate::api::{Client, Error, Transport};
use crate::model::AggregateResult;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Runs fetch cycles one at a time and keeps the last successful result.
pub struct Coordinator<T: Transport> {
    client: Client<T>,
    interval: Duration,
    /// Last successful result, kept when a later cycle fails
    data: Mutex<Option<Arc<AggregateResult>>>,
    /// Timestamp of last successful refresh
    timestamp: Mutex<Option<Instant>>,
    cycle: tokio::sync::Mutex<()>,
}

impl<T: Transport> Coordinator<T> {
    pub fn new(client: Client<T>, interval: Duration) -> Self {
        Coordinator {
            client,
            interval,
            data: Mutex::new(None),
            timestamp: Mutex::new(None),
            cycle: tokio::sync::Mutex::new(()),
        }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Updates `timestamp` to `now()`.
    fn touch(&self) {
        if let Ok(mut ts) = self.timestamp.lock() {
            *ts = Some(Instant::now());
        } else {
            log::trace!("Unable to lock timestamp mutex, will refresh again")
        }
    }

    /// True until a refresh has succeeded within the last two intervals.
    pub fn is_stale(&self) -> bool {
        let elapsed_opt = self
            .timestamp
            .lock()
            .ok()
            .and_then(|a| a.map(|b| b.elapsed()));

        if let Some(elapsed) = elapsed_opt {
            elapsed > self.interval * 2
        } else {
            /* nothing fetched yet */
            true
        }
    }

    /// Last successful result, if any cycle has succeeded yet.
    pub fn data(&self) -> Option<Arc<AggregateResult>> {
        self.data.lock().ok().and_then(|data| data.clone())
    }

    fn store(&self, result: AggregateResult) -> Result<Arc<AggregateResult>, Error> {
        let result = Arc::new(result);
        let mut data = self.data.lock().or(Err(Error::InternalError))?;
        *data = Some(Arc::clone(&result));
        drop(data);
        self.touch();
        Ok(result)
    }

    /// Initial refresh; fails with `Error::CannotConnect` when the credentials do not work.
    pub async fn first_refresh(&self) -> Result<Arc<AggregateResult>, Error> {
        let _cycle = self.cycle.lock().await;
        log::info!("Performing initial data refresh");

        let result = self.client.validate().await?;
        self.store(result)
    }

    /// Run one fetch cycle. On failure the previous result stays in place.
    pub async fn refresh(&self) -> Result<Arc<AggregateResult>, Error> {
        let _cycle = self.cycle.lock().await;
        log::debug!("Starting data fetch from Solis Cloud API");

        match self.client.fetch_all().await {
            Ok(result) => {
                log::info!(
                    "Successfully received data from Solis Cloud API ({} inverter(s))",
                    result.records.len()
                );
                self.store(result)
            }
            Err(e) => {
                log::error!("Error communicating with API: {}", e);
                Err(e)
            }
        }
    }

    /// Refresh every `interval`, forever. Failed cycles are retried on the next tick.
    ///
    /// The first tick comes one interval from now; callers do the first refresh themselves.
    pub async fn run(self: Arc<Self>) {
        let start = Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            /* errors are logged by refresh() */
            let _ = self.refresh().await;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::endpoint::{self, Endpoint};
    use crate::api::sign::SignedHeaders;
    use crate::model::Credentials;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds on the first station list call, then fails.
    struct FlakyTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn post(
            &self,
            resource: &Endpoint,
            _headers: &SignedHeaders,
            _body: Vec<u8>,
        ) -> Result<String, Error> {
            if resource == endpoint::INVERTER_LIST {
                let records = json!([{"id": "i1", "pac": 1.0}]);
                return Ok(json!({"success": true, "data": {"page": {"records": records}}})
                    .to_string());
            }

            match self.calls.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(json!({
                    "success": true,
                    "data": {"page": {"records": [{"id": "s1", "stationName": "Home"}]}}
                })
                .to_string()),
                _ => Ok(json!({"success": false, "message": "ACCESS_FREQUENCY_IS_TOO_HIGH"})
                    .to_string()),
            }
        }
    }

    fn coordinator(interval: Duration) -> Coordinator<FlakyTransport> {
        let credentials = Credentials {
            key_id: "key".to_string(),
            secret: "secret".to_string(),
            username: None,
        };
        let transport = FlakyTransport {
            calls: AtomicUsize::new(0),
        };
        Coordinator::new(Client::new(credentials, transport), interval)
    }

    #[tokio::test]
    async fn keeps_last_good_result() {
        let coordinator = coordinator(Duration::from_secs(300));
        assert!(coordinator.data().is_none());

        let first = coordinator.refresh().await.unwrap();
        assert_eq!(1, first.records.len());

        let second = coordinator.refresh().await;
        match second {
            Err(Error::ApiError(message)) => assert_eq!("ACCESS_FREQUENCY_IS_TOO_HIGH", message),
            other => panic!("unexpected result: {:?}", other),
        }

        let data = coordinator.data().unwrap();
        assert_eq!(first, data);
        assert_eq!(Some("Home"), data.records[0].station_name());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_until_refreshed() {
        let coordinator = coordinator(Duration::from_secs(300));
        assert!(coordinator.is_stale());

        coordinator.refresh().await.unwrap();
        assert!(!coordinator.is_stale());

        tokio::time::sleep(Duration::from_secs(599)).await;
        assert!(!coordinator.is_stale());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(coordinator.is_stale());
    }

    #[tokio::test]
    async fn failed_refresh_does_not_touch() {
        let coordinator = coordinator(Duration::from_secs(300));
        coordinator.refresh().await.unwrap();
        *coordinator.timestamp.lock().unwrap() = None;

        assert!(coordinator.refresh().await.is_err());
        assert!(coordinator.is_stale());
    }

    #[tokio::test]
    async fn first_refresh_failure_cannot_connect() {
        let coordinator = coordinator(Duration::from_secs(300));
        coordinator.first_refresh().await.unwrap();
        assert!(!coordinator.is_stale());

        let result = coordinator.first_refresh().await;
        assert!(matches!(result, Err(Error::CannotConnect(_))));
        assert!(coordinator.data().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn run_refreshes_on_interval() {
        let coordinator = Arc::new(coordinator(Duration::from_secs(300)));
        coordinator.first_refresh().await.unwrap();
        let first = coordinator.data().unwrap();

        let handle = tokio::spawn(Arc::clone(&coordinator).run());
        tokio::time::sleep(Duration::from_secs(301)).await;

        /* second cycle failed, first result retained */
        assert_eq!(2, coordinator.client().transport().calls.load(Ordering::SeqCst));
        assert!(Arc::ptr_eq(&first, &coordinator.data().unwrap()));
        handle.abort();
    }
}

use super::sampler::sample_all;
use crate::metric::MetricSpec;
use crate::transport::MBeanConnection;
use crate::writer::WriterFanout;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// One tick's worth of values, in metric order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow<'a> {
    pub timestamp_millis: i64,
    pub values: Vec<(&'a str, String)>,
}

impl SampleRow<'_> {
    pub fn rendered(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(_, v)| v.as_str())
    }
}

/// Samples every spec, writes the row, then sleeps for the interval.
///
/// The sleep starts after the work, so slow fetches push later ticks back.
pub struct PollLoop {
    interval: Duration,
}

impl Default for PollLoop {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl PollLoop {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sample one row, stamped with the wall clock time before fetching.
    pub async fn tick<'a, C>(&self, connection: &C, specs: &'a [MetricSpec]) -> SampleRow<'a>
    where
        C: MBeanConnection + ?Sized,
    {
        let timestamp_millis = chrono::Utc::now().timestamp_millis();
        let values = sample_all(connection, specs).await;
        SampleRow {
            timestamp_millis,
            values: specs.iter().map(MetricSpec::alias).zip(values).collect(),
        }
    }

    /// Write the header, then poll until `cancel` fires.
    pub async fn run<C>(
        &self,
        connection: &C,
        specs: &[MetricSpec],
        fanout: &mut WriterFanout,
        cancel: CancellationToken,
    ) where
        C: MBeanConnection + ?Sized,
    {
        let aliases: Vec<&str> = specs.iter().map(MetricSpec::alias).collect();
        fanout.header(&aliases);
        tracing::info!(
            "Polling {} metrics every {:?}",
            specs.len(),
            self.interval
        );

        loop {
            let row = tokio::select! {
                row = self.tick(connection, specs) => row,
                _ = cancel.cancelled() => break,
            };
            let values: Vec<&str> = row.rendered().collect();
            fanout.row(row.timestamp_millis, &values);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = cancel.cancelled() => break,
            }
        }

        tracing::info!("Poller stopping");
    }
}

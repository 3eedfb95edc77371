// exporter: Turns stub_status reports into Prometheus metrics.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use crate::errors::{
    ExporterError,
    ScrapeError,
};
use crate::fetcher::StatusFetcher;
use crate::httpd::{
    collector::Collector,
    errors::HttpdError,
};
use crate::register_info_with_registry;
use crate::status::{
    self,
    StatusField,
    StatusSnapshot,
};
use prometheus_client::encoding::{
    DescriptorEncoder,
    EncodeMetric,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::MetricType;
use prometheus_client::metrics::counter::ConstCounter;
use prometheus_client::metrics::gauge::ConstGauge;
use prometheus_client::registry::Registry;
use tracing::{
    debug,
    error,
};

/// The two kinds of metric exposed from stub_status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    fn metric_type(self) -> MetricType {
        match self {
            Self::Counter => MetricType::Counter,
            Self::Gauge   => MetricType::Gauge,
        }
    }
}

/// Fixed identity of one exposed metric.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Descriptor {
    name:  String,
    help:  &'static str,
    kind:  MetricKind,
    field: StatusField,
}

impl Descriptor {
    fn new(
        namespace: &str,
        name: &str,
        help: &'static str,
        kind: MetricKind,
        field: StatusField,
    ) -> Self {
        Self {
            name: format!("{namespace}_{name}"),
            help,
            kind,
            field,
        }
    }

    /// Metric family name, as given to the encoder.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the sample as it appears in the exposition. Counters gain a
    /// `_total` suffix from the encoder.
    pub fn sample_name(&self) -> String {
        match self.kind {
            MetricKind::Counter => format!("{}_total", self.name),
            MetricKind::Gauge   => self.name.clone(),
        }
    }

    pub fn help(&self) -> &str {
        self.help
    }

    pub fn kind(&self) -> MetricKind {
        self.kind
    }
}

// Builds the descriptor table for the given namespace.
// Help strings follow the NGINX documentation for stub_status.
fn descriptors(namespace: &str) -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            namespace,
            "connections_active",
            "Active client connections",
            MetricKind::Gauge,
            StatusField::Active,
        ),
        Descriptor::new(
            namespace,
            "connections_reading",
            "Connections currently reading client request headers",
            MetricKind::Gauge,
            StatusField::Reading,
        ),
        Descriptor::new(
            namespace,
            "connections_accepted",
            "Total accepted client connections",
            MetricKind::Counter,
            StatusField::Accepted,
        ),
        Descriptor::new(
            namespace,
            "connections_handled",
            "Total handled client connections",
            MetricKind::Counter,
            StatusField::Handled,
        ),
        Descriptor::new(
            namespace,
            "connections_waiting",
            "Idle client connections",
            MetricKind::Gauge,
            StatusField::Waiting,
        ),
        Descriptor::new(
            namespace,
            "connections_writing",
            "Connections where NGINX is currently writing responses to clients",
            MetricKind::Gauge,
            StatusField::Writing,
        ),
        Descriptor::new(
            namespace,
            "http_requests",
            "Total number of HTTP requests handled",
            MetricKind::Counter,
            StatusField::Requests,
        ),
    ]
}

/// A value for one descriptor, produced by a single pull.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample<'a> {
    pub descriptor: &'a Descriptor,
    pub value:      u64,
}

/// Scrapes stub_status on every pull and emits one sample per descriptor.
///
/// Holds no mutable state, so overlapping pulls are independent of each
/// other.
#[derive(Debug)]
pub struct StubStatusCollector {
    descriptors: Vec<Descriptor>,
    endpoint:    String,
    fetcher:     StatusFetcher,
}

impl StubStatusCollector {
    pub fn new(namespace: &str, endpoint: String, fetcher: StatusFetcher) -> Self {
        debug!("New StubStatusCollector for endpoint: {endpoint}");

        Self {
            descriptors: descriptors(namespace),
            endpoint,
            fetcher,
        }
    }

    /// Lists every descriptor without contacting upstream.
    pub fn describe(&self) -> &[Descriptor] {
        &self.descriptors
    }

    // Fetch and parse a fresh snapshot.
    fn scrape(&self) -> Result<StatusSnapshot, ScrapeError> {
        let body = self.fetcher.fetch(&self.endpoint)?;
        let snapshot = status::parse(&body)?;

        Ok(snapshot)
    }

    // Pairs each descriptor with its value from the snapshot.
    fn samples<'a>(
        &'a self,
        snapshot: &StatusSnapshot,
    ) -> Result<Vec<Sample<'a>>, ScrapeError> {
        self.descriptors
            .iter()
            .map(|descriptor| {
                let value = snapshot.get(descriptor.field);

                // Gauges are encoded as i64.
                if descriptor.kind == MetricKind::Gauge
                    && i64::try_from(value).is_err()
                {
                    return Err(ScrapeError::GaugeOutOfRange {
                        name: descriptor.name.clone(),
                        value,
                    });
                }

                Ok(Sample {
                    descriptor,
                    value,
                })
            })
            .collect()
    }

    /// Performs one pull. Returns a sample for every descriptor, or no
    /// samples at all if upstream couldn't be scraped.
    pub fn collect(&self) -> Vec<Sample<'_>> {
        debug!("Collecting stub_status metrics");

        let samples = self.scrape()
            .and_then(|snapshot| self.samples(&snapshot));

        match samples {
            Ok(samples) => samples,
            Err(e)      => {
                error!(endpoint = %self.endpoint, "scrape failed: {e}");
                Vec::new()
            },
        }
    }
}

impl prometheus_client::collector::Collector for StubStatusCollector {
    fn encode(&self, mut encoder: DescriptorEncoder) -> Result<(), std::fmt::Error> {
        for sample in self.collect() {
            let descriptor = sample.descriptor;
            let metric_type = descriptor.kind.metric_type();

            let metric_encoder = encoder.encode_descriptor(
                descriptor.name(),
                descriptor.help(),
                None,
                metric_type,
            )?;

            match descriptor.kind {
                MetricKind::Counter => {
                    ConstCounter::new(sample.value).encode(metric_encoder)?;
                },
                MetricKind::Gauge => {
                    // Range was checked when the sample was built.
                    let value = i64::try_from(sample.value)
                        .map_err(|_| std::fmt::Error)?;

                    ConstGauge::new(value).encode(metric_encoder)?;
                },
            }
        }

        Ok(())
    }
}

/// Owns the registry that the HTTP server exposes.
#[derive(Debug)]
pub struct Exporter {
    registry: Registry,
}

impl Exporter {
    /// Registers the collector and the build info metric.
    pub fn new(collector: StubStatusCollector) -> Self {
        let mut registry = Registry::default();

        let build_labels = vec![
            ("rustversion".to_string(), env!("RUSTC_VERSION").to_string()),
            ("version".to_string(), env!("CARGO_PKG_VERSION").to_string()),
        ];

        register_info_with_registry!(
            "stub_status_exporter_build",
            "stub_status_exporter build information",
            build_labels,
            registry,
        );

        for descriptor in collector.describe() {
            debug!(
                "Registering {} ({:?})",
                descriptor.sample_name(),
                descriptor.kind(),
            );
        }

        registry.register_collector(Box::new(collector));

        Self {
            registry,
        }
    }

    /// Scrapes upstream and renders every registered metric as text.
    pub fn export(&self) -> Result<String, ExporterError> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;

        Ok(buffer)
    }
}

impl Collector for Exporter {
    fn collect(&self) -> Result<Vec<u8>, HttpdError> {
        self.export()
            .map(String::into_bytes)
            .map_err(|e| HttpdError::CollectorError(e.to_string()))
    }
}

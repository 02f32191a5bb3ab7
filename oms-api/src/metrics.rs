use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Prometheus counters exposed on `/metrics`
pub struct Metrics {
    registry: Registry,
    lookups: IntCounterVec,
    ingested: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("oms".to_string()), None)?;

        let lookups = IntCounterVec::new(
            Opts::new("order_lookups_total", "Order lookups by where the order was found"),
            &["source"],
        )?;
        let ingested = IntCounterVec::new(
            Opts::new("ingested_messages_total", "Messages from the orders topic by outcome"),
            &["outcome"],
        )?;

        registry.register(Box::new(lookups.clone()))?;
        registry.register(Box::new(ingested.clone()))?;

        Ok(Self {
            registry,
            lookups,
            ingested,
        })
    }

    /// `source` is `cache`, `store` or `miss`
    pub fn record_lookup(&self, source: &str) {
        self.lookups.with_label_values(&[source]).inc();
    }

    pub fn record_ingest(&self, outcome: &str) {
        self.ingested.with_label_values(&[outcome]).inc();
    }

    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }

    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

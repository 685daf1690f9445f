use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub transitions_total: IntCounterVec,
    pub estimates_total: IntCounterVec,
    pub open_requests: IntGauge,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let transitions_total = IntCounterVec::new(
            Opts::new("transitions_total", "Lifecycle transitions by event and outcome"),
            &["event", "outcome"],
        )
        .expect("valid transitions_total metric");

        let estimates_total = IntCounterVec::new(
            Opts::new("estimates_total", "Cost estimations by outcome"),
            &["outcome"],
        )
        .expect("valid estimates_total metric");

        let open_requests = IntGauge::new(
            "open_requests",
            "Delivery requests not yet in a terminal state",
        )
        .expect("valid open_requests metric");

        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(estimates_total.clone()))
            .expect("register estimates_total");
        registry
            .register(Box::new(open_requests.clone()))
            .expect("register open_requests");

        Self {
            registry,
            transitions_total,
            estimates_total,
            open_requests,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

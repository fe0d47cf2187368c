//! Metrics definitions for the PNR status gateway.
//!
//! Metrics go through the `metrics` facade; the binary decides whether a
//! recorder is installed.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
}

impl MetricType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "Counter",
            MetricType::Histogram => "Histogram",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub description: &'static str,
}

#[macro_export]
macro_rules! counter {
    ($def:expr $(, $key:expr => $value:expr)* $(,)?) => {
        ::metrics::counter!($def.name $(, $key => $value)*)
    };
}

#[macro_export]
macro_rules! histogram {
    ($def:expr $(, $key:expr => $value:expr)* $(,)?) => {
        ::metrics::histogram!($def.name $(, $key => $value)*)
    };
}

pub const PNR_CHECK_REQUESTS: MetricDef = MetricDef {
    name: "pnr_check.requests",
    metric_type: MetricType::Counter,
    description: "Number of /check-pnr requests answered. Tagged with status.",
};

pub const UPSTREAM_DURATION: MetricDef = MetricDef {
    name: "upstream.duration",
    metric_type: MetricType::Histogram,
    description: "Upstream status call duration in seconds. Tagged with provider, outcome.",
};

pub const UPSTREAM_ERRORS: MetricDef = MetricDef {
    name: "upstream.errors",
    metric_type: MetricType::Counter,
    description: "Number of failed upstream status calls. Tagged with provider, kind.",
};

pub const ALL_METRICS: &[MetricDef] = &[PNR_CHECK_REQUESTS, UPSTREAM_DURATION, UPSTREAM_ERRORS];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_metric_names_unique() {
        let names: HashSet<_> = ALL_METRICS.iter().map(|m| m.name).collect();
        assert_eq!(names.len(), ALL_METRICS.len());
    }

    #[test]
    fn test_metrics_described() {
        for metric in ALL_METRICS {
            assert!(!metric.description.is_empty(), "{}", metric.name);
            assert!(!metric.metric_type.as_str().is_empty());
        }
    }
}

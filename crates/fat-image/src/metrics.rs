//! Optional process-wide hook for observing image I/O.
//!
//! Nothing is recorded until a sink is installed; installing is one-shot.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IoOpType {
    Read,
    Write,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Region {
    Metadata,
    Data,
}

#[derive(Copy, Clone, Debug)]
pub struct ImageOp {
    pub region: Region,
    pub op: IoOpType,
    pub bytes: u64,
    pub latency_seconds: f64,
    pub error: bool,
}

pub trait MetricsSink: Send + Sync + 'static {
    fn record_image_op(&self, op: ImageOp);
}

static METRICS_SINK: OnceLock<Arc<dyn MetricsSink>> = OnceLock::new();

pub fn install_metrics_sink(sink: Arc<dyn MetricsSink>) -> bool {
    METRICS_SINK.set(sink).is_ok()
}

pub fn is_enabled() -> bool {
    METRICS_SINK.get().is_some()
}

pub fn record_image_op(op: ImageOp) {
    if let Some(sink) = METRICS_SINK.get() {
        sink.record_image_op(op);
    }
}

/// Runs `f` and, when a sink is installed, records its latency against `region`.
pub(crate) fn timed<T, E>(
    region: Region,
    op: IoOpType,
    bytes: u64,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    if !is_enabled() {
        return f();
    }
    let started = Instant::now();
    let result = f();
    record_image_op(ImageOp {
        region,
        op,
        bytes,
        latency_seconds: started.elapsed().as_secs_f64(),
        error: result.is_err(),
    });
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TestSink {
        ops: Mutex<Vec<ImageOp>>,
    }

    impl MetricsSink for TestSink {
        fn record_image_op(&self, op: ImageOp) {
            self.ops.lock().unwrap().push(op);
        }
    }

    #[test]
    fn metrics_sink_records_ops_when_enabled() {
        let sink = Arc::new(TestSink {
            ops: Mutex::new(Vec::new()),
        });

        assert!(install_metrics_sink(sink.clone()));
        assert!(is_enabled());

        let ok: Result<(), ()> = timed(Region::Data, IoOpType::Write, 2048, || Ok(()));
        assert!(ok.is_ok());
        let failed: Result<(), &str> =
            timed(Region::Metadata, IoOpType::Read, 49, || Err("short read"));
        assert!(failed.is_err());

        // Other tests in this binary run real image operations against the
        // same global sink, so only look for the two ops recorded above.
        let ops = sink.ops.lock().unwrap();
        assert!(ops.iter().any(|op| op.region == Region::Data
            && op.op == IoOpType::Write
            && op.bytes == 2048
            && !op.error));
        assert!(ops.iter().any(|op| op.region == Region::Metadata
            && op.op == IoOpType::Read
            && op.bytes == 49
            && op.error));
    }
}

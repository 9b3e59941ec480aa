//! Transfer properties checked with in-memory collaborators (no sockets).

use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{StreamExt, stream};
use reqwest::header::{CONTENT_DISPOSITION, HeaderMap, HeaderValue};
use uncut_edges_core::parser::{ParserKind, TransferRequest};
use uncut_edges_core::transfer::{
    BodyStream, DestinationSink, ManualPump, Pipeline, PipelineState, RequestIssuer,
    ResponseDescriptor, SinkFactory, StreamTransfer, TransferError, TransferStrategy,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Read(usize),
    WriteStart(Vec<u8>),
    WriteAck(Vec<u8>),
    Close,
    Abort,
}

type Log = Arc<Mutex<Vec<Event>>>;

fn logged_source(chunks: Vec<&'static [u8]>, log: Log) -> BodyStream {
    Box::pin(stream::iter(chunks.into_iter().enumerate()).then(move |(i, chunk)| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(Event::Read(i + 1));
            Ok::<_, io::Error>(Bytes::from_static(chunk))
        }
    }))
}

/// A sink whose writes take a while to acknowledge.
struct SlowSink {
    log: Log,
    fail_write_at: Option<usize>,
    writes: usize,
    dropped: Arc<AtomicBool>,
}

impl Drop for SlowSink {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl DestinationSink for SlowSink {
    fn target(&self) -> &Path {
        Path::new("memory")
    }

    async fn write(&mut self, chunk: Bytes) -> io::Result<()> {
        self.writes += 1;
        self.log
            .lock()
            .unwrap()
            .push(Event::WriteStart(chunk.to_vec()));
        tokio::time::sleep(Duration::from_millis(5)).await;
        if self.fail_write_at == Some(self.writes) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
        }
        self.log.lock().unwrap().push(Event::WriteAck(chunk.to_vec()));
        Ok(())
    }

    async fn close(self: Box<Self>) -> io::Result<()> {
        self.log.lock().unwrap().push(Event::Close);
        Ok(())
    }

    async fn abort(self: Box<Self>) {
        self.log.lock().unwrap().push(Event::Abort);
    }
}

struct SlowFactory {
    log: Log,
    opened: Arc<Mutex<Vec<String>>>,
    dropped: Arc<AtomicBool>,
}

impl SlowFactory {
    fn new(log: Log) -> Self {
        Self {
            log,
            opened: Arc::new(Mutex::new(Vec::new())),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }
}

#[async_trait]
impl SinkFactory for SlowFactory {
    async fn open(&self, filename: &str) -> io::Result<Box<dyn DestinationSink>> {
        self.opened.lock().unwrap().push(filename.to_string());
        Ok(Box::new(SlowSink {
            log: Arc::clone(&self.log),
            fail_write_at: None,
            writes: 0,
            dropped: Arc::clone(&self.dropped),
        }))
    }
}

/// Serves one canned response per call.
struct CannedIssuer {
    disposition: Option<&'static str>,
    chunks: Vec<&'static [u8]>,
    log: Log,
    requests: Arc<Mutex<Vec<String>>>,
    stall: bool,
}

impl CannedIssuer {
    fn new(disposition: Option<&'static str>, chunks: Vec<&'static [u8]>, log: Log) -> Self {
        Self {
            disposition,
            chunks,
            log,
            requests: Arc::new(Mutex::new(Vec::new())),
            stall: false,
        }
    }
}

#[async_trait]
impl RequestIssuer for CannedIssuer {
    async fn issue(&self, url: &str) -> Result<ResponseDescriptor, TransferError> {
        self.requests.lock().unwrap().push(url.to_string());
        let mut headers = HeaderMap::new();
        if let Some(value) = self.disposition {
            headers.insert(CONTENT_DISPOSITION, HeaderValue::from_static(value));
        }
        let body = if self.stall {
            let first = logged_source(self.chunks.clone(), Arc::clone(&self.log));
            Box::pin(first.chain(stream::pending())) as BodyStream
        } else {
            logged_source(self.chunks.clone(), Arc::clone(&self.log))
        };
        Ok(ResponseDescriptor {
            url: url.to_string(),
            headers,
            body,
        })
    }
}

fn manifest_request() -> TransferRequest {
    TransferRequest::build(
        "https://api.test",
        ParserKind::Manifest,
        "https://example.com/manifest.json",
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn test_pipeline_scenario_ab_cd() {
    let log: Log = Arc::default();
    let issuer = Arc::new(CannedIssuer::new(
        Some("attachment; filename=out.pdf"),
        vec![&b"AB"[..], &b"CD"[..]],
        Arc::clone(&log),
    ));
    let factory = Arc::new(SlowFactory::new(Arc::clone(&log)));
    let pipeline = Pipeline::new(
        issuer.clone(),
        factory.clone(),
        TransferStrategy::Pump.select(false),
    );
    assert_eq!(pipeline.state(), PipelineState::Idle);

    let report = pipeline.run(&manifest_request()).await.unwrap();

    assert_eq!(
        *issuer.requests.lock().unwrap(),
        vec!["https://api.test/parse/https%3A%2F%2Fexample.com%2Fmanifest.json".to_string()]
    );
    assert_eq!(*factory.opened.lock().unwrap(), vec!["out.pdf".to_string()]);
    assert_eq!(report.filename, "out.pdf");
    assert_eq!(report.bytes_written, 4);
    assert_eq!(report.chunks, 2);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            Event::Read(1),
            Event::WriteStart(b"AB".to_vec()),
            Event::WriteAck(b"AB".to_vec()),
            Event::Read(2),
            Event::WriteStart(b"CD".to_vec()),
            Event::WriteAck(b"CD".to_vec()),
            Event::Close,
        ]
    );
}

#[tokio::test]
async fn test_direct_strategy_on_writerless_sink_matches_pump() {
    let log: Log = Arc::default();
    let issuer = Arc::new(CannedIssuer::new(
        Some("attachment; filename=out.pdf"),
        vec![&b"AB"[..], &b"CD"[..]],
        Arc::clone(&log),
    ));
    let factory = Arc::new(SlowFactory::new(Arc::clone(&log)));
    let pipeline = Pipeline::new(issuer, factory, TransferStrategy::Direct.select(false));

    let report = pipeline.run(&manifest_request()).await.unwrap();

    assert_eq!(report.bytes_written, 4);
    let writes: Vec<Event> = log
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, Event::WriteAck(_) | Event::Close))
        .cloned()
        .collect();
    assert_eq!(
        writes,
        vec![
            Event::WriteAck(b"AB".to_vec()),
            Event::WriteAck(b"CD".to_vec()),
            Event::Close
        ]
    );
}

#[tokio::test]
async fn test_missing_header_never_opens_sink() {
    let log: Log = Arc::default();
    let issuer = Arc::new(CannedIssuer::new(None, vec![&b"AB"[..]], Arc::clone(&log)));
    let factory = Arc::new(SlowFactory::new(Arc::clone(&log)));
    let pipeline = Pipeline::new(issuer, factory.clone(), TransferStrategy::Auto.select(false));

    let result = pipeline.run(&manifest_request()).await;

    assert!(matches!(
        result,
        Err(TransferError::MissingFilenameHeader { .. })
    ));
    assert!(factory.opened.lock().unwrap().is_empty());
    assert!(log.lock().unwrap().is_empty(), "no bytes may be read or written");
}

#[tokio::test]
async fn test_write_failure_on_each_chunk_stops_everything() {
    let chunks: Vec<&'static [u8]> = vec![&b"c1"[..], &b"c2"[..], &b"c3"[..], &b"c4"[..]];

    for k in 1..=chunks.len() {
        let log: Log = Arc::default();
        let sink = Box::new(SlowSink {
            log: Arc::clone(&log),
            fail_write_at: Some(k),
            writes: 0,
            dropped: Arc::new(AtomicBool::new(false)),
        });

        let result = ManualPump
            .transfer(logged_source(chunks.clone(), Arc::clone(&log)), sink)
            .await;

        assert!(
            matches!(result, Err(TransferError::WriteFailed { .. })),
            "k={k}: unexpected {result:?}"
        );
        let events = log.lock().unwrap().clone();
        assert_eq!(events.last(), Some(&Event::Abort), "k={k}");
        let reads = events.iter().filter(|e| matches!(e, Event::Read(_))).count();
        assert_eq!(reads, k, "k={k}: reads after the failed write");
        let acks = events
            .iter()
            .filter(|e| matches!(e, Event::WriteAck(_)))
            .count();
        assert_eq!(acks, k - 1, "k={k}");
        assert!(!events.contains(&Event::Close), "k={k}: close after failure");
    }
}

#[tokio::test]
async fn test_manual_pump_never_reads_ahead_of_acknowledged_write() {
    let log: Log = Arc::default();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    struct GaugedSink {
        in_flight: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DestinationSink for GaugedSink {
        fn target(&self) -> &Path {
            Path::new("memory")
        }

        async fn write(&mut self, _chunk: Bytes) -> io::Result<()> {
            tokio::time::sleep(Duration::from_millis(2)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }

        async fn close(self: Box<Self>) -> io::Result<()> {
            Ok(())
        }

        async fn abort(self: Box<Self>) {}
    }

    let gauge = Arc::clone(&in_flight);
    let high = Arc::clone(&peak);
    let source: BodyStream = Box::pin(
        logged_source(vec![&b"a"[..]; 16], Arc::clone(&log)).inspect(move |_| {
            let now = gauge.fetch_add(1, Ordering::SeqCst) + 1;
            high.fetch_max(now, Ordering::SeqCst);
        }),
    );

    let stats = ManualPump
        .transfer(
            source,
            Box::new(GaugedSink {
                in_flight: Arc::clone(&in_flight),
            }),
        )
        .await
        .unwrap();

    assert_eq!(stats.chunks, 16);
    assert_eq!(peak.load(Ordering::SeqCst), 1, "more than one chunk was in flight");
}

#[tokio::test]
async fn test_cancelled_transfer_stops_and_releases_sink() {
    let log: Log = Arc::default();
    let mut issuer = CannedIssuer::new(
        Some("attachment; filename=out.pdf"),
        vec![&b"AB"[..]],
        Arc::clone(&log),
    );
    issuer.stall = true;
    let factory = Arc::new(SlowFactory::new(Arc::clone(&log)));
    let dropped = Arc::clone(&factory.dropped);
    let pipeline = Pipeline::new(
        Arc::new(issuer),
        factory,
        TransferStrategy::Pump.select(false),
    );

    let result = pipeline
        .run_until(
            &manifest_request(),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;

    assert!(matches!(result, Err(TransferError::Cancelled)));
    assert!(dropped.load(Ordering::SeqCst), "sink must be released");
    let events = log.lock().unwrap().clone();
    assert!(!events.contains(&Event::Close));
    assert_eq!(
        events,
        vec![
            Event::Read(1),
            Event::WriteStart(b"AB".to_vec()),
            Event::WriteAck(b"AB".to_vec()),
        ]
    );
}

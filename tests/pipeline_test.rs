// End-to-end behaviour of the pipeline and service without a real clipboard.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipboard_pretty::error::AppError;
use clipboard_pretty::pipeline::{
    Buffer, ContentHandler, JsonPrettyHandler, Outcome, Pipeline, TransformError,
    WhitespaceTrimHandler,
};
use clipboard_pretty::service::{FormatterService, run_pipeline};
use clipboard_pretty::sink::ContentSink;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct CollectSink {
    received: Mutex<Vec<Buffer>>,
}

impl ContentSink for CollectSink {
    fn name(&self) -> &str {
        "collect"
    }

    fn deliver(&self, content: &Buffer) -> Result<(), AppError> {
        self.received.lock().expect("lock").push(content.clone());
        Ok(())
    }
}

/// JSON handler wrapper that counts transform calls.
struct CountingJson {
    inner: JsonPrettyHandler,
    transforms: Arc<AtomicUsize>,
}

impl ContentHandler for CountingJson {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn matches(&self, buffer: &[u8]) -> bool {
        self.inner.matches(buffer)
    }

    fn transform(&self, buffer: &[u8]) -> Result<Buffer, TransformError> {
        self.transforms.fetch_add(1, Ordering::SeqCst);
        self.inner.transform(buffer)
    }
}

#[test]
fn non_json_is_never_processed() {
    let transforms = Arc::new(AtomicUsize::new(0));
    let pipeline = Pipeline::new().with_handler(CountingJson {
        inner: JsonPrettyHandler::new(),
        transforms: Arc::clone(&transforms),
    });

    let (outcome, trace) = pipeline.run_traced(b"not json");

    assert_eq!(outcome, Outcome::Unmatched);
    assert_eq!(transforms.load(Ordering::SeqCst), 0);
    assert_eq!(trace.len(), 1);
    assert_eq!(trace[0].to_string(), "Match step not taken for JSON Handler");
}

#[test]
fn hello_world_object_is_pretty_printed_with_trace() {
    let pipeline = Pipeline::default();

    let (outcome, trace) = pipeline.run_traced(br#"{"hello":"world"}"#);

    assert_eq!(
        outcome.output().map(|b| &b[..]),
        Some(&b"{\n  \"hello\": \"world\"\n}"[..])
    );
    let lines: Vec<String> = trace.iter().map(ToString::to_string).collect();
    assert_eq!(
        lines,
        vec![
            "Match step taken for JSON Handler",
            "Process step taken for JSON Handler",
        ]
    );
}

#[test]
fn first_matching_handler_wins() {
    let padded = b"  {\"a\":1}  ";

    let trim_first = Pipeline::new()
        .with_handler(WhitespaceTrimHandler::new())
        .with_handler(JsonPrettyHandler::new());
    let (outcome, trace) = trim_first.run_traced(padded);
    assert_eq!(outcome.handler(), Some("Trim Handler"));
    assert_eq!(outcome.output().map(|b| &b[..]), Some(&b"{\"a\":1}"[..]));
    assert!(trace.iter().all(|event| event.handler == "Trim Handler"));

    let json_first = Pipeline::new()
        .with_handler(JsonPrettyHandler::new())
        .with_handler(WhitespaceTrimHandler::new());
    let outcome = json_first.run(padded);
    assert_eq!(outcome.handler(), Some("JSON Handler"));
    assert_eq!(outcome.output().map(|b| &b[..]), Some(&b"{\n  \"a\": 1\n}"[..]));
}

#[tokio::test]
async fn non_json_produces_nothing_downstream() {
    let (input_tx, input_rx) = mpsc::channel(1);
    let (output_tx, mut output_rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();
    let runner = tokio::spawn(run_pipeline(
        Arc::new(Pipeline::default()),
        input_rx,
        output_tx,
        cancel.clone(),
    ));

    input_tx.send(Buffer::from_static(b"hello world")).await.expect("send");

    let waited = tokio::time::timeout(Duration::from_millis(200), output_rx.recv()).await;
    assert!(waited.is_err(), "nothing should be forwarded for plain text");

    cancel.cancel();
    runner.await.expect("runner exits");
    assert!(output_rx.recv().await.is_none());
}

#[tokio::test]
async fn service_forwards_in_order_and_skips_failures() {
    let collect = Arc::new(CollectSink::default());
    let cancel = CancellationToken::new();
    let (input, handle) = FormatterService::new(Pipeline::default(), 1)
        .with_sink(collect.clone())
        .start(cancel);

    for raw in [&br#"{"hello":"world"}"#[..], b"hello world", b"{\"a\":", b"[1,2]"] {
        input.send(Buffer::copy_from_slice(raw)).await.expect("send");
    }
    drop(input);
    handle.join().await.expect("join");

    let received = collect.received.lock().expect("lock");
    let texts: Vec<&[u8]> = received.iter().map(|b| &b[..]).collect();
    assert_eq!(
        texts,
        vec![&b"{\n  \"hello\": \"world\"\n}"[..], &b"[\n  1,\n  2\n]"[..]]
    );
}

#[tokio::test]
async fn pipeline_is_shareable_across_tasks() {
    let pipeline = Arc::new(Pipeline::default());
    let mut tasks = Vec::new();

    for i in 0..8 {
        let pipeline = Arc::clone(&pipeline);
        tasks.push(tokio::spawn(async move {
            let raw = format!(r#"{{"n":{i}}}"#);
            pipeline.run(raw.as_bytes()).into_output()
        }));
    }

    for (i, task) in tasks.into_iter().enumerate() {
        let output = task.await.expect("task").expect("transformed");
        assert_eq!(output, Buffer::from(format!("{{\n  \"n\": {i}\n}}")));
    }
}

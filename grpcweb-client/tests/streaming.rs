//! Integration tests: `StreamReader` over a scripted polling transport.
//!
//! The scripted transport plays the server side: tests append base64 text
//! to it in arbitrary chunk sizes and flip it to Done, invoking the
//! reader's notification entry point after every change the way an XHR
//! driver would.

use std::cell::RefCell;
use std::rc::Rc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use grpcweb_client::{PollingTransport, ReadyState, Status, StatusCode, StreamReader};
use grpcweb_frame::{encode_message, encode_trailers};

// -- Scripted transport --

struct ScriptedTransport {
    text: String,
    state: ReadyState,
    aborted: bool,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self {
            text: String::new(),
            state: ReadyState::Loading,
            aborted: false,
        }
    }
}

impl PollingTransport for ScriptedTransport {
    fn ready_state(&self) -> ReadyState {
        self.state
    }

    fn response_text(&self) -> &str {
        &self.text
    }

    fn abort(&mut self) {
        self.aborted = true;
        self.state = ReadyState::Done;
    }
}

// -- Harness --

/// Everything the reader dispatched, in dispatch order.
#[derive(Debug, Clone, PartialEq)]
enum Event {
    Data(String),
    Status(Status),
    End,
}

type EventLog = Rc<RefCell<Vec<Event>>>;

/// A reader that deserializes payloads as UTF-8 strings and records every
/// callback into a shared log.
fn logging_reader() -> (StreamReader<ScriptedTransport, String>, EventLog) {
    let log: EventLog = Rc::new(RefCell::new(Vec::new()));

    let mut reader = StreamReader::new(ScriptedTransport::new());
    reader.set_deserializer(|bytes| String::from_utf8(bytes.to_vec()).ok());

    let data_log = log.clone();
    let status_log = log.clone();
    let end_log = log.clone();
    reader
        .on_data(move |msg| data_log.borrow_mut().push(Event::Data(msg)))
        .on_status(move |status| status_log.borrow_mut().push(Event::Status(status)))
        .on_end(move || end_log.borrow_mut().push(Event::End));

    (reader, log)
}

/// Build the base64 text of a whole response: message payloads followed by
/// an optional trailer block.
fn response_text(messages: &[&[u8]], trailer: Option<&[u8]>) -> String {
    let mut wire = Vec::new();
    for payload in messages {
        encode_message(payload, &mut wire);
    }
    if let Some(block) = trailer {
        encode_trailers(block, &mut wire);
    }
    STANDARD.encode(&wire)
}

/// Deliver `text` in chunks of `chunk_len` characters, notifying after each,
/// then flip to Done and notify once more.
fn drive_chunked(reader: &mut StreamReader<ScriptedTransport, String>, text: &str, chunk_len: usize) {
    let chars: Vec<char> = text.chars().collect();
    for chunk in chars.chunks(chunk_len) {
        reader.transport_mut().text.extend(chunk);
        reader.on_ready_state_change();
    }
    reader.transport_mut().state = ReadyState::Done;
    reader.on_ready_state_change();
}

fn data_events(log: &EventLog) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Data(msg) => Some(msg.clone()),
            _ => None,
        })
        .collect()
}

fn status_events(log: &EventLog) -> Vec<Status> {
    log.borrow()
        .iter()
        .filter_map(|e| match e {
            Event::Status(status) => Some(status.clone()),
            _ => None,
        })
        .collect()
}

fn end_count(log: &EventLog) -> usize {
    log.borrow().iter().filter(|e| **e == Event::End).count()
}

// -- Tests --

#[test]
fn one_shot_delivery() {
    let (mut reader, log) = logging_reader();

    let text = response_text(
        &[b"alpha", b"beta"],
        Some(b"grpc-status:0\r\ngrpc-message:\r\n"),
    );
    drive_chunked(&mut reader, &text, text.len());

    assert_eq!(data_events(&log), vec!["alpha", "beta"]);

    let statuses = status_events(&log);
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].code.is_ok());
    assert_eq!(statuses[0].details, "");
    assert_eq!(statuses[0].metadata["grpc-status"], "0");
    assert_eq!(statuses[0].metadata["grpc-message"], "");

    assert_eq!(end_count(&log), 1);

    // Status precedes end: the trailer frame is processed before the
    // completion check of the same pass.
    let events = log.borrow();
    assert!(matches!(events[events.len() - 2], Event::Status(_)));
    assert_eq!(events[events.len() - 1], Event::End);
}

#[test]
fn chunked_delivery_matches_one_shot() {
    let text = response_text(
        &[b"first message", b"second", b"third and last"],
        Some(b"grpc-status:0\r\n"),
    );

    let (mut reference, reference_log) = logging_reader();
    drive_chunked(&mut reference, &text, text.len());

    // Chunk lengths deliberately coprime with the base64 group size.
    for chunk_len in [1, 2, 3, 5, 7, 11, 13] {
        let (mut reader, log) = logging_reader();
        drive_chunked(&mut reader, &text, chunk_len);

        assert_eq!(
            *log.borrow(),
            *reference_log.borrow(),
            "chunk_len {chunk_len} diverged from one-shot delivery"
        );
    }
}

#[test]
fn trailer_status_with_details() {
    let (mut reader, log) = logging_reader();

    let text = response_text(&[], Some(b"grpc-status:5\r\ngrpc-message:not found\r\n"));
    drive_chunked(&mut reader, &text, text.len());

    let statuses = status_events(&log);
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].code, StatusCode::NotFound);
    assert_eq!(statuses[0].details, "not found");
}

#[test]
fn trailer_without_status_headers_defaults_ok() {
    let (mut reader, log) = logging_reader();

    let text = response_text(&[], Some(b"x-request-id: r-17\r\n"));
    drive_chunked(&mut reader, &text, text.len());

    let statuses = status_events(&log);
    assert_eq!(statuses.len(), 1);
    assert!(statuses[0].code.is_ok());
    assert_eq!(statuses[0].details, "");
    assert_eq!(statuses[0].metadata["x-request-id"], "r-17");
}

#[test]
fn completion_without_trailer_frame() {
    let (mut reader, log) = logging_reader();

    let text = response_text(&[b"only data"], None);
    drive_chunked(&mut reader, &text, 4);

    assert_eq!(data_events(&log), vec!["only data"]);
    assert!(status_events(&log).is_empty());
    assert_eq!(end_count(&log), 1);
}

#[test]
fn empty_trailer_frame_is_ignored() {
    let (mut reader, log) = logging_reader();

    let text = response_text(&[b"payload"], Some(b""));
    drive_chunked(&mut reader, &text, text.len());

    assert_eq!(data_events(&log), vec!["payload"]);
    assert!(status_events(&log).is_empty());
    assert_eq!(end_count(&log), 1);
}

#[test]
fn deserialization_failure_skips_message_only() {
    let (mut reader, log) = logging_reader();

    // The middle payload is not valid UTF-8, so the deserializer rejects it.
    let text = response_text(
        &[b"before", b"\xff\xfe\xfd", b"after"],
        Some(b"grpc-status:0\r\n"),
    );
    drive_chunked(&mut reader, &text, 6);

    assert_eq!(data_events(&log), vec!["before", "after"]);
    assert_eq!(status_events(&log).len(), 1);
    assert_eq!(end_count(&log), 1);
}

#[test]
fn multiple_nonempty_trailer_frames_each_fire_status() {
    let (mut reader, log) = logging_reader();

    let mut wire = Vec::new();
    encode_trailers(b"grpc-status:0\r\n", &mut wire);
    encode_trailers(b"grpc-status:13\r\n", &mut wire);
    let text = STANDARD.encode(&wire);
    drive_chunked(&mut reader, &text, text.len());

    let statuses = status_events(&log);
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0].code, StatusCode::Ok);
    assert_eq!(statuses[1].code, StatusCode::Internal);
}

#[test]
fn cancel_before_any_data() {
    let (mut reader, log) = logging_reader();

    reader.cancel();
    assert!(reader.transport().aborted);
    assert!(data_events(&log).is_empty());
    assert!(status_events(&log).is_empty());
}

#[test]
fn data_and_completion_in_one_notification() {
    let (mut reader, log) = logging_reader();

    let text = response_text(&[b"single"], Some(b"grpc-status:0\r\n"));
    reader.transport_mut().text.push_str(&text);
    reader.transport_mut().state = ReadyState::Done;
    reader.on_ready_state_change();

    assert_eq!(data_events(&log), vec!["single"]);
    assert_eq!(status_events(&log).len(), 1);
    assert_eq!(end_count(&log), 1);
}

#[test]
fn message_split_across_chunk_boundaries_is_not_corrupted() {
    let (mut reader, log) = logging_reader();

    // One large payload, delivered 7 chars at a time: every frame header
    // and most of the payload straddle chunk and base64-group boundaries.
    let payload: String = "abcdefghij".repeat(50);
    let text = response_text(&[payload.as_bytes()], Some(b"grpc-status:0\r\n"));
    drive_chunked(&mut reader, &text, 7);

    assert_eq!(data_events(&log), vec![payload]);
    assert_eq!(status_events(&log).len(), 1);
    assert_eq!(end_count(&log), 1);
}

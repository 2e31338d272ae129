//! Integration tests for the exec output-stream demultiplexer.
//!
//! These exercise the chunk-at-a-time routing heuristic through the public
//! API, with each chunk built as one well-formed frame (the common case the
//! heuristic is designed for).

use zade::StreamDemux;

const HEADER_LEN: usize = 8;

fn frame(selector: u8, payload: &[u8]) -> Vec<u8> {
    let mut chunk = vec![selector, 0, 0, 0];
    chunk.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    chunk.extend_from_slice(payload);
    chunk
}

#[test]
fn test_stdout_stream_is_payload_concatenation() {
    let payloads: [&[u8]; 3] = [b"total 0\n", b"drwxr-xr-x root\n", b"-rw-r--r-- notes.txt\n"];

    let mut demux = StreamDemux::new();
    for payload in payloads {
        demux.push_chunk(&frame(1, payload));
    }

    let (stdout, stderr) = demux.into_parts();
    assert_eq!(stdout, "total 0\ndrwxr-xr-x root\n-rw-r--r-- notes.txt\n");
    assert!(stderr.is_empty());
}

#[test]
fn test_stderr_stream_is_payload_concatenation() {
    let mut demux = StreamDemux::new();
    demux.push_chunk(&frame(2, b"bash: foo: "));
    demux.push_chunk(&frame(2, b"command not found\n"));

    let (stdout, stderr) = demux.into_parts();
    assert!(stdout.is_empty());
    assert_eq!(stderr, "bash: foo: command not found\n");
}

#[test]
fn test_mixed_streams_keep_delivery_order_within_each_stream() {
    let mut demux = StreamDemux::new();
    demux.push_chunk(&frame(1, b"step 1\n"));
    demux.push_chunk(&frame(2, b"warning\n"));
    demux.push_chunk(&frame(1, b"step 2\n"));
    demux.push_chunk(&frame(2, b"error\n"));

    let (stdout, stderr) = demux.into_parts();
    assert_eq!(stdout, "step 1\nstep 2\n");
    assert_eq!(stderr, "warning\nerror\n");
}

#[test]
fn test_raw_chunks_fall_back_to_stdout() {
    // A TTY-attached exec produces unframed output; the heuristic routes it
    // to stdout unmodified.
    let mut demux = StreamDemux::new();
    demux.push_chunk(b"raw tty");

    let (stdout, stderr) = demux.into_parts();
    assert_eq!(stdout, "raw tty");
    assert!(stderr.is_empty());
}

#[test]
fn test_large_payload_in_single_chunk() {
    let payload = vec![b'x'; 64 * 1024];
    let mut demux = StreamDemux::new();
    demux.push_chunk(&frame(1, &payload));

    let (stdout, _) = demux.into_parts();
    assert_eq!(stdout.len(), payload.len());
}

#[test]
fn test_header_is_never_leaked_into_output() {
    let chunk = frame(1, b"payload");
    assert_eq!(chunk.len(), HEADER_LEN + 7);

    let mut demux = StreamDemux::new();
    demux.push_chunk(&chunk);

    let (stdout, _) = demux.into_parts();
    assert_eq!(stdout, "payload");
}

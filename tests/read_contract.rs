//! Read-path contract tests over an in-memory transport.
//!
//! These cover the counted-read guarantees: exact delivery, clean
//! `ReadEof` on a short stream, zero-length reads performing no I/O, and
//! the replay of an unconsumed tail across logical reads.

use bytes::Bytes;
use rstest::rstest;
use shardlink::{BufferList, Socket, SocketError, SocketOptions};
use tokio::io::{AsyncWriteExt, DuplexStream, ReadHalf, WriteHalf, duplex, split};

type DuplexSocket = Socket<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

/// Build a socket over one end of an in-memory pipe, returning the raw
/// peer end for the test to drive.
fn socket_pair(capacity: usize) -> (DuplexSocket, DuplexStream) {
    let (local, peer) = duplex(capacity);
    let (input, output) = split(local);
    (Socket::from_parts(input, output, SocketOptions::default()), peer)
}

#[tokio::test]
async fn read_returns_exactly_the_requested_bytes() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"0123456789").await.unwrap();
    peer.shutdown().await.unwrap();

    let buf = socket.read(10).await.unwrap();
    assert_eq!(buf.len(), 10);
    assert_eq!(buf.coalesce().as_ref(), b"0123456789");

    socket.close().await.unwrap();
}

#[tokio::test]
async fn read_past_end_of_stream_fails_with_read_eof() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"0123456789").await.unwrap();
    peer.shutdown().await.unwrap();

    let error = socket.read(11).await.unwrap_err();
    assert!(error.is_read_eof(), "expected ReadEof, got {error}");

    socket.close().await.unwrap();
}

#[tokio::test]
async fn exhausted_stream_still_fails_follow_up_reads() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"abc").await.unwrap();
    peer.shutdown().await.unwrap();

    socket.read(3).await.unwrap();
    let error = socket.read(1).await.unwrap_err();
    assert!(matches!(error, SocketError::ReadEof));

    socket.close().await.unwrap();
}

#[rstest]
#[case::counted_read(false)]
#[case::exact_read(true)]
#[tokio::test]
async fn zero_length_reads_complete_without_io(#[case] exact: bool) {
    // The peer never writes; any transport I/O would suspend forever.
    let (mut socket, _peer) = socket_pair(16);

    if exact {
        let buf = socket.read_exactly(0).await.unwrap();
        assert!(buf.is_empty());
    } else {
        let buf = socket.read(0).await.unwrap();
        assert!(buf.is_empty());
    }

    socket.close().await.unwrap();
}

#[tokio::test]
async fn read_assembles_across_many_small_chunks() {
    // A 4-byte pipe forces delivery in at least three chunks.
    let (mut socket, mut peer) = socket_pair(4);
    let writer = tokio::spawn(async move {
        peer.write_all(b"abcdefghij").await.unwrap();
        peer.shutdown().await.unwrap();
    });

    let buf = socket.read(10).await.unwrap();
    assert_eq!(buf.coalesce().as_ref(), b"abcdefghij");
    assert!(buf.chunk_count() >= 3, "chunks: {}", buf.chunk_count());

    writer.await.unwrap();
    socket.close().await.unwrap();
}

#[tokio::test]
async fn unconsumed_tail_is_replayed_by_the_next_read() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"0123456789").await.unwrap();
    peer.shutdown().await.unwrap();

    let head = socket.read(4).await.unwrap();
    assert_eq!(head.coalesce().as_ref(), b"0123");

    // The remaining six bytes were already delivered; the second read is
    // served from the replayed tail.
    let rest = socket.read(6).await.unwrap();
    assert_eq!(rest.coalesce().as_ref(), b"456789");
    assert_eq!(rest.chunk_count(), 1);

    socket.close().await.unwrap();
}

#[tokio::test]
async fn read_exactly_returns_a_contiguous_buffer() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"hello world").await.unwrap();

    let exact = socket.read_exactly(5).await.unwrap();
    assert_eq!(exact.as_ref(), b"hello");

    socket.close().await.unwrap();
}

#[tokio::test]
async fn read_exactly_escalates_short_results_to_read_eof() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"abc").await.unwrap();
    peer.shutdown().await.unwrap();

    // A partial prefix is never returned as success.
    let error = socket.read_exactly(5).await.unwrap_err();
    assert!(error.is_read_eof());

    socket.close().await.unwrap();
}

#[tokio::test]
async fn read_exactly_on_an_empty_stream_fails_with_read_eof() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.shutdown().await.unwrap();

    let error = socket.read_exactly(1).await.unwrap_err();
    assert!(error.is_read_eof());

    socket.close().await.unwrap();
}

#[tokio::test]
async fn interleaved_counted_and_exact_reads_share_the_tail() {
    let (mut socket, mut peer) = socket_pair(64);
    peer.write_all(b"abcdefgh").await.unwrap();
    peer.shutdown().await.unwrap();

    let head = socket.read(3).await.unwrap();
    assert_eq!(head.coalesce().as_ref(), b"abc");

    let exact = socket.read_exactly(2).await.unwrap();
    assert_eq!(exact.as_ref(), b"de");

    let rest = socket.read(3).await.unwrap();
    assert_eq!(rest.coalesce().as_ref(), b"fgh");

    socket.close().await.unwrap();
}

#[tokio::test]
async fn writes_are_buffered_until_flush() {
    let (mut socket, mut peer) = socket_pair(1024);

    socket
        .write(BufferList::from(Bytes::from_static(b"ping")))
        .await
        .unwrap();
    socket.flush().await.unwrap();

    let mut received = [0_u8; 4];
    tokio::io::AsyncReadExt::read_exact(&mut peer, &mut received)
        .await
        .unwrap();
    assert_eq!(&received, b"ping");

    socket.close().await.unwrap();
}

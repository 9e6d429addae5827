//! Line-delimited JSON health transport over TCP.
//!
//! # Protocol
//! ```text
//! client → node:  "stream_health\n"
//! node → client:  one JSON HealthReport per line, until EOF
//! ```
//!
//! Blank lines are ignored. EOF is a clean end of stream; a read failure, an
//! undecodable or overlong line, or cancellation ends the stream with an
//! error item and closes the socket.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::io::{AsyncRead, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::topology::Endpoint;
use crate::transport::{HealthDialer, HealthReport, HealthStream, TransportError};

/// Dials nodes over plain TCP.
#[derive(Debug, Clone)]
pub struct TcpDialer {
    connect_timeout: Duration,
    max_line_length: usize,
}

impl TcpDialer {
    /// Registry name of this transport.
    pub const PROTOCOL: &'static str = "tcp";

    /// First line sent after connecting.
    pub const REQUEST_LINE: &'static [u8] = b"stream_health\n";

    /// Longest accepted report line, in bytes.
    pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            max_line_length: Self::DEFAULT_MAX_LINE_LENGTH,
        }
    }

    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }
}

#[async_trait]
impl HealthDialer for TcpDialer {
    type Message = HealthReport;

    async fn open_health_stream(
        &self,
        endpoint: &Endpoint,
        cancel: CancellationToken,
    ) -> Result<HealthStream<HealthReport>, TransportError> {
        let connect = time::timeout(self.connect_timeout, TcpStream::connect(endpoint.to_string()));

        let mut socket = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransportError::Cancelled),
            res = connect => match res {
                Ok(Ok(socket)) => socket,
                Ok(Err(e)) => return Err(TransportError::Connect(e.to_string())),
                Err(_) => return Err(TransportError::ConnectTimeout(self.connect_timeout.as_secs())),
            },
        };

        socket
            .write_all(Self::REQUEST_LINE)
            .await
            .map_err(|e| TransportError::Io(e.to_string()))?;

        tracing::debug!(endpoint = %endpoint, "Health stream connected");

        Ok(report_stream(socket, self.max_line_length, cancel))
    }
}

fn report_stream<R>(
    reader: R,
    max_line_length: usize,
    cancel: CancellationToken,
) -> HealthStream<HealthReport>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let lines = FramedRead::new(reader, LinesCodec::new_with_max_length(max_line_length));

    // `None` state means the stream already yielded its terminal error.
    stream::unfold(Some((lines, cancel)), move |state| async move {
        let Some((mut lines, cancel)) = state else {
            return None;
        };
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Some((Err(TransportError::Cancelled), None)),
                next = lines.next() => next,
            };

            match next {
                Some(Ok(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return match serde_json::from_str::<HealthReport>(line) {
                        Ok(report) => Some((Ok(report), Some((lines, cancel)))),
                        Err(e) => Some((Err(TransportError::Decode(e.to_string())), None)),
                    };
                }
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    let err = TransportError::Decode(format!(
                        "health report line exceeds {} bytes",
                        max_line_length
                    ));
                    return Some((Err(err), None));
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    return Some((Err(TransportError::Io(e.to_string())), None));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accept one connection, check the request line, then write `body`.
    async fn serve_once(body: &'static str) -> Endpoint {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut request = String::new();
            BufReader::new(read).read_line(&mut request).await.unwrap();
            assert_eq!(request.as_bytes(), TcpDialer::REQUEST_LINE);
            write.write_all(body.as_bytes()).await.unwrap();
            write.shutdown().await.unwrap();
        });

        Endpoint::new("127.0.0.1", addr.port())
    }

    #[tokio::test]
    async fn test_streams_reports_until_eof() {
        let endpoint = serve_once(
            "{\"serving\":true}\n\n{\"serving\":false,\"realtime_stats\":{\"health_error\":\"lagging\"}}\n",
        )
        .await;

        let dialer = TcpDialer::new(Duration::from_secs(5));
        let stream = dialer
            .open_health_stream(&endpoint, CancellationToken::new())
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].as_ref().unwrap().serving);
        let second = items[1].as_ref().unwrap();
        assert!(!second.serving);
        assert_eq!(second.realtime_stats.health_error, "lagging");
    }

    #[tokio::test]
    async fn test_bad_line_ends_stream_with_decode_error() {
        let endpoint = serve_once("{\"serving\":true}\nnot json\n{\"serving\":true}\n").await;

        let dialer = TcpDialer::new(Duration::from_secs(5));
        let stream = dialer
            .open_health_stream(&endpoint, CancellationToken::new())
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(TransportError::Decode(_))));
    }

    #[tokio::test]
    async fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let dialer = TcpDialer::new(Duration::from_secs(5));
        let err = dialer
            .open_health_stream(&Endpoint::new("127.0.0.1", port), CancellationToken::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Connect(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_connect() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let dialer = TcpDialer::new(Duration::from_secs(5));
        let err = dialer
            .open_health_stream(&Endpoint::new("127.0.0.1", 1), cancel)
            .await
            .err()
            .unwrap();
        assert_eq!(err, TransportError::Cancelled);
    }

    #[tokio::test]
    async fn test_cancel_after_connect_closes_stream() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (closed_tx, closed_rx) = oneshot::channel();

        // A silent node that reports when the client hangs up.
        tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut reader = BufReader::new(socket);
            let mut request = String::new();
            reader.read_line(&mut request).await.unwrap();
            let mut rest = Vec::new();
            let _ = reader.read_to_end(&mut rest).await;
            let _ = closed_tx.send(());
        });

        let cancel = CancellationToken::new();
        let dialer = TcpDialer::new(Duration::from_secs(5));
        let mut stream = dialer
            .open_health_stream(&Endpoint::new("127.0.0.1", port), cancel.clone())
            .await
            .unwrap();

        cancel.cancel();
        let item = time::timeout(Duration::from_millis(500), stream.next())
            .await
            .expect("stream ignored cancellation");
        assert!(matches!(item, Some(Err(TransportError::Cancelled))));
        assert!(stream.next().await.is_none());

        drop(stream);
        time::timeout(Duration::from_secs(1), closed_rx)
            .await
            .expect("connection left open")
            .unwrap();
    }

    #[tokio::test]
    async fn test_overlong_line_is_a_decode_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(&[b'x'; 256]).await.unwrap();
            // Never send the newline.
            time::sleep(Duration::from_secs(5)).await;
        });

        let dialer = TcpDialer::new(Duration::from_secs(5)).with_max_line_length(64);
        let mut stream = dialer
            .open_health_stream(&Endpoint::new("127.0.0.1", port), CancellationToken::new())
            .await
            .unwrap();

        let item = time::timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("overlong line not detected");
        assert!(matches!(item, Some(Err(TransportError::Decode(_)))));
        assert!(stream.next().await.is_none());
    }
}

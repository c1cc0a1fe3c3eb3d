use futures::{Stream, StreamExt};
use thiserror::Error;

/// Bytes collected by [`read_max`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounded {
    pub bytes: Vec<u8>,
    /// The limit was reached. The stream may hold more data that was never read.
    pub exceeded: bool,
}

/// A read failed before the limit or the end of the stream was reached.
#[derive(Debug, Error)]
#[error("stream failed after {} bytes: {source}", .partial.len())]
pub struct ReadMaxError<E: std::error::Error + 'static> {
    pub partial: Vec<u8>,
    #[source]
    pub source: E,
}

/// Collect at most `max_bytes` from a chunked byte stream.
///
/// Reaching the limit counts as exceeded even when the stream would have
/// ended right there, so a body of exactly `max_bytes` is rejected by callers
/// that treat `exceeded` as an error.
pub async fn read_max<S, B, E>(stream: S, max_bytes: usize) -> Result<Bounded, ReadMaxError<E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::error::Error + 'static,
{
    let mut stream = std::pin::pin!(stream);
    let mut buf = Vec::with_capacity(max_bytes.min(8 * 1024));

    while buf.len() < max_bytes {
        match stream.next().await {
            Some(Ok(chunk)) => {
                let chunk = chunk.as_ref();
                let take = chunk.len().min(max_bytes - buf.len());
                buf.extend_from_slice(&chunk[..take]);
            }
            Some(Err(source)) => {
                return Err(ReadMaxError {
                    partial: buf,
                    source,
                })
            }
            None => {
                return Ok(Bounded {
                    bytes: buf,
                    exceeded: false,
                })
            }
        }
    }

    Ok(Bounded {
        bytes: buf,
        exceeded: true,
    })
}

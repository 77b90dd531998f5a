//! Size-limited success bodies and one-shot draining.

use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::BodyExt;
use pin_project_lite::pin_project;
use tracing::warn;

use crate::transport::{BoxError, TransportBody};

/// Default cap on a success response body: 5 MiB.
pub const DEFAULT_MAX_RESPONSE_SIZE: u64 = 5 * 1024 * 1024;

pin_project! {
    /// A body that yields at most `limit` bytes of data and then ends.
    ///
    /// Unlike [`http_body_util::Limited`], going over the limit is not an
    /// error: the frame that crosses it is cut short and the stream ends.
    /// The JSON decoder downstream will then fail on the truncated document.
    #[derive(Debug)]
    pub struct LimitedBody<B> {
        #[pin]
        inner: B,
        limit: u64,
        remaining: u64,
    }
}

impl<B> LimitedBody<B> {
    /// Limit `inner` to `limit` bytes.
    #[must_use]
    pub fn new(inner: B, limit: u64) -> Self {
        Self {
            inner,
            limit,
            remaining: limit,
        }
    }

    /// The configured limit.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Bytes that may still be yielded.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl<B> Body for LimitedBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.project();
        if *this.remaining == 0 {
            return Poll::Ready(None);
        }

        let frame = match ready!(this.inner.poll_frame(cx)) {
            Some(Ok(frame)) => frame,
            other => return Poll::Ready(other),
        };

        match frame.into_data() {
            Ok(mut data) => {
                let len = u64::try_from(data.len()).unwrap_or(u64::MAX);
                if len > *this.remaining {
                    data.truncate(usize::try_from(*this.remaining).unwrap_or(usize::MAX));
                    *this.remaining = 0;
                } else {
                    *this.remaining -= len;
                }
                Poll::Ready(Some(Ok(Frame::data(data))))
            }
            Err(frame) => Poll::Ready(Some(Ok(frame))),
        }
    }

    fn is_end_stream(&self) -> bool {
        self.remaining == 0 || self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        let inner = self.inner.size_hint();
        let mut hint = SizeHint::new();
        hint.set_lower(inner.lower().min(self.remaining));
        hint.set_upper(inner.upper().map_or(self.remaining, |upper| upper.min(self.remaining)));
        hint
    }
}

/// Body of a successful response, capped at the dispatcher's size limit.
pub type ResponseBody = LimitedBody<TransportBody>;

impl LimitedBody<TransportBody> {
    /// Read the (possibly truncated) body into memory.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if reading a frame fails.
    pub async fn collect_bytes(self) -> Result<Bytes, BoxError> {
        Ok(self.collect().await?.to_bytes())
    }
}

/// Consume `body` to the end, exactly once.
///
/// A read failure is logged and yields an empty buffer: callers on the error
/// path must never fail because the error body could not be read.
pub(crate) async fn drain<B>(body: B) -> Bytes
where
    B: Body<Data = Bytes>,
    B::Error: std::fmt::Display,
{
    match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!(error = %err, "failed to drain response body");
            Bytes::new()
        }
    }
}

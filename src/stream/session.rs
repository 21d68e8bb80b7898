// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Bytes;
use chrono::Local;
use futures::future::FutureExt;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, info_span, warn};
use tracing_futures::Instrument;

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::camera::{Acquisition, Hardware};
use crate::error::PipelineError;
use crate::metrics::HotspotQueue;
use crate::pipeline::FramePipeline;
use crate::render::resize::Method;
use crate::render::RenderSettings;
use crate::util::flatten_join_result;

use super::jpeg::encode_jpeg;
use super::mjpeg::frame_part;

/// Where a client connection is in its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionState {
    /// The response has been created, but no frame has been requested yet.
    Accepted,
    /// Frames are being sent.
    Streaming,
    /// The session ended before it started streaming.
    Closed,
    /// The session ended because of an error, including the client going away.
    Failed,
}

/// Everything client sessions share.
pub(crate) struct StreamContext {
    hardware: Arc<Hardware>,
    pipeline: Arc<FramePipeline>,
    display_size: (u32, u32),
    resize_method: Method,
    jpeg_quality: u8,
    metrics: Option<HotspotQueue>,
    next_id: AtomicU64,
    active_clients: AtomicUsize,
    failed_clients: AtomicUsize,
}

impl StreamContext {
    pub(crate) fn new(
        hardware: Arc<Hardware>,
        settings: &RenderSettings,
        metrics: Option<HotspotQueue>,
    ) -> Self {
        Self {
            hardware,
            pipeline: Arc::new(FramePipeline::new(settings)),
            display_size: settings.display_size(),
            resize_method: settings.resize_method,
            jpeg_quality: settings.jpeg_quality,
            metrics,
            next_id: AtomicU64::new(0),
            active_clients: AtomicUsize::new(0),
            failed_clients: AtomicUsize::new(0),
        }
    }

    /// The number of sessions that have not ended yet.
    pub(crate) fn active_clients(&self) -> usize {
        self.active_clients.load(Ordering::SeqCst)
    }

    /// The number of sessions that ended in [`SessionState::Failed`].
    pub(crate) fn failed_clients(&self) -> usize {
        self.failed_clients.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for StreamContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamContext")
            .field("hardware", &self.hardware)
            .field("display_size", &self.display_size)
            .field("resize_method", &self.resize_method)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("metrics", &self.metrics)
            .field("active_clients", &self.active_clients())
            .field("failed_clients", &self.failed_clients())
            .finish()
    }
}

/// One client's MJPEG stream.
///
/// Every frame is captured, rendered and encoded for this client alone. Capture errors are
/// retried until a capture succeeds, any other error ends the session. Dropping a session that is
/// still streaming means the client went away, which also counts as a failure.
#[derive(Debug)]
pub(crate) struct ClientSession {
    id: u64,
    context: Arc<StreamContext>,
    state: SessionState,
}

impl ClientSession {
    pub(crate) fn accept(context: &Arc<StreamContext>) -> Self {
        let id = context.next_id.fetch_add(1, Ordering::SeqCst);
        let active = context.active_clients.fetch_add(1, Ordering::SeqCst) + 1;
        info!(client = id, active_clients = active, "client connected");
        Self {
            id,
            context: Arc::clone(context),
            state: SessionState::Accepted,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    /// Capture from both cameras, retrying until it works.
    async fn acquire(&self) -> Acquisition {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            let result = self
                .context
                .hardware
                .acquire(self.context.display_size, self.context.resize_method)
                .await;
            match result {
                Ok(acquisition) => {
                    if attempt > 1 {
                        debug!(client = self.id, attempt, "capture succeeded after retrying");
                    }
                    return acquisition;
                }
                Err(err) => {
                    warn!(client = self.id, attempt, "Dropping frame: {}", err);
                }
            }
        }
    }

    async fn encode(&self, acquisition: Acquisition) -> Result<Bytes, PipelineError> {
        let pipeline = Arc::clone(&self.context.pipeline);
        let quality = self.context.jpeg_quality;
        spawn_blocking(move || {
            let frame = pipeline.render(acquisition, &Local::now())?;
            encode_jpeg(&frame, quality).map_err(PipelineError::Encode)
        })
        .map(flatten_join_result)
        .await
    }

    /// Produce the next part of the multipart stream.
    pub(crate) async fn next_part(&mut self) -> Result<Bytes, PipelineError> {
        if self.state == SessionState::Accepted {
            self.state = SessionState::Streaming;
        }
        let acquisition = self.acquire().await;
        let hotspot = acquisition.hotspot();
        let jpeg = self.encode(acquisition).await?;
        if let Some(metrics) = &self.context.metrics {
            metrics.submit(hotspot);
        }
        Ok(frame_part(&jpeg))
    }

    /// Turn this session into a stream of multipart body chunks.
    ///
    /// The stream ends with the first pipeline error, which is also yielded so the connection is
    /// torn down instead of finishing cleanly.
    pub(crate) fn into_stream(self) -> BoxStream<'static, Result<Bytes, PipelineError>> {
        let span = info_span!("mjpeg_client", client = self.id);
        stream::unfold(Some(self), |session| async move {
            let mut session = session?;
            match session.next_part().await {
                Ok(part) => Some((Ok(part), Some(session))),
                Err(err) => {
                    error!(client = session.id, "Ending stream: {}", err);
                    session.state = SessionState::Failed;
                    Some((Err(err), None))
                }
            }
        })
        .instrument(span)
        .boxed()
    }
}

impl Drop for ClientSession {
    fn drop(&mut self) {
        match self.state {
            SessionState::Accepted => self.state = SessionState::Closed,
            SessionState::Streaming => {
                warn!(client = self.id, "client disconnected while streaming");
                self.state = SessionState::Failed;
            }
            SessionState::Closed | SessionState::Failed => (),
        }
        if self.state == SessionState::Failed {
            self.context.failed_clients.fetch_add(1, Ordering::SeqCst);
        }
        let active = self.context.active_clients.fetch_sub(1, Ordering::SeqCst) - 1;
        info!(
            client = self.id,
            state = ?self.state,
            active_clients = active,
            "client session ended"
        );
    }
}

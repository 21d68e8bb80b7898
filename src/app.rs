// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use futures::future::{Future, FutureExt};
use futures::ready;
use futures::stream::{FuturesUnordered, Stream};
use pin_project::pin_project;
use tracing::{debug, info, info_span};
use tracing_futures::Instrument;

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::camera::Hardware;
use crate::metrics::{self, HotspotQueue, HotspotRecorder, MetricsSettings, MqttSink};
use crate::settings::Settings;
use crate::stream::{self, StreamContext};
use crate::util::flatten_join_result;

type InnerTask = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;
type TaskList = FuturesUnordered<InnerTask>;

/// The running application: the stream server and, if configured, the metrics connection.
///
/// Resolves when any of its tasks does, which normally only happens on error.
#[pin_project]
pub(crate) struct App {
    address: SocketAddr,
    context: Arc<StreamContext>,
    #[pin]
    tasks: TaskList,
}

impl App {
    /// Open the cameras and start listening for clients. Must be called within a Tokio runtime.
    pub(crate) fn new(config: Settings) -> anyhow::Result<Self> {
        let sensor = config
            .thermal
            .create_sensor()
            .context("Error configuring thermal sensor")?;
        let camera = config.visible.create_camera();
        let hardware = Arc::new(Hardware::new(
            sensor,
            camera,
            config.thermal.orientation(),
        ));
        debug!(?hardware, "opened cameras");
        let tasks = TaskList::new();
        let hotspots = config
            .metrics
            .as_ref()
            .map(|settings| Self::create_metrics(settings, &tasks));
        let context = Arc::new(StreamContext::new(hardware, &config.render, hotspots));
        let (address, server) = stream::bind(&config.streams, Arc::clone(&context))
            .context("Error creating video stream")?;
        tasks.push(server.map(Ok).boxed());
        Ok(Self {
            address,
            context,
            tasks,
        })
    }

    fn create_metrics(settings: &MetricsSettings, tasks: &TaskList) -> HotspotQueue {
        let host = settings.host.clone().unwrap_or_else(metrics::host_name);
        info!(server = %settings.server.host(), %host, "recording hotspot metrics");
        let (sink, event_loop) = MqttSink::new(settings);
        let event_loop_task = tokio::spawn(
            metrics::run_event_loop(event_loop).instrument(info_span!("mqtt_event_loop")),
        )
        .map(flatten_join_result)
        .boxed();
        tasks.push(event_loop_task);
        let (queue, recorder) =
            HotspotRecorder::new(Arc::new(sink), &settings.base_topic, &host).into_queue();
        let recorder_task = tokio::spawn(recorder.instrument(info_span!("hotspot_recorder")))
            .map(flatten_join_result)
            .boxed();
        tasks.push(recorder_task);
        queue
    }

    /// The address the stream server is listening on.
    pub(crate) fn address(&self) -> SocketAddr {
        self.address
    }

    pub(crate) fn active_clients(&self) -> usize {
        self.context.active_clients()
    }
}

impl Future for App {
    type Output = anyhow::Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        Poll::Ready(loop {
            if let Some(res) = ready!(this.tasks.as_mut().poll_next(cx)) {
                debug!(result = ?res, "App terminating");
                break res;
            }
        })
    }
}

#[cfg(test)]
mod test {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::{timeout, Duration};

    use super::App;
    use crate::settings::Settings;

    #[tokio::test]
    async fn serves_synthetic_cameras() {
        let source = r#"
            [thermal]
            kind = "synthetic"
            width = 8
            height = 6

            [visible]
            kind = "solid"
            width = 64
            height = 48

            [render]
            width = 64
            height = 48
            text_scale = 1

            [streams]
            address = "127.0.0.1"
            port = 0
        "#;
        let config: Settings = toml::from_str(source).unwrap();
        let app = App::new(config).unwrap();
        let address = app.address();
        assert_ne!(address.port(), 0);
        let running = tokio::spawn(app);
        let mut client = TcpStream::connect(address).await.unwrap();
        client
            .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        timeout(Duration::from_secs(20), async {
            while !received
                .windows(b"Content-type: image/jpeg".len())
                .any(|window| window == b"Content-type: image/jpeg")
            {
                let read = client.read(&mut buf).await.unwrap();
                assert_ne!(read, 0);
                received.extend_from_slice(&buf[..read]);
            }
        })
        .await
        .expect("timed out waiting for a frame");
        running.abort();
    }
}

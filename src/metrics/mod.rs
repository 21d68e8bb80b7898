// SPDX-License-Identifier: GPL-3.0-or-later
use async_trait::async_trait;
use futures::future::Future;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, trace, warn};

use std::fmt;
use std::fs;
use std::sync::Arc;

use crate::camera::Extremum;
use crate::temperature::Centikelvin;

mod mqtt;
mod settings;

pub(crate) use mqtt::{run_event_loop, MqttSink};
pub(crate) use settings::MetricsSettings;

/// How many hotspots may wait for the sink before new ones are dropped.
const HOTSPOT_BACKLOG: usize = 8;

/// Somewhere to keep numeric samples.
#[async_trait]
pub(crate) trait MetricSink: fmt::Debug + Send + Sync {
    async fn store(&self, name: &str, value: f64) -> anyhow::Result<()>;
}

/// The name of this machine, as the kernel knows it.
pub(crate) fn host_name() -> String {
    match fs::read_to_string("/proc/sys/kernel/hostname") {
        Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
        Ok(_) => "localhost".to_string(),
        Err(err) => {
            debug!(error = %err, "unable to read host name, using 'localhost'");
            "localhost".to_string()
        }
    }
}

/// Records where the hottest point of each frame is, and how hot it is in Fahrenheit.
#[derive(Clone, Debug)]
pub(crate) struct HotspotRecorder {
    sink: Arc<dyn MetricSink>,
    prefix: String,
}

impl HotspotRecorder {
    pub(crate) fn new(sink: Arc<dyn MetricSink>, base: &str, host: &str) -> Self {
        Self {
            sink,
            prefix: format!("{}.{}.temperature_f.01", base, host),
        }
    }

    /// Store the peak column, row and temperature.
    ///
    /// Failures are logged, and do not stop the remaining samples from being stored.
    pub(crate) async fn record(&self, hotspot: Extremum) {
        let samples = [
            (
                format!("{}.max_pos_x", self.prefix),
                f64::from(hotspot.location.x),
            ),
            (
                format!("{}.max_pos_y", self.prefix),
                f64::from(hotspot.location.y),
            ),
            (
                self.prefix.clone(),
                Centikelvin::from(hotspot.value).in_fahrenheit(),
            ),
        ];
        for (name, value) in samples.iter() {
            if let Err(err) = self.sink.store(name, *value).await {
                warn!(metric = %name, "Unable to store metric: {:#}", err);
            }
        }
    }

    /// Split the recorder into a queue for frames to submit hotspots to, and the task that
    /// records them one at a time.
    ///
    /// The task finishes once every clone of the queue has been dropped.
    pub(crate) fn into_queue(self) -> (HotspotQueue, impl Future<Output = anyhow::Result<()>>) {
        let (sender, mut receiver) = mpsc::channel(HOTSPOT_BACKLOG);
        let task = async move {
            while let Some(hotspot) = receiver.recv().await {
                self.record(hotspot).await;
            }
            debug!("hotspot queue closed");
            Ok::<_, anyhow::Error>(())
        };
        (HotspotQueue { sender }, task)
    }
}

/// The sending half of a [`HotspotRecorder`]. Submitting never waits on the sink.
#[derive(Clone, Debug)]
pub(crate) struct HotspotQueue {
    sender: mpsc::Sender<Extremum>,
}

impl HotspotQueue {
    pub(crate) fn submit(&self, hotspot: Extremum) {
        match self.sender.try_send(hotspot) {
            Ok(()) => (),
            Err(TrySendError::Full(_)) => trace!("metrics backlog full, dropping hotspot"),
            Err(TrySendError::Closed(_)) => debug!("metrics recorder stopped, dropping hotspot"),
        }
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use serde_json::json;
use tokio::time::{sleep, Duration};
use tracing::{debug, trace, warn};

use std::fmt;

use super::settings::MetricsSettings;
use super::MetricSink;

/// Capacity of the queue between [`MqttSink`] and the event loop.
const REQUEST_CAPACITY: usize = 32;
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Publishes each sample as a small JSON document, on a topic derived from the metric name.
#[derive(Clone)]
pub(crate) struct MqttSink {
    client: AsyncClient,
}

impl MqttSink {
    /// Create a sink, and the event loop that has to be driven for anything to be sent.
    pub(crate) fn new(settings: &MetricsSettings) -> (Self, EventLoop) {
        let mut options = MqttOptions::new(
            settings.client_id.clone(),
            settings.server.host(),
            settings.server.port(),
        );
        // rumqttc refuses keep-alive intervals under five seconds.
        options.set_keep_alive(settings.keep_alive.max(5));
        if let Some(username) = &settings.username {
            options.set_credentials(
                username.clone(),
                settings.password.clone().unwrap_or_default(),
            );
        }
        let (client, event_loop) = AsyncClient::new(options, REQUEST_CAPACITY);
        (Self { client }, event_loop)
    }
}

/// The topic a metric is published on, one level per dotted component.
pub(crate) fn topic_for(name: &str) -> String {
    name.replace('.', "/")
}

/// The point stored for each sample.
pub(crate) fn point_for(name: &str, value: f64) -> serde_json::Value {
    json!({
        "measurement": name,
        "tags": {
            "sensor": name,
        },
        "fields": {
            "value": value,
        },
    })
}

#[async_trait]
impl MetricSink for MqttSink {
    async fn store(&self, name: &str, value: f64) -> anyhow::Result<()> {
        let payload = serde_json::to_vec(&point_for(name, value))?;
        let topic = topic_for(name);
        trace!(%topic, value, "publishing metric");
        // Fails immediately when the request queue is full (e.g. the server is unreachable).
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)
            .map_err(anyhow::Error::from)
    }
}

impl fmt::Debug for MqttSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttSink").finish()
    }
}

/// Drive the MQTT connection forever, reconnecting after errors.
pub(crate) async fn run_event_loop(mut event_loop: EventLoop) -> anyhow::Result<()> {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                debug!(?ack, "connected to MQTT server");
            }
            Ok(event) => trace!(?event, "MQTT event"),
            Err(err) => {
                warn!(
                    "MQTT connection error, retrying in {:?}: {}",
                    RECONNECT_DELAY, err
                );
                sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

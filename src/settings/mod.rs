// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use serde::Deserialize;

use std::fs;
use std::path::Path;

mod cli;

use crate::camera::{ThermalSettings, VisibleSettings};
use crate::metrics::MetricsSettings;
use crate::render::RenderSettings;
use crate::stream::StreamSettings;
pub(crate) use cli::Args;

#[derive(Debug, Deserialize, PartialEq)]
pub(crate) struct Settings {
    /// The thermal sensor.
    pub(crate) thermal: ThermalSettings,

    /// The visible light camera.
    pub(crate) visible: VisibleSettings,

    /// Settings related to how the two images are combined.
    #[serde(default)]
    pub(crate) render: RenderSettings,

    /// Settings related to the HTTP server for the video stream.
    #[serde(default)]
    pub(crate) streams: StreamSettings,

    /// Where to send hotspot samples. Nothing is sent if not given.
    #[serde(default)]
    pub(crate) metrics: Option<MetricsSettings>,
}

impl Settings {
    pub(crate) fn from_path(path: &Path) -> anyhow::Result<Self> {
        let config_data = fs::read_to_string(path)
            .with_context(|| format!("Unable to read configuration file {}", path.display()))?;
        toml::from_str(&config_data)
            .with_context(|| format!("Unable to parse configuration file {}", path.display()))
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
mod acquisition;
mod i2c;
mod settings;
mod synthetic;
mod thermal_camera;
mod visible;

pub(crate) use acquisition::{Acquisition, Extremum, Hardware, PixelLocation};
pub(crate) use settings::{ThermalSettings, VisibleSettings};

#[cfg(test)]
pub(crate) use i2c::Bus;
#[cfg(test)]
pub(crate) use settings::Orientation;
#[cfg(test)]
pub(crate) use synthetic::SyntheticSensor;
#[cfg(test)]
pub(crate) use thermal_camera::ThermalSensor;
#[cfg(test)]
pub(crate) use visible::{SolidCamera, VisibleCamera};

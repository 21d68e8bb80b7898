// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::error::Error as StdError;

use anyhow::{anyhow, Context as _};
use embedded_hal::blocking::i2c;
use image::imageops;

use crate::image_buffer::RawThermalSample;
use crate::temperature::Centikelvin;

/// The operations a thermal sensor needs to support.
///
/// Captures block until the sensor has produced a sample (or failed to).
pub(crate) trait ThermalSensor {
    /// Read one sample from the sensor, in centikelvin.
    fn capture(&mut self) -> anyhow::Result<RawThermalSample>;
}

/// Build a raw sample from row-major temperatures in degrees Celsius.
pub(crate) fn sample_from_celsius<I>(width: u32, height: u32, celsius: I) -> anyhow::Result<RawThermalSample>
where
    I: IntoIterator<Item = f32>,
{
    let samples: Vec<u16> = celsius
        .into_iter()
        .map(|c| Centikelvin::from_celsius(f64::from(c)).as_sample())
        .collect();
    let sample_count = samples.len();
    RawThermalSample::from_raw(width, height, samples).ok_or_else(|| {
        anyhow!(
            "{} temperatures do not fill a {}x{} sample",
            sample_count,
            width,
            height
        )
    })
}

impl<I2C> ThermalSensor for amg88::GridEye<I2C>
where
    I2C: i2c::WriteRead,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
{
    fn capture(&mut self) -> anyhow::Result<RawThermalSample> {
        let grid = self.image().context("Error reading image from GridEYE")?;
        let (row_count, col_count) = grid.dim();
        // Logical iteration order is row-major regardless of the memory layout.
        let mut sample =
            sample_from_celsius(col_count as u32, row_count as u32, grid.iter().copied())?;
        // The GridEYE reports images with the Y-axis pointing up.
        imageops::flip_vertical_in_place(&mut sample);
        Ok(sample)
    }
}

pub(crate) struct Mlx90640<I2C> {
    camera: mlx9064x::Mlx90640Driver<I2C>,
    temperature_buffer: Vec<f32>,
}

impl<I2C> Mlx90640<I2C>
where
    I2C: 'static + i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
    <I2C as i2c::Write>::Error: 'static + StdError + Sync + Send,
{
    pub(crate) fn new(
        camera: mlx9064x::Mlx90640Driver<I2C>,
        frame_rate: mlx9064x::FrameRate,
    ) -> anyhow::Result<Self> {
        let num_pixels = camera.height() * camera.width();
        let mut sensor = Self {
            camera,
            temperature_buffer: vec![0f32; num_pixels],
        };
        sensor
            .camera
            .set_frame_rate(frame_rate)
            .context("Error setting camera frame rate")?;
        Ok(sensor)
    }
}

impl<I2C> ThermalSensor for Mlx90640<I2C>
where
    I2C: 'static + i2c::WriteRead + i2c::Write,
    <I2C as i2c::WriteRead>::Error: 'static + StdError + Sync + Send,
    <I2C as i2c::Write>::Error: 'static + StdError + Sync + Send,
{
    fn capture(&mut self) -> anyhow::Result<RawThermalSample> {
        // If a new frame isn't ready yet, the buffer still holds the previous one.
        self.camera
            .generate_image_if_ready(&mut self.temperature_buffer)
            .context("Error reading image from MLX90640")?;
        // mlx9064x uses row-major ordering, so no swapping needed here.
        sample_from_celsius(
            u32::try_from(self.camera.width())?,
            u32::try_from(self.camera.height())?,
            self.temperature_buffer.iter().copied(),
        )
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use tracing::trace;

use crate::image_buffer::RawThermalSample;
use crate::temperature::Centikelvin;

use super::thermal_camera::ThermalSensor;

/// Ambient temperature of the synthetic scene, in Celsius.
const AMBIENT: f64 = 20.0;
/// How much warmer than ambient the centre of the hot spot is, in Celsius.
const HOT_SPOT_DELTA: f64 = 15.0;

/// A thermal sensor without any hardware behind it.
///
/// Every capture produces a scene at room temperature with a single warm spot that sweeps across
/// the frame, one pixel per capture.
#[derive(Clone, Debug)]
pub(crate) struct SyntheticSensor {
    width: u32,
    height: u32,
    frame: u64,
}

impl SyntheticSensor {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frame: 0,
        }
    }

    /// Where the hot spot will be for the given frame number.
    fn hot_spot(&self, frame: u64) -> (f64, f64) {
        let x = frame % u64::from(self.width.max(1));
        let y = (frame / u64::from(self.width.max(1))) % u64::from(self.height.max(1));
        (x as f64, y as f64)
    }
}

impl ThermalSensor for SyntheticSensor {
    fn capture(&mut self) -> anyhow::Result<RawThermalSample> {
        let (spot_x, spot_y) = self.hot_spot(self.frame);
        // Roughly a quarter of the shorter side.
        let sigma = (f64::from(self.width.min(self.height)) / 4.0).max(1.0);
        let sample = RawThermalSample::from_fn(self.width, self.height, |x, y| {
            let distance_squared =
                (f64::from(x) - spot_x).powi(2) + (f64::from(y) - spot_y).powi(2);
            let celsius =
                AMBIENT + HOT_SPOT_DELTA * (-distance_squared / (2.0 * sigma * sigma)).exp();
            image::Luma([Centikelvin::from_celsius(celsius).as_sample()])
        });
        trace!(frame = self.frame, spot_x, spot_y, "generated synthetic sample");
        self.frame = self.frame.wrapping_add(1);
        Ok(sample)
    }
}

#[cfg(test)]
mod test {
    use super::{SyntheticSensor, ThermalSensor};

    #[test]
    fn hot_spot_is_hottest() {
        let mut sensor = SyntheticSensor::new(8, 6);
        let sample = sensor.capture().unwrap();
        assert_eq!(sample.dimensions(), (8, 6));
        let hottest = sample.pixels().map(|p| p[0]).max().unwrap();
        assert_eq!(sample.get_pixel(0, 0)[0], hottest);
    }

    #[test]
    fn hot_spot_moves() {
        let mut sensor = SyntheticSensor::new(8, 6);
        let first = sensor.capture().unwrap();
        let second = sensor.capture().unwrap();
        assert!(second.get_pixel(1, 0)[0] > first.get_pixel(1, 0)[0]);
        assert_eq!(second.get_pixel(1, 0)[0], first.get_pixel(0, 0)[0]);
    }
}

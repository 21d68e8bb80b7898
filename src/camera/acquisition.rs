// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::task::spawn_blocking;
use tracing::{instrument, trace};

use crate::error::AcquisitionError;
use crate::image_buffer::{RawThermalSample, VisibleImage};
use crate::render::resize::{self, Method};
use crate::util::flatten_join_result;

use super::settings::Orientation;
use super::thermal_camera::ThermalSensor;
use super::visible::VisibleCamera;

/// A pixel position, `x` being the column and `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PixelLocation {
    pub(crate) x: u32,
    pub(crate) y: u32,
}

/// A sample value and where it was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Extremum {
    pub(crate) value: u16,
    pub(crate) location: PixelLocation,
}

/// The coldest and hottest points of a sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Extrema {
    pub(crate) min: Extremum,
    pub(crate) max: Extremum,
}

impl Extrema {
    /// Find the smallest and largest values in a sample. Ties go to the first occurrence in
    /// row-major order.
    ///
    /// Returns `None` for an empty sample.
    pub(crate) fn find(sample: &RawThermalSample) -> Option<Self> {
        let mut pixels = sample.enumerate_pixels();
        let (x, y, first) = pixels.next()?;
        let first = Extremum {
            value: first[0],
            location: PixelLocation { x, y },
        };
        let extrema = pixels.fold(
            Self {
                min: first,
                max: first,
            },
            |mut extrema, (x, y, pixel)| {
                let value = pixel[0];
                if value < extrema.min.value {
                    extrema.min = Extremum {
                        value,
                        location: PixelLocation { x, y },
                    };
                }
                if value > extrema.max.value {
                    extrema.max = Extremum {
                        value,
                        location: PixelLocation { x, y },
                    };
                }
                extrema
            },
        );
        Some(extrema)
    }
}

/// One thermal sample and one visible frame, captured together.
#[derive(Clone, Debug)]
pub(crate) struct Acquisition {
    /// The sample as the sensor reported it.
    pub(crate) raw: RawThermalSample,
    /// The sample resized to the display size.
    pub(crate) display: RawThermalSample,
    pub(crate) visible: VisibleImage,
    /// Extreme values are from the raw sample, their locations are in display coordinates.
    pub(crate) extrema: Extrema,
}

impl Acquisition {
    /// Resize the raw sample to the display size and locate its extremes.
    pub(crate) fn new(
        raw: RawThermalSample,
        visible: VisibleImage,
        display_size: (u32, u32),
        method: Method,
    ) -> Result<Self, AcquisitionError> {
        let empty_sample = || AcquisitionError::Thermal(anyhow!("Sensor returned an empty sample"));
        let raw_extrema = Extrema::find(&raw).ok_or_else(empty_sample)?;
        let (width, height) = display_size;
        let display = resize::resize(&raw, width, height, method);
        let display_extrema = Extrema::find(&display).ok_or_else(empty_sample)?;
        let extrema = Extrema {
            min: Extremum {
                value: raw_extrema.min.value,
                location: display_extrema.min.location,
            },
            max: Extremum {
                value: raw_extrema.max.value,
                location: display_extrema.max.location,
            },
        };
        Ok(Self {
            raw,
            display,
            visible,
            extrema,
        })
    }

    /// The hottest point of the sample.
    pub(crate) fn hotspot(&self) -> Extremum {
        self.extrema.max
    }
}

/// Shared access to the physical cameras.
///
/// Each device sits behind its own lock, held only for the duration of a single capture call. The
/// thermal sensor in particular usually hangs off a slow serial bus and can't handle concurrent
/// reads.
pub(crate) struct Hardware {
    thermal: Mutex<Box<dyn ThermalSensor + Send>>,
    visible: Mutex<Box<dyn VisibleCamera + Send>>,
    orientation: Orientation,
}

impl Hardware {
    pub(crate) fn new(
        thermal: Box<dyn ThermalSensor + Send>,
        visible: Box<dyn VisibleCamera + Send>,
        orientation: Orientation,
    ) -> Self {
        Self {
            thermal: Mutex::new(thermal),
            visible: Mutex::new(visible),
            orientation,
        }
    }

    /// Capture a thermal sample and a visible frame, blocking until both are available.
    pub(crate) fn capture(&self) -> Result<(RawThermalSample, VisibleImage), AcquisitionError> {
        let raw = {
            let mut sensor = self.thermal.lock();
            sensor.capture().map_err(AcquisitionError::Thermal)?
        };
        trace!(width = raw.width(), height = raw.height(), "captured thermal sample");
        let raw = self.orientation.apply(raw);
        let visible = {
            let mut camera = self.visible.lock();
            camera.capture().map_err(AcquisitionError::Visible)?
        };
        trace!(
            width = visible.width(),
            height = visible.height(),
            "captured visible frame"
        );
        Ok((raw, visible))
    }

    /// Capture from both cameras on the blocking thread pool and prepare the result for
    /// rendering.
    #[instrument(level = "trace", skip(self))]
    pub(crate) async fn acquire(
        self: &Arc<Self>,
        display_size: (u32, u32),
        method: Method,
    ) -> Result<Acquisition, AcquisitionError> {
        let hardware = Arc::clone(self);
        spawn_blocking(move || {
            let (raw, visible) = hardware.capture()?;
            Acquisition::new(raw, visible, display_size, method)
        })
        .map(flatten_join_result)
        .await
    }
}

impl fmt::Debug for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The boxed devices aren't Debug.
        f.debug_struct("Hardware")
            .field("orientation", &self.orientation)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use anyhow::anyhow;
    use image::Luma;

    use crate::camera::{Orientation, SolidCamera, ThermalSensor, VisibleCamera};
    use crate::error::AcquisitionError;
    use crate::image_buffer::{RawThermalSample, VisibleImage};
    use crate::render::resize::Method;

    use super::{Acquisition, Extrema, Hardware, PixelLocation};

    fn sample(width: u32, values: Vec<u16>) -> RawThermalSample {
        let height = values.len() as u32 / width;
        RawThermalSample::from_raw(width, height, values).unwrap()
    }

    #[test]
    fn extrema_first_occurrence() {
        let extrema = Extrema::find(&sample(3, vec![5, 1, 9, 9, 1, 5])).unwrap();
        assert_eq!(extrema.min.value, 1);
        assert_eq!(extrema.min.location, PixelLocation { x: 1, y: 0 });
        assert_eq!(extrema.max.value, 9);
        assert_eq!(extrema.max.location, PixelLocation { x: 2, y: 0 });
    }

    #[test]
    fn extrema_empty() {
        assert!(Extrema::find(&RawThermalSample::new(0, 0)).is_none());
    }

    #[test]
    fn locations_in_display_coordinates() {
        let mut raw = RawThermalSample::from_pixel(4, 4, Luma([29000]));
        raw.put_pixel(3, 2, Luma([31000]));
        raw.put_pixel(0, 1, Luma([28000]));
        let visible = SolidCamera::new(8, 8, [0, 0, 0]).capture().unwrap();
        let acquisition = Acquisition::new(raw, visible, (8, 8), Method::Nearest).unwrap();
        assert_eq!(acquisition.display.dimensions(), (8, 8));
        // Values come from the raw sample, locations from the enlarged one.
        let hotspot = acquisition.hotspot();
        assert_eq!(hotspot.value, 31000);
        assert_eq!((hotspot.location.x / 2, hotspot.location.y / 2), (3, 2));
        let coldest = acquisition.extrema.min;
        assert_eq!(coldest.value, 28000);
        assert_eq!((coldest.location.x / 2, coldest.location.y / 2), (0, 1));
    }

    #[test]
    fn empty_sample_is_acquisition_error() {
        let result = Acquisition::new(
            RawThermalSample::new(0, 0),
            VisibleImage::new(1, 1),
            (8, 8),
            Method::Nearest,
        );
        assert!(matches!(result, Err(AcquisitionError::Thermal(_))));
    }

    /// A sensor that fails every other capture.
    struct Alternating(Arc<AtomicUsize>);

    impl ThermalSensor for Alternating {
        fn capture(&mut self) -> anyhow::Result<RawThermalSample> {
            if self.0.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Err(anyhow!("bus error"))
            } else {
                Ok(RawThermalSample::from_pixel(2, 2, Luma([30000])))
            }
        }
    }

    #[tokio::test]
    async fn acquire_reports_sensor_errors() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let hardware = Arc::new(Hardware::new(
            Box::new(Alternating(Arc::clone(&attempts))),
            Box::new(SolidCamera::new(4, 4, [0, 0, 0])),
            Orientation::default(),
        ));
        let first = hardware.acquire((4, 4), Method::Nearest).await;
        assert!(matches!(first, Err(AcquisitionError::Thermal(_))));
        let second = hardware.acquire((4, 4), Method::Nearest).await;
        assert!(second.is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}

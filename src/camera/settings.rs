// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;
use std::fmt;
use std::marker::PhantomData;
use std::path::PathBuf;

use anyhow::Context as _;
use image::imageops;
use linux_embedded_hal::I2cdev;
use serde::de::{Deserialize, Deserializer, Error};
use serde_repr::Deserialize_repr;

use crate::image_buffer::RawThermalSample;

use super::i2c::Bus;
use super::synthetic::SyntheticSensor;
use super::thermal_camera::{Mlx90640, ThermalSensor};
use super::visible::{CommandCamera, FileCamera, SolidCamera, VisibleCamera};

// This enum is purely used to restrict the acceptable values for rotation.
#[derive(Clone, Copy, Deserialize_repr, PartialEq, Debug)]
#[repr(u16)]
pub(crate) enum Rotation {
    Zero = 0,
    Ninety = 90,
    OneEighty = 180,
    TwoSeventy = 270,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::Zero
    }
}

/// How a thermal sensor is mounted relative to the visible camera.
#[derive(Clone, Copy, Default, Debug, PartialEq, serde::Deserialize)]
pub(crate) struct Orientation {
    #[serde(default)]
    rotation: Rotation,

    #[serde(default)]
    flip_horizontal: bool,

    #[serde(default)]
    flip_vertical: bool,
}

impl Orientation {
    /// Flip and rotate a sample so that it lines up with the visible camera.
    pub(crate) fn apply(&self, mut sample: RawThermalSample) -> RawThermalSample {
        if self.flip_vertical {
            imageops::flip_vertical_in_place(&mut sample);
        }
        if self.flip_horizontal {
            imageops::flip_horizontal_in_place(&mut sample);
        }
        match self.rotation {
            Rotation::Zero => sample,
            Rotation::Ninety => imageops::rotate90(&sample),
            Rotation::OneEighty => {
                imageops::rotate180_in_place(&mut sample);
                sample
            }
            Rotation::TwoSeventy => imageops::rotate270(&sample),
        }
    }
}

struct TryFromNum<U>(PhantomData<U>);

impl<U> TryFromNum<U> {
    fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<U>,
        <T as TryFrom<U>>::Error: fmt::Display,
        U: Deserialize<'de>,
    {
        let value: U = U::deserialize(deserializer)?;
        T::try_from(value).map_err(|err| D::Error::custom(err))
    }
}

type TryFromU8 = TryFromNum<u8>;
type TryFromF32 = TryFromNum<f32>;

fn default_grideye_frame_rate() -> amg88::FrameRateValue {
    amg88::FrameRateValue::Fps10
}

fn default_synthetic_width() -> u32 {
    80
}

fn default_synthetic_height() -> u32 {
    60
}

#[derive(Clone, Debug, serde::Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub(crate) enum ThermalSettings {
    GridEye {
        bus: Bus,

        #[serde(deserialize_with = "TryFromU8::deserialize")]
        address: amg88::Address,

        #[serde(
            default = "default_grideye_frame_rate",
            deserialize_with = "TryFromU8::deserialize"
        )]
        frame_rate: amg88::FrameRateValue,

        #[serde(flatten)]
        orientation: Orientation,
    },
    Mlx90640 {
        bus: Bus,
        address: u8,

        #[serde(default, deserialize_with = "TryFromF32::deserialize")]
        frame_rate: mlx9064x::FrameRate,

        #[serde(flatten)]
        orientation: Orientation,
    },
    Synthetic {
        #[serde(default = "default_synthetic_width")]
        width: u32,

        #[serde(default = "default_synthetic_height")]
        height: u32,

        #[serde(flatten)]
        orientation: Orientation,
    },
}

impl ThermalSettings {
    /// How the sensor is mounted.
    pub(crate) fn orientation(&self) -> Orientation {
        match self {
            Self::GridEye { orientation, .. } => *orientation,
            Self::Mlx90640 { orientation, .. } => *orientation,
            Self::Synthetic { orientation, .. } => *orientation,
        }
    }

    /// If the sensor is connected over I2C, this method creates the [I2cdev] for that bus.
    ///
    /// If the sensor does not use I2C, this method returns `None`.
    fn i2c_bus(&self) -> Option<anyhow::Result<I2cdev>> {
        match self {
            Self::GridEye { bus, .. } => Some(bus),
            Self::Mlx90640 { bus, .. } => Some(bus),
            Self::Synthetic { .. } => None,
        }
        .map(|bus| I2cdev::try_from(bus).context("Unable to connect to I2C bus"))
    }

    pub(crate) fn create_sensor(&self) -> anyhow::Result<Box<dyn ThermalSensor + Send>> {
        Ok(match self {
            Self::GridEye {
                address,
                frame_rate,
                ..
            } => {
                let bus = self.i2c_bus().context("GridEYE uses I2C")??;
                let mut camera = amg88::GridEye::new(bus, *address);
                camera
                    .set_frame_rate(*frame_rate)
                    .context("Error setting camera frame rate")?;
                Box::new(camera)
            }
            Self::Mlx90640 {
                address,
                frame_rate,
                ..
            } => {
                let bus = self.i2c_bus().context("MLX90640 uses I2C")??;
                let driver = mlx9064x::Mlx90640Driver::new(bus, *address)
                    .context("Unable to initialize MLX90640")?;
                Box::new(Mlx90640::new(driver, *frame_rate)?)
            }
            Self::Synthetic { width, height, .. } => Box::new(SyntheticSensor::new(*width, *height)),
        })
    }
}

fn default_solid_width() -> u32 {
    800
}

fn default_solid_height() -> u32 {
    480
}

#[derive(Clone, Debug, serde::Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub(crate) enum VisibleSettings {
    /// Run a program that writes an encoded still image to stdout.
    Command {
        program: String,

        #[serde(default)]
        args: Vec<String>,
    },
    /// Decode an image file.
    File { path: PathBuf },
    /// A single color, given as blue, green, red.
    Solid {
        #[serde(default = "default_solid_width")]
        width: u32,

        #[serde(default = "default_solid_height")]
        height: u32,

        #[serde(default)]
        color: [u8; 3],
    },
}

impl VisibleSettings {
    pub(crate) fn create_camera(&self) -> Box<dyn VisibleCamera + Send> {
        match self {
            Self::Command { program, args } => Box::new(CommandCamera::new(program, args)),
            Self::File { path } => Box::new(FileCamera::new(path)),
            Self::Solid {
                width,
                height,
                color,
            } => Box::new(SolidCamera::new(*width, *height, *color)),
        }
    }
}

#[cfg(test)]
mod de_tests {
    use std::path::PathBuf;

    use image::Luma;

    use crate::camera::Bus;
    use crate::image_buffer::RawThermalSample;

    use super::{Orientation, Rotation, ThermalSettings, VisibleSettings};

    #[test]
    fn error_invalid_frame_rate() {
        let source = r#"
        kind = "grideye"
        bus = 1
        address = 0x68
        frame_rate = 20
        "#;
        let parsed: Result<ThermalSettings, _> = toml::from_str(source);
        assert!(
            parsed.is_err(),
            "Accepted invalid frame_rate value:\n{}",
            source
        );
    }

    #[test]
    fn error_invalid_rotation() {
        let source = r#"
        kind = "synthetic"
        rotation = 100
        "#;
        let parsed: Result<ThermalSettings, _> = toml::from_str(source);
        assert!(
            parsed.is_err(),
            "Accepted invalid rotation value:\n{}",
            source
        );
    }

    #[test]
    fn error_bad_kind() {
        let source = r#"
        kind = "NotARealCamera"
        bus = 1
        address = 30
        "#;
        let parsed: Result<ThermalSettings, _> = toml::from_str(source);
        assert!(
            parsed.is_err(),
            "Did not detect invalid camera kind in:\n{}",
            source
        );
    }

    #[test]
    fn grideye_minimal_toml() {
        let source = r#"
        kind = "grideye"
        bus = 1
        address = 0x69
        "#;
        let parsed = toml::from_str(source);
        assert!(parsed.is_ok(), "Unable to parse TOML: {:?}", parsed);
        let parsed: ThermalSettings = parsed.unwrap();
        let expected = ThermalSettings::GridEye {
            bus: Bus::Number(1),
            address: amg88::Address::High,
            frame_rate: amg88::FrameRateValue::Fps10,
            orientation: Orientation::default(),
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn mlx90640_full() {
        let source = r#"
        kind = "mlx90640"
        bus = "/dev/i2c-3"
        address = 0x33
        frame_rate = 8
        rotation = 180
        flip_horizontal = true
        flip_vertical = true
        "#;
        let parsed = toml::from_str(source);
        assert!(parsed.is_ok(), "Unable to parse TOML: {:?}", parsed);
        let parsed: ThermalSettings = parsed.unwrap();
        let expected = ThermalSettings::Mlx90640 {
            bus: Bus::Path(PathBuf::from("/dev/i2c-3")),
            address: 0x33,
            frame_rate: mlx9064x::FrameRate::Eight,
            orientation: Orientation {
                rotation: Rotation::OneEighty,
                flip_horizontal: true,
                flip_vertical: true,
            },
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn synthetic_defaults() {
        let parsed: ThermalSettings = toml::from_str("kind = \"synthetic\"").unwrap();
        assert_eq!(
            parsed,
            ThermalSettings::Synthetic {
                width: 80,
                height: 60,
                orientation: Orientation::default(),
            }
        );
    }

    #[test]
    fn visible_command() {
        let source = r#"
        kind = "command"
        program = "libcamera-still"
        args = ["-n", "-o", "-"]
        "#;
        let parsed: VisibleSettings = toml::from_str(source).unwrap();
        assert_eq!(
            parsed,
            VisibleSettings::Command {
                program: "libcamera-still".to_string(),
                args: vec!["-n".to_string(), "-o".to_string(), "-".to_string()],
            }
        );
    }

    #[test]
    fn visible_solid_defaults() {
        let parsed: VisibleSettings = toml::from_str("kind = \"solid\"").unwrap();
        assert_eq!(
            parsed,
            VisibleSettings::Solid {
                width: 800,
                height: 480,
                color: [0, 0, 0],
            }
        );
    }

    #[test]
    fn visible_file_requires_path() {
        let parsed: Result<VisibleSettings, _> = toml::from_str("kind = \"file\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn orientation_flip_and_rotate() {
        // 2x1 sample: [1, 2]
        let sample = RawThermalSample::from_raw(2, 1, vec![1, 2]).unwrap();
        let flipped = Orientation {
            flip_horizontal: true,
            ..Orientation::default()
        }
        .apply(sample.clone());
        assert_eq!(flipped.as_raw(), &vec![2, 1]);
        let rotated = Orientation {
            rotation: Rotation::Ninety,
            ..Orientation::default()
        }
        .apply(sample);
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(*rotated.get_pixel(0, 0), Luma([1]));
        assert_eq!(*rotated.get_pixel(0, 1), Luma([2]));
    }
}

// SPDX-License-Identifier: GPL-3.0-or-later
use linux_embedded_hal::I2cdev;

use i2cdev::linux::LinuxI2CError;
use serde::de::{self, Deserialize, Deserializer, Visitor};

use std::convert::TryFrom;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::util::parse_int_decimal_hex;

/// An I2C bus, given either as the bus number or as a path to the device node.
///
/// In configuration files the bus number may also be given as a decimal or hexadecimal string.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Bus {
    Number(u32),
    Path(PathBuf),
}

impl From<u32> for Bus {
    fn from(bus: u32) -> Self {
        Self::Number(bus)
    }
}

impl FromStr for Bus {
    type Err = std::convert::Infallible;

    /// Anything that parses as a decimal or hexadecimal number is a bus number, everything else
    /// is a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match parse_int_decimal_hex(s) {
            Ok(number) => Self::Number(number),
            Err(_) => Self::Path(PathBuf::from(s)),
        })
    }
}

struct BusVisitor;

impl<'de> Visitor<'de> for BusVisitor {
    type Value = Bus;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an I2C bus number or device path")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .map(Bus::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u32::try_from(v)
            .map(Bus::from)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        match v.parse::<Bus>() {
            Ok(bus) => Ok(bus),
            Err(never) => match never {},
        }
    }
}

impl<'de> Deserialize<'de> for Bus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(BusVisitor)
    }
}

impl TryFrom<&Bus> for I2cdev {
    type Error = LinuxI2CError;

    fn try_from(bus: &Bus) -> Result<Self, Self::Error> {
        let device_path = match bus {
            Bus::Number(n) => PathBuf::from(format!("/dev/i2c-{}", n)),
            Bus::Path(p) => p.clone(),
        };
        I2cdev::new(device_path)
    }
}

#[cfg(test)]
mod test {
    use serde::Deserialize;

    use std::path::PathBuf;

    use super::Bus;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        bus: Bus,
    }

    fn parse_bus(source: &str) -> Result<Bus, toml::de::Error> {
        toml::from_str::<Wrapper>(source).map(|wrapper| wrapper.bus)
    }

    #[test]
    fn deserialize_number() {
        assert_eq!(parse_bus("bus = 3").unwrap(), Bus::Number(3));
    }

    #[test]
    fn deserialize_hex_string() {
        assert_eq!(parse_bus(r#"bus = "0x1""#).unwrap(), Bus::Number(1));
        assert_eq!(parse_bus(r#"bus = "12""#).unwrap(), Bus::Number(12));
    }

    #[test]
    fn deserialize_path() {
        assert_eq!(
            parse_bus(r#"bus = "/dev/i2c-1""#).unwrap(),
            Bus::Path(PathBuf::from("/dev/i2c-1"))
        );
    }

    #[test]
    fn deserialize_negative() {
        assert!(parse_bus("bus = -1").is_err());
    }

    #[test]
    fn bus_from_num() {
        assert_eq!(Bus::from(0), Bus::Number(0))
    }

    #[test]
    fn bus_num_from_decimal_string() {
        let bus: Result<Bus, _> = "0".parse();
        assert!(bus.is_ok());
        let bus = bus.unwrap();
        assert_eq!(bus, Bus::Number(0))
    }

    #[test]
    fn bus_num_from_hex_string() {
        let bus: Result<Bus, _> = "0x68".parse();
        assert!(bus.is_ok());
        let bus = bus.unwrap();
        assert_eq!(bus, Bus::Number(0x68))
    }

    #[test]
    fn bus_path_from_string() {
        let bus: Result<Bus, _> = "/dev/i2c-0".parse();
        assert!(bus.is_ok());
        let bus = bus.unwrap();
        assert_eq!(bus, Bus::Path(PathBuf::from("/dev/i2c-0")))
    }
}

//! Serde support
//!
//! Deserialisation goes through the same checks as the constructors, so a
//! malformed document yields an error instead of an out-of-domain config.

use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::types::{FlowControl, Parity, UartConfig};
use crate::error::ConfigurationError;

/// On-the-wire shape of a [`UartConfig`], before validation
#[derive(Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawUartConfig {
    bits: u8,
    parity: Parity,
    stop_bits: u8,
    baud: u32,
    flow_control: FlowControl,
}

impl Default for RawUartConfig {
    fn default() -> Self {
        UartConfig::default().into()
    }
}

impl From<UartConfig> for RawUartConfig {
    fn from(config: UartConfig) -> Self {
        Self {
            bits: config.bits(),
            parity: config.parity(),
            stop_bits: config.stop_bits(),
            baud: config.baud(),
            flow_control: config.flow_control(),
        }
    }
}

impl Serialize for UartConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawUartConfig::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UartConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawUartConfig::deserialize(deserializer)?;
        UartConfig::new(
            raw.bits,
            raw.parity,
            raw.stop_bits,
            raw.baud,
            raw.flow_control,
        )
        .map_err(de::Error::custom)
    }
}

/// Visitor for enums spelled as their names or numeric discriminants
struct NameVisitor<T>(PhantomData<T>);

impl<T> Visitor<'_> for NameVisitor<T>
where
    T: FromStr<Err = ConfigurationError> + TryFrom<u8, Error = ConfigurationError>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mode name or its discriminant")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        let discriminant =
            u8::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))?;
        T::try_from(discriminant).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        let v = u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))?;
        self.visit_u64(v)
    }
}

impl Serialize for Parity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Parity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(NameVisitor(PhantomData))
    }
}

impl Serialize for FlowControl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FlowControl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(NameVisitor(PhantomData))
    }
}

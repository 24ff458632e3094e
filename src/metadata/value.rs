//! Typed metadata values
//!
//! A `Value` keeps the raw bytes of a TIFF field exactly as they were read,
//! together with the field type and the byte order they are encoded in.
//! Components are decoded on demand.

use std::fmt;

use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::field_types;
use crate::utils::{string_utils, tag_utils};

/// A typed, possibly multi-component metadata value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    field_type: u16,
    count: u64,
    data: Vec<u8>,
    byte_order: ByteOrder,
}

impl Value {
    /// Wraps raw field bytes
    pub fn new(field_type: u16, count: u64, data: Vec<u8>, byte_order: ByteOrder) -> Self {
        Value { field_type, count, data, byte_order }
    }

    /// Builds a SHORT or LONG value from integers
    pub fn from_u32s(field_type: u16, values: &[u32], byte_order: ByteOrder) -> Self {
        let mut data = Vec::with_capacity(values.len() * tag_utils::get_field_type_size(field_type));
        for &v in values {
            match field_type {
                field_types::SHORT | field_types::SSHORT => data.extend_from_slice(&byte_order.u16_bytes(v as u16)),
                _ => data.extend_from_slice(&byte_order.u32_bytes(v)),
            }
        }
        Value::new(field_type, values.len() as u64, data, byte_order)
    }

    /// Builds an UNDEFINED value holding opaque bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Value::new(field_types::UNDEFINED, bytes.len() as u64, bytes.to_vec(), ByteOrder::LittleEndian)
    }

    /// Builds a NUL-terminated ASCII value
    pub fn ascii(text: &str) -> Self {
        let mut data = text.as_bytes().to_vec();
        data.push(0);
        Value::new(field_types::ASCII, data.len() as u64, data, ByteOrder::LittleEndian)
    }

    pub fn field_type(&self) -> u16 {
        self.field_type
    }

    /// Number of components
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Size of the encoded value in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The value bytes exactly as stored, without byte order conversion
    pub fn raw_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Decodes component `index` as an unsigned integer
    ///
    /// Rationals decode to `numerator / denominator`; signed types are
    /// reinterpreted. Returns None past the last component.
    pub fn to_u64(&self, index: usize) -> Option<u64> {
        let size = tag_utils::get_field_type_size(self.field_type);
        let start = index.checked_mul(size)?;
        let buf = self.data.get(start..start.checked_add(size)?)?;
        let order = self.byte_order;

        let value = match self.field_type {
            field_types::BYTE | field_types::UNDEFINED | field_types::ASCII => buf[0] as u64,
            field_types::SBYTE => buf[0] as i8 as i64 as u64,
            field_types::SHORT => order.u16_from(buf) as u64,
            field_types::SSHORT => order.u16_from(buf) as i16 as i64 as u64,
            field_types::LONG | field_types::IFD => order.u32_from(buf) as u64,
            field_types::SLONG => order.u32_from(buf) as i32 as i64 as u64,
            field_types::RATIONAL => {
                let num = order.u32_from(&buf[..4]) as u64;
                let den = order.u32_from(&buf[4..]) as u64;
                if den == 0 { 0 } else { num / den }
            },
            field_types::SRATIONAL => {
                let num = order.u32_from(&buf[..4]) as i32 as i64;
                let den = order.u32_from(&buf[4..]) as i32 as i64;
                if den == 0 { 0 } else { (num / den) as u64 }
            },
            field_types::FLOAT => f32::from_bits(order.u32_from(buf)) as u64,
            field_types::DOUBLE => f64::from_bits(order.u64_from(buf)) as u64,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => order.u64_from(buf),
            _ => return None,
        };

        Some(value)
    }

    /// Decodes every component as an unsigned integer
    pub fn to_u64_vec(&self) -> Vec<u64> {
        (0..self.count as usize).map_while(|i| self.to_u64(i)).collect()
    }

    /// Returns the value bytes converted to `target` byte order
    pub fn encode(&self, target: ByteOrder) -> Vec<u8> {
        if target == self.byte_order {
            return self.data.clone();
        }

        let unit = tag_utils::get_swap_unit_size(self.field_type);
        let mut out = self.data.clone();
        if unit > 1 {
            for chunk in out.chunks_exact_mut(unit) {
                chunk.reverse();
            }
        }
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field_type {
            field_types::ASCII => {
                let mut text = self.data.clone();
                string_utils::trim_trailing_nulls(&mut text);
                write!(f, "{}", String::from_utf8_lossy(&text))
            },
            field_types::RATIONAL | field_types::SRATIONAL => {
                let parts: Vec<String> = self.data.chunks_exact(8)
                    .map(|c| {
                        let num = self.byte_order.u32_from(&c[..4]);
                        let den = self.byte_order.u32_from(&c[4..]);
                        if self.field_type == field_types::SRATIONAL {
                            format!("{}/{}", num as i32, den as i32)
                        } else {
                            format!("{}/{}", num, den)
                        }
                    })
                    .collect();
                write!(f, "{}", parts.join(" "))
            },
            field_types::SBYTE | field_types::SSHORT | field_types::SLONG => {
                let parts: Vec<String> = self.to_u64_vec().iter()
                    .map(|v| (*v as i64).to_string())
                    .collect();
                write!(f, "{}", parts.join(" "))
            },
            _ => {
                let parts: Vec<String> = self.to_u64_vec().iter().map(u64::to_string).collect();
                write!(f, "{}", parts.join(" "))
            }
        }
    }
}

//! Tokenizers that drive a [`Builder`].
//!
//! The grammar lives outside this crate. [`JsonTokenizer`] lends it from
//! `serde_json`: its streaming deserializer walks the input once and every
//! value it reports is forwarded to the builder as it appears. Nesting depth
//! is not capped; deep documents run on a stack that grows on the heap.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::build::Builder;

pub trait Tokenizer {
    /// Feeds `input` to `builder` and returns the root handle. Failures are
    /// reported as a human-readable message.
    fn tokenize<B: Builder>(
        &mut self,
        input: &[u8],
        builder: &mut B,
    ) -> std::result::Result<B::Handle, String>;
}

/// JSON text tokenizer backed by `serde_json`.
///
/// Integers that fit in `i32` become `Int32` nodes, other integers in `i64`
/// range become `Int64`, and everything else numeric becomes `Double`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTokenizer;

impl Tokenizer for JsonTokenizer {
    fn tokenize<B: Builder>(
        &mut self,
        input: &[u8],
        builder: &mut B,
    ) -> std::result::Result<B::Handle, String> {
        let mut deserializer = serde_json::Deserializer::from_slice(input);
        deserializer.disable_recursion_limit();
        let root = ValueSeed { builder }
            .deserialize(serde_stacker::Deserializer::new(&mut deserializer))
            .map_err(|err| err.to_string())?;
        deserializer.end().map_err(|err| err.to_string())?;
        Ok(root)
    }
}

struct ValueSeed<'b, B> {
    builder: &'b mut B,
}

impl<'de, B: Builder> DeserializeSeed<'de> for ValueSeed<'_, B> {
    type Value = B::Handle;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, B: Builder> Visitor<'de> for ValueSeed<'_, B> {
    type Value = B::Handle;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(self.builder.new_null())
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        Ok(if value {
            self.builder.new_true()
        } else {
            self.builder.new_false()
        })
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(match i32::try_from(value) {
            Ok(small) => self.builder.new_int32(small),
            Err(_) => self.builder.new_int64(value),
        })
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        if let Ok(small) = i32::try_from(value) {
            return Ok(self.builder.new_int32(small));
        }
        Ok(match i64::try_from(value) {
            Ok(wide) => self.builder.new_int64(wide),
            Err(_) => self.builder.new_double(value as f64),
        })
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        Ok(self.builder.new_double(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(self.builder.new_string(value))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let builder = self.builder;
        let array = builder.new_array();
        while let Some(value) = seq.next_element_seed(ValueSeed {
            builder: &mut *builder,
        })? {
            builder.append_array_entry(array, value);
        }
        Ok(array)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let builder = self.builder;
        let object = builder.new_object();
        while let Some(key) = map.next_key_seed(KeySeed {
            builder: &mut *builder,
        })? {
            let value = map.next_value_seed(ValueSeed {
                builder: &mut *builder,
            })?;
            builder.append_object_pair(object, key, value);
        }
        Ok(object)
    }
}

struct KeySeed<'b, B> {
    builder: &'b mut B,
}

impl<'de, B: Builder> DeserializeSeed<'de> for KeySeed<'_, B> {
    type Value = B::Handle;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(self)
    }
}

impl<'de, B: Builder> Visitor<'de> for KeySeed<'_, B> {
    type Value = B::Handle;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object key")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        Ok(self.builder.new_string(value))
    }
}

use smallvec::SmallVec;

use crate::dom::Node;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Boolean,
    Numeric,
    String,
    Array,
    Object,
    Any,
}

/// Expected kind of an unpacked value. Nullable codes also accept JSON null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeCode {
    pub expected: Expected,
    pub nullable: bool,
}

impl TypeCode {
    pub const fn required(expected: Expected) -> Self {
        Self {
            expected,
            nullable: false,
        }
    }

    pub const fn nullable(expected: Expected) -> Self {
        Self {
            expected,
            nullable: true,
        }
    }

    /// `B N S A O U`, lowercase for the nullable variant.
    pub fn from_char(code: char) -> Option<Self> {
        let expected = match code.to_ascii_uppercase() {
            'B' => Expected::Boolean,
            'N' => Expected::Numeric,
            'S' => Expected::String,
            'A' => Expected::Array,
            'O' => Expected::Object,
            'U' => Expected::Any,
            _ => return None,
        };
        Some(Self {
            expected,
            nullable: code.is_ascii_lowercase(),
        })
    }

    pub fn as_char(self) -> char {
        let code = match self.expected {
            Expected::Boolean => 'B',
            Expected::Numeric => 'N',
            Expected::String => 'S',
            Expected::Array => 'A',
            Expected::Object => 'O',
            Expected::Any => 'U',
        };
        if self.nullable {
            code.to_ascii_lowercase()
        } else {
            code
        }
    }

    pub fn accepts(self, node: &Node<'_>) -> bool {
        match self.expected {
            Expected::Any => true,
            _ if node.is_null() => self.nullable,
            Expected::Boolean => node.is_bool(),
            Expected::Numeric => node.is_numeric(),
            Expected::String => node.is_string(),
            Expected::Array => node.is_array(),
            Expected::Object => node.is_object(),
        }
    }
}

pub type TypeFormat = SmallVec<[TypeCode; 16]>;

/// Parses a format string such as `"SNno"`, one code per character.
pub fn parse_format(format: &str) -> Result<TypeFormat> {
    format
        .chars()
        .enumerate()
        .map(|(index, code)| {
            TypeCode::from_char(code).ok_or_else(|| {
                Error::format(format!(
                    "invalid type code {code:?} at position {index} of format {format:?}"
                ))
            })
        })
        .collect()
}

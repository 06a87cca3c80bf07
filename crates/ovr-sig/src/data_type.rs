//! Data types carried by plan nodes
//!
//! [`DataType`] is the concrete type a node declares for its output.
//! [`TypeTag`] is the fixed enumeration signatures are built from; every
//! data type maps to exactly one tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum nesting accepted when parsing a textual data type
const MAX_PARSE_DEPTH: usize = 128;

/// Tag enumeration underlying type signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeTag {
    /// Untyped null
    Null,
    /// Boolean
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Days since epoch
    Date,
    /// Microseconds since epoch
    Timestamp,
    /// UTF-8 string
    String,
    /// Raw bytes
    Binary,
    /// Fixed-point decimal
    Decimal,
    /// Array of a single element type
    Array,
    /// Map of key and value types
    Map,
    /// Struct of named fields
    Struct,
}

impl TypeTag {
    /// All tags, in display order
    pub const ALL: [TypeTag; 16] = [
        TypeTag::Boolean,
        TypeTag::Byte,
        TypeTag::Short,
        TypeTag::Int,
        TypeTag::Long,
        TypeTag::Float,
        TypeTag::Double,
        TypeTag::Date,
        TypeTag::Timestamp,
        TypeTag::String,
        TypeTag::Decimal,
        TypeTag::Null,
        TypeTag::Binary,
        TypeTag::Array,
        TypeTag::Map,
        TypeTag::Struct,
    ];

    /// Upper-case name used in diagnostics
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean => "BOOLEAN",
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Int => "INT",
            Self::Long => "LONG",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::String => "STRING",
            Self::Binary => "BINARY",
            Self::Decimal => "DECIMAL",
            Self::Array => "ARRAY",
            Self::Map => "MAP",
            Self::Struct => "STRUCT",
        }
    }

    /// Bit position inside a [`crate::TypeTags`] set
    #[inline]
    #[must_use]
    pub(crate) const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Whether values of this tag contain other values
    #[inline]
    #[must_use]
    pub const fn is_container(self) -> bool {
        matches!(self, Self::Array | Self::Map | Self::Struct)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named field of a struct type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructField {
    /// Field name
    pub name: String,
    /// Field type
    pub data_type: DataType,
}

impl StructField {
    /// Create a new field
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Concrete data type of a plan node's output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    /// Untyped null
    Null,
    /// Boolean
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// 32-bit float
    Float,
    /// 64-bit float
    Double,
    /// Days since epoch
    Date,
    /// Microseconds since epoch
    Timestamp,
    /// UTF-8 string
    String,
    /// Raw bytes
    Binary,
    /// Fixed-point decimal
    Decimal {
        /// Total number of digits
        precision: u8,
        /// Digits after the decimal point
        scale: i8,
    },
    /// Array of elements
    Array(Box<DataType>),
    /// Map from keys to values
    Map(Box<DataType>, Box<DataType>),
    /// Struct of named fields
    Struct(Vec<StructField>),
}

impl DataType {
    /// Decimal type with the given precision and scale
    #[inline]
    #[must_use]
    pub const fn decimal(precision: u8, scale: i8) -> Self {
        Self::Decimal { precision, scale }
    }

    /// Array of `element`
    #[inline]
    #[must_use]
    pub fn array_of(element: DataType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Map from `key` to `value`
    #[inline]
    #[must_use]
    pub fn map_of(key: DataType, value: DataType) -> Self {
        Self::Map(Box::new(key), Box::new(value))
    }

    /// Struct from `(name, type)` pairs
    #[must_use]
    pub fn struct_of<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = (S, DataType)>,
        S: Into<String>,
    {
        Self::Struct(
            fields
                .into_iter()
                .map(|(name, ty)| StructField::new(name, ty))
                .collect(),
        )
    }

    /// The tag this type belongs to
    #[must_use]
    pub const fn tag(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::Boolean => TypeTag::Boolean,
            Self::Byte => TypeTag::Byte,
            Self::Short => TypeTag::Short,
            Self::Int => TypeTag::Int,
            Self::Long => TypeTag::Long,
            Self::Float => TypeTag::Float,
            Self::Double => TypeTag::Double,
            Self::Date => TypeTag::Date,
            Self::Timestamp => TypeTag::Timestamp,
            Self::String => TypeTag::String,
            Self::Binary => TypeTag::Binary,
            Self::Decimal { .. } => TypeTag::Decimal,
            Self::Array(_) => TypeTag::Array,
            Self::Map(..) => TypeTag::Map,
            Self::Struct(_) => TypeTag::Struct,
        }
    }

    /// Check if this type is an integral number
    #[must_use]
    pub const fn is_integral(&self) -> bool {
        matches!(self, Self::Byte | Self::Short | Self::Int | Self::Long)
    }

    /// Check if this type is a floating point number
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    /// Check if this type is numeric (integral, floating or decimal)
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        self.is_integral() || self.is_floating() || matches!(self, Self::Decimal { .. })
    }

    /// Check if this type contains other types
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Map(..) | Self::Struct(_))
    }

    /// Nesting depth; flat types have depth 0
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Array(element) => 1 + element.depth(),
            Self::Map(key, value) => 1 + key.depth().max(value.depth()),
            Self::Struct(fields) => {
                1 + fields
                    .iter()
                    .map(|f| f.data_type.depth())
                    .max()
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decimal { precision, scale } => write!(f, "DECIMAL({precision},{scale})"),
            Self::Array(element) => write!(f, "ARRAY<{element}>"),
            Self::Map(key, value) => write!(f, "MAP<{key},{value}>"),
            Self::Struct(fields) => {
                f.write_str("STRUCT<")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}:{}", field.name, field.data_type)?;
                }
                f.write_str(">")
            }
            other => f.write_str(other.tag().name()),
        }
    }
}

/// Failure to parse a textual data type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataTypeParseError {
    /// Input ended before the type was complete
    #[error("unexpected end of data type '{input}'")]
    UnexpectedEnd {
        /// Full input
        input: String,
    },

    /// Unknown type name
    #[error("unknown data type name '{0}'")]
    UnknownName(String),

    /// A specific character was expected
    #[error("expected '{expected}' at offset {offset} in '{input}'")]
    Expected {
        /// Expected character
        expected: char,
        /// Byte offset
        offset: usize,
        /// Full input
        input: String,
    },

    /// Decimal precision or scale out of range
    #[error("invalid decimal parameters in '{0}'")]
    InvalidDecimal(String),

    /// Input continues after a complete type
    #[error("trailing input at offset {offset} in '{input}'")]
    Trailing {
        /// Byte offset
        offset: usize,
        /// Full input
        input: String,
    },

    /// Type nests deeper than the parser accepts
    #[error("data type nests deeper than {0} levels")]
    TooDeep(usize),
}

impl FromStr for DataType {
    type Err = DataTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser { input: s, pos: 0 };
        let ty = parser.parse_type(0)?;
        parser.skip_ws();
        if parser.pos < s.len() {
            return Err(DataTypeParseError::Trailing {
                offset: parser.pos,
                input: s.to_string(),
            });
        }
        Ok(ty)
    }
}

impl TryFrom<String> for DataType {
    type Error = DataTypeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.to_string()
    }
}

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeParser<'_> {
    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn expect(&mut self, expected: char) -> Result<(), DataTypeParseError> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(_) => Err(DataTypeParseError::Expected {
                expected,
                offset: self.pos,
                input: self.input.to_string(),
            }),
            None => Err(self.unexpected_end()),
        }
    }

    fn unexpected_end(&self) -> DataTypeParseError {
        DataTypeParseError::UnexpectedEnd {
            input: self.input.to_string(),
        }
    }

    fn ident(&mut self) -> Result<&str, DataTypeParseError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return match self.peek() {
                Some(c) => Err(DataTypeParseError::UnknownName(c.to_string())),
                None => Err(self.unexpected_end()),
            };
        }
        Ok(&self.input[start..self.pos])
    }

    fn integer(&mut self) -> Result<i64, DataTypeParseError> {
        self.skip_ws();
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| DataTypeParseError::InvalidDecimal(self.input.to_string()))
    }

    fn parse_type(&mut self, depth: usize) -> Result<DataType, DataTypeParseError> {
        if depth > MAX_PARSE_DEPTH {
            return Err(DataTypeParseError::TooDeep(MAX_PARSE_DEPTH));
        }
        let name = self.ident()?.to_ascii_uppercase();
        let ty = match name.as_str() {
            "NULL" | "VOID" => DataType::Null,
            "BOOLEAN" | "BOOL" => DataType::Boolean,
            "BYTE" | "TINYINT" => DataType::Byte,
            "SHORT" | "SMALLINT" => DataType::Short,
            "INT" | "INTEGER" => DataType::Int,
            "LONG" | "BIGINT" => DataType::Long,
            "FLOAT" | "REAL" => DataType::Float,
            "DOUBLE" => DataType::Double,
            "DATE" => DataType::Date,
            "TIMESTAMP" => DataType::Timestamp,
            "STRING" => DataType::String,
            "BINARY" => DataType::Binary,
            "DECIMAL" => self.decimal_params()?,
            "ARRAY" => {
                self.expect('<')?;
                let element = self.parse_type(depth + 1)?;
                self.expect('>')?;
                DataType::array_of(element)
            }
            "MAP" => {
                self.expect('<')?;
                let key = self.parse_type(depth + 1)?;
                self.expect(',')?;
                let value = self.parse_type(depth + 1)?;
                self.expect('>')?;
                DataType::map_of(key, value)
            }
            "STRUCT" => self.struct_fields(depth)?,
            _ => return Err(DataTypeParseError::UnknownName(name)),
        };
        Ok(ty)
    }

    fn decimal_params(&mut self) -> Result<DataType, DataTypeParseError> {
        self.expect('(')?;
        let precision = self.integer()?;
        self.expect(',')?;
        let scale = self.integer()?;
        self.expect(')')?;
        let precision = u8::try_from(precision)
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| DataTypeParseError::InvalidDecimal(self.input.to_string()))?;
        let scale = i8::try_from(scale)
            .ok()
            .filter(|s| i16::from(*s) <= i16::from(precision))
            .ok_or_else(|| DataTypeParseError::InvalidDecimal(self.input.to_string()))?;
        Ok(DataType::decimal(precision, scale))
    }

    fn struct_fields(&mut self, depth: usize) -> Result<DataType, DataTypeParseError> {
        self.expect('<')?;
        let mut fields = Vec::new();
        self.skip_ws();
        if self.peek() == Some('>') {
            self.pos += 1;
            return Ok(DataType::Struct(fields));
        }
        loop {
            let name = self.ident()?.to_string();
            self.expect(':')?;
            let data_type = self.parse_type(depth + 1)?;
            fields.push(StructField::new(name, data_type));
            self.skip_ws();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some('>') => {
                    self.pos += 1;
                    return Ok(DataType::Struct(fields));
                }
                Some(_) => {
                    return Err(DataTypeParseError::Expected {
                        expected: '>',
                        offset: self.pos,
                        input: self.input.to_string(),
                    })
                }
                None => return Err(self.unexpected_end()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_upper_case() {
        assert_eq!(DataType::Double.to_string(), "DOUBLE");
        assert_eq!(DataType::String.to_string(), "STRING");
        assert_eq!(DataType::decimal(10, 2).to_string(), "DECIMAL(10,2)");
        assert_eq!(
            DataType::array_of(DataType::Int).to_string(),
            "ARRAY<INT>"
        );
        assert_eq!(
            DataType::map_of(DataType::String, DataType::Long).to_string(),
            "MAP<STRING,LONG>"
        );
        assert_eq!(
            DataType::struct_of([("a", DataType::Int), ("b", DataType::String)]).to_string(),
            "STRUCT<a:INT,b:STRING>"
        );
    }

    #[test]
    fn parse_accepts_aliases_and_whitespace() {
        assert_eq!("bigint".parse::<DataType>().unwrap(), DataType::Long);
        assert_eq!(" decimal( 38 , 10 ) ".parse::<DataType>().unwrap(), DataType::decimal(38, 10));
        assert_eq!(
            "array< map<string, int> >".parse::<DataType>().unwrap(),
            DataType::array_of(DataType::map_of(DataType::String, DataType::Int))
        );
        assert_eq!("STRUCT<>".parse::<DataType>().unwrap(), DataType::Struct(vec![]));
    }

    #[test]
    fn parse_round_trips_display() {
        let ty = DataType::struct_of([
            ("id", DataType::Long),
            ("tags", DataType::array_of(DataType::String)),
            ("price", DataType::decimal(12, 2)),
        ]);
        assert_eq!(ty.to_string().parse::<DataType>().unwrap(), ty);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            "UUID".parse::<DataType>(),
            Err(DataTypeParseError::UnknownName(_))
        ));
        assert!(matches!(
            "ARRAY<INT".parse::<DataType>(),
            Err(DataTypeParseError::UnexpectedEnd { .. })
        ));
        assert!(matches!(
            "DECIMAL(0,0)".parse::<DataType>(),
            Err(DataTypeParseError::InvalidDecimal(_))
        ));
        assert!(matches!(
            "INT INT".parse::<DataType>(),
            Err(DataTypeParseError::Trailing { .. })
        ));
    }

    #[test]
    fn parse_limits_depth() {
        let deep = format!("{}INT{}", "ARRAY<".repeat(200), ">".repeat(200));
        assert!(matches!(
            deep.parse::<DataType>(),
            Err(DataTypeParseError::TooDeep(_))
        ));
    }

    #[test]
    fn serde_uses_textual_form() {
        let json = serde_json::to_string(&DataType::array_of(DataType::Double)).unwrap();
        assert_eq!(json, "\"ARRAY<DOUBLE>\"");
        let back: DataType = serde_json::from_str("\"decimal(9,3)\"").unwrap();
        assert_eq!(back, DataType::decimal(9, 3));
    }

    #[test]
    fn depth_counts_nesting() {
        assert_eq!(DataType::Int.depth(), 0);
        assert_eq!(DataType::array_of(DataType::array_of(DataType::Int)).depth(), 2);
    }
}

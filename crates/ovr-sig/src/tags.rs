//! Compact set of flat type tags

use crate::data_type::TypeTag;
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Set of [`TypeTag`]s stored as a bitmask
///
/// Only flat tags are meaningful here; decimals and containers are
/// described by dedicated signature nodes because they carry parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeTags(u32);

impl TypeTags {
    /// No tags
    pub const EMPTY: Self = Self(0);
    /// `NULL`
    pub const NULL: Self = Self(TypeTag::Null.bit());
    /// `BOOLEAN`
    pub const BOOLEAN: Self = Self(TypeTag::Boolean.bit());
    /// `BYTE`
    pub const BYTE: Self = Self(TypeTag::Byte.bit());
    /// `SHORT`
    pub const SHORT: Self = Self(TypeTag::Short.bit());
    /// `INT`
    pub const INT: Self = Self(TypeTag::Int.bit());
    /// `LONG`
    pub const LONG: Self = Self(TypeTag::Long.bit());
    /// `FLOAT`
    pub const FLOAT: Self = Self(TypeTag::Float.bit());
    /// `DOUBLE`
    pub const DOUBLE: Self = Self(TypeTag::Double.bit());
    /// `DATE`
    pub const DATE: Self = Self(TypeTag::Date.bit());
    /// `TIMESTAMP`
    pub const TIMESTAMP: Self = Self(TypeTag::Timestamp.bit());
    /// `STRING`
    pub const STRING: Self = Self(TypeTag::String.bit());
    /// `BINARY`
    pub const BINARY: Self = Self(TypeTag::Binary.bit());

    /// All integral widths
    pub const INTEGRAL: Self = Self(
        TypeTag::Byte.bit() | TypeTag::Short.bit() | TypeTag::Int.bit() | TypeTag::Long.bit(),
    );
    /// Both floating widths
    pub const FP: Self = Self(TypeTag::Float.bit() | TypeTag::Double.bit());
    /// Integral and floating widths
    pub const NUMERIC: Self = Self(Self::INTEGRAL.0 | Self::FP.0);
    /// Every flat tag
    pub const FLAT: Self = Self(
        Self::NUMERIC.0
            | TypeTag::Null.bit()
            | TypeTag::Boolean.bit()
            | TypeTag::Date.bit()
            | TypeTag::Timestamp.bit()
            | TypeTag::String.bit()
            | TypeTag::Binary.bit(),
    );

    /// Single-tag set; parameterised tags yield the empty set
    #[must_use]
    pub const fn of(tag: TypeTag) -> Self {
        if tag.is_container() || matches!(tag, TypeTag::Decimal) {
            Self::EMPTY
        } else {
            Self(tag.bit())
        }
    }

    /// Check membership of a tag
    #[inline]
    #[must_use]
    pub const fn contains(self, tag: TypeTag) -> bool {
        self.0 & tag.bit() != 0
    }

    /// Check if no tag is present
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Set union
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Set intersection
    #[inline]
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Iterate over present tags in display order
    pub fn iter(self) -> impl Iterator<Item = TypeTag> {
        TypeTag::ALL.into_iter().filter(move |t| self.contains(*t))
    }
}

impl BitOr for TypeTags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitAnd for TypeTags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.intersect(rhs)
    }
}

impl fmt::Display for TypeTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            f.write_str(tag.name())?;
        }
        Ok(())
    }
}

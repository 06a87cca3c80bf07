//! Type signatures
//!
//! A [`TypeSig`] is an immutable set expression over data types. Leaves are
//! flat tag sets and decimal bounds; containers and [`TypeSig::nested`]
//! describe array, map and struct types; union and intersection combine
//! signatures. Every combinator returns a new signature.

use crate::data_type::{DataType, TypeTag};
use crate::decimal::{DecimalBounds, DECIMAL_128_MAX_PRECISION, DECIMAL_64_MAX_PRECISION};
use crate::tags::TypeTags;
use std::fmt;
use std::ops::{Add, BitAnd};
use std::sync::Arc;

/// Deepest type nesting a signature evaluates before giving up
pub const MAX_NESTING_DEPTH: usize = 32;

/// Type nesting went past [`MAX_NESTING_DEPTH`] during evaluation
///
/// Callers of [`TypeSig::contains`] never see this; it reads as
/// non-membership there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("type nesting exceeds the signature depth ceiling of {limit}")]
pub struct RecursionLimitExceeded {
    /// The ceiling that was hit
    pub limit: usize,
}

/// Immutable set of supported data types
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeSig(Arc<SigExpr>);

#[derive(Debug, PartialEq, Eq, Hash)]
enum SigExpr {
    Tags(TypeTags),
    Decimal(DecimalBounds),
    Array(TypeSig),
    Map(TypeSig, TypeSig),
    Struct(TypeSig),
    Nested(TypeSig),
    Union(Vec<TypeSig>),
    Intersect(Vec<TypeSig>),
}

impl TypeSig {
    fn from_expr(expr: SigExpr) -> Self {
        Self(Arc::new(expr))
    }

    /// The empty signature
    #[must_use]
    pub fn none() -> Self {
        Self::of(TypeTags::EMPTY)
    }

    /// Signature of a set of flat tags
    #[must_use]
    pub fn of(tags: TypeTags) -> Self {
        Self::from_expr(SigExpr::Tags(tags))
    }

    /// Decimals inside `bounds`
    #[must_use]
    pub fn decimal(bounds: DecimalBounds) -> Self {
        Self::from_expr(SigExpr::Decimal(bounds))
    }

    /// Decimals that fit in 64 bits
    #[must_use]
    pub fn decimal_64() -> Self {
        Self::decimal(DecimalBounds::up_to(DECIMAL_64_MAX_PRECISION))
    }

    /// Decimals that fit in 128 bits
    #[must_use]
    pub fn decimal_128() -> Self {
        Self::decimal(DecimalBounds::up_to(DECIMAL_128_MAX_PRECISION))
    }

    /// Integral numbers
    #[must_use]
    pub fn integral() -> Self {
        Self::of(TypeTags::INTEGRAL)
    }

    /// Floating point numbers
    #[must_use]
    pub fn fp() -> Self {
        Self::of(TypeTags::FP)
    }

    /// Integral and floating point numbers
    #[must_use]
    pub fn numeric() -> Self {
        Self::of(TypeTags::NUMERIC)
    }

    /// Flat types every accelerated operator is expected to handle
    #[must_use]
    pub fn common() -> Self {
        Self::of(
            TypeTags::BOOLEAN
                | TypeTags::NUMERIC
                | TypeTags::DATE
                | TypeTags::TIMESTAMP
                | TypeTags::STRING
                | TypeTags::NULL,
        )
    }

    /// Every data type, at any nesting depth
    #[must_use]
    pub fn all() -> Self {
        Self::of(TypeTags::FLAT).union(&Self::decimal_128()).nested()
    }

    /// Arrays whose element is in `element`
    #[must_use]
    pub fn array_of(element: &TypeSig) -> Self {
        Self::from_expr(SigExpr::Array(element.clone()))
    }

    /// Maps whose key is in `key` and value is in `value`
    #[must_use]
    pub fn map_of(key: &TypeSig, value: &TypeSig) -> Self {
        Self::from_expr(SigExpr::Map(key.clone(), value.clone()))
    }

    /// Structs whose every field is in `fields`
    #[must_use]
    pub fn struct_of(fields: &TypeSig) -> Self {
        Self::from_expr(SigExpr::Struct(fields.clone()))
    }

    /// This signature plus arrays, maps and structs built from members
    /// of the result, recursively
    #[must_use]
    pub fn nested(&self) -> Self {
        if self.is_none() {
            return self.clone();
        }
        if let SigExpr::Nested(_) = &*self.0 {
            return self.clone();
        }
        Self::from_expr(SigExpr::Nested(self.clone()))
    }

    /// Structurally empty signature
    #[inline]
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(&*self.0, SigExpr::Tags(t) if t.is_empty())
    }

    /// Set union
    #[must_use]
    pub fn union(&self, other: &TypeSig) -> Self {
        if self == other || other.is_none() {
            return self.clone();
        }
        if self.is_none() {
            return other.clone();
        }
        if let (SigExpr::Tags(a), SigExpr::Tags(b)) = (&*self.0, &*other.0) {
            return Self::of(*a | *b);
        }

        let mut tags = TypeTags::EMPTY;
        let mut members: Vec<TypeSig> = Vec::new();
        for sig in [self, other] {
            let parts = match &*sig.0 {
                SigExpr::Union(parts) => parts.as_slice(),
                _ => std::slice::from_ref(sig),
            };
            for part in parts {
                match &*part.0 {
                    SigExpr::Tags(t) => tags = tags | *t,
                    _ if !members.contains(part) => members.push(part.clone()),
                    _ => {}
                }
            }
        }
        if !tags.is_empty() {
            members.insert(0, Self::of(tags));
        }
        match members.len() {
            1 => members.swap_remove(0),
            _ => Self::from_expr(SigExpr::Union(members)),
        }
    }

    /// Set intersection
    #[must_use]
    pub fn intersect(&self, other: &TypeSig) -> Self {
        if self == other {
            return self.clone();
        }
        if self.is_none() || other.is_none() {
            return Self::none();
        }
        match (&*self.0, &*other.0) {
            (SigExpr::Tags(a), SigExpr::Tags(b)) => return Self::of(*a & *b),
            (SigExpr::Decimal(a), SigExpr::Decimal(b)) => {
                return a.intersect(b).map_or_else(Self::none, Self::decimal)
            }
            _ => {}
        }

        let mut members: Vec<TypeSig> = Vec::new();
        for sig in [self, other] {
            let parts = match &*sig.0 {
                SigExpr::Intersect(parts) => parts.as_slice(),
                _ => std::slice::from_ref(sig),
            };
            for part in parts {
                if !members.contains(part) {
                    members.push(part.clone());
                }
            }
        }
        Self::from_expr(SigExpr::Intersect(members))
    }

    /// Membership test; nesting deeper than [`MAX_NESTING_DEPTH`] is
    /// reported as non-membership
    #[must_use]
    pub fn contains(&self, data_type: &DataType) -> bool {
        match self.try_contains(data_type) {
            Ok(found) => found,
            Err(err) => {
                tracing::debug!(
                    data_type = %data_type,
                    signature = %self,
                    "{err}; treating the type as unsupported"
                );
                false
            }
        }
    }

    /// Membership test that surfaces the depth ceiling
    ///
    /// # Errors
    /// [`RecursionLimitExceeded`] when `data_type` nests deeper than
    /// [`MAX_NESTING_DEPTH`] along a path the signature has to inspect.
    pub fn try_contains(&self, data_type: &DataType) -> Result<bool, RecursionLimitExceeded> {
        self.eval(data_type, 0)
    }

    fn eval(&self, ty: &DataType, depth: usize) -> Result<bool, RecursionLimitExceeded> {
        if depth > MAX_NESTING_DEPTH {
            return Err(RecursionLimitExceeded {
                limit: MAX_NESTING_DEPTH,
            });
        }
        match &*self.0 {
            SigExpr::Tags(tags) => Ok(tags.contains(ty.tag())),
            SigExpr::Decimal(bounds) => Ok(matches!(
                ty,
                DataType::Decimal { precision, scale } if bounds.admits(*precision, *scale)
            )),
            SigExpr::Array(element) => match ty {
                DataType::Array(inner) => element.eval(inner, depth + 1),
                _ => Ok(false),
            },
            SigExpr::Map(key, value) => match ty {
                DataType::Map(k, v) => Ok(key.eval(k, depth + 1)? && value.eval(v, depth + 1)?),
                _ => Ok(false),
            },
            SigExpr::Struct(fields) => match ty {
                DataType::Struct(members) => {
                    for member in members {
                        if !fields.eval(&member.data_type, depth + 1)? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
                _ => Ok(false),
            },
            SigExpr::Nested(inner) => {
                if inner.eval(ty, depth)? {
                    return Ok(true);
                }
                match ty {
                    DataType::Array(element) => self.eval(element, depth + 1),
                    DataType::Map(k, v) => Ok(self.eval(k, depth + 1)? && self.eval(v, depth + 1)?),
                    DataType::Struct(members) => {
                        for member in members {
                            if !self.eval(&member.data_type, depth + 1)? {
                                return Ok(false);
                            }
                        }
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            SigExpr::Union(members) => {
                let mut exceeded = None;
                for member in members {
                    match member.eval(ty, depth) {
                        Ok(true) => return Ok(true),
                        Ok(false) => {}
                        Err(err) => exceeded = Some(err),
                    }
                }
                exceeded.map_or(Ok(false), Err)
            }
            SigExpr::Intersect(members) => {
                let mut exceeded = None;
                for member in members {
                    match member.eval(ty, depth) {
                        Ok(false) => return Ok(false),
                        Ok(true) => {}
                        Err(err) => exceeded = Some(err),
                    }
                }
                exceeded.map_or(Ok(true), Err)
            }
        }
    }

    /// Whether some type carrying `tag` can be a member
    ///
    /// Intersections are approximated per member, which is exact for the
    /// flat and decimal cases used in documentation tables.
    #[must_use]
    pub fn supports_tag(&self, tag: TypeTag) -> bool {
        match &*self.0 {
            SigExpr::Tags(tags) => tags.contains(tag),
            SigExpr::Decimal(_) => tag == TypeTag::Decimal,
            SigExpr::Array(_) => tag == TypeTag::Array,
            SigExpr::Map(..) => tag == TypeTag::Map,
            SigExpr::Struct(_) => tag == TypeTag::Struct,
            SigExpr::Nested(inner) => tag.is_container() || inner.supports_tag(tag),
            SigExpr::Union(members) => members.iter().any(|m| m.supports_tag(tag)),
            SigExpr::Intersect(members) => members.iter().all(|m| m.supports_tag(tag)),
        }
    }
}

impl Default for TypeSig {
    fn default() -> Self {
        Self::none()
    }
}

impl From<TypeTags> for TypeSig {
    fn from(tags: TypeTags) -> Self {
        Self::of(tags)
    }
}

impl Add for TypeSig {
    type Output = TypeSig;

    fn add(self, rhs: TypeSig) -> TypeSig {
        self.union(&rhs)
    }
}

impl BitAnd for TypeSig {
    type Output = TypeSig;

    fn bitand(self, rhs: TypeSig) -> TypeSig {
        self.intersect(&rhs)
    }
}

impl fmt::Display for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            SigExpr::Tags(tags) => write!(f, "{tags}"),
            SigExpr::Decimal(bounds) => write!(f, "{bounds}"),
            SigExpr::Array(element) => write!(f, "ARRAY<{element}>"),
            SigExpr::Map(key, value) => write!(f, "MAP<{key},{value}>"),
            SigExpr::Struct(fields) => write!(f, "STRUCT<{fields}>"),
            SigExpr::Nested(inner) => write!(f, "nested({inner})"),
            SigExpr::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            SigExpr::Intersect(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(") & (")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl fmt::Debug for TypeSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeSig({self})")
    }
}

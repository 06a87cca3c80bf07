//! Built-in replacement rules

use crate::checks::{ansi_overflow_safe, build_side_fits_budget, reject_under_ansi};
use crate::rule::{ChildPolicy, InputSpec, ReplacementRule};
use ovr_sig::{TypeSig, TypeTags};

/// Unary math functions over doubles
const UNARY_MATH: [(&str, &str); 8] = [
    ("Acos", "inverse cosine"),
    ("Asin", "inverse sine"),
    ("Atan", "inverse tangent"),
    ("Cos", "cosine"),
    ("Sin", "sine"),
    ("Sqrt", "square root"),
    ("Exp", "natural exponent"),
    ("Log", "natural logarithm"),
];

const COMPARISONS: [(&str, &str); 5] = [
    ("EqualTo", "equality"),
    ("LessThan", "less than"),
    ("LessThanOrEqual", "less than or equal"),
    ("GreaterThan", "greater than"),
    ("GreaterThanOrEqual", "greater than or equal"),
];

fn double() -> TypeSig {
    TypeSig::of(TypeTags::DOUBLE)
}

fn boolean() -> TypeSig {
    TypeSig::of(TypeTags::BOOLEAN)
}

fn arithmetic() -> TypeSig {
    TypeSig::numeric() + TypeSig::decimal_128()
}

fn comparable() -> TypeSig {
    TypeSig::common() + TypeSig::decimal_128()
}

fn values() -> TypeSig {
    comparable().nested()
}

/// Double in, double out
pub fn unary_math(kind: &str, description: &str) -> ReplacementRule {
    ReplacementRule::expr(kind, description)
        .signature(double())
        .host_signature(double())
        .input(InputSpec::new("input").with_sig(double()))
        .build()
}

fn binary_arithmetic(kind: &str, description: &str) -> ReplacementRule {
    ReplacementRule::expr(kind, description)
        .signature(arithmetic())
        .host_signature(arithmetic())
        .input(InputSpec::new("lhs").with_sig(arithmetic()))
        .input(InputSpec::new("rhs").with_sig(arithmetic()))
        .check(ansi_overflow_safe())
        .build()
}

fn comparison(kind: &str, description: &str) -> ReplacementRule {
    ReplacementRule::expr(kind, description)
        .signature(boolean())
        .host_signature(boolean())
        .input(InputSpec::new("lhs").with_sig(comparable()))
        .input(InputSpec::new("rhs").with_sig(comparable()))
        .build()
}

fn expressions() -> Vec<ReplacementRule> {
    let mut rules = vec![
        ReplacementRule::expr("Literal", "constant value")
            .signature(values())
            .build(),
        ReplacementRule::expr("ColumnRef", "reference to an input column")
            .signature(values())
            .build(),
        ReplacementRule::expr("Alias", "names the result of an expression")
            .signature(values())
            .variadic(InputSpec::new("child").with_sig(values()))
            .build(),
    ];
    rules.extend(UNARY_MATH.iter().map(|(kind, desc)| unary_math(kind, desc)));
    rules.extend([
        binary_arithmetic("Add", "addition"),
        binary_arithmetic("Subtract", "subtraction"),
        binary_arithmetic("Multiply", "multiplication"),
        ReplacementRule::expr("Divide", "division")
            .signature(TypeSig::fp() + TypeSig::decimal_128())
            .input(InputSpec::new("lhs").with_sig(TypeSig::fp() + TypeSig::decimal_128()))
            .input(InputSpec::new("rhs").with_sig(TypeSig::fp() + TypeSig::decimal_128()))
            .check(reject_under_ansi("division by zero checking"))
            .build(),
    ]);
    rules.extend(COMPARISONS.iter().map(|(kind, desc)| comparison(kind, desc)));
    rules.extend([
        ReplacementRule::expr("And", "logical and")
            .signature(boolean())
            .variadic(InputSpec::new("operand").with_sig(boolean()))
            .build(),
        ReplacementRule::expr("Or", "logical or")
            .signature(boolean())
            .variadic(InputSpec::new("operand").with_sig(boolean()))
            .build(),
        ReplacementRule::expr("Not", "logical not")
            .signature(boolean())
            .input(InputSpec::new("input").with_sig(boolean()))
            .build(),
        ReplacementRule::expr("IsNull", "null test")
            .signature(boolean())
            .input(InputSpec::new("input").with_sig(values()))
            .build(),
        ReplacementRule::expr("Upper", "upper case")
            .signature(TypeSig::of(TypeTags::STRING))
            .input(InputSpec::new("input").with_sig(TypeSig::of(TypeTags::STRING)))
            .incompatible("case conversion differs from the host for some non-ASCII characters")
            .build(),
        ReplacementRule::expr("Lower", "lower case")
            .signature(TypeSig::of(TypeTags::STRING))
            .input(InputSpec::new("input").with_sig(TypeSig::of(TypeTags::STRING)))
            .incompatible("case conversion differs from the host for some non-ASCII characters")
            .build(),
        ReplacementRule::expr("Sum", "sum aggregate")
            .signature(arithmetic())
            .input(InputSpec::new("input").with_sig(arithmetic()))
            .check(ansi_overflow_safe())
            .build(),
        ReplacementRule::expr("Count", "count aggregate")
            .signature(TypeSig::of(TypeTags::LONG))
            .variadic(InputSpec::new("input"))
            .build(),
        ReplacementRule::expr("Average", "average aggregate")
            .signature(double() + TypeSig::decimal_128())
            .input(InputSpec::new("input").with_sig(arithmetic()))
            .build(),
        ReplacementRule::expr("Min", "minimum aggregate")
            .signature(comparable())
            .input(InputSpec::new("input").with_sig(comparable()))
            .build(),
        ReplacementRule::expr("Max", "maximum aggregate")
            .signature(comparable())
            .input(InputSpec::new("input").with_sig(comparable()))
            .build(),
    ]);
    rules
}

fn execs() -> Vec<ReplacementRule> {
    vec![
        ReplacementRule::exec("Scan", "columnar file scan")
            .signature(values())
            .build(),
        ReplacementRule::exec("Project", "column projection")
            .signature(values())
            .variadic(InputSpec::new("input"))
            .build(),
        ReplacementRule::exec("Filter", "row filter")
            .signature(values())
            .variadic(InputSpec::new("input"))
            .build(),
        ReplacementRule::exec("HashAggregate", "hash-based aggregation")
            .signature(values())
            .variadic(InputSpec::new("input"))
            .build(),
        ReplacementRule::exec("HashJoin", "hash join")
            .signature(values())
            .input(InputSpec::new("left").with_policy(ChildPolicy::Strict))
            .input(InputSpec::new("right").with_policy(ChildPolicy::Strict))
            .variadic(InputSpec::new("key").with_sig(comparable()))
            .check(build_side_fits_budget())
            .build(),
        ReplacementRule::exec("Sort", "sort")
            .signature(values())
            .variadic(InputSpec::new("input"))
            .build(),
        ReplacementRule::exec("Union", "union of inputs")
            .signature(values())
            .variadic(InputSpec::new("input").with_policy(ChildPolicy::Mixed))
            .build(),
        ReplacementRule::exec("CollectLimit", "collect the first rows to the driver")
            .signature(values())
            .variadic(InputSpec::new("input"))
            .disabled_by_default("collecting a small limit rarely pays for the transfer")
            .build(),
    ]
}

/// Every built-in rule, expressions first
#[must_use]
pub fn default_rules() -> Vec<ReplacementRule> {
    let mut rules = expressions();
    rules.extend(execs());
    rules
}

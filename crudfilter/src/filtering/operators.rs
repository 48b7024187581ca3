//! Operator suffixes recognised on parameter keys.
//!
//! `age_gte=18` means "`age` >= 18". The table is fixed and read-only; each entry
//! maps a suffix to the function that builds its comparison from the raw value.

use super::query::Comparison;

pub struct SuffixOperator {
    pub suffix: &'static str,
    pub build: fn(&str) -> Comparison,
}

fn split_list(value: &str) -> Vec<String> {
    value.split(',').map(str::to_string).collect()
}

pub static OPERATORS: [SuffixOperator; 10] = [
    SuffixOperator {
        suffix: "_not",
        build: |value| Comparison::NotEq(value.to_string()),
    },
    SuffixOperator {
        suffix: "_gt",
        build: |value| Comparison::Gt(value.to_string()),
    },
    SuffixOperator {
        suffix: "_lt",
        build: |value| Comparison::Lt(value.to_string()),
    },
    SuffixOperator {
        suffix: "_gte",
        build: |value| Comparison::Gte(value.to_string()),
    },
    SuffixOperator {
        suffix: "_lte",
        build: |value| Comparison::Lte(value.to_string()),
    },
    SuffixOperator {
        suffix: "_like",
        build: |value| Comparison::Like(format!("%{value}%")),
    },
    SuffixOperator {
        suffix: "_in",
        build: |value| Comparison::In(split_list(value)),
    },
    SuffixOperator {
        suffix: "_notIn",
        build: |value| Comparison::NotIn(split_list(value)),
    },
    SuffixOperator {
        suffix: "_isNull",
        build: |_| Comparison::IsNull,
    },
    SuffixOperator {
        suffix: "_isNotNull",
        build: |_| Comparison::IsNotNull,
    },
];

/// Every operator whose suffix ends `key`, paired with the key minus that suffix.
pub fn matching(key: &str) -> impl Iterator<Item = (&str, &'static SuffixOperator)> {
    OPERATORS
        .iter()
        .filter_map(move |op| key.strip_suffix(op.suffix).map(|field| (field, op)))
}

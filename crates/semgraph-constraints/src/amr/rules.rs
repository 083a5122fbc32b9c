//! AMR relation/value rule table.
//!
//! [`is_valid_arg`] classifies a prospective node label or property value
//! against the relation labels it would be attached with. Relation labels
//! are compared case-insensitively.

use semgraph_core::label::has_placeholder;

use crate::resources::RoleSets;
use crate::verdict::Verdict;

pub const POLARITY: &str = "polarity";
pub const NAME: &str = "name";
pub const MODE: &str = "mode";
pub const ARG2: &str = "arg2";
pub const VALUE: &str = "value";
pub const DAY: &str = "day";
pub const MONTH: &str = "month";
pub const YEAR: &str = "year";
pub const YEAR2: &str = "year2";
pub const DECADE: &str = "decade";
pub const WEEKDAY: &str = "weekday";
pub const QUARTER: &str = "quarter";
pub const CENTURY: &str = "century";
pub const SEASON: &str = "season";
pub const TIMEZONE: &str = "timezone";

pub const MINUS: &str = "-";
pub const DATE_ENTITY: &str = "date-entity";
pub const MODES: [&str; 3] = ["expressive", "imperative", "interrogative"];
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];
pub const SEASONS: [&str; 4] = ["winter", "fall", "spring", "summer"];

/// Relations whose parent must be a `date-entity`.
const DATE_RELATIONS: [&str; 10] = [
    DAY, MONTH, YEAR, YEAR2, DECADE, WEEKDAY, QUARTER, CENTURY, SEASON, TIMEZONE,
];

/// Checks `value` in the position described by `labs`.
///
/// - `is_parent`: `value` labels the parent end of edges labeled `labs`,
///   otherwise the child end.
/// - `is_node_label`: `value` is a node label; otherwise it is a constant
///   (property value).
///
/// Missing values and values with unresolved placeholders are always valid.
pub fn is_valid_arg(
    value: Option<&str>,
    labs: &[&str],
    is_parent: bool,
    is_node_label: bool,
    rolesets: &RoleSets,
) -> Verdict {
    let value = match value {
        Some(value) if !has_placeholder(value) => value,
        _ => return Verdict::Valid,
    };
    let labs: Vec<String> = labs.iter().map(|l| l.to_lowercase()).collect();
    let has = |lab: &str| labs.iter().any(|l| l == lab);
    let valid = |cond: bool| {
        Verdict::check(cond, || {
            format!(
                "{} incompatible as {} of {}",
                value,
                if is_parent { "parent" } else { "child" },
                labs.join(", ")
            )
        })
    };

    if is_parent {
        if DATE_RELATIONS.iter().any(|r| has(r)) {
            return valid(value == DATE_ENTITY);
        }
    } else if is_node_label {
        if has(WEEKDAY) {
            return valid(WEEKDAYS.contains(&value));
        } else if WEEKDAYS.contains(&value) {
            return valid(has(WEEKDAY));
        } else if has(SEASON) {
            return valid(SEASONS.contains(&value));
        } else if has(NAME) {
            return valid(value == NAME);
        }
    } else if value == MINUS {
        return valid(labs.iter().all(|l| [POLARITY, ARG2, VALUE].contains(&l.as_str())));
    } else if has(POLARITY) {
        return valid(value == MINUS);
    } else if has(MODE) {
        return valid(MODES.contains(&value));
    } else if MODES.contains(&value) {
        return valid(has(MODE));
    } else if has(DAY) {
        return is_int_in_range(value, Some(1), Some(31));
    } else if has(MONTH) {
        return is_int_in_range(value, Some(1), Some(12));
    } else if has(QUARTER) {
        return is_int_in_range(value, Some(1), Some(4));
    } else if [YEAR, YEAR2, DECADE, CENTURY].iter().any(|r| has(r)) {
        return is_int_in_range(value, None, None);
    }

    // Predicate-argument roles, only meaningful for predicate senses.
    if !value.contains('-') {
        return Verdict::Valid;
    }
    let args: Vec<&str> = labs
        .iter()
        .filter(|l| l.starts_with("arg") && l.ends_with("-of") != is_parent)
        .map(|l| l.trim_end_matches("-of"))
        .collect();
    if args.is_empty() {
        return Verdict::Valid;
    }
    match rolesets.get(value) {
        Some(roles) if !roles.is_empty() => Verdict::check(
            args.iter()
                .all(|arg| roles.iter().any(|role| arg.ends_with(role.as_str()))),
            || format!("valid args: {}", roles.join(", ")),
        ),
        _ => Verdict::Valid,
    }
}

/// Checks that `value` starts with an integer within `[min, max]`.
///
/// The sign is skipped and only the leading digit run counts. Runs too long
/// for `i64` exceed any upper bound and satisfy any lower bound.
pub fn is_int_in_range(value: &str, min: Option<i64>, max: Option<i64>) -> Verdict {
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() {
        return Verdict::Invalid(format!("{} is not numeric", value));
    }
    let num: i64 = match digits.parse() {
        Ok(num) => num,
        Err(_) => {
            return match max {
                Some(max) => Verdict::Invalid(format!("{} > {}", digits, max)),
                None => Verdict::Valid,
            }
        }
    };
    Verdict::check(min.map_or(true, |min| num >= min), || {
        format!("{} < {}", num, min.unwrap_or_default())
    })
    .and(|| {
        Verdict::check(max.map_or(true, |max| num <= max), || {
            format!("{} > {}", num, max.unwrap_or_default())
        })
    })
}

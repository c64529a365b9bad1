//! Range filter synthesis.
//!
//! Parameters named `<column>_<token>` where `<token>` belongs to a known
//! preposition pair (`after:before`, `min:max`, ...) collapse into one call of
//! the `<column>Between` range handler with both bounds.

use crate::case::between_method;
use crate::errors::FilterError;
use crate::params::ParameterSet;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Separator between the column and the preposition token.
const SEPARATOR: char = '_';

const DEFAULT_PAIRS: [(&str, &str); 6] = [
    ("after", "before"),
    ("from", "to"),
    ("min", "max"),
    ("start", "end"),
    ("gte", "lte"),
    ("greater", "less"),
];

/// A lower/upper preposition pair such as `after:before`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangePair {
    pub lower: String,
    pub upper: String,
}

impl RangePair {
    #[must_use]
    pub fn new(lower: impl Into<String>, upper: impl Into<String>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
        }
    }

    fn contains(&self, token: &str) -> bool {
        self.lower == token || self.upper == token
    }
}

impl fmt::Display for RangePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lower, self.upper)
    }
}

impl FromStr for RangePair {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((lower, upper))
                if is_token(lower) && is_token(upper) && lower != upper =>
            {
                Ok(Self::new(lower, upper))
            }
            _ => Err(FilterError::config(format!(
                "invalid range pair '{s}', expected 'lower:upper'"
            ))),
        }
    }
}

fn is_token(token: &str) -> bool {
    !token.is_empty() && !token.contains([SEPARATOR, ':'])
}

/// Ordered set of preposition pairs; earlier pairs win ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeVocabulary {
    pairs: Vec<RangePair>,
}

impl Default for RangeVocabulary {
    fn default() -> Self {
        Self {
            pairs: DEFAULT_PAIRS
                .iter()
                .map(|(lower, upper)| RangePair::new(*lower, *upper))
                .collect(),
        }
    }
}

impl RangeVocabulary {
    #[must_use]
    pub const fn new(pairs: Vec<RangePair>) -> Self {
        Self { pairs }
    }

    /// Build a vocabulary from `"lower:upper"` strings.
    pub fn parse<S: AsRef<str>>(pairs: &[S]) -> Result<Self, FilterError> {
        pairs
            .iter()
            .map(|pair| pair.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    #[must_use]
    pub fn pairs(&self) -> &[RangePair] {
        &self.pairs
    }

    /// Every preposition token of every pair, in priority order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.pairs
            .iter()
            .flat_map(|pair| [pair.lower.as_str(), pair.upper.as_str()])
    }

    /// First pair (in priority order) containing `token`.
    #[must_use]
    pub fn pair_for(&self, token: &str) -> Option<&RangePair> {
        self.pairs.iter().find(|pair| pair.contains(token))
    }

    /// Split `created_at_after` into `("created_at", pair after:before)`.
    ///
    /// Returns `None` unless the name ends with `_<token>` for a known token
    /// and leaves a non-empty column.
    #[must_use]
    pub fn split<'n>(&self, name: &'n str) -> Option<(&'n str, &RangePair)> {
        let (column, token) = name.rsplit_once(SEPARATOR)?;
        if column.is_empty() {
            return None;
        }
        self.pair_for(token).map(|pair| (column, pair))
    }
}

impl<'de> Deserialize<'de> for RangeVocabulary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Vec::<String>::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One scheduled invocation of a `<column>Between` handler.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeCall<'p> {
    pub method: String,
    pub column: &'p str,
    pub pair: RangePair,
    pub lower: Option<&'p Value>,
    pub upper: Option<&'p Value>,
}

/// Scan the parameter names and schedule one call per distinct range method.
///
/// Calls are returned in the order their first candidate appears. A later
/// candidate that synthesizes an already scheduled method is dropped, so
/// `score_min` + `score_gte` yields a single `scoreBetween` from `min:max`.
#[must_use]
pub fn plan<'p>(parameters: &'p ParameterSet, vocabulary: &RangeVocabulary) -> Vec<RangeCall<'p>> {
    let mut calls: Vec<RangeCall<'p>> = Vec::new();

    for name in parameters.names() {
        let Some((column, pair)) = vocabulary.split(name) else {
            continue;
        };

        let method = between_method(column);
        if calls.iter().any(|call| call.method == method) {
            continue;
        }

        let lower = parameters.get(&format!("{column}{SEPARATOR}{}", pair.lower));
        let upper = parameters.get(&format!("{column}{SEPARATOR}{}", pair.upper));

        calls.push(RangeCall {
            method,
            column,
            pair: pair.clone(),
            lower,
            upper,
        });
    }

    calls
}

use std::collections::BTreeMap;
use std::sync::LazyLock;

use serde_json::{Map, Value};

/// Which parts of a nested response to retain.
///
/// A key absent from `Fields` is dropped. Deserializes from JSON where `true`
/// keeps a value, `false` (or an empty object) drops it, and an object descends.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(from = "RawMask")]
pub enum FilterMask {
    Keep,
    Fields(BTreeMap<String, FilterMask>),
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawMask {
    Flag(bool),
    Fields(BTreeMap<String, RawMask>),
}

impl RawMask {
    fn into_entry(self) -> Option<FilterMask> {
        match self {
            Self::Flag(true) => Some(FilterMask::Keep),
            Self::Flag(false) => None,
            Self::Fields(fields) => {
                let fields = collect_entries(fields);
                (!fields.is_empty()).then_some(FilterMask::Fields(fields))
            }
        }
    }
}

fn collect_entries(fields: BTreeMap<String, RawMask>) -> BTreeMap<String, FilterMask> {
    fields
        .into_iter()
        .filter_map(|(key, raw)| raw.into_entry().map(|mask| (key, mask)))
        .collect()
}

impl From<RawMask> for FilterMask {
    fn from(raw: RawMask) -> Self {
        match raw {
            RawMask::Flag(true) => Self::Keep,
            // A top-level `false` keeps nothing, which the empty-result fallback turns into a no-op.
            RawMask::Flag(false) => Self::Fields(BTreeMap::new()),
            RawMask::Fields(fields) => Self::Fields(collect_entries(fields)),
        }
    }
}

impl FilterMask {
    pub fn fields<K: Into<String>>(entries: impl IntoIterator<Item = (K, FilterMask)>) -> Self {
        Self::Fields(
            entries
                .into_iter()
                .map(|(key, mask)| (key.into(), mask))
                .collect(),
        )
    }
}

/// Mask applied to `coreTable.all`, `dataTable.all` and `list.all` replies.
pub static TABLE_FILTER: LazyLock<FilterMask> =
    LazyLock::new(|| FilterMask::fields([("name", FilterMask::Keep), ("id", FilterMask::Keep)]));

/// Project `value` through `mask`.
///
/// Sequences are filtered element by element with the same mask. Scalars are
/// returned unchanged. A mapping that filters down to nothing is returned
/// unfiltered.
pub fn filter_results(value: &Value, mask: &FilterMask) -> Value {
    match mask {
        FilterMask::Keep => value.clone(),
        FilterMask::Fields(fields) => filter_each(value, fields),
    }
}

fn filter_each(value: &Value, fields: &BTreeMap<String, FilterMask>) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(|item| filter_each(item, fields)).collect()),
        Value::Object(map) => {
            let mut kept = Map::new();
            for (key, child) in map {
                match fields.get(key) {
                    Some(FilterMask::Keep) => {
                        kept.insert(key.clone(), child.clone());
                    }
                    Some(FilterMask::Fields(sub)) if !sub.is_empty() => {
                        kept.insert(key.clone(), filter_each(child, sub));
                    }
                    _ => {}
                }
            }
            // TODO: decide with API consumers whether a mask that removes every key should yield `{}`.
            if kept.is_empty() {
                value.clone()
            } else {
                Value::Object(kept)
            }
        }
        scalar => scalar.clone(),
    }
}

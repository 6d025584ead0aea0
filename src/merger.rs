//! Joins the English and Chinese datastores on the `emoji` character.
//!
//! English entries take precedence: their scalar fields win, their tags come first and
//! their annotation leads the combined text. Chinese entries fill the gaps and add the
//! Chinese-only emojis after the English ones.

use std::collections::HashMap;

use log::info;
use serde_json::Value;

use crate::datastore::Record;

// prefer English, fall back to Chinese; presence decides, not truthiness
const SCALAR_KEYS: [&str; 4] = ["order", "group", "version", "emoticon"];

// where entries without a numeric or boolean `order` land in the sorted output
const MISSING_ORDER: f64 = 9_999_999.0;

/// Counters collected while joining the two datastores.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeStats {
    pub both: usize,
    pub primary_only: usize,
    pub secondary_only: usize,
    pub primary_duplicates: usize,
    pub secondary_duplicates: usize,
}

// emoji key -> entry, in order of first appearance
struct Lookup<'a> {
    slots: Vec<(String, &'a Record)>,
    index: HashMap<String, usize>,
    duplicates: usize,
}

impl<'a> Lookup<'a> {
    fn build(records: &'a [Record], label: &str) -> Self {
        let mut lookup = Lookup {
            slots: Vec::with_capacity(records.len()),
            index: HashMap::with_capacity(records.len()),
            duplicates: 0,
        };
        for record in records {
            let key = emoji_key(record);
            match lookup.index.get(&key) {
                Some(&pos) => {
                    lookup.slots[pos].1 = record;
                    lookup.duplicates += 1;
                    info!(" -> duplicate emoji {key} in {label}: keeping last");
                }
                None => {
                    lookup.index.insert(key.clone(), lookup.slots.len());
                    lookup.slots.push((key, record));
                }
            }
        }
        lookup
    }

    fn get(&self, key: &str) -> Option<&'a Record> {
        self.index.get(key).map(|&pos| self.slots[pos].1)
    }

    fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }
}

// Canonical JSON text of the `emoji` value; a missing key behaves like `null`.
fn emoji_key(record: &Record) -> String {
    record.get("emoji").unwrap_or(&Value::Null).to_string()
}

/// Merge both datastores into one entry per distinct emoji, sorted by `order`.
pub fn merge_datasets(primary: &[Record], secondary: &[Record]) -> (Vec<Record>, MergeStats) {
    let en_map = Lookup::build(primary, "en");
    let zh_map = Lookup::build(secondary, "zh");

    let mut stats = MergeStats {
        primary_duplicates: en_map.duplicates,
        secondary_duplicates: zh_map.duplicates,
        ..MergeStats::default()
    };
    let mut merged = Vec::with_capacity(en_map.slots.len() + zh_map.slots.len());

    for (key, en_item) in &en_map.slots {
        let zh_item = zh_map.get(key);
        if zh_item.is_some() {
            stats.both += 1;
        } else {
            stats.primary_only += 1;
        }
        merged.push(merge_entries(en_item, zh_item));
    }

    let empty = Record::new();
    for &(_, zh_item) in zh_map.slots.iter().filter(|(key, _)| !en_map.contains(key)) {
        stats.secondary_only += 1;
        merged.push(merge_entries(&empty, Some(zh_item)));
    }

    sort_by_order(&mut merged);
    (merged, stats)
}

/// Combine one English entry with its Chinese counterpart, if any.
pub fn merge_entries(en_item: &Record, zh_item: Option<&Record>) -> Record {
    let mut merged = Record::new();

    let emoji = en_item
        .get("emoji")
        .filter(|v| !v.is_null())
        .or_else(|| zh_item.and_then(|zh| zh.get("emoji")))
        .cloned()
        .unwrap_or(Value::Null);
    merged.insert("emoji".into(), emoji);

    let tags = dedupe_preserve_order(tag_list(Some(en_item)).chain(tag_list(zh_item)));
    if !tags.is_empty() {
        merged.insert("tags".into(), Value::Array(tags));
    }

    if let Some(text) = combine_annotations(annotation(Some(en_item)), annotation(zh_item)) {
        merged.insert("annotation".into(), Value::String(text));
    }

    for key in SCALAR_KEYS {
        let value = en_item
            .get(key)
            .or_else(|| zh_item.and_then(|zh| zh.get(key)));
        if let Some(v) = value {
            merged.insert(key.into(), v.clone());
        }
    }

    // everything else: English first, then whatever only the Chinese side has
    for (k, v) in en_item.iter().chain(zh_item.into_iter().flatten()) {
        if k == "tags" || k == "annotation" || merged.contains_key(k) {
            continue;
        }
        merged.insert(k.clone(), v.clone());
    }

    merged
}

fn tag_list(record: Option<&Record>) -> impl Iterator<Item = &Value> {
    record
        .and_then(|r| r.get("tags"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn dedupe_preserve_order<'a>(items: impl Iterator<Item = &'a Value>) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}

fn annotation(record: Option<&Record>) -> &str {
    record
        .and_then(|r| r.get("annotation"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or("")
}

fn combine_annotations(en: &str, zh: &str) -> Option<String> {
    match (en, zh) {
        ("", "") => None,
        (text, "") | ("", text) => Some(text.to_owned()),
        (en, zh) if en == zh => Some(en.to_owned()),
        (en, zh) => Some(format!("{en} {zh}")),
    }
}

// Stable, so entries sharing an `order` keep their construction order.
fn sort_by_order(records: &mut [Record]) {
    records.sort_by(|a, b| order_key(a).total_cmp(&order_key(b)));
}

fn order_key(record: &Record) -> f64 {
    match record.get("order") {
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(v) => v.as_f64().unwrap_or(MISSING_ORDER),
        None => MISSING_ORDER,
    }
}

//! Value conversion between the host side (command replies, JSON documents)
//! and the guest side (Lua values).
//!
//! Both directions are plain recursive functions over owned trees, so the
//! conversion rules can be exercised without starting an interpreter. The Lua
//! adapter in `lua.rs` only maps `GuestValue` to and from `mlua::Value`.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde_json::{Map, Number, Value};

/// A value on the host side of the bridge.
///
/// `Undefined` is the absence of a value (a missing key, an empty return);
/// `Null` is an explicit null and maps to the guest's null sentinel.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Strings are byte strings on both sides; only JSON needs them as text.
    String(Bytes),
    Array(Vec<HostValue>),
    Object(BTreeMap<String, HostValue>),
}

impl HostValue {
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => HostValue::Number(n.as_f64().unwrap_or_default()),
            Value::String(s) => HostValue::String(Bytes::from(s)),
            Value::Array(items) => {
                HostValue::Array(items.into_iter().map(HostValue::from_json).collect())
            }
            Value::Object(map) => HostValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, HostValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts to JSON. Integral numbers become JSON integers; `Undefined`
    /// is dropped from objects and becomes `null` elsewhere.
    pub fn to_json(&self) -> Value {
        match self {
            HostValue::Undefined | HostValue::Null => Value::Null,
            HostValue::Bool(b) => Value::Bool(*b),
            HostValue::Number(n) => number_to_json(*n),
            HostValue::String(s) => Value::String(String::from_utf8_lossy(s).into_owned()),
            HostValue::Array(items) => Value::Array(items.iter().map(HostValue::to_json).collect()),
            HostValue::Object(map) => {
                let mut object = Map::new();
                for (k, v) in map {
                    if *v != HostValue::Undefined {
                        object.insert(k.clone(), v.to_json());
                    }
                }
                Value::Object(object)
            }
        }
    }
}

fn number_to_json(n: f64) -> Value {
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuestKey {
    Index(i64),
    Name(String),
}

/// A value on the guest side, mirroring the Lua types the bridge understands.
#[derive(Debug, Clone, PartialEq)]
pub enum GuestValue {
    Nil,
    /// The null sentinel (`cjson.null`).
    Null,
    Boolean(bool),
    Number(f64),
    String(Bytes),
    Table(Vec<(GuestKey, GuestValue)>),
}

/// Host to guest: arrays become 1-based sequences, objects become keyed
/// tables whose integer-looking keys shift up by one, absent values vanish.
pub fn host_to_guest(value: HostValue) -> GuestValue {
    match value {
        HostValue::Undefined => GuestValue::Nil,
        HostValue::Null => GuestValue::Null,
        HostValue::Bool(b) => GuestValue::Boolean(b),
        HostValue::Number(n) => GuestValue::Number(n),
        HostValue::String(s) => GuestValue::String(s),
        HostValue::Array(items) => GuestValue::Table(
            items
                .into_iter()
                .enumerate()
                .filter(|(_, item)| *item != HostValue::Undefined)
                .map(|(i, item)| (GuestKey::Index(i as i64 + 1), host_to_guest(item)))
                .collect(),
        ),
        HostValue::Object(map) => GuestValue::Table(
            map.into_iter()
                .filter(|(_, item)| *item != HostValue::Undefined)
                .map(|(k, item)| (object_key_to_guest(k), host_to_guest(item)))
                .collect(),
        ),
    }
}

fn object_key_to_guest(key: String) -> GuestKey {
    if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
        if let Some(index) = key.parse::<i64>().ok().and_then(|i| i.checked_add(1)) {
            return GuestKey::Index(index);
        }
    }

    GuestKey::Name(key)
}

/// Guest to host: a table with a non-nil `[1]` is an array read from the
/// contiguous run `1..n`; any other table is an object whose integer keys
/// shift down by one.
pub fn guest_to_host(value: GuestValue) -> HostValue {
    match value {
        GuestValue::Nil => HostValue::Undefined,
        GuestValue::Null => HostValue::Null,
        GuestValue::Boolean(b) => HostValue::Bool(b),
        GuestValue::Number(n) => HostValue::Number(n),
        GuestValue::String(s) => HostValue::String(s),
        GuestValue::Table(entries) => {
            if is_sequence(&entries) {
                table_to_array(entries)
            } else {
                table_to_object(entries)
            }
        }
    }
}

fn is_sequence(entries: &[(GuestKey, GuestValue)]) -> bool {
    entries
        .iter()
        .any(|(key, value)| *key == GuestKey::Index(1) && *value != GuestValue::Nil)
}

fn table_to_array(entries: Vec<(GuestKey, GuestValue)>) -> HostValue {
    let mut indexed: BTreeMap<i64, GuestValue> = entries
        .into_iter()
        .filter_map(|(key, value)| match key {
            GuestKey::Index(i) if i >= 1 => Some((i, value)),
            _ => None,
        })
        .collect();

    let mut items = Vec::with_capacity(indexed.len());
    let mut next = 1;

    while let Some(value) = indexed.remove(&next) {
        items.push(guest_to_host(value));
        next += 1;
    }

    HostValue::Array(items)
}

fn table_to_object(entries: Vec<(GuestKey, GuestValue)>) -> HostValue {
    let mut object = BTreeMap::new();

    for (key, value) in entries {
        let value = guest_to_host(value);
        if value == HostValue::Undefined {
            continue;
        }

        let key = match key {
            GuestKey::Index(i) => (i - 1).to_string(),
            GuestKey::Name(name) => name,
        };
        object.insert(key, value);
    }

    HostValue::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arrays_become_one_based_tables() {
        let guest = host_to_guest(HostValue::from_json(json!(["a", "b"])));

        assert_eq!(
            guest,
            GuestValue::Table(vec![
                (GuestKey::Index(1), GuestValue::String("a".into())),
                (GuestKey::Index(2), GuestValue::String("b".into())),
            ])
        );
        assert_eq!(guest_to_host(guest).to_json(), json!(["a", "b"]));
    }

    #[test]
    fn integer_keys_shift_both_ways() {
        let guest = host_to_guest(HostValue::from_json(json!({"0": "zero", "name": "x"})));

        let GuestValue::Table(entries) = &guest else {
            panic!("expected a table, got {:?}", guest);
        };
        assert!(entries.contains(&(GuestKey::Index(1), GuestValue::String("zero".into()))));

        // `[1]` is set, so the table reads back as a sequence.
        assert_eq!(guest_to_host(guest).to_json(), json!(["zero"]));

        let sparse = GuestValue::Table(vec![
            (GuestKey::Index(3), GuestValue::Boolean(true)),
            (GuestKey::Name("k".into()), GuestValue::Number(1.0)),
        ]);
        assert_eq!(guest_to_host(sparse).to_json(), json!({"2": true, "k": 1}));
    }

    #[test]
    fn null_and_absence_are_distinct() {
        assert_eq!(host_to_guest(HostValue::Null), GuestValue::Null);
        assert_eq!(host_to_guest(HostValue::Undefined), GuestValue::Nil);
        assert_eq!(guest_to_host(GuestValue::Null), HostValue::Null);
        assert_eq!(guest_to_host(GuestValue::Nil), HostValue::Undefined);

        let mut object = BTreeMap::new();
        object.insert("gone".to_string(), HostValue::Undefined);
        object.insert("kept".to_string(), HostValue::Null);
        assert_eq!(
            host_to_guest(HostValue::Object(object)),
            GuestValue::Table(vec![(GuestKey::Name("kept".into()), GuestValue::Null)])
        );
    }

    #[test]
    fn array_stops_at_first_hole() {
        let guest = GuestValue::Table(vec![
            (GuestKey::Index(1), GuestValue::Number(1.0)),
            (GuestKey::Index(2), GuestValue::Number(2.0)),
            (GuestKey::Index(4), GuestValue::Number(4.0)),
        ]);

        assert_eq!(guest_to_host(guest).to_json(), json!([1, 2]));
    }

    #[test]
    fn fractional_numbers_survive_json() {
        assert_eq!(HostValue::Number(3.5).to_json(), json!(3.5));
        assert_eq!(HostValue::Number(3.0).to_json(), json!(3));
    }
}

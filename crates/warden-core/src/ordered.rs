// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! String-keyed map that remembers insertion order.
//!
//! Report rows and columns follow the order in which roles, resources and
//! actions were configured, so the maps backing them cannot re-sort their keys.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Insertion-ordered map keyed by `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
	entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
		}
	}
}

impl<V> OrderedMap<V> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, key: &str) -> Option<&V> {
		self
			.entries
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v)
	}

	/// Inserts a value, replacing an existing one in place so the key keeps
	/// its original position.
	pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
		let key = key.into();
		match self.entries.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => Some(std::mem::replace(slot, value)),
			None => {
				self.entries.push((key, value));
				None
			}
		}
	}

	/// Returns the value for `key`, appending `default()` first if absent.
	pub fn get_or_insert_with(&mut self, key: &str, default: impl FnOnce() -> V) -> &mut V {
		let idx = match self.entries.iter().position(|(k, _)| k == key) {
			Some(idx) => idx,
			None => {
				self.entries.push((key.to_string(), default()));
				self.entries.len() - 1
			}
		};
		&mut self.entries[idx].1
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|(k, _)| k.as_str())
	}

	pub fn values(&self) -> impl Iterator<Item = &V> {
		self.entries.iter().map(|(_, v)| v)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
	fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
		let mut map = Self::new();
		for (k, v) in iter {
			map.insert(k, v);
		}
		map
	}
}

impl<V: Serialize> Serialize for OrderedMap<V> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut map = serializer.serialize_map(Some(self.entries.len()))?;
		for (k, v) in &self.entries {
			map.serialize_entry(k, v)?;
		}
		map.end()
	}
}

struct OrderedMapVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
	type Value = OrderedMap<V>;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("a map with string keys")
	}

	fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
		let mut map = OrderedMap::new();
		while let Some((k, v)) = access.next_entry::<String, V>()? {
			map.insert(k, v);
		}
		Ok(map)
	}
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn keeps_insertion_order() {
		let mut map = OrderedMap::new();
		map.insert("zeta", 1);
		map.insert("alpha", 2);
		map.insert("mid", 3);
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
	}

	#[test]
	fn replacing_keeps_position() {
		let mut map = OrderedMap::new();
		map.insert("a", 1);
		map.insert("b", 2);
		assert_eq!(map.insert("a", 10), Some(1));
		assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", &10), ("b", &2)]);
	}

	#[test]
	fn get_or_insert_with_appends_once() {
		let mut map: OrderedMap<Vec<u8>> = OrderedMap::new();
		map.get_or_insert_with("x", Vec::new).push(1);
		map.get_or_insert_with("x", Vec::new).push(2);
		assert_eq!(map.len(), 1);
		assert_eq!(map.get("x"), Some(&vec![1, 2]));
	}

	#[test]
	fn json_preserves_order_both_ways() {
		let map: OrderedMap<u32> = serde_json::from_str(r#"{"b":1,"a":2,"c":3}"#).unwrap();
		assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
		assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"b":1,"a":2,"c":3}"#);
	}
}

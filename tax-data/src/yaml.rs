//! Serde helpers for the YAML configuration documents.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};

/// A mapping whose entries keep the order they appear in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<K, V>(pub Vec<(K, V)>);

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<K, V> OrderedMap<K, V> {
    pub fn into_inner(self) -> Vec<(K, V)> {
        self.0
    }
}

impl<'de, K, V> Deserialize<'de> for OrderedMap<K, V>
where
    K: Deserialize<'de>,
    V: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct OrderedMapVisitor<K, V>(PhantomData<(K, V)>);

        impl<'de, K, V> Visitor<'de> for OrderedMapVisitor<K, V>
        where
            K: Deserialize<'de>,
            V: Deserialize<'de>,
        {
            type Value = OrderedMap<K, V>;

            fn expecting(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str("a mapping")
            }

            fn visit_map<A>(
                self,
                mut access: A,
            ) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(OrderedMap(entries))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(OrderedMap::default())
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// An upper income or earnings bound; `None` is unbounded.
///
/// Accepts integers, floats, numeric strings, and `.inf` / `inf` /
/// `infinity` / null for an open bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpperBound(pub Option<Decimal>);

fn is_infinity_word(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "inf" | ".inf" | "+inf" | "+.inf" | "infinity" | "+infinity"
    )
}

impl<'de> Deserialize<'de> for UpperBound {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UpperBoundVisitor;

        impl<'de> Visitor<'de> for UpperBoundVisitor {
            type Value = UpperBound;

            fn expecting(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str("a number, or .inf for no upper bound")
            }

            fn visit_i64<E: de::Error>(
                self,
                v: i64,
            ) -> Result<Self::Value, E> {
                Ok(UpperBound(Some(Decimal::from(v))))
            }

            fn visit_u64<E: de::Error>(
                self,
                v: u64,
            ) -> Result<Self::Value, E> {
                Ok(UpperBound(Some(Decimal::from(v))))
            }

            fn visit_f64<E: de::Error>(
                self,
                v: f64,
            ) -> Result<Self::Value, E> {
                if v.is_infinite() && v.is_sign_positive() {
                    return Ok(UpperBound(None));
                }
                Decimal::try_from(v)
                    .map(|d| UpperBound(Some(d)))
                    .map_err(|e| E::custom(format!("invalid bound {v}: {e}")))
            }

            fn visit_str<E: de::Error>(
                self,
                v: &str,
            ) -> Result<Self::Value, E> {
                let trimmed = v.trim();
                if is_infinity_word(trimmed) {
                    return Ok(UpperBound(None));
                }
                Decimal::from_str(trimmed)
                    .map(|d| UpperBound(Some(d)))
                    .map_err(|e| E::custom(format!("invalid bound '{trimmed}': {e}")))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(UpperBound(None))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(UpperBound(None))
            }

            fn visit_some<D>(
                self,
                deserializer: D,
            ) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(self)
            }
        }

        deserializer.deserialize_any(UpperBoundVisitor)
    }
}

/// Deserializes an optional string, treating an empty or blank one as absent.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
}

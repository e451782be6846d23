//! Basket of product ids and its string encoding.
//!
//! Snapshots store the basket in a single CSV column as a bracketed,
//! comma-separated list: `[196, 14084, 12427]`. The empty basket is `[]`.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::BasketError;

/// Product id type shared by order lines and dimension tables
pub type ProductId = u32;

/// Products bought in one order, in add-to-cart file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Basket(Vec<ProductId>);

impl Basket {
    pub fn new(products: Vec<ProductId>) -> Self {
        Self(products)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn products(&self) -> &[ProductId] {
        &self.0
    }

    pub fn push(&mut self, product: ProductId) {
        self.0.push(product);
    }

    /// Encode as `[a, b, c]`
    pub fn encode(&self) -> String {
        let mut out = String::with_capacity(self.0.len() * 7 + 2);
        out.push('[');
        for (i, product) in self.0.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&product.to_string());
        }
        out.push(']');
        out
    }

    /// Decode the `[a, b, c]` form. Whitespace around the brackets and
    /// the elements is ignored.
    pub fn decode(raw: &str) -> Result<Self, BasketError> {
        let inner = raw
            .trim()
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .ok_or_else(|| BasketError::MissingBrackets(raw.to_string()))?;

        if inner.trim().is_empty() {
            return Ok(Self::default());
        }

        inner
            .split(',')
            .map(|item| {
                let item = item.trim();
                item.parse::<ProductId>()
                    .map_err(|_| BasketError::InvalidElement(item.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<ProductId>> for Basket {
    fn from(products: Vec<ProductId>) -> Self {
        Self(products)
    }
}

impl FromStr for Basket {
    type Err = BasketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for Basket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl Serialize for Basket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Basket {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BasketVisitor;

        impl Visitor<'_> for BasketVisitor {
            type Value = Basket;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a bracketed list of product ids")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Basket, E> {
                Basket::decode(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(BasketVisitor)
    }
}

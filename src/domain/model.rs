use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;

/// Product identifiers appear both as numbers and strings in catalog files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub market_id: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub category: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// `None` when the document has no `prices` array for this product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prices: Option<Vec<PriceEntry>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn prices(&self) -> &[PriceEntry] {
        self.prices.as_deref().unwrap_or(&[])
    }
}

/// `products` stays optional: a document without it is served as-is and
/// never jittered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markets: Option<Vec<Market>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Catalog {
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    pub fn markets(&self) -> &[Market] {
        self.markets.as_deref().unwrap_or(&[])
    }

    pub fn products(&self) -> &[Product] {
        self.products.as_deref().unwrap_or(&[])
    }

    pub fn market(&self, id: &str) -> Option<&Market> {
        self.markets().iter().find(|m| m.id == id)
    }

    pub fn market_ids(&self) -> BTreeSet<&str> {
        self.markets().iter().map(|m| m.id.as_str()).collect()
    }

    /// Distinct market ids referenced by any price entry.
    pub fn referenced_market_ids(&self) -> BTreeSet<&str> {
        self.products()
            .iter()
            .flat_map(|p| p.prices().iter())
            .map(|pr| pr.market_id.as_str())
            .collect()
    }

    /// `(product id, market id)` pairs whose market is not in `markets`.
    pub fn dangling_market_refs(&self) -> Vec<(ProductId, String)> {
        let known = self.market_ids();
        self.products()
            .iter()
            .flat_map(|p| {
                p.prices()
                    .iter()
                    .filter(|pr| !known.contains(pr.market_id.as_str()))
                    .map(move |pr| (p.id.clone(), pr.market_id.clone()))
            })
            .collect()
    }
}

/// Client-side cart line. Never sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product: Product,
    pub market_id: String,
    pub price: f64,
    pub quantity: u32,
}

impl CartItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Body of `GET /api/status`. Backends report `port`, `uptime` or both, so
/// readers treat every field as optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
}

fn default_status() -> String {
    "online".to_string()
}

impl StatusReport {
    pub fn online(port: u16, uptime: f64) -> Self {
        Self {
            status: default_status(),
            port: Some(port),
            uptime: Some(uptime),
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

use crate::core::Catalog;
use crate::utils::error::{Result, ScanError};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};
use rand::Rng;
use std::fmt::Write;

pub const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Rejects strftime strings chrono cannot render.
pub fn validate_date_format(format: &str) -> Result<()> {
    if format.trim().is_empty() || StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(ScanError::InvalidConfigValueError {
            field: "jitter.date_format".to_string(),
            value: format.to_string(),
            reason: "not a valid strftime format".to_string(),
        });
    }
    Ok(())
}

/// Multiplicative band a jittered price is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JitterBand {
    low: f64,
    high: f64,
}

impl JitterBand {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !(low.is_finite() && high.is_finite()) || low <= 0.0 || low > high {
            return Err(ScanError::InvalidConfigValueError {
                field: "jitter".to_string(),
                value: format!("[{}, {}]", low, high),
                reason: "band must satisfy 0 < low <= high".to_string(),
            });
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.low..=self.high)
    }

    /// `round(price * factor, 2)`, kept inside `[price*low, price*high]`.
    pub fn apply(&self, price: f64, factor: f64) -> f64 {
        let rounded = round_cents(price * factor);
        let (lo, hi) = self.bounds(price);
        if hi - lo < 0.01 {
            return rounded;
        }
        if rounded < lo {
            ceil_cents(lo)
        } else if rounded > hi {
            floor_cents(hi)
        } else {
            rounded
        }
    }

    pub fn bounds(&self, price: f64) -> (f64, f64) {
        let a = price * self.low;
        let b = price * self.high;
        // negative prices flip the interval
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }
}

impl Default for JitterBand {
    fn default() -> Self {
        Self {
            low: 0.98,
            high: 1.02,
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ceil_cents(value: f64) -> f64 {
    // tolerate representation error such as 9.499999999999998
    ((value * 100.0) - 1e-6).ceil() / 100.0
}

fn floor_cents(value: f64) -> f64 {
    ((value * 100.0) + 1e-6).floor() / 100.0
}

/// Produces a freshly priced copy of a catalog.
#[derive(Debug, Clone)]
pub struct Jitterer {
    band: JitterBand,
    date_format: String,
}

impl Jitterer {
    pub fn new(band: JitterBand, date_format: impl Into<String>) -> Self {
        Self {
            band,
            date_format: date_format.into(),
        }
    }

    pub fn jitter(&self, catalog: &Catalog) -> Catalog {
        let mut rng = rand::thread_rng();
        self.jitter_with(catalog, &mut rng, Local::now())
    }

    /// A catalog without a `products` collection, or with a product that has
    /// no `prices` array, is returned untouched, `lastUpdated` included.
    pub fn jitter_with<R: Rng>(
        &self,
        catalog: &Catalog,
        rng: &mut R,
        now: DateTime<Local>,
    ) -> Catalog {
        let Some(products) = &catalog.products else {
            tracing::warn!("Catalog has no products collection, leaving it unchanged");
            return catalog.clone();
        };
        if let Some(product) = products.iter().find(|p| p.prices.is_none()) {
            tracing::warn!(
                "Product {} has no prices array, leaving the catalog unchanged",
                product.id
            );
            return catalog.clone();
        }

        let mut updated = catalog.clone();
        updated.products = Some(
            products
                .iter()
                .map(|product| {
                    let mut product = product.clone();
                    for entry in product.prices.iter_mut().flatten() {
                        let factor = self.band.sample(rng);
                        entry.price = self.band.apply(entry.price, factor);
                    }
                    product
                })
                .collect(),
        );
        let mut stamp = String::new();
        if write!(stamp, "{}", now.format(&self.date_format)).is_ok() {
            updated.last_updated = Some(stamp);
        } else {
            tracing::warn!(
                "Date format '{}' cannot be rendered, keeping previous lastUpdated",
                self.date_format
            );
        }
        updated
    }
}

impl Default for Jitterer {
    fn default() -> Self {
        Self::new(JitterBand::default(), DEFAULT_DATE_FORMAT)
    }
}

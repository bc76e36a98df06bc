use crate::client::browse::lowest_price;
use crate::core::{CartItem, Product};
use crate::utils::error::{Result, ScanError};

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Adds one unit at the product's cheapest market. The same
    /// product+market pair bumps quantity instead of adding a line.
    pub fn add(&mut self, product: &Product) -> Result<&CartItem> {
        let best = lowest_price(product.prices()).ok_or_else(|| ScanError::CartError {
            message: format!("'{}' has no prices", product.name),
        })?;
        let market_id = best.market_id.clone();
        let price = best.price;

        let index = match self
            .items
            .iter()
            .position(|item| item.product.id == product.id && item.market_id == market_id)
        {
            Some(index) => {
                self.items[index].quantity += 1;
                index
            }
            None => {
                self.items.push(CartItem {
                    product: product.clone(),
                    market_id,
                    price,
                    quantity: 1,
                });
                self.items.len() - 1
            }
        };

        Ok(&self.items[index])
    }

    pub fn remove(&mut self, index: usize) -> Option<CartItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

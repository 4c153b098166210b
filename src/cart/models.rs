//! Cart models.

use serde::{Deserialize, Serialize};

use crate::api::{Book, BookId};

/// A purchasable line in the cart.
///
/// Exists only at `quantity >= 1`; a line that would drop to zero is
/// removed instead. Prices are display snapshots taken when the book was
/// added; the backend re-resolves them at order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub book_id: BookId,
    pub title: String,
    pub unit_price: f64,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn from_book(book: &Book) -> Self {
        Self {
            book_id: book.id,
            title: book.title.clone(),
            unit_price: book.price,
            quantity: 1,
        }
    }

    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

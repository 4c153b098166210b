//! Cart store.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    api::{Book, BookId, OrderItemInput},
    cart::models::CartLine,
};

/// In-memory cart, one line per book, in the order books were first added.
///
/// All reads are value snapshots and the totals are recomputed on every
/// call, never cached. Stock is not checked here; the backend enforces it
/// at order submission.
#[derive(Debug, Default)]
pub struct CartStore {
    lines: RwLock<Vec<CartLine>>,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one copy of a book, merging into an existing line if present.
    pub fn add(&self, book: &Book) {
        let mut lines = self.write();

        match lines.iter_mut().find(|line| line.book_id == book.id) {
            Some(line) => line.quantity += 1,
            None => lines.push(CartLine::from_book(book)),
        }
    }

    /// Drop a line entirely. Unknown ids are a silent no-op.
    pub fn remove(&self, book_id: BookId) {
        self.write().retain(|line| line.book_id != book_id);
    }

    /// Overwrite a line's quantity. Zero removes the line, matching what
    /// a quantity stepper in the cart drawer does when decremented past
    /// one. Unknown ids are a silent no-op.
    pub fn set_quantity(&self, book_id: BookId, quantity: u32) {
        if quantity == 0 {
            self.remove(book_id);
            return;
        }

        if let Some(line) = self.write().iter_mut().find(|line| line.book_id == book_id) {
            line.quantity = quantity;
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear(&self) {
        self.write().clear();
    }

    /// Current lines, in insertion order.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.read().clone()
    }

    /// Sum of all line totals.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.read().iter().map(CartLine::line_total).sum()
    }

    /// Total number of copies across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.read().iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// The order submission payload: ids and quantities only, so the
    /// backend prices the order from its own catalog.
    #[must_use]
    pub fn order_items(&self) -> Vec<OrderItemInput> {
        self.read()
            .iter()
            .map(|line| OrderItemInput {
                book_id: line.book_id,
                quantity: line.quantity,
            })
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<CartLine>> {
        self.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<CartLine>> {
        self.lines.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use uuid::Uuid;

    use super::*;

    fn book(title: &str, price: f64) -> Book {
        Book {
            id: BookId::from_uuid(Uuid::new_v4()),
            title: title.to_owned(),
            author: "Ursula K. Le Guin".to_owned(),
            price,
            description: String::new(),
            cover_image_url: String::new(),
            stock_quantity: 100,
            category: "Science Fiction".to_owned(),
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn adding_the_same_book_twice_merges_into_one_line() {
        let cart = CartStore::new();
        let dispossessed = book("The Dispossessed", 8.99);

        cart.add(&dispossessed);
        cart.add(&dispossessed);

        let lines = cart.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 2);
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn adding_twice_equals_adding_then_setting_quantity_two() {
        let title = book("The Left Hand of Darkness", 7.50);

        let twice = CartStore::new();
        twice.add(&title);
        twice.add(&title);

        let set = CartStore::new();
        set.add(&title);
        set.set_quantity(title.id, 2);

        assert_eq!(twice.lines(), set.lines());
    }

    #[test]
    fn count_always_equals_the_sum_of_quantities() {
        let cart = CartStore::new();
        let a = book("A Wizard of Earthsea", 6.99);
        let b = book("The Tombs of Atuan", 6.99);

        cart.add(&a);
        cart.add(&b);
        cart.set_quantity(a.id, 3);
        cart.remove(b.id);
        cart.add(&b);

        let quantity_sum: u32 = cart.lines().iter().map(|line| line.quantity).sum();
        assert_eq!(cart.count(), quantity_sum);
        assert!(cart.lines().iter().all(|line| line.quantity >= 1));
    }

    #[test]
    fn setting_quantity_to_zero_removes_the_line() {
        let cart = CartStore::new();
        let title = book("The Lathe of Heaven", 5.25);

        cart.add(&title);
        cart.set_quantity(title.id, 0);

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn removing_an_unknown_book_is_a_no_op() {
        let cart = CartStore::new();
        cart.add(&book("Rocannon's World", 4.99));

        cart.remove(BookId::from_uuid(Uuid::new_v4()));
        cart.set_quantity(BookId::from_uuid(Uuid::new_v4()), 7);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn clear_empties_everything() {
        let cart = CartStore::new();
        cart.add(&book("Planet of Exile", 4.50));
        cart.add(&book("City of Illusions", 4.50));

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.count(), 0);
        assert_eq!(cart.total(), 0.0);
        assert!(cart.order_items().is_empty());
    }

    #[test]
    fn total_recomputes_from_current_lines() {
        let cart = CartStore::new();
        let a = book("The Word for World Is Forest", 6.00);
        let b = book("The Telling", 9.00);

        cart.add(&a);
        cart.add(&b);
        cart.set_quantity(a.id, 2);

        assert!((cart.total() - 21.00).abs() < f64::EPSILON);

        cart.remove(b.id);

        assert!((cart.total() - 12.00).abs() < f64::EPSILON);
    }

    #[test]
    fn lines_preserve_insertion_order() {
        let cart = CartStore::new();
        let first = book("Malafrena", 7.99);
        let second = book("Orsinian Tales", 7.99);

        cart.add(&first);
        cart.add(&second);
        cart.add(&first);

        let titles: Vec<_> = cart.lines().into_iter().map(|line| line.title).collect();
        assert_eq!(titles, vec!["Malafrena", "Orsinian Tales"]);
    }

    #[test]
    fn order_items_strip_client_side_prices() {
        let cart = CartStore::new();
        let title = book("Always Coming Home", 11.99);

        cart.add(&title);
        cart.set_quantity(title.id, 4);

        let items = cart.order_items();
        assert_eq!(
            items,
            vec![OrderItemInput {
                book_id: title.id,
                quantity: 4,
            }]
        );
    }
}

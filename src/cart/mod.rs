//! The in-memory shopping cart: an ordered set of product lines aggregated
//! by product id, with totals derived on every read. The cart is the single
//! owner of its state; HTTP handlers only dispatch mutations through
//! [`registry::CartRegistry`] and read back a projection.

pub mod checkout;
pub mod registry;
pub mod storage;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// The product display data captured when an item is first added. No
/// quantity: repeat adds of the same id bump the existing line instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub title: String,
    pub price: i64,
    pub image: String,
}

/// One aggregated cart entry. `title`, `price` and `image` are the snapshot
/// from the first add and are never refreshed afterwards; the catalog stays
/// the source of truth and the cart is a lightweight cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub id: Uuid,
    pub title: String,
    /// Minor currency units (cents).
    pub price: i64,
    pub image: String,
    pub quantity: i64,
}

/// The ordered line collection. Insertion order is first-add order, and
/// there is at most one line per product id with `quantity >= 1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from a stored snapshot. Foreign data gets the
    /// invariants re-imposed: zero/negative quantities are dropped and
    /// duplicated ids are merged into the first occurrence.
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity < 1 {
                continue;
            }
            match cart.lines.iter_mut().find(|l| l.id == line.id) {
                Some(existing) => existing.quantity += line.quantity,
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Increment the quantity of the matching line, or append a new line
    /// with quantity 1. Only the quantity changes on a repeat add.
    pub fn add(&mut self, item: ProductSnapshot) {
        match self.lines.iter_mut().find(|l| l.id == item.id) {
            Some(existing) => existing.quantity += 1,
            None => self.lines.push(CartLine {
                id: item.id,
                title: item.title,
                price: item.price,
                image: item.image,
                quantity: 1,
            }),
        }
    }

    /// Delete the line with the given id. Silently does nothing when the id
    /// is not in the cart.
    pub fn remove(&mut self, id: Uuid) {
        self.lines.retain(|l| l.id != id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_items(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_price(&self) -> i64 {
        self.lines.iter().map(|l| l.price * l.quantity).sum()
    }
}

/// Render an amount of minor units as a two-decimal major-unit string.
/// Rounding exists only here; all arithmetic stays in exact minor units.
pub fn display_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: Uuid, title: &str, price: i64) -> ProductSnapshot {
        ProductSnapshot {
            id,
            title: title.to_string(),
            price,
            image: format!("https://img.example/{title}.jpg"),
        }
    }

    #[test]
    fn repeat_adds_aggregate_into_one_line() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(snapshot(id, "Smartphone", 59999));
        cart.add(snapshot(id, "Smartphone", 59999));
        cart.add(snapshot(id, "Smartphone", 59999));

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.total_items(), 3);
    }

    #[test]
    fn repeat_add_keeps_first_snapshot() {
        let id = Uuid::new_v4();
        let mut cart = Cart::new();
        cart.add(snapshot(id, "Smartphone", 59999));

        // Second add with changed display data must not touch the line.
        let mut updated = snapshot(id, "Smartphone Pro", 64999);
        updated.image = "https://img.example/new.jpg".to_string();
        cart.add(updated);

        let line = &cart.lines()[0];
        assert_eq!(line.title, "Smartphone");
        assert_eq!(line.price, 59999);
        assert_eq!(line.image, "https://img.example/Smartphone.jpg");
        assert_eq!(line.quantity, 2);
    }

    #[test]
    fn insertion_order_is_first_add_order() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut cart = Cart::new();
        cart.add(snapshot(a, "Smartphone", 59999));
        cart.add(snapshot(b, "Laptop", 129999));
        cart.add(snapshot(a, "Smartphone", 59999));

        let titles: Vec<&str> = cart.lines().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Smartphone", "Laptop"]);
    }

    #[test]
    fn mixed_cart_totals() {
        // A at 599.99 once, B at 1299.99 once, A again.
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut cart = Cart::new();
        cart.add(snapshot(a, "Smartphone", 59999));
        cart.add(snapshot(b, "Laptop", 129999));
        cart.add(snapshot(a, "Smartphone", 59999));

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.total_items(), 3);
        assert_eq!(cart.total_price(), 249997);
        assert_eq!(display_amount(cart.total_price()), "2499.97");
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_price(), 0);
        assert_eq!(display_amount(0), "0.00");
    }

    #[test]
    fn remove_absent_id_is_a_noop() {
        let mut cart = Cart::new();
        cart.add(snapshot(Uuid::new_v4(), "Smartphone", 59999));
        let before = serde_json::to_string(cart.lines()).expect("serialize");

        cart.remove(Uuid::new_v4());

        let after = serde_json::to_string(cart.lines()).expect("serialize");
        assert_eq!(before, after);
    }

    #[test]
    fn remove_then_clear() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut cart = Cart::new();
        cart.add(snapshot(a, "Smartphone", 59999));
        cart.add(snapshot(b, "Laptop", 129999));

        cart.remove(a);
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id, b);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total_price(), 0);
    }

    #[test]
    fn from_lines_drops_dead_lines_and_merges_duplicates() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let line = |id: Uuid, quantity: i64| CartLine {
            id,
            title: "x".to_string(),
            price: 100,
            image: String::new(),
            quantity,
        };

        let cart = Cart::from_lines(vec![line(a, 2), line(b, 0), line(a, 3), line(b, -1)]);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].id, a);
        assert_eq!(cart.lines()[0].quantity, 5);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut cart = Cart::new();
        cart.add(snapshot(Uuid::new_v4(), "Smartphone", 59999));
        cart.add(snapshot(Uuid::new_v4(), "Laptop", 129999));

        let json = serde_json::to_string(cart.lines()).expect("serialize");
        let lines: Vec<CartLine> = serde_json::from_str(&json).expect("deserialize");
        let restored = Cart::from_lines(lines);

        assert_eq!(restored, cart);
    }

    #[test]
    fn display_amount_pads_cents() {
        assert_eq!(display_amount(5), "0.05");
        assert_eq!(display_amount(1299), "12.99");
        assert_eq!(display_amount(120000), "1200.00");
    }
}

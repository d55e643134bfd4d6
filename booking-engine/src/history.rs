//! Order history log
//!
//! Append-only list of completed orders, newest first. Recording is keyed
//! by booking id: a booking produces at most one entry no matter how often
//! the confirmation view is entered.

use crate::cart::OrderBook;
use crate::money::{line_total, sum_amounts, to_f64};
use crate::outcome::{CommandOutcome, IgnoredReason};
use shared::models::{
    Booking, OrderHistoryEntry, OrderHistoryItem, OrderHistoryStatus, Person,
    CART_ITEM_CATEGORY, GROUP_ORDER_LABEL,
};

/// Sort key for the history screen (both descending)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistorySort {
    /// Newest first
    #[default]
    Date,
    /// Largest total first
    Total,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderHistory {
    entries: Vec<OrderHistoryEntry>,
}

impl OrderHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<OrderHistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[OrderHistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_by_booking(&self, booking_id: &str) -> Option<&OrderHistoryEntry> {
        self.entries.iter().find(|e| e.booking_id == booking_id)
    }

    /// Prepend an entry unless its booking is already recorded
    ///
    /// Returns the stored entry for the booking and whether it is new.
    pub fn record(&mut self, entry: OrderHistoryEntry) -> (&OrderHistoryEntry, bool) {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| e.booking_id == entry.booking_id)
        {
            tracing::debug!(booking_id = %entry.booking_id, "Order already recorded for booking");
            return (&self.entries[idx], false);
        }
        tracing::info!(
            order_id = %entry.id,
            reference = %shared::util::short_reference(&entry.id),
            booking_id = %entry.booking_id,
            total = entry.total,
            "Order recorded"
        );
        self.entries.insert(0, entry);
        (&self.entries[0], true)
    }

    /// `None` keeps every status
    pub fn filtered(&self, status: Option<OrderHistoryStatus>) -> Vec<&OrderHistoryEntry> {
        self.entries
            .iter()
            .filter(|e| status.is_none_or(|s| e.status == s))
            .collect()
    }

    pub fn sorted(
        &self,
        status: Option<OrderHistoryStatus>,
        sort: HistorySort,
    ) -> Vec<&OrderHistoryEntry> {
        let mut entries = self.filtered(status);
        match sort {
            HistorySort::Date => entries.sort_by(|a, b| b.date.cmp(&a.date)),
            HistorySort::Total => entries.sort_by(|a, b| b.total.total_cmp(&a.total)),
        }
        entries
    }

    /// Σ total over every entry
    pub fn total_spent(&self) -> f64 {
        sum_amounts(self.entries.iter().map(|e| e.total))
    }

    pub fn completed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.status == OrderHistoryStatus::Completed)
            .count()
    }

    pub fn clear(&mut self) -> CommandOutcome {
        if self.entries.is_empty() {
            return IgnoredReason::NoChange.into();
        }
        self.entries.clear();
        CommandOutcome::Applied
    }
}

/// Flatten a confirmed booking into a history entry
///
/// - each pre-order unit becomes its own line, attributed to the person
/// - each shared-cart line visible for the booking's table becomes one
///   line at price × quantity, attributed to its person or the group
pub fn build_entry(
    booking: &Booking,
    table_number: u32,
    people: &[Person],
    book: &OrderBook,
) -> OrderHistoryEntry {
    let mut items = Vec::new();

    for person in people {
        for line in book.pre_order_lines_for(&person.id) {
            for _ in 0..line.quantity {
                items.push(OrderHistoryItem {
                    item_id: line.food.id.clone(),
                    name: line.food.name.clone(),
                    price: line.food.price,
                    quantity: 1,
                    person_name: person.name.clone(),
                    category: line.food.category.clone(),
                });
            }
        }
    }

    for line in book.items_for_table(Some(booking.table_id.as_str())) {
        items.push(OrderHistoryItem {
            item_id: line.food.id.clone(),
            name: line.food.name.clone(),
            price: to_f64(line_total(line.food.price, line.quantity)),
            quantity: line.quantity,
            person_name: line
                .person_name
                .clone()
                .unwrap_or_else(|| GROUP_ORDER_LABEL.to_string()),
            category: Some(CART_ITEM_CATEGORY.to_string()),
        });
    }

    let total = sum_amounts(items.iter().map(|i| i.price));
    OrderHistoryEntry {
        id: format!("order-{}", uuid::Uuid::new_v4()),
        table_number,
        booking_id: booking.id.clone(),
        items,
        total,
        date: shared::util::now_millis(),
        status: OrderHistoryStatus::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{BookingStatus, BookingType, CartItemInput, FoodRef};

    fn booking(id: &str, table_id: &str) -> Booking {
        Booking {
            id: id.to_string(),
            table_id: table_id.to_string(),
            booking_type: BookingType::Individual,
            number_of_people: 1,
            people: Vec::new(),
            booked_seats: vec![2],
            status: BookingStatus::Confirmed,
            created_at: 0,
        }
    }

    fn entry(booking_id: &str, total: f64, date: i64, status: OrderHistoryStatus) -> OrderHistoryEntry {
        OrderHistoryEntry {
            id: format!("order-{booking_id}"),
            table_number: 1,
            booking_id: booking_id.to_string(),
            items: Vec::new(),
            total,
            date,
            status,
        }
    }

    #[test]
    fn test_pre_order_units_are_expanded() {
        let mut alice = Person::new("p1", 2, "1");
        alice.name = "Alice".to_string();
        let mut book = OrderBook::new();
        let mut salad = FoodRef::new("1", "Caesar Salad", 12.99);
        salad.category = Some("Appetizers".to_string());
        book.add_to_person("p1", salad, 2, Some("1"));

        let e = build_entry(&booking("b1", "1"), 1, &[alice], &book);
        assert_eq!(e.items.len(), 2);
        assert!(e.items.iter().all(|i| i.person_name == "Alice" && i.price == 12.99));
        assert_eq!(e.items[0].category.as_deref(), Some("Appetizers"));
        assert_eq!(e.total, 25.98);
        assert_eq!(e.item_count(), 2);
    }

    #[test]
    fn test_cart_lines_priced_by_quantity() {
        let mut book = OrderBook::new();
        book.add(CartItemInput::new(FoodRef::new("a", "A", 10.0)).quantity(3));
        book.add(
            CartItemInput::new(FoodRef::new("b", "B", 5.0))
                .person("p9", "Zoe")
                .table("4"),
        );
        // Different table: not part of this order
        book.add(CartItemInput::new(FoodRef::new("c", "C", 99.0)).table("2"));

        let e = build_entry(&booking("b1", "4"), 4, &[], &book);
        assert_eq!(e.items.len(), 2);
        assert_eq!(e.items[0].price, 30.0);
        assert_eq!(e.items[0].person_name, GROUP_ORDER_LABEL);
        assert_eq!(e.items[0].category.as_deref(), Some(CART_ITEM_CATEGORY));
        assert_eq!(e.items[1].person_name, "Zoe");
        assert_eq!(e.total, 35.0);
        assert_eq!(e.table_number, 4);
    }

    #[test]
    fn test_record_is_idempotent_per_booking() {
        let mut history = OrderHistory::new();
        let (_, inserted) = history.record(entry("b1", 10.0, 1, OrderHistoryStatus::Completed));
        assert!(inserted);

        let (stored, inserted) = history.record(entry("b1", 99.0, 2, OrderHistoryStatus::Completed));
        assert!(!inserted);
        assert_eq!(stored.total, 10.0);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_newest_first() {
        let mut history = OrderHistory::new();
        history.record(entry("b1", 10.0, 1, OrderHistoryStatus::Completed));
        history.record(entry("b2", 20.0, 2, OrderHistoryStatus::Completed));
        assert_eq!(history.entries()[0].booking_id, "b2");
        assert!(history.find_by_booking("b1").is_some());
    }

    #[test]
    fn test_filter_sort_and_stats() {
        let history = OrderHistory::from_entries(vec![
            entry("b1", 10.10, 3, OrderHistoryStatus::Completed),
            entry("b2", 50.0, 1, OrderHistoryStatus::Pending),
            entry("b3", 20.20, 2, OrderHistoryStatus::Completed),
        ]);

        let by_date: Vec<_> = history
            .sorted(None, HistorySort::Date)
            .iter()
            .map(|e| e.booking_id.as_str())
            .collect();
        assert_eq!(by_date, vec!["b1", "b3", "b2"]);

        let by_total: Vec<_> = history
            .sorted(Some(OrderHistoryStatus::Completed), HistorySort::Total)
            .iter()
            .map(|e| e.booking_id.as_str())
            .collect();
        assert_eq!(by_total, vec!["b3", "b1"]);

        assert_eq!(history.filtered(Some(OrderHistoryStatus::Pending)).len(), 1);
        assert_eq!(history.total_spent(), 80.3);
        assert_eq!(history.completed_count(), 2);
    }

    #[test]
    fn test_clear() {
        let mut history = OrderHistory::new();
        assert_eq!(history.clear(), CommandOutcome::Ignored(IgnoredReason::NoChange));
        history.record(entry("b1", 1.0, 1, OrderHistoryStatus::Completed));
        assert!(history.clear().is_applied());
        assert!(history.is_empty());
    }
}

//! Order book (订单行)
//!
//! One collection for every order line of the session. Shared-cart lines
//! and per-person pre-order lines live side by side, told apart by
//! [`LineSource`]; the per-person [`FoodSelection`] lists and the cart
//! sidebar are views over the same vector.
//!
//! # Merge rules
//!
//! | Source | Key | On add |
//! |--------|-----|--------|
//! | `Cart` | `(id, optionKey, personId)` | quantity accumulates |
//! | `PreOrder` | `(id, personId)` | quantity += delta, line removed at 0 |

use crate::money;
use crate::outcome::{CommandOutcome, IgnoredReason};
use shared::models::{
    CartItemInput, FoodRef, FoodSelection, LineKey, LineSource, OrderLine, Person,
    PersonSelections,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBook {
    lines: Vec<OrderLine>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the two persisted lists
    ///
    /// Cart items are re-tagged as cart lines and merged by key; each
    /// person's selections become pre-order lines owned by that person.
    pub fn from_parts(cart_items: Vec<OrderLine>, selections: &[PersonSelections]) -> Self {
        let mut book = Self::new();
        for mut line in cart_items {
            line.source = LineSource::Cart;
            if line.quantity == 0 {
                continue;
            }
            book.merge_line(line);
        }
        for record in selections {
            book.replace_person_selections(&record.id, &record.food_selections, None);
        }
        book
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|l| &l.key() == key)
    }

    fn merge_line(&mut self, line: OrderLine) {
        match self.position(&line.key()) {
            Some(idx) => self.lines[idx].quantity += line.quantity,
            None => self.lines.push(line),
        }
    }

    // ========== Shared cart ==========

    /// Add with merge: identical (id, optionKey, personId) accumulates quantity
    pub fn add(&mut self, input: CartItemInput) -> CommandOutcome {
        self.merge_line(OrderLine::from_input(input));
        CommandOutcome::Applied
    }

    /// Remove a cart line entirely
    pub fn remove(&mut self, key: &LineKey) -> CommandOutcome {
        match self.position(key) {
            Some(idx) => {
                self.lines.remove(idx);
                CommandOutcome::Applied
            }
            None => IgnoredReason::LineNotFound.into(),
        }
    }

    /// Decrement by one; the line goes away when it reaches zero
    pub fn decrement(&mut self, key: &LineKey) -> CommandOutcome {
        self.change_quantity_by(key, -1)
    }

    /// Apply a signed delta; quantity floors at zero and the line is removed there
    pub fn change_quantity_by(&mut self, key: &LineKey, delta: i32) -> CommandOutcome {
        let Some(idx) = self.position(key) else {
            return IgnoredReason::LineNotFound.into();
        };
        if delta == 0 {
            return IgnoredReason::NoChange.into();
        }
        let next = apply_delta(self.lines[idx].quantity, delta);
        if next == 0 {
            self.lines.remove(idx);
        } else {
            self.lines[idx].quantity = next;
        }
        CommandOutcome::Applied
    }

    /// Drop every shared-cart line (pre-orders stay)
    pub fn clear(&mut self) -> CommandOutcome {
        let before = self.lines.len();
        self.lines.retain(|l| l.is_pre_order());
        changed(before, self.lines.len())
    }

    /// Drop the shared-cart lines stamped with a table
    pub fn clear_by_table(&mut self, table_id: &str) -> CommandOutcome {
        let before = self.lines.len();
        self.lines
            .retain(|l| l.is_pre_order() || l.table_id.as_deref() != Some(table_id));
        changed(before, self.lines.len())
    }

    /// Stamp a table on every shared-cart line that has none
    pub fn assign_table_to_unowned(&mut self, table_id: &str) -> CommandOutcome {
        let mut touched = 0;
        for line in self.lines.iter_mut().filter(|l| !l.is_pre_order()) {
            if line.table_id.is_none() {
                line.table_id = Some(table_id.to_string());
                touched += 1;
            }
        }
        if touched == 0 {
            IgnoredReason::NoChange.into()
        } else {
            CommandOutcome::Applied
        }
    }

    pub fn cart_lines(&self) -> impl Iterator<Item = &OrderLine> {
        self.lines.iter().filter(|l| !l.is_pre_order())
    }

    /// Cart lines visible for a table; everything when no table is in context
    pub fn items_for_table(&self, table_id: Option<&str>) -> Vec<&OrderLine> {
        self.cart_lines()
            .filter(|l| table_id.is_none_or(|t| l.belongs_to_table(t)))
            .collect()
    }

    /// Σ quantity of the cart lines visible for a table
    pub fn cart_count(&self, table_id: Option<&str>) -> u32 {
        self.items_for_table(table_id)
            .iter()
            .map(|l| l.quantity)
            .sum()
    }

    /// Σ price × quantity of the cart lines visible for a table
    pub fn cart_subtotal(&self, table_id: Option<&str>) -> f64 {
        money::lines_subtotal(self.items_for_table(table_id))
    }

    // ========== Per-person pre-orders ==========

    /// Apply `delta` to a person's selection for a food item
    ///
    /// A missing selection is created only for a positive delta; the
    /// selection is removed when its quantity reaches zero.
    pub fn add_to_person(
        &mut self,
        person_id: &str,
        food: FoodRef,
        delta: i32,
        table_id: Option<&str>,
    ) -> CommandOutcome {
        let key = pre_order_key(person_id, &food.id);
        match self.position(&key) {
            Some(idx) => {
                if delta == 0 {
                    return IgnoredReason::NoChange.into();
                }
                let next = apply_delta(self.lines[idx].quantity, delta);
                if next == 0 {
                    self.lines.remove(idx);
                } else {
                    self.lines[idx].quantity = next;
                }
                CommandOutcome::Applied
            }
            None if delta > 0 => {
                self.lines.push(OrderLine::pre_order(
                    person_id,
                    food,
                    delta.unsigned_abs(),
                    table_id.map(str::to_string),
                ));
                CommandOutcome::Applied
            }
            None => IgnoredReason::LineNotFound.into(),
        }
    }

    /// Remove one unit, or the whole selection when `all` is set or one unit is left
    pub fn remove_from_person(&mut self, person_id: &str, food_id: &str, all: bool) -> CommandOutcome {
        let key = pre_order_key(person_id, food_id);
        let Some(idx) = self.position(&key) else {
            return IgnoredReason::LineNotFound.into();
        };
        if all || self.lines[idx].quantity <= 1 {
            self.lines.remove(idx);
        } else {
            self.lines[idx].quantity -= 1;
        }
        CommandOutcome::Applied
    }

    /// A person's selections, in insertion order
    pub fn selections_for(&self, person_id: &str) -> Vec<FoodSelection> {
        self.pre_order_lines_for(person_id)
            .map(OrderLine::to_selection)
            .collect()
    }

    pub fn pre_order_lines_for<'a>(
        &'a self,
        person_id: &'a str,
    ) -> impl Iterator<Item = &'a OrderLine> + 'a {
        self.lines
            .iter()
            .filter(move |l| l.is_pre_order() && l.person_id.as_deref() == Some(person_id))
    }

    /// Σ quantity over a person's selections
    pub fn person_item_count(&self, person_id: &str) -> u32 {
        self.pre_order_lines_for(person_id).map(|l| l.quantity).sum()
    }

    /// Replace a person's pre-order lines with a stored selection list
    ///
    /// Selections with quantity 0 are dropped and repeated food ids merge,
    /// keeping at most one selection per food item.
    pub fn replace_person_selections(
        &mut self,
        person_id: &str,
        selections: &[FoodSelection],
        table_id: Option<&str>,
    ) {
        self.lines
            .retain(|l| !(l.is_pre_order() && l.person_id.as_deref() == Some(person_id)));
        for sel in selections.iter().filter(|s| s.quantity > 0) {
            self.merge_line(OrderLine::pre_order(
                person_id,
                sel.food.clone(),
                sel.quantity,
                table_id.map(str::to_string),
            ));
        }
    }

    /// Drop pre-order lines whose owner is not in `people`
    pub fn retain_pre_orders_for(&mut self, people: &[Person]) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| {
            !l.is_pre_order()
                || l.person_id
                    .as_deref()
                    .is_some_and(|pid| people.iter().any(|p| p.id == pid))
        });
        before - self.lines.len()
    }

    pub fn clear_pre_orders(&mut self) -> usize {
        let before = self.lines.len();
        self.lines.retain(|l| !l.is_pre_order());
        before - self.lines.len()
    }

    /// Compact per-person record list as persisted: `[{ id, foodSelections }]`
    pub fn person_selections(&self, people: &[Person]) -> Vec<PersonSelections> {
        people
            .iter()
            .map(|p| PersonSelections {
                id: p.id.clone(),
                food_selections: self.selections_for(&p.id),
            })
            .collect()
    }
}

fn pre_order_key(person_id: &str, food_id: &str) -> LineKey {
    LineKey {
        item_id: food_id.to_string(),
        option_key: None,
        person_id: Some(person_id.to_string()),
        source: LineSource::PreOrder,
    }
}

/// max(0, quantity + delta)
fn apply_delta(quantity: u32, delta: i32) -> u32 {
    let next = i64::from(quantity) + i64::from(delta);
    u32::try_from(next.max(0)).unwrap_or(u32::MAX)
}

fn changed(before: usize, after: usize) -> CommandOutcome {
    if before == after {
        IgnoredReason::NoChange.into()
    } else {
        CommandOutcome::Applied
    }
}

//! Booking session (预订会话)
//!
//! Owns every piece of session state and the persistence port. Commands
//! are delegated to the reducers; an applied command is followed by a
//! save, an ignored one leaves storage untouched.
//!
//! After each applied booking command the pre-order lines are pruned to
//! the current party, so clearing the party also clears its selections.

use crate::cart::OrderBook;
use crate::catalog::Catalog;
use crate::core::EngineConfig;
use crate::flow::FlowView;
use crate::history::{self, OrderHistory};
use crate::layout::{ImmediateLayoutSink, LayoutSink, LayoutStore};
use crate::outcome::{CommandOutcome, IgnoredReason};
use crate::storage::{
    BookingSnapshot, CartState, KeyValueStore, RestaurantState, SessionPersistence,
    SessionSnapshot,
};
use crate::workflow::BookingWorkflow;
use serde::Serialize;
use shared::AppResult;
use shared::models::{
    BookingStep, BookingType, CartItemInput, FoodRef, LineKey, OrderHistoryEntry, OrderLine,
    PersonSummary, Position, TableFlags, TableLayout,
};
use std::sync::Arc;

/// Shared-cart sidebar for the selected table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub table_id: Option<String>,
    pub lines: Vec<OrderLine>,
    pub item_count: u32,
    pub subtotal: f64,
}

pub struct BookingSession {
    config: EngineConfig,
    persistence: SessionPersistence,
    workflow: BookingWorkflow,
    book: OrderBook,
    catalog: Catalog,
    layout: LayoutStore,
    history: OrderHistory,
}

impl std::fmt::Debug for BookingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingSession")
            .field("step", &self.workflow.step())
            .field("selected_table", &self.workflow.state().selected_table)
            .field("lines", &self.book.lines().len())
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl BookingSession {
    /// Open a session over `store`, resuming whatever it holds
    ///
    /// Missing or corrupt keys fall back to defaults; only an invalid
    /// configuration is an error.
    pub fn open(
        config: EngineConfig,
        store: Arc<dyn KeyValueStore>,
        sink: Box<dyn LayoutSink>,
    ) -> AppResult<Self> {
        config.validate()?;
        let persistence = SessionPersistence::new(store);

        let snapshot = persistence.load_session();
        let resumed = snapshot.is_some();
        let SessionSnapshot {
            booking,
            cart,
            restaurant,
        } = snapshot.unwrap_or_default();

        let workflow = BookingWorkflow::from_state(booking.state, config.max_party_size);

        let selections = persistence.load_person_selections();
        let mut book = OrderBook::from_parts(cart.items, &selections);
        let dropped = book.retain_pre_orders_for(workflow.people());
        if dropped > 0 {
            tracing::debug!(dropped, "Stored selections without a matching person dropped");
        }

        let mut catalog = Catalog::seeded();
        if let Some(category) = restaurant.active_category.as_deref() {
            catalog.set_active_category(category);
        }

        let mut layout = LayoutStore::new(sink, config.snap_increment, config.layout_delays());
        layout.init_from_storage(&persistence, config.layout_init_options());

        let history = OrderHistory::from_entries(booking.order_history);

        tracing::info!(
            resumed,
            step = %workflow.step(),
            people = workflow.people().len(),
            history = history.len(),
            "Booking session opened"
        );

        Ok(Self {
            config,
            persistence,
            workflow,
            book,
            catalog,
            layout,
            history,
        })
    }

    /// Open with layout writes going straight to `store`
    pub fn open_with_store(config: EngineConfig, store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        let sink = ImmediateLayoutSink::new(SessionPersistence::new(store.clone()));
        Self::open(config, store, Box::new(sink))
    }

    // ========== Queries ==========

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workflow(&self) -> &BookingWorkflow {
        &self.workflow
    }

    pub fn order_book(&self) -> &OrderBook {
        &self.book
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn layout(&self) -> &LayoutStore {
        &self.layout
    }

    pub fn history(&self) -> &OrderHistory {
        &self.history
    }

    pub fn flow(&self) -> FlowView {
        FlowView::of(&self.workflow)
    }

    /// People with their selections, in seat order of creation
    pub fn people_summaries(&self) -> Vec<PersonSummary> {
        self.workflow
            .people()
            .iter()
            .map(|p| PersonSummary {
                person: p.clone(),
                food_selections: self.book.selections_for(&p.id),
                item_count: self.book.person_item_count(&p.id),
            })
            .collect()
    }

    pub fn cart_view(&self) -> CartView {
        let table_id = self.workflow.state().selected_table.clone();
        let lines = self
            .book
            .items_for_table(table_id.as_deref())
            .into_iter()
            .cloned()
            .collect();
        CartView {
            item_count: self.book.cart_count(table_id.as_deref()),
            subtotal: self.book.cart_subtotal(table_id.as_deref()),
            table_id,
            lines,
        }
    }

    /// What would be written under the session key right now
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            booking: BookingSnapshot {
                state: self.workflow.state().clone(),
                order_history: self.history.entries().to_vec(),
            },
            cart: CartState {
                items: self.book.cart_lines().cloned().collect(),
            },
            restaurant: RestaurantState {
                selected_table: self.workflow.state().selected_table.clone(),
                active_category: Some(self.catalog.active_category_id().to_string()),
            },
        }
    }

    // ========== Persistence ==========

    fn save_session(&self) {
        if let Err(e) = self.persistence.save_session(&self.snapshot()) {
            tracing::warn!(error = %e, "Failed to save booking session");
        }
    }

    fn save_selections(&self) {
        let records = self.book.person_selections(self.workflow.people());
        if let Err(e) = self.persistence.save_person_selections(&records) {
            tracing::warn!(error = %e, "Failed to save person selections");
        }
    }

    /// Persist after a booking command; pre-orders follow the party
    fn after_booking_command(&mut self, outcome: CommandOutcome) -> CommandOutcome {
        if outcome.is_applied() {
            let pruned = self.book.retain_pre_orders_for(self.workflow.people());
            if pruned > 0 {
                tracing::debug!(pruned, "Selections of removed people dropped");
            }
            self.save_session();
            self.save_selections();
        }
        outcome
    }

    /// Persist after a cart or catalog command
    fn after_cart_command(&mut self, outcome: CommandOutcome) -> CommandOutcome {
        if outcome.is_applied() {
            self.save_session();
        }
        outcome
    }

    /// Write everything now: session, selections and the table layout
    pub fn flush(&self) {
        self.save_session();
        self.save_selections();
        self.layout.flush();
    }

    // ========== Booking commands ==========

    pub fn select_table(&mut self, table_id: &str) -> CommandOutcome {
        let outcome = self.workflow.select_table(table_id);
        self.after_booking_command(outcome)
    }

    pub fn select_table_by_number(&mut self, number: u32) -> CommandOutcome {
        let outcome = self.workflow.select_table_by_number(number);
        self.after_booking_command(outcome)
    }

    pub fn advance_to_seat_selection(&mut self) -> CommandOutcome {
        let outcome = self.workflow.advance_to_seat_selection();
        self.after_booking_command(outcome)
    }

    /// Switching to individual also resets the party size to one
    pub fn set_booking_type(&mut self, booking_type: BookingType) -> CommandOutcome {
        let outcome = self.workflow.set_booking_type(booking_type);
        if outcome.is_applied() && booking_type == BookingType::Individual {
            self.workflow.set_number_of_people(1);
        }
        self.after_booking_command(outcome)
    }

    pub fn set_number_of_people(&mut self, n: u32) -> CommandOutcome {
        let outcome = self.workflow.set_number_of_people(n);
        self.after_booking_command(outcome)
    }

    pub fn toggle_seat(&mut self, seat: u32) -> CommandOutcome {
        let outcome = self.workflow.toggle_seat(seat);
        self.after_booking_command(outcome)
    }

    pub fn proceed_to_person_details(&mut self) -> CommandOutcome {
        let outcome = self.workflow.proceed_to_person_details();
        self.after_booking_command(outcome)
    }

    pub fn update_person_name(&mut self, person_id: &str, name: &str) -> CommandOutcome {
        let outcome = self.workflow.update_person_name(person_id, name);
        self.after_booking_command(outcome)
    }

    pub fn proceed_to_food_selection(&mut self) -> CommandOutcome {
        let outcome = self.workflow.proceed_to_food_selection();
        self.after_booking_command(outcome)
    }

    pub fn add_food_to_person(&mut self, person_id: &str, food: FoodRef, delta: i32) -> CommandOutcome {
        let outcome = self
            .workflow
            .add_food_to_person(&mut self.book, person_id, food, delta);
        self.after_booking_command(outcome)
    }

    /// Same as [`add_food_to_person`](Self::add_food_to_person), by catalog id
    pub fn add_menu_item_to_person(
        &mut self,
        person_id: &str,
        item_id: &str,
        delta: i32,
    ) -> CommandOutcome {
        let Some(item) = self.catalog.find_item(item_id) else {
            return IgnoredReason::FoodItemNotFound.into();
        };
        let food = FoodRef::from(item);
        self.add_food_to_person(person_id, food, delta)
    }

    pub fn remove_food_from_person(&mut self, person_id: &str, food_id: &str, all: bool) -> CommandOutcome {
        let outcome = self
            .workflow
            .remove_food_from_person(&mut self.book, person_id, food_id, all);
        self.after_booking_command(outcome)
    }

    pub fn go_back_to_step(&mut self, step: BookingStep) -> CommandOutcome {
        let outcome = self.workflow.go_back_to_step(step);
        self.after_booking_command(outcome)
    }

    /// Confirm, then record the order for the confirmation view
    pub fn confirm_booking(&mut self) -> CommandOutcome {
        let outcome = self.workflow.confirm_booking();
        let outcome = self.after_booking_command(outcome);
        if outcome.is_applied() {
            self.enter_confirmation();
        }
        outcome
    }

    /// Record the confirmed booking in the order history
    ///
    /// Safe to call on every visit of the confirmation view: a booking is
    /// recorded once and later calls return the stored entry. `None` when
    /// no confirmed booking exists.
    pub fn enter_confirmation(&mut self) -> Option<&OrderHistoryEntry> {
        let booking = self.workflow.current_booking().filter(|b| b.is_confirmed())?;
        if self.history.find_by_booking(&booking.id).is_none() {
            let table_number = self
                .workflow
                .table(&booking.table_id)
                .map(|t| t.number)
                .unwrap_or_default();
            let entry = history::build_entry(&booking, table_number, &booking.people, &self.book);
            self.history.record(entry);
            self.save_session();
        }
        self.history.find_by_booking(&booking.id)
    }

    pub fn reset_booking(&mut self) -> CommandOutcome {
        let outcome = self.workflow.reset_booking();
        tracing::info!("Booking reset");
        self.after_booking_command(outcome)
    }

    /// Fresh booking and an empty shared cart
    pub fn start_new_order(&mut self) -> CommandOutcome {
        self.book.clear();
        self.reset_booking()
    }

    // ========== Selection restore ==========

    /// Re-read stored selections for every person of the current party
    pub fn load_all_person_selections(&mut self) -> CommandOutcome {
        let records = self.persistence.load_person_selections();
        let table_id = self.workflow.state().selected_table.clone();
        let mut restored = 0;
        for record in &records {
            if self.workflow.person(&record.id).is_some() {
                self.book
                    .replace_person_selections(&record.id, &record.food_selections, table_id.as_deref());
                restored += 1;
            }
        }
        if restored == 0 {
            return IgnoredReason::NoChange.into();
        }
        tracing::debug!(restored, "Person selections restored");
        CommandOutcome::Applied
    }

    /// Re-read stored selections for one person
    pub fn load_person_selections(&mut self, person_id: &str) -> CommandOutcome {
        if self.workflow.person(person_id).is_none() {
            return IgnoredReason::PersonNotFound.into();
        }
        let records = self.persistence.load_person_selections();
        let Some(record) = records.iter().find(|r| r.id == person_id) else {
            return IgnoredReason::NoChange.into();
        };
        let table_id = self.workflow.state().selected_table.clone();
        self.book
            .replace_person_selections(person_id, &record.food_selections, table_id.as_deref());
        CommandOutcome::Applied
    }

    // ========== Shared cart ==========

    /// Add to the shared cart
    ///
    /// A chosen size takes its price from the catalog, and a line without
    /// a table is stamped with the selected one.
    pub fn add_to_cart(&mut self, mut input: CartItemInput) -> CommandOutcome {
        if let Some(size) = input.options.as_ref().and_then(|o| o.size.as_deref())
            && let Some(item) = self.catalog.find_item(&input.food.id)
        {
            input.food.price = item.price_for_size(Some(size));
        }
        if input.table_id.is_none() {
            input.table_id = self.workflow.state().selected_table.clone();
        }
        let outcome = self.book.add(input);
        self.after_cart_command(outcome)
    }

    pub fn remove_cart_line(&mut self, key: &LineKey) -> CommandOutcome {
        let outcome = self.book.remove(key);
        self.after_cart_command(outcome)
    }

    pub fn change_cart_quantity(&mut self, key: &LineKey, delta: i32) -> CommandOutcome {
        let outcome = self.book.change_quantity_by(key, delta);
        self.after_cart_command(outcome)
    }

    pub fn clear_cart(&mut self) -> CommandOutcome {
        let outcome = self.book.clear();
        self.after_cart_command(outcome)
    }

    pub fn clear_cart_for_table(&mut self, table_id: &str) -> CommandOutcome {
        let outcome = self.book.clear_by_table(table_id);
        self.after_cart_command(outcome)
    }

    /// Stamp the selected table on cart lines that have none
    pub fn assign_cart_to_selected_table(&mut self) -> CommandOutcome {
        let Some(table_id) = self.workflow.state().selected_table.clone() else {
            return IgnoredReason::NoTableSelected.into();
        };
        let outcome = self.book.assign_table_to_unowned(&table_id);
        self.after_cart_command(outcome)
    }

    pub fn set_active_category(&mut self, category_id: &str) -> CommandOutcome {
        let outcome = self.catalog.set_active_category(category_id);
        self.after_cart_command(outcome)
    }

    // ========== History ==========

    pub fn clear_history(&mut self) -> CommandOutcome {
        let outcome = self.history.clear();
        self.after_cart_command(outcome)
    }

    // ========== Table layout ==========

    /// Move a table on the floor plan and in the seat inventory
    pub fn update_table_position(&mut self, table_id: &str, position: Position) -> CommandOutcome {
        let in_layout = self.layout.update_position(table_id, position, None);
        let in_inventory = self
            .workflow
            .update_table_position(table_id, position, self.config.snap_increment);
        if in_inventory.is_applied() {
            self.save_session();
        }
        if in_layout.is_applied() || in_inventory.is_applied() {
            CommandOutcome::Applied
        } else {
            IgnoredReason::TableNotFound.into()
        }
    }

    pub fn set_layout_tables(&mut self, tables: Vec<TableLayout>) -> CommandOutcome {
        self.layout.set_all(tables)
    }

    pub fn upsert_layout_table(&mut self, table: TableLayout) -> CommandOutcome {
        self.layout.upsert(table)
    }

    pub fn remove_layout_table(&mut self, table_id: &str) -> CommandOutcome {
        self.layout.remove(table_id)
    }

    pub fn set_table_size(
        &mut self,
        table_id: &str,
        width: Option<f64>,
        height: Option<f64>,
    ) -> CommandOutcome {
        self.layout.set_size(table_id, width, height)
    }

    pub fn set_table_flags(&mut self, table_id: &str, flags: TableFlags) -> CommandOutcome {
        self.layout.set_flags(table_id, flags)
    }

    pub fn set_table_background(&mut self, table_id: &str, image: Option<String>) -> CommandOutcome {
        self.layout.set_background(table_id, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RedbStore;

    fn open() -> BookingSession {
        let store = Arc::new(RedbStore::open_in_memory().unwrap());
        BookingSession::open_with_store(EngineConfig::with_overrides("/tmp/unused", 8), store).unwrap()
    }

    #[test]
    fn test_ignored_command_is_not_persisted() {
        let store = Arc::new(RedbStore::open_in_memory().unwrap());
        let mut session =
            BookingSession::open_with_store(EngineConfig::with_overrides("/tmp/unused", 8), store.clone())
                .unwrap();
        assert!(!session.advance_to_seat_selection().is_applied());
        assert!(SessionPersistence::new(store).load_session().is_none());
    }

    #[test]
    fn test_individual_type_resets_party_size() {
        let mut session = open();
        session.select_table("1");
        session.advance_to_seat_selection();
        session.set_booking_type(BookingType::Group);
        session.set_number_of_people(5);
        assert_eq!(session.workflow().number_of_people(), 5);

        assert!(session.set_booking_type(BookingType::Individual).is_applied());
        assert_eq!(session.workflow().number_of_people(), 1);
    }

    #[test]
    fn test_add_to_cart_uses_size_price_and_table() {
        let mut session = open();
        session.select_table("2");
        let mut options = session.catalog().find_item("1").unwrap().default_options();
        options.size = Some("Large".to_string());
        let input = CartItemInput::new(FoodRef::new("1", "Caesar Salad", 12.99)).options(options);

        assert!(session.add_to_cart(input).is_applied());
        let view = session.cart_view();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].food.price, 16.99);
        assert_eq!(view.lines[0].table_id.as_deref(), Some("2"));
        assert_eq!(view.subtotal, 16.99);
    }

    #[test]
    fn test_unknown_menu_item() {
        let mut session = open();
        assert_eq!(
            session.add_menu_item_to_person("p", "99", 1),
            CommandOutcome::Ignored(IgnoredReason::FoodItemNotFound)
        );
    }

    #[test]
    fn test_table_position_moves_layout_and_inventory() {
        let mut session = open();
        assert!(
            session
                .update_table_position("1", Position::new(113.0, 207.0))
                .is_applied()
        );
        assert_eq!(
            session.workflow().table("1").map(|t| t.position),
            Some(Position::new(120.0, 200.0))
        );
        assert!(
            session
                .update_table_position("t2", Position::new(0.0, 0.0))
                .is_applied()
        );
        assert_eq!(
            session.update_table_position("nope", Position::default()),
            CommandOutcome::Ignored(IgnoredReason::TableNotFound)
        );
    }

    #[test]
    fn test_enter_confirmation_without_booking() {
        let mut session = open();
        assert!(session.enter_confirmation().is_none());
        assert!(session.history().is_empty());
    }
}

//! Booking workflow (预订流程)
//!
//! State machine driving one party from table choice to confirmation:
//!
//! ```text
//! table-selection → seat-selection → person-details → food-selection → confirmation
//! ```
//!
//! The workflow owns the step, the party and the booking aggregate. It is
//! the only place the step changes; [`crate::flow::FlowView`] merely reads
//! it. Per-person food selections live in the [`OrderBook`]; the food
//! commands take it by `&mut` so ownership of every line stays in one
//! collection.
//!
//! Every command returns a [`CommandOutcome`]. A refused command leaves the
//! state exactly as it was.
//!
//! # Destructive vs non-destructive
//!
//! - `set_booking_type`, `set_number_of_people`, `reset_booking` and
//!   picking a different table clear the selected seats and the party.
//! - `go_back_to_step` only moves the step; names and selections are kept
//!   and reused when the party is rebuilt from the same seats.

use crate::cart::OrderBook;
use crate::outcome::{CommandOutcome, IgnoredReason};
use serde::{Deserialize, Serialize};
use shared::models::{
    Booking, BookingStatus, BookingStep, BookingType, DiningTable, FoodRef, Person, Position,
};

/// Largest party a single booking accepts
pub const DEFAULT_MAX_PARTY_SIZE: u32 = 8;

/// Persisted booking sub-state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingState {
    /// Seat inventory of every table
    pub tables: Vec<DiningTable>,
    pub current_booking: Option<Booking>,
    pub booking_step: BookingStep,
    /// Id of the selected table
    pub selected_table: Option<String>,
    /// Sorted ascending
    pub selected_seats: Vec<u32>,
    pub booking_type: BookingType,
    pub number_of_people: u32,
    pub people: Vec<Person>,
    pub current_table_route: Option<String>,
}

impl Default for BookingState {
    fn default() -> Self {
        Self {
            tables: seed_tables(),
            current_booking: None,
            booking_step: BookingStep::TableSelection,
            selected_table: None,
            selected_seats: Vec::new(),
            booking_type: BookingType::Individual,
            number_of_people: 1,
            people: Vec::new(),
            current_table_route: None,
        }
    }
}

/// Seven ten-seat tables with some seats already taken
pub fn seed_tables() -> Vec<DiningTable> {
    let seeds: [(&str, &[u32], f64, f64, &str); 7] = [
        ("1", &[1, 3, 7], 100.0, 100.0, "/elegant-restaurant-table-with-chairs.jpg"),
        ("2", &[2, 5, 8, 9], 300.0, 150.0, "/round-dining-table-with-wooden-finish.jpg"),
        ("3", &[1, 2, 3, 4, 5], 500.0, 200.0, "/modern-square-table-with-contemporary-chairs.jpg"),
        ("4", &[], 200.0, 300.0, "/luxury-dining-table-with-upholstered-chairs.jpg"),
        ("5", &[1, 4], 400.0, 100.0, "/cozy-wooden-booth-table.jpg"),
        ("6", &[2, 3, 6, 10], 600.0, 150.0, "/family-dining-table.jpg"),
        ("7", &[1, 5, 7, 9], 800.0, 200.0, "/window-side-table-two-seater.jpg"),
    ];
    seeds
        .into_iter()
        .enumerate()
        .map(|(i, (id, booked, x, y, image))| {
            DiningTable::new(id, i as u32 + 1, 10, booked)
                .at(x, y)
                .with_background(image)
        })
        .collect()
}

/// Route shown for a table in the flow header
pub fn table_route(number: u32) -> String {
    format!("/table/{number}")
}

#[derive(Debug, Clone)]
pub struct BookingWorkflow {
    state: BookingState,
    max_party_size: u32,
}

impl Default for BookingWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARTY_SIZE)
    }
}

impl BookingWorkflow {
    pub fn new(max_party_size: u32) -> Self {
        Self::from_state(BookingState::default(), max_party_size)
    }

    /// Resume from a persisted state
    pub fn from_state(mut state: BookingState, max_party_size: u32) -> Self {
        state.selected_seats.sort_unstable();
        state.selected_seats.dedup();
        if state.number_of_people == 0 {
            state.number_of_people = 1;
        }
        Self {
            state,
            max_party_size: max_party_size.max(1),
        }
    }

    // ========== Queries ==========

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn step(&self) -> BookingStep {
        self.state.booking_step
    }

    pub fn tables(&self) -> &[DiningTable] {
        &self.state.tables
    }

    pub fn table(&self, table_id: &str) -> Option<&DiningTable> {
        self.state.tables.iter().find(|t| t.id == table_id)
    }

    pub fn selected_table(&self) -> Option<&DiningTable> {
        self.state
            .selected_table
            .as_deref()
            .and_then(|id| self.table(id))
    }

    pub fn selected_seats(&self) -> &[u32] {
        &self.state.selected_seats
    }

    pub fn booking_type(&self) -> BookingType {
        self.state.booking_type
    }

    pub fn number_of_people(&self) -> u32 {
        self.state.number_of_people
    }

    pub fn people(&self) -> &[Person] {
        &self.state.people
    }

    pub fn person(&self, person_id: &str) -> Option<&Person> {
        self.state.people.iter().find(|p| p.id == person_id)
    }

    pub fn current_table_route(&self) -> Option<&str> {
        self.state.current_table_route.as_deref()
    }

    /// Upper bound for the party size: the configured maximum, capped by
    /// the free seats of the selected table
    pub fn max_selectable_people(&self) -> u32 {
        let free = self
            .selected_table()
            .map(|t| t.available_seats.len() as u32)
            .unwrap_or(self.max_party_size);
        self.max_party_size.min(free).max(1)
    }

    /// The booking aggregate; while pending, its people are the live party
    pub fn current_booking(&self) -> Option<Booking> {
        self.state.current_booking.as_ref().map(|b| {
            let mut booking = b.clone();
            if booking.status == BookingStatus::Pending {
                booking.people = self.state.people.clone();
            }
            booking
        })
    }

    pub fn is_confirmed(&self) -> bool {
        self.state
            .current_booking
            .as_ref()
            .is_some_and(Booking::is_confirmed)
    }

    // ========== Commands ==========

    /// Run a guarded command; guards must be checked before any mutation
    fn apply(
        &mut self,
        command: &'static str,
        f: impl FnOnce(&mut Self) -> Result<(), IgnoredReason>,
    ) -> CommandOutcome {
        match f(self) {
            Ok(()) => {
                tracing::debug!(command, step = %self.state.booking_step, "Booking command applied");
                CommandOutcome::Applied
            }
            Err(reason) => {
                tracing::debug!(command, step = %self.state.booking_step, %reason, "Booking command ignored");
                CommandOutcome::Ignored(reason)
            }
        }
    }

    fn require_step(&self, step: BookingStep) -> Result<(), IgnoredReason> {
        if self.state.booking_step == step {
            Ok(())
        } else {
            Err(IgnoredReason::WrongStep(self.state.booking_step))
        }
    }

    fn require_not_confirmed(&self) -> Result<(), IgnoredReason> {
        if self.is_confirmed() {
            Err(IgnoredReason::AlreadyConfirmed)
        } else {
            Ok(())
        }
    }

    /// Forget seats, party and any pending booking
    fn clear_party(&mut self) {
        self.state.selected_seats.clear();
        self.state.people.clear();
        if !self.is_confirmed() {
            self.state.current_booking = None;
        }
    }

    /// Pick a table (does not advance the step)
    ///
    /// Choosing a different table than the current one drops the seats
    /// and party picked for the old table.
    pub fn select_table(&mut self, table_id: &str) -> CommandOutcome {
        self.apply("select_table", |wf| {
            wf.require_step(BookingStep::TableSelection)?;
            let number = wf
                .table(table_id)
                .map(|t| t.number)
                .ok_or(IgnoredReason::TableNotFound)?;
            if wf.state.selected_table.as_deref() != Some(table_id) {
                wf.clear_party();
                wf.state.selected_table = Some(table_id.to_string());
            }
            wf.state.current_table_route = Some(table_route(number));
            Ok(())
        })
    }

    pub fn select_table_by_number(&mut self, number: u32) -> CommandOutcome {
        match self.state.tables.iter().find(|t| t.number == number) {
            Some(table) => {
                let id = table.id.clone();
                self.select_table(&id)
            }
            None => IgnoredReason::TableNotFound.into(),
        }
    }

    pub fn advance_to_seat_selection(&mut self) -> CommandOutcome {
        self.apply("advance_to_seat_selection", |wf| {
            wf.require_step(BookingStep::TableSelection)?;
            if wf.selected_table().is_none() {
                return Err(IgnoredReason::NoTableSelected);
            }
            wf.state.booking_step = BookingStep::SeatSelection;
            Ok(())
        })
    }

    /// Destructive: always clears the selected seats and the party
    pub fn set_booking_type(&mut self, booking_type: BookingType) -> CommandOutcome {
        self.apply("set_booking_type", |wf| {
            if wf.state.booking_step > BookingStep::SeatSelection {
                return Err(IgnoredReason::WrongStep(wf.state.booking_step));
            }
            wf.state.booking_type = booking_type;
            wf.clear_party();
            Ok(())
        })
    }

    /// Destructive: always clears the selected seats and the party.
    /// The size is clamped to `1..=max_selectable_people()`.
    pub fn set_number_of_people(&mut self, n: u32) -> CommandOutcome {
        self.apply("set_number_of_people", |wf| {
            if wf.state.booking_step > BookingStep::SeatSelection {
                return Err(IgnoredReason::WrongStep(wf.state.booking_step));
            }
            wf.state.number_of_people = n.clamp(1, wf.max_selectable_people());
            wf.clear_party();
            Ok(())
        })
    }

    /// Select or deselect a seat of the selected table
    pub fn toggle_seat(&mut self, seat: u32) -> CommandOutcome {
        self.apply("toggle_seat", |wf| {
            wf.require_step(BookingStep::SeatSelection)?;
            let table = wf.selected_table().ok_or(IgnoredReason::NoTableSelected)?;
            if !table.is_seat_available(seat) {
                return Err(IgnoredReason::SeatUnavailable);
            }
            let seats = &mut wf.state.selected_seats;
            if let Some(pos) = seats.iter().position(|&s| s == seat) {
                seats.remove(pos);
            } else if (seats.len() as u32) < wf.state.number_of_people {
                seats.push(seat);
                seats.sort_unstable();
            } else {
                return Err(IgnoredReason::SeatLimitReached);
            }
            Ok(())
        })
    }

    /// Build the party: one person per selected seat, in seat order
    ///
    /// Requires exactly `number_of_people` selected seats. When the party
    /// already sits on exactly these seats (the user went back and forth),
    /// it is kept together with the names entered so far.
    pub fn proceed_to_person_details(&mut self) -> CommandOutcome {
        self.apply("proceed_to_person_details", |wf| {
            wf.require_step(BookingStep::SeatSelection)?;
            let table_id = wf
                .selected_table()
                .map(|t| t.id.clone())
                .ok_or(IgnoredReason::NoTableSelected)?;
            let n = wf.state.number_of_people;
            if n == 0 || wf.state.selected_seats.len() != n as usize {
                return Err(IgnoredReason::SeatCountMismatch);
            }

            let seats = wf.state.selected_seats.clone();
            let same_party = wf.state.current_booking.as_ref().is_some_and(|b| {
                b.status == BookingStatus::Pending && b.table_id == table_id
            }) && wf.state.people.len() == seats.len()
                && wf
                    .state
                    .people
                    .iter()
                    .zip(&seats)
                    .all(|(p, &s)| p.seat_number == s && p.table_id == table_id);

            if same_party {
                if let Some(booking) = wf.state.current_booking.as_mut() {
                    booking.booking_type = wf.state.booking_type;
                    booking.number_of_people = n;
                    booking.booked_seats = seats;
                }
            } else {
                let booking_id = uuid::Uuid::new_v4().to_string();
                wf.state.people = seats
                    .iter()
                    .enumerate()
                    .map(|(i, &seat)| Person::new(format!("{booking_id}-{i}"), seat, table_id.clone()))
                    .collect();
                wf.state.current_booking = Some(Booking {
                    id: booking_id,
                    table_id,
                    booking_type: wf.state.booking_type,
                    number_of_people: n,
                    people: Vec::new(),
                    booked_seats: seats,
                    status: BookingStatus::Pending,
                    created_at: shared::util::now_millis(),
                });
            }
            wf.state.booking_step = BookingStep::PersonDetails;
            Ok(())
        })
    }

    pub fn update_person_name(&mut self, person_id: &str, name: &str) -> CommandOutcome {
        self.apply("update_person_name", |wf| {
            wf.require_step(BookingStep::PersonDetails)?;
            let person = wf
                .state
                .people
                .iter_mut()
                .find(|p| p.id == person_id)
                .ok_or(IgnoredReason::PersonNotFound)?;
            if person.name == name {
                return Err(IgnoredReason::NoChange);
            }
            person.name = name.to_string();
            Ok(())
        })
    }

    /// Advance once every person has a non-blank name
    pub fn proceed_to_food_selection(&mut self) -> CommandOutcome {
        self.apply("proceed_to_food_selection", |wf| {
            wf.require_step(BookingStep::PersonDetails)?;
            if wf.state.people.is_empty() {
                return Err(IgnoredReason::NoPeople);
            }
            if !wf.state.people.iter().all(Person::has_name) {
                return Err(IgnoredReason::MissingNames);
            }
            wf.state.booking_step = BookingStep::FoodSelection;
            Ok(())
        })
    }

    /// Apply `delta` units of `food` to a person's selections
    ///
    /// An unknown person id is created on the fly: empty name, seat 1 when
    /// the party is empty, otherwise `people.len() + 1`, table of the
    /// current selection (or empty).
    pub fn add_food_to_person(
        &mut self,
        book: &mut OrderBook,
        person_id: &str,
        food: FoodRef,
        delta: i32,
    ) -> CommandOutcome {
        self.apply("add_food_to_person", |wf| {
            wf.require_step(BookingStep::FoodSelection)?;
            if delta == 0 {
                return Err(IgnoredReason::NoChange);
            }
            let table_id = wf.state.selected_table.clone();
            let created = wf.ensure_person(person_id, table_id.as_deref().unwrap_or(""));
            let outcome = book.add_to_person(person_id, food, delta, table_id.as_deref());
            match outcome.reason() {
                Some(reason) if !created => Err(reason),
                _ => Ok(()),
            }
        })
    }

    fn ensure_person(&mut self, person_id: &str, table_id: &str) -> bool {
        if self.person(person_id).is_some() {
            return false;
        }
        let seat = if self.state.people.is_empty() {
            1
        } else {
            self.state.people.len() as u32 + 1
        };
        tracing::warn!(person_id, seat, "Person missing at food selection, creating one");
        self.state.people.push(Person::new(person_id, seat, table_id));
        true
    }

    /// Remove one unit, or every unit when `all` is set or one is left
    pub fn remove_food_from_person(
        &mut self,
        book: &mut OrderBook,
        person_id: &str,
        food_id: &str,
        all: bool,
    ) -> CommandOutcome {
        self.apply("remove_food_from_person", |wf| {
            wf.require_not_confirmed()?;
            if wf.person(person_id).is_none() {
                return Err(IgnoredReason::PersonNotFound);
            }
            match book.remove_from_person(person_id, food_id, all).reason() {
                Some(reason) => Err(reason),
                None => Ok(()),
            }
        })
    }

    /// Move back to an earlier step, keeping everything entered so far
    pub fn go_back_to_step(&mut self, step: BookingStep) -> CommandOutcome {
        self.apply("go_back_to_step", |wf| {
            wf.require_not_confirmed()?;
            if step >= wf.state.booking_step {
                return Err(IgnoredReason::NotAnEarlierStep);
            }
            wf.state.booking_step = step;
            Ok(())
        })
    }

    /// Confirm the booking and book its seats on the table
    ///
    /// Valid in `food-selection`. A group booking may confirm from any
    /// step as long as a table is selected. A booking is created on the
    /// spot when none exists yet.
    pub fn confirm_booking(&mut self) -> CommandOutcome {
        self.apply("confirm_booking", |wf| {
            wf.require_not_confirmed()?;
            let is_group = wf.state.booking_type == BookingType::Group;
            if !is_group {
                wf.require_step(BookingStep::FoodSelection)?;
            }
            let table_id = wf
                .selected_table()
                .map(|t| t.id.clone())
                .ok_or(IgnoredReason::NoTableSelected)?;

            let seats = wf.state.selected_seats.clone();
            let mut booking = wf.state.current_booking.take().unwrap_or_else(|| Booking {
                id: uuid::Uuid::new_v4().to_string(),
                table_id: table_id.clone(),
                booking_type: wf.state.booking_type,
                number_of_people: wf.state.number_of_people,
                people: Vec::new(),
                booked_seats: Vec::new(),
                status: BookingStatus::Pending,
                created_at: shared::util::now_millis(),
            });
            booking.table_id = table_id.clone();
            booking.booking_type = wf.state.booking_type;
            booking.number_of_people = wf.state.number_of_people;
            booking.booked_seats = seats.clone();
            booking.people = wf.state.people.clone();
            booking.status = BookingStatus::Confirmed;

            if let Some(table) = wf.state.tables.iter_mut().find(|t| t.id == table_id) {
                let booked = table.book_seats(&seats);
                tracing::info!(table_id = %table.id, ?booked, "Seats booked");
            }
            tracing::info!(booking_id = %booking.id, "Booking confirmed");
            wf.state.current_booking = Some(booking);
            wf.state.booking_step = BookingStep::Confirmation;
            Ok(())
        })
    }

    /// Back to a fresh booking; the seat inventory of the tables is kept
    pub fn reset_booking(&mut self) -> CommandOutcome {
        self.apply("reset_booking", |wf| {
            let tables = std::mem::take(&mut wf.state.tables);
            wf.state = BookingState {
                tables,
                ..BookingState::default()
            };
            Ok(())
        })
    }

    /// Move a table of the seat inventory, snapped to the grid
    pub fn update_table_position(
        &mut self,
        table_id: &str,
        position: Position,
        snap: f64,
    ) -> CommandOutcome {
        self.apply("update_table_position", |wf| {
            let table = wf
                .state
                .tables
                .iter_mut()
                .find(|t| t.id == table_id)
                .ok_or(IgnoredReason::TableNotFound)?;
            table.position = position.snapped(snap);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests;

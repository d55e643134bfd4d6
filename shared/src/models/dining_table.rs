//! Dining Table Model

use serde::{Deserialize, Serialize};

/// 2-D position on the floor plan
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round each axis to the nearest multiple of `snap`.
    ///
    /// A non-positive or non-finite increment leaves the position unchanged.
    pub fn snapped(self, snap: f64) -> Self {
        if !(snap.is_finite() && snap > 0.0) {
            return self;
        }
        Self {
            x: (self.x / snap).round() * snap,
            y: (self.y / snap).round() * snap,
        }
    }
}

/// Dining table entity with its seat inventory (桌台)
///
/// Invariant: `booked_seats ∪ available_seats ⊆ [1, total_seats]` and the two
/// sets are disjoint. Seat numbers are kept sorted ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTable {
    pub id: String,
    pub number: u32,
    pub total_seats: u32,
    pub booked_seats: Vec<u32>,
    pub available_seats: Vec<u32>,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
}

impl DiningTable {
    /// Build a table whose every seat not listed in `booked` is available
    pub fn new(id: impl Into<String>, number: u32, total_seats: u32, booked: &[u32]) -> Self {
        let mut booked_seats: Vec<u32> = booked
            .iter()
            .copied()
            .filter(|s| (1..=total_seats).contains(s))
            .collect();
        booked_seats.sort_unstable();
        booked_seats.dedup();
        let available_seats = (1..=total_seats)
            .filter(|s| !booked_seats.contains(s))
            .collect();
        Self {
            id: id.into(),
            number,
            total_seats,
            booked_seats,
            available_seats,
            position: Position::default(),
            background_image: None,
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn with_background(mut self, image: impl Into<String>) -> Self {
        self.background_image = Some(image.into());
        self
    }

    /// Whether `seat` can be picked for a new booking
    pub fn is_seat_available(&self, seat: u32) -> bool {
        self.available_seats.contains(&seat)
    }

    /// Move `seats` from available to booked.
    ///
    /// Seats that are not currently available are skipped. Returns the seats
    /// that were actually booked.
    pub fn book_seats(&mut self, seats: &[u32]) -> Vec<u32> {
        let mut booked = Vec::new();
        for &seat in seats {
            if let Some(pos) = self.available_seats.iter().position(|&s| s == seat) {
                self.available_seats.remove(pos);
                self.booked_seats.push(seat);
                booked.push(seat);
            }
        }
        self.booked_seats.sort_unstable();
        booked
    }

    /// Check the seat inventory invariant
    pub fn is_consistent(&self) -> bool {
        let in_range = |s: &u32| (1..=self.total_seats).contains(s);
        self.booked_seats.iter().all(in_range)
            && self.available_seats.iter().all(in_range)
            && !self
                .booked_seats
                .iter()
                .any(|s| self.available_seats.contains(s))
    }
}

/// Layout flags for arrange mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableFlags {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draggable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
}

impl TableFlags {
    /// Overlay the flags that are set in `other`
    pub fn merge(&mut self, other: TableFlags) {
        if other.draggable.is_some() {
            self.draggable = other.draggable;
        }
        if other.resizable.is_some() {
            self.resizable = other.resizable;
        }
    }
}

/// Table layout record (floor plan only, no seat data)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableLayout {
    pub id: String,
    pub number: u32,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<TableFlags>,
}

impl TableLayout {
    pub fn new(id: impl Into<String>, number: u32, position: Position) -> Self {
        Self {
            id: id.into(),
            number,
            position,
            background_image: None,
            width: None,
            height: None,
            flags: None,
        }
    }

    pub fn with_background(mut self, image: impl Into<String>) -> Self {
        self.background_image = Some(image.into());
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_flags(mut self, flags: TableFlags) -> Self {
        self.flags = Some(flags);
        self
    }
}

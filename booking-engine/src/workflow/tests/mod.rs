use super::*;
use shared::models::FoodRef;

fn salad() -> FoodRef {
    FoodRef::new("1", "Caesar Salad", 12.99)
}

fn lemonade() -> FoodRef {
    FoodRef::new("4", "Fresh Lemonade", 4.99)
}

fn ignored(reason: IgnoredReason) -> CommandOutcome {
    CommandOutcome::Ignored(reason)
}

/// Table "1" selected, now at seat selection
fn at_seat_selection(people: u32) -> BookingWorkflow {
    let mut wf = BookingWorkflow::default();
    assert!(wf.select_table("1").is_applied());
    assert!(wf.advance_to_seat_selection().is_applied());
    assert!(wf.set_number_of_people(people).is_applied());
    wf
}

/// Table "1" (free seats 2,4,5,...), `seats` picked, party built
fn at_person_details(seats: &[u32]) -> BookingWorkflow {
    let mut wf = at_seat_selection(seats.len() as u32);
    for &seat in seats {
        assert!(wf.toggle_seat(seat).is_applied());
    }
    assert!(wf.proceed_to_person_details().is_applied());
    wf
}

/// Names entered for every person, now at food selection
fn at_food_selection(names: &[&str]) -> BookingWorkflow {
    let seats: Vec<u32> = [2, 4, 5, 6, 8, 9, 10][..names.len()].to_vec();
    let mut wf = at_person_details(&seats);
    let ids: Vec<String> = wf.people().iter().map(|p| p.id.clone()).collect();
    for (id, name) in ids.iter().zip(names) {
        assert!(wf.update_person_name(id, name).is_applied());
    }
    assert!(wf.proceed_to_food_selection().is_applied());
    wf
}

fn person_id(wf: &BookingWorkflow, index: usize) -> String {
    wf.people()[index].id.clone()
}

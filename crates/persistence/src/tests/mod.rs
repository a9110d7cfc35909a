// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.


use crate::Persistence;
use bistro_desk_domain::{NewTicket, UserId};
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-05-01 10:00 UTC);

/// Creates an in-memory store with one customer, two staff, and one admin.
///
/// Returns the store and the profile IDs as
/// `(customer, staff_a, staff_b, admin)`.
pub fn seeded_store() -> (Persistence, i64, i64, i64, i64) {
    let mut store = Persistence::new_in_memory().expect("Failed to create in-memory store");

    let customer = store
        .create_profile(
            "diner@example.com",
            "Avery Diner",
            Some("555-0100"),
            "plate-of-pho-22",
            "customer",
        )
        .expect("Failed to create customer profile");
    let staff_a = store
        .create_profile("staff.a@bistro.example", "Staff A", None, "alpha-pass-11", "staff")
        .expect("Failed to create staff profile");
    let staff_b = store
        .create_profile("staff.b@bistro.example", "Staff B", None, "bravo-pass-11", "staff")
        .expect("Failed to create staff profile");
    let admin = store
        .create_profile("admin@bistro.example", "Admin", None, "admin-pass-11", "admin")
        .expect("Failed to create admin profile");

    (store, customer, staff_a, staff_b, admin)
}

/// Inserts a ticket filed by the given customer and returns its row.
pub fn file_ticket(store: &mut Persistence, customer_id: i64) -> crate::TicketRow {
    let new_ticket = NewTicket::new(
        UserId::new(customer_id),
        "billing",
        "Wrong charge",
        "I was charged twice for order #88.",
        None,
        None,
    )
    .expect("valid ticket input");

    store
        .insert_ticket(&new_ticket, "Avery Diner", "diner@example.com", NOW)
        .expect("Failed to insert ticket")
}

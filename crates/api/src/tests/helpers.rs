// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared test fixtures: an in-memory store seeded with one customer, two
//! staff members, and one admin.

use crate::auth::AuthenticatedActor;
use crate::request_response::{CreateTicketRequest, TicketInfo};
use bistro_desk_domain::{Role, UserId};
use bistro_desk_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

pub const NOW: OffsetDateTime = datetime!(2026-06-01 09:00 UTC);

pub struct TestWorld {
    pub persistence: Persistence,
    pub customer: AuthenticatedActor,
    pub other_customer: AuthenticatedActor,
    pub staff_a: AuthenticatedActor,
    pub staff_b: AuthenticatedActor,
    pub admin: AuthenticatedActor,
}

fn actor(id: i64, role: Role, email: &str, name: &str) -> AuthenticatedActor {
    AuthenticatedActor {
        id: UserId::new(id),
        role,
        email: email.to_string(),
        display_name: name.to_string(),
    }
}

/// Creates the seeded test world.
pub fn setup() -> TestWorld {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create in-memory store");

    let customer_id = persistence
        .create_profile(
            "diner@example.com",
            "Avery Diner",
            Some("555-0100"),
            "plate-of-pho-22",
            "customer",
        )
        .expect("Failed to create customer");
    let other_id = persistence
        .create_profile(
            "other@example.com",
            "Blake Diner",
            None,
            "bun-cha-pass-9",
            "customer",
        )
        .expect("Failed to create customer");
    let staff_a_id = persistence
        .create_profile(
            "staff.a@bistro.example",
            "Staff A",
            None,
            "alpha-pass-11",
            "staff",
        )
        .expect("Failed to create staff");
    let staff_b_id = persistence
        .create_profile(
            "staff.b@bistro.example",
            "Staff B",
            None,
            "bravo-pass-11",
            "staff",
        )
        .expect("Failed to create staff");
    let admin_id = persistence
        .create_profile(
            "admin@bistro.example",
            "Admin",
            None,
            "admin-pass-11",
            "admin",
        )
        .expect("Failed to create admin");

    TestWorld {
        persistence,
        customer: actor(customer_id, Role::Customer, "diner@example.com", "Avery Diner"),
        other_customer: actor(other_id, Role::Customer, "other@example.com", "Blake Diner"),
        staff_a: actor(staff_a_id, Role::Staff, "staff.a@bistro.example", "Staff A"),
        staff_b: actor(staff_b_id, Role::Staff, "staff.b@bistro.example", "Staff B"),
        admin: actor(admin_id, Role::Admin, "admin@bistro.example", "Admin"),
    }
}

/// Files a standard billing ticket as the world's customer.
pub fn file_ticket(world: &mut TestWorld) -> TicketInfo {
    let request = CreateTicketRequest {
        category: String::from("billing"),
        subject: String::from("Wrong charge"),
        description: String::from("I was charged twice for order #88."),
        order_id: None,
        customer_phone: None,
    };
    crate::create_ticket(&mut world.persistence, &request, &world.customer, NOW)
        .expect("Failed to create ticket")
}

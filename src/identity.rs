//! Synthetic identity fields: name, student id, postal address.

use serde::Serialize;

use crate::rng::RngProvider;

const FIRST_NAMES: &[&str] = &[
    "Avery", "Jordan", "Taylor", "Morgan", "Riley", "Casey", "Quinn", "Parker", "Rowan", "Elliot",
    "Hayden", "Jamie", "Skyler", "Dakota", "Reese", "Cameron",
];

const LAST_NAMES: &[&str] = &[
    "Alvarez", "Bennett", "Chen", "Delgado", "Ellison", "Foster", "Garcia", "Hughes", "Iverson",
    "Jensen", "Kowalski", "Lindqvist", "Morales", "Nakamura", "Okafor", "Patel",
];

const STREETS: &[&str] = &[
    "Maple Ave", "Oak St", "Cedar Ln", "Pine Rd", "Elm Dr", "Willow Way", "Birch Ct", "Lakeview Blvd",
];

const CITIES: &[(&str, &str)] = &[
    ("Austin", "TX"),
    ("Denton", "TX"),
    ("Columbus", "OH"),
    ("Madison", "WI"),
    ("Tempe", "AZ"),
    ("Boulder", "CO"),
    ("Eugene", "OR"),
    ("Athens", "GA"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

impl Address {
    /// `City, ST 12345`
    pub fn locality(&self) -> String {
        format!("{}, {} {}", self.city, self.state, self.postal_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub first_name: String,
    pub last_name: String,
    pub student_id: String,
    pub address: Address,
}

impl Identity {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

pub fn draw_identity<R: RngProvider>(rng: &mut R) -> Identity {
    let first_name = rng.pick(FIRST_NAMES).copied().unwrap_or("Alex").to_string();
    let last_name = rng.pick(LAST_NAMES).copied().unwrap_or("Smith").to_string();
    // Leading digit is never zero so ids keep their width when parsed.
    let student_id = format!("{}{}", rng.uniform_int(1, 9), rng.digits(8));

    let number = rng.uniform_int(100, 9899);
    let street = rng.pick(STREETS).copied().unwrap_or("Main St");
    let (city, state) = rng.pick(CITIES).copied().unwrap_or(("Springfield", "IL"));
    let address = Address {
        street: format!("{} {}", number, street),
        city: city.to_string(),
        state: state.to_string(),
        postal_code: format!("{}{}", rng.uniform_int(1, 9), rng.digits(4)),
    };

    Identity {
        first_name,
        last_name,
        student_id,
        address,
    }
}

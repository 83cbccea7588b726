#![allow(dead_code)]

use std::sync::Arc;

use rideover_core::location::{Location, LocationCatalog};
use rideover_core::session::{now_secs, Session, User, UserRole};

/// Shared catalog so every test works on the same Accra places.
pub fn catalog() -> Arc<LocationCatalog> {
    Arc::new(LocationCatalog::popular())
}

pub fn place(id: &str) -> Location {
    LocationCatalog::popular()
        .get(id)
        .expect("catalog entry")
        .clone()
}

pub fn accra_mall() -> Location {
    place("1")
}

pub fn airport() -> Location {
    place("2")
}

pub fn rider(email: &str) -> User {
    User {
        id: format!("user-{email}"),
        email: email.to_string(),
        full_name: Some("Efua Owusu".to_string()),
        phone: Some("+233501234567".to_string()),
        role: UserRole::Rider,
    }
}

/// Session for `user` that stays valid for an hour.
pub fn live_session(user: User) -> Session {
    Session {
        access_token: "access-token".to_string(),
        refresh_token: "refresh-token".to_string(),
        expires_at: now_secs() + 3_600,
        user,
    }
}

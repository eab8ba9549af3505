//! In-process test harness
//!
//! `fixtures` builds an isolated application per test together with its
//! users, logged-in clients and content; `scenario` runs tables of
//! (request, client, expected outcome) rows against it.

pub mod fixtures;
pub mod scenario;

pub use fixtures::{Fixture, NewsScene, NoteScene, TestClient, TestResponse, DEFAULT_PASSWORD};
pub use scenario::{run_matrix, Expect, Method, Scenario};

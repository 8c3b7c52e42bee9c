//! Cloud Firestore document store over the REST API.
//!
//! Each `set` is a `PATCH` of the full document without an update mask, which
//! replaces whatever was stored under the key.

mod client;
mod encode;

pub use client::FirestoreStore;

//! Client-side store for a remote todo collection.
//!
//! The [`application::store::TodoStore`] keeps an in-memory snapshot of the
//! remote list and mirrors every mutation to it through a
//! [`domain::gateway::TodoGateway`]. The binary renders the store as an
//! interactive terminal list.

pub mod application;
pub mod domain;
pub mod infrastructure;

//! Domain values persisted through repositories.
//!
//! # Responsibility
//! - Define entity traits shared by repository bindings.
//! - Host the `User` entity used by the bundled `users` binding.
//!
//! # Invariants
//! - Entities are plain immutable values; repositories never track identity.

pub mod identity;
pub mod user;

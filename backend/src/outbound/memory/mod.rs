//! Process-local adapters used when no database is configured.
//!
//! Each store keeps its rows behind a `Mutex` and hands out increasing
//! integer ids. Contents vanish on restart; these adapters exist for local
//! runs and HTTP tests.

mod labels;
mod recipes;
mod users;

use std::sync::{Mutex, MutexGuard};

pub use labels::{InMemoryIngredientRepository, InMemoryLabelRepository, InMemoryTagRepository};
pub use recipes::InMemoryRecipeRepository;
pub use users::{InMemoryAuthTokenRepository, InMemoryUserRepository};

/// Lock `mutex`, reporting poisoning through `on_poison`.
fn lock<'a, T, E>(
    mutex: &'a Mutex<T>,
    on_poison: impl FnOnce(&'static str) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    mutex.lock().map_err(|_| on_poison("in-memory store poisoned"))
}

/// Monotonic id source starting at one.
#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 += 1;
        self.0
    }
}

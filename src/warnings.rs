//! Advisory warnings with scoped suppression.
//!
//! Non-fatal diagnostics are routed through [`advise`] so library users pick
//! the sink via the `log` facade. Statistical routines that knowingly produce
//! degenerate comparisons (constant rows, all-missing rows) suppress their
//! own warning category for the duration of one call by holding a
//! [`SuppressGuard`]; the previous state is restored when the guard drops,
//! on every exit path.

use std::cell::RefCell;
use std::collections::HashMap;

/// Categories of advisory warnings emitted by the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Degenerate statistical comparison (constant or all-missing row).
    DegenerateTest,
    /// Suspicious but legal group-to-column match counts.
    GroupMatch,
}

thread_local! {
    static SUPPRESSED: RefCell<HashMap<Category, usize>> = RefCell::new(HashMap::new());
}

/// Guard that suppresses one warning category while alive.
///
/// Guards nest: the category stays suppressed until every guard for it has
/// been dropped.
#[must_use = "suppression ends when the guard is dropped"]
pub struct SuppressGuard {
    category: Category,
}

/// Suppress `category` until the returned guard is dropped.
pub fn suppress(category: Category) -> SuppressGuard {
    SUPPRESSED.with(|s| {
        *s.borrow_mut().entry(category).or_insert(0) += 1;
    });
    SuppressGuard { category }
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        SUPPRESSED.with(|s| {
            let mut map = s.borrow_mut();
            if let Some(count) = map.get_mut(&self.category) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    map.remove(&self.category);
                }
            }
        });
    }
}

/// Whether `category` is currently suppressed on this thread.
pub fn is_suppressed(category: Category) -> bool {
    SUPPRESSED.with(|s| s.borrow().get(&category).copied().unwrap_or(0) > 0)
}

/// Emit an advisory warning unless its category is suppressed.
pub fn advise(category: Category, message: &str) {
    if !is_suppressed(category) {
        log::warn!("{}", message);
    }
}

pub mod debounce;
pub mod timers;

pub use debounce::{DebounceAction, Debouncer};
pub use timers::{TaskKind, TimerRegistry};

//! Hardware drivers: one-shot peripheral init, the periodic tick timers,
//! and the alarm servo facade.

pub mod hw_init;
pub mod hw_timer;
pub mod servo;

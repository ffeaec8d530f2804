//! Control core: motor detection, rotation schedule, interlocked switching
//! and daily usage totals.
//!
//! Everything here is pure logic over port traits; no module touches a
//! register directly.

pub mod motor;
pub mod relays;
pub mod rotation;
pub mod switch;
pub mod usage;

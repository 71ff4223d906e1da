//! Channel flavors.
//!
//! There are four flavors:
//!
//! 1. `array` - Bounded channel based on a preallocated buffer.
//! 2. `list` - Unbounded channel backed by a growable buffer.
//! 3. `tick` - Channel that delivers messages periodically.
//! 4. `zero` - Zero-capacity channel.

pub mod array;
pub mod list;
pub mod tick;
pub mod zero;

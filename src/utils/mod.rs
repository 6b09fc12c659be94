pub mod clock;
pub mod wait;

pub use clock::SimClock;
pub use wait::{sleep_or_cancel, Wait};

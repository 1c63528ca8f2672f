pub mod clock;
pub mod firing;
pub mod recurrence;
pub mod scheduler;

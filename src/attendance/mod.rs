pub mod aggregate;
pub mod identity;
pub mod period;
pub mod source;

pub use aggregate::aggregate_month;
pub use period::Period;
pub use source::AttendanceSources;

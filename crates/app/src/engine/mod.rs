//! Rule evaluation engines.
//!
//! [`whered`](whered::whered) and [`occurd`](occurd::occurd) are pure
//! predicates over a [`context::WhereContext`] or a stream event. The
//! [`desired::DesiredEngine`] and [`aspired::AspiredEngine`] sit on top
//! and turn rule outcomes into action items, tracking fire times for
//! delay suppression.

pub mod aspired;
pub mod context;
pub mod desired;
pub mod occurd;
pub mod whered;

pub use aspired::AspiredEngine;
pub use context::WhereContext;
pub use desired::DesiredEngine;
pub use occurd::occurd;
pub use whered::whered;

// Core algorithm exports
pub mod assignment;
pub mod delivery;
pub mod error;
pub mod exclusions;
pub mod matcher;
pub mod session;

pub use assignment::{Assignment, AssignmentViolation, Pairing};
pub use delivery::{compose_assignment_message, deliver_all, DeliveryReport, Notification, Notifier, NotifyError};
pub use error::MatchError;
pub use exclusions::ExclusionSet;
pub use matcher::{max_matching_size, Matcher, MatcherSettings};
pub use session::{WishlistAction, WishlistEvent, WishlistState};

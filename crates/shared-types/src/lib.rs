//! # Shared Types Crate
//!
//! Identifier newtypes, calendar values and the clock port used across the
//! settlement ledger workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every identifier that crosses a crate
//!   boundary is defined here as a distinct newtype, so a `MemberId` can
//!   never be passed where a `VisitId` is expected.
//! - **Strict calendar parsing**: claim days are accepted only in the
//!   `YYYY-MM-DD` form; month keys are always rendered as `YYYY-MM`.

pub mod calendar;
pub mod clock;
pub mod errors;
pub mod ids;

pub use calendar::{ClaimDay, MonthKey};
pub use clock::{MockTimeSource, SystemTimeSource, TimeSource, Timestamp};
pub use errors::ParseError;
pub use ids::{ClaimId, FacilityId, MemberId, SignOffId, VisitId, WorkerId};

//! Ring membership for Eddy.
//!
//! [`Membership`] owns the shared placement ring, seeds it at startup and
//! broadcasts a [`RingEvent`](eddy_types::RingEvent) after every change.

mod membership;


pub use membership::Membership;

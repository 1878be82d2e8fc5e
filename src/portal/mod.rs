//! Records served by the backend API to the Claims and Payments pages, with
//! the filtering and summaries those pages show.

pub mod claims;
pub mod payments;
pub mod records;

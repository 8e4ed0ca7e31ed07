// Library lints
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unsafe_code)]

pub mod counts;
pub mod layout;
pub mod lookup;
pub mod parser;
pub mod policy;
pub mod protocols;
pub mod report;

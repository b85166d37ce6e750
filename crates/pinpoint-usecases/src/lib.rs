#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Use-case orchestration crate.

pub mod usecases;
pub use usecases::*;

pub mod domain {
    pub use pinpoint_domain::domain::*;
}

#[cfg(test)]
pub(crate) mod test_support {
    pub use crate::usecases::ports::test_support::MockAgentLauncher;
    pub use crate::usecases::ports::test_support::MockInputCapture;
    pub use crate::usecases::ports::test_support::MockPathTranslator;
}

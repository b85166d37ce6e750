#![deny(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! pinpoint: CLI, edit bridge server and composition root.

pub mod app;

pub use app::Application;

pub mod common {
    pub use pinpoint_common::common::*;
}

pub mod domain {
    pub use pinpoint_domain::domain::*;
}

pub mod usecases {
    pub use pinpoint_usecases::usecases::*;
}

pub mod infra {
    pub use pinpoint_infra::infra::*;
}

mod color;
pub mod error_codes;
mod sync;
pub mod telemetry;

pub use color::Colors;
pub use color::init as color_init;
pub use error_codes::ErrorCategory;
pub use sync::mutex_lock_or_recover;

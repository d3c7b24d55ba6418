//! Physical target descriptions for socext.
//!
//! A platform names every physical connection a design may request:
//! - **IO declarations:** connection name, instance index, pin locators and
//!   electrical standard
//! - **Platform:** the ordered declaration set, extensible after the fact,
//!   and the connection provider peripherals are bound through
//! - **Parsing:** `.platform.toml` loading, validation and discovery

pub mod error;
pub mod io;
pub mod parse;
pub mod platform;

pub use error::{PlatformError, Result};
pub use io::{IoDeclaration, IoStandard, Pins};
pub use platform::Platform;

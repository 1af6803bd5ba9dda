//! Infrastructure: injected capabilities and filesystem helpers.
//!
//! Instead of ambient globals, components that need the clock, the data
//! directory or random bytes take them as trait objects:
//!
//! - [`Environment`]: data directory, current time, platform name
//! - [`RandomSource`]: random bytes
//!
//! [`paths`] holds the default data-directory resolution used by
//! [`SystemEnvironment`].

pub mod environment;
pub mod paths;
pub mod random;

pub use environment::{Environment, FixedEnvironment, SystemEnvironment};
pub use paths::{default_data_dir, expand_home, expand_tilde};
pub use random::{hex_token, RandomSource, SeededRandom, ThreadRandom};

//! Provides the [`PkiEnvironment`](crate::PkiEnvironment) switchboard and the callback types it aggregates

pub mod pki_environment;
pub mod pki_environment_traits;

pub use crate::{environment::pki_environment::*, environment::pki_environment_traits::*};

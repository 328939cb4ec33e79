//! Provides the verification façade and the error it returns

pub mod certificate_verifier;
pub mod verification_error;

pub use crate::{
    verification::certificate_verifier::*, verification::verification_error::*,
};

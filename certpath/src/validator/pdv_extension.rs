//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use alloc::collections::BTreeMap;

use der::asn1::ObjectIdentifier;
use x509_cert::ext::pkix::BasicConstraints;

use crate::util::error::*;

/// The [`ExtensionProcessing`] trait provides a common means of extracting extensions from objects that
/// feature extensions and that retain copies of the decoded extension structures, like `PDVCertificate`.
///
/// Prior to building and validating certification paths, the parse_extensions method should be used
/// to parse the extensions that will be used. The decoded extensions are cached and accessed via the
/// get_extension function.
pub trait ExtensionProcessing {
    /// `get_extension` takes an ObjectIdentifier that identifies an extension type and returns
    /// a previously parsed PDVExtension instance containing the decoded extension if the extension was present.
    fn get_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>>;

    /// `parse_extension` takes an ObjectIdentifier that identifies an extension type and returns
    /// a `PDVExtension` containing the decoded extension if the extension was present.
    fn parse_extension(&'_ mut self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>>;

    /// `parse_extensions` parses each of the listed extension types, ignoring any that fail to decode.
    fn parse_extensions(&'_ mut self, oids: &[ObjectIdentifier]);
}

/// [`ParsedExtensions`] is a typedef of a BTreeMap map that associates [`PDVExtension`] objects with object
/// identifier values. This is used to avoid parsing extensions repeatedly when performing certification
/// path processing.
pub type ParsedExtensions = BTreeMap<ObjectIdentifier, PDVExtension>;

/// [`PDVExtension`] provides a wrapper for supported extension types. At present only the
/// basicConstraints extension is consulted when building and validating paths.
#[derive(Debug, PartialEq, Clone, Eq)]
#[non_exhaustive]
pub enum PDVExtension {
    /// Parsed BasicConstraints extension
    BasicConstraints(BasicConstraints),
}

//! Arguments for the pathcheck utility

use clap::Parser;

/// Builds and verifies a certification path for an end entity certificate using a pool of trust
/// anchors and intermediate CA certificates.
#[derive(Parser, Debug, Default)]
#[command(arg_required_else_help(true))]
#[clap(author, version, about, long_about = None)]
pub struct PathcheckArgs {
    /// Full path and filename of a binary DER-encoded or PEM-encoded certificate to verify.
    #[clap(short, long, help_heading = "VERIFICATION")]
    pub end_entity_file: Option<String>,

    /// Full path of a file or folder containing DER-encoded or PEM-encoded certificates to use as
    /// trust anchors and intermediate CA certificates. Folders are traversed recursively. May be
    /// repeated.
    #[clap(short, long, help_heading = "VERIFICATION")]
    pub pool: Vec<String>,

    /// Time to use for verification expressed as the number of seconds since Unix epoch. Overrides
    /// any value read from the settings file. Zero disables validity period checks.
    #[clap(short = 'i', long, help_heading = "VERIFICATION")]
    pub time_of_interest: Option<u64>,

    /// Full path and filename of JSON-formatted certification path settings.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub settings: Option<String>,

    /// Full path and filename of YAML-formatted configuration file for log4rs logging mechanism.
    /// See <https://docs.rs/log4rs/latest/log4rs/> for details.
    #[clap(short, long, help_heading = "COMMON OPTIONS")]
    pub logging_config: Option<String>,

    /// Lists the subject of each certificate read into the pool.
    #[clap(long, help_heading = "DIAGNOSTICS")]
    pub list_pool: bool,
}

#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

mod args;
mod file_utils;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, LevelFilter};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use certpath::{read_settings, CertificateVerifier, PDVCertificate};

use crate::args::*;
use crate::file_utils::*;

/// Exit code used when the certificate could not be verified
const VERIFICATION_FAILURE: u8 = 1;
/// Exit code used when inputs could not be read
const INPUT_FAILURE: u8 = 2;

fn configure_logging(args: &PathcheckArgs) {
    if let Some(logging_config) = &args.logging_config {
        match log4rs::init_file(logging_config, Default::default()) {
            Ok(_) => return,
            Err(e) => {
                println!(
                    "ERROR: failed to configure logging using {} with {:?}. Continuing with console logging.",
                    logging_config, e
                );
            }
        }
    }

    // if there's no config, prepare one using stdout
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    match Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info))
    {
        Ok(config) => {
            if let Err(e) = log4rs::init_config(config) {
                println!(
                    "ERROR: failed to configure logging for stdout with {:?}. Continuing without logging.",
                    e
                );
            }
        }
        Err(e) => {
            println!(
                "ERROR: failed to prepare default logging configuration with {:?}. Continuing without logging",
                e
            );
        }
    }
}

fn read_target(filename: &str) -> Result<PDVCertificate, String> {
    let mut certs = read_certificates_from_file(Path::new(filename))
        .map_err(|e| format!("failed to read {}: {}", filename, e))?;
    if certs.is_empty() {
        return Err(format!("no certificate found in {}", filename));
    }
    Ok(certs.remove(0))
}

fn run(args: &PathcheckArgs) -> u8 {
    let mut cps = match read_settings(&args.settings) {
        Ok(cps) => cps,
        Err(e) => {
            error!("Failed to read settings: {}", e);
            return INPUT_FAILURE;
        }
    };
    if let Some(toi) = args.time_of_interest {
        cps.set_time_of_interest(toi);
    }

    let mut pool = vec![];
    for p in &args.pool {
        match load_certificates(p, &mut pool) {
            Ok(count) => debug!("Read {} certificate(s) from {}", count, p),
            Err(e) => {
                error!("Failed to read certificates from {}: {}", p, e);
                return INPUT_FAILURE;
            }
        }
    }

    if args.list_pool {
        for (i, cert) in pool.iter().enumerate() {
            println!("Index: {:3}; Subject: {}", i, cert.subject_name());
        }
        if args.end_entity_file.is_none() {
            return 0;
        }
    }

    let target = match &args.end_entity_file {
        Some(f) => match read_target(f) {
            Ok(target) => target,
            Err(e) => {
                error!("{}", e);
                return INPUT_FAILURE;
            }
        },
        None => {
            error!("An end entity file must be provided using --end-entity-file");
            return INPUT_FAILURE;
        }
    };

    let verifier = CertificateVerifier::default();
    match verifier.verify_certificate(&cps, Some(&target), &pool) {
        Ok(chain) => {
            for (i, cert) in chain.certificates.iter().enumerate() {
                println!("Chain[{}]: {}", i, cert.subject_name());
            }
            0
        }
        Err(e) => {
            println!("Verification failed: {}", e);
            VERIFICATION_FAILURE
        }
    }
}

/// Point of entry for the pathcheck application.
fn main() -> ExitCode {
    let args = PathcheckArgs::parse();
    configure_logging(&args);
    debug!("pathcheck start");
    let code = run(&args);
    debug!("pathcheck end");
    ExitCode::from(code)
}

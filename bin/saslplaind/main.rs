use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Arg, Command};
use miette::{Context, IntoDiagnostic};

use saslplain::users::pass;
use saslplain::{config, logging, registry, AuthenticationHandle};

fn main() -> miette::Result<()> {
    // Argument parsing
    // values for the name, description and version are pulled from `Cargo.toml`.
    let matches = Command::new("saslplaind")
        .version(clap::crate_version!())
        .long_version(saslplain::VERSION_STRING)
        .about(clap::crate_description!())
        .arg(
            Arg::new("config")
                .help("Path to the config file to use")
                .long("config")
                .short('c')
                .takes_value(true),
        )
        .arg(Arg::new("verbosity")
            .help("Increase logging verbosity")
            .long("verbose")
            .short('v')
            .multiple_occurrences(true)
            .max_occurrences(3)
            .conflicts_with("quiet")
        )
        .arg(Arg::new("quiet")
            .help("Decrease logging verbosity")
            .long("quiet")
            .conflicts_with("verbosity")
        )
        .arg(Arg::new("log format")
            .help("Use an alternative log formatter. Available: Full, Compact, Pretty")
            .long("log-format")
            .takes_value(true)
            .ignore_case(true)
            .possible_values(["Full", "Compact", "Pretty"]))
        .arg(
            Arg::new("print default")
                .help("Print a default config to stdout instead of running")
                .long("print-default"),
        )
        .arg(
            Arg::new("check config")
                .help("Check config for validity")
                .long("check"),
        )
        .arg(
            Arg::new("list mechanisms")
                .help("List the mechanisms that would be offered to clients")
                .long("list-mechanisms"),
        )
        .arg(
            Arg::new("hash password")
                .help("Print an argon2 hash of PASSWORD for use in the users file")
                .long("hash-password")
                .value_name("PASSWORD")
                .takes_value(true),
        )
        .arg(
            Arg::new("authenticate")
                .help("Authenticate one base64 encoded token per line read from stdin")
                .long("authenticate")
                .value_name("MECHANISM")
                .takes_value(true)
                .default_value("PLAIN"),
        )
        .get_matches();

    let configpath = matches
        .value_of("config")
        .unwrap_or("/etc/saslplaind.dhall");

    // Check for the --print-default option first because we don't need to do anything else in that
    // case.
    if matches.is_present("print default") {
        let config = config::Config::default();
        let encoded = config::serialize_config(&config)
            .map_err(|e| miette::miette!("Failed to serialize the default config: {}", e))?;

        // Direct writing to fd 1 is faster but also prevents any print-formatting that could
        // invalidate the generated dhall
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(encoded.as_bytes()).into_diagnostic()?;

        // Early return to exit.
        return Ok(());
    } else if matches.is_present("hash password") {
        let password = matches.value_of("hash password").unwrap_or_default();
        let encoded = pass::hash_password(password.as_bytes())
            .into_diagnostic()
            .wrap_err("Failed to hash the given password")?;
        println!("{}", encoded);
        return Ok(());
    } else if matches.is_present("check config") {
        let config = read_config(configpath)?;
        println!("{:#?}", config);
        return Ok(());
    }

    let mut config = read_config(configpath)?;
    config.verbosity = matches.occurrences_of("verbosity") as isize;
    if config.verbosity == 0 && matches.is_present("quiet") {
        config.verbosity = -1;
    }
    config.log_format = matches.value_of("log format").unwrap_or("full").to_string();
    logging::init(&config);

    // Listing only needs the registry and the policy, not the users file.
    if matches.is_present("list mechanisms") {
        for mech in registry::global()?.supported_names_with(&config.policy) {
            println!("{}", mech);
        }
        return Ok(());
    }

    let handle = AuthenticationHandle::from_config(&config).map_err(|e| {
        miette::miette!("Failed to set up authentication from {}: {}", config.userdb.display(), e)
    })?;

    let mechanism = matches.value_of("authenticate").unwrap_or("PLAIN");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.into_diagnostic()?;
        let reply = handle
            .authenticate_line(mechanism, line.trim())
            .map_err(|e| miette::miette!("{}", e))?;
        println!("{}", reply);
    }

    Ok(())
}

fn read_config(path: &str) -> miette::Result<config::Config> {
    config::read(PathBuf::from(path)).map_err(|e| miette::miette!("{}", e))
}

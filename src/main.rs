use anyhow::{Context, Error};
use clap::Parser;
use clap_stdin::MaybeStdin;
use mrtd_channel::definitions::{security_info::Summary, CardAccess};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    action: Action,
}

#[derive(Debug, clap::Subcommand)]
enum Action {
    /// Print the SecurityInfos of an EF.CardAccess as JSON.
    Inspect {
        /// Base64 encoded contents of EF.CardAccess.
        card_access: MaybeStdin<String>,
    },
    /// Re-encode an EF.CardAccess as a DER SET OF, members sorted.
    Canonicalize {
        /// Base64 encoded contents of EF.CardAccess.
        card_access: MaybeStdin<String>,
    },
}

fn main() -> Result<(), Error> {
    match Args::parse().action {
        Action::Inspect { card_access } => print_security_infos(&card_access.to_string()),
        Action::Canonicalize { card_access } => print_canonical(&card_access.to_string()),
    }
}

fn parse(card_access: &str) -> Result<CardAccess, Error> {
    let der = base64::decode(card_access.trim()).context("EF.CardAccess is not valid base64")?;
    CardAccess::from_der(&der).context("could not parse EF.CardAccess")
}

fn summaries(card_access: &str) -> Result<Vec<Summary>, Error> {
    let mut summaries: Vec<Summary> = parse(card_access)?
        .security_infos()
        .map(|info| info.summary())
        .collect();
    summaries.sort_by(|a, b| a.protocol.cmp(&b.protocol));
    Ok(summaries)
}

fn print_security_infos(card_access: &str) -> Result<(), Error> {
    println!("{}", serde_json::to_string_pretty(&summaries(card_access)?)?);
    Ok(())
}

fn canonical(card_access: &str) -> Result<String, Error> {
    let der = parse(card_access)?
        .to_der_canonical()
        .context("could not encode EF.CardAccess")?;
    Ok(base64::encode(der))
}

fn print_canonical(card_access: &str) -> Result<(), Error> {
    println!("{}", canonical(card_access)?);
    Ok(())
}

//! Sentinel demo CLI
//!
//! Drives the decision engine and the OTP manager from the command line and
//! prints every result as JSON. All runs share one in-memory audit chain,
//! which is sealed and verified before exit.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- assess --transcript "..." --challenge "green mango" --amount 25000
//!   cargo run -p demo -- scam-check --text "..."
//!   cargo run -p demo -- challenge
//!   cargo run -p demo -- otp --phone 9876543210
//!
//! OTP codes are only printed when `SENTINEL_ENV` (or `ENVIRONMENT`) names a
//! development mode; otherwise pass `--code` with the delivered code.

mod runtime;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sentinel_contracts::{
    assessment::TransactionRequest, error::SentinelResult, liveness::ChallengePhrase,
};
use sentinel_policy::OtpSettings;

use runtime::{print_json, Runtime};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Sentinel: voice liveness, scam detection, and OTP step-up for transfers.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Sentinel transaction-authentication demo",
    long_about = "Runs Sentinel assessments and OTP sessions, showing liveness scoring,\n\
                  scam detection, risk aggregation, and audit chain integrity."
)]
struct Cli {
    /// TOML scoring policy to load instead of the built-in defaults.
    #[arg(long, global = true)]
    policy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the bundled scenarios in sequence.
    RunAll,
    /// Assess one transfer request.
    Assess {
        #[arg(long)]
        transcript: String,
        #[arg(long)]
        challenge: String,
        #[arg(long)]
        amount: f64,
    },
    /// Check a transcript for scam coaching phrases.
    ScamCheck {
        #[arg(long)]
        text: String,
    },
    /// Draw a challenge phrase.
    Challenge,
    /// Issue an OTP, verify it, then show it cannot be reused.
    Otp {
        #[arg(long)]
        phone: String,
        /// Code to submit. Defaults to the exposed code in development mode.
        #[arg(long)]
        code: Option<String>,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Initialize structured logging.  Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let result = run(cli);

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> SentinelResult<()> {
    let rt = Runtime::build(cli.policy.as_deref(), OtpSettings::from_env())?;

    match cli.command {
        Command::RunAll => run_all(&rt)?,
        Command::Assess {
            transcript,
            challenge,
            amount,
        } => assess(&rt, transcript, ChallengePhrase::new(challenge), amount)?,
        Command::ScamCheck { text } => print_json("scam check", &rt.engine.scam_check(&text)?)?,
        Command::Challenge => print_json("challenge", &rt.engine.issue_challenge()?)?,
        Command::Otp { phone, code } => otp(&rt, &phone, code)?,
    }

    rt.finish()
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run_all(rt: &Runtime) -> SentinelResult<()> {
    println!("Scenario 1: customer reads the challenge back, small transfer");
    let challenge = rt.engine.issue_challenge()?;
    let transcript = format!("yes this is me, {challenge}, please send it to my sister");
    assess(rt, transcript, challenge, 5_000.0)?;

    println!("Scenario 2: coached caller, no challenge, large transfer");
    assess(
        rt,
        "the bank officer said it is urgent, share your otp immediately, please help".to_string(),
        ChallengePhrase::new("green mango"),
        150_000.0,
    )?;

    println!("Scenario 3: standalone scam check");
    let check = rt
        .engine
        .scam_check("your kyc expired and the account is blocked, click this link")?;
    print_json("scam check", &check)?;

    println!("Scenario 4: OTP step-up");
    otp(rt, "98765 43210", None)
}

fn assess(rt: &Runtime, transcript: String, challenge: ChallengePhrase, amount: f64) -> SentinelResult<()> {
    let request = TransactionRequest {
        transcript,
        challenge,
        amount,
        recipient: None,
    };
    let assessment = rt.engine.assess(&request)?;
    println!(
        "  → {:?} (score {}, {})",
        assessment.action, assessment.verdict.risk_score, assessment.verdict.risk_level
    );
    print_json("assessment", &assessment)
}

fn otp(rt: &Runtime, phone: &str, code: Option<String>) -> SentinelResult<()> {
    let issued = rt.otp.issue(phone)?;
    print_json("issued", &issued)?;

    let Some(code) = code.or_else(|| issued.otp.clone()) else {
        println!("  Code not exposed in this mode; pass --code to verify.");
        return Ok(());
    };

    match rt.otp.verify_otp(&issued.session_id, &code, phone) {
        Ok(verified) => print_json("verified", &verified)?,
        Err(e) => println!("  ✗ verify: {}", e),
    }
    match rt.otp.verify_otp(&issued.session_id, &code, phone) {
        Ok(_) => println!("  ✗ second use unexpectedly accepted"),
        Err(e) => println!("  ✓ second use rejected: {}", e),
    }
    println!();
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Sentinel — Transaction Authentication");
    println!("=====================================");
    println!();
    println!("Assessment pipeline per request:");
    println!("  [1] Input validation (transcript, challenge, amount)");
    println!("  [2] Voice liveness: challenge phrase match and speech quality");
    println!("  [3] Stress estimate from urgency keywords");
    println!("  [4] Risk aggregation: amount tier, scam phrases, liveness, stress");
    println!("  [5] Action mapped from risk level + record written to SHA-256 chain");
    println!();
}

//! Sign the latest commit and encrypt the signature for the instructor.
//!
//! Prints the commit hash and the base64 encrypted signature on separate
//! lines. Each failure stage exits with its own code.

use authproof::config::Config;
use authproof::proof::{self, ProofRequest, ProofStage};
use authproof::vcs::{CommitSource, FixedCommit, GitCommitSource};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "generate-proof", about = "Sign latest commit and encrypt signature")]
struct Args {
    /// 40-char commit hash (defaults to the latest commit)
    #[arg(long)]
    commit: Option<String>,

    /// Path to student private PEM [default: AUTHPROOF_PRIVATE_KEY or keys/student_private.pem]
    #[arg(long = "priv")]
    private_key: Option<PathBuf>,

    /// Path to instructor public PEM [default: AUTHPROOF_INSTRUCTOR_KEY or keys/instructor_public.pem]
    #[arg(long = "instr")]
    instructor_key: Option<PathBuf>,

    /// Repository root
    #[arg(long, default_value = ".")]
    repo: PathBuf,
}

fn main() -> ExitCode {
    authproof::init_tracing();
    let args = Args::parse();

    let source: Box<dyn CommitSource> = match args.commit {
        Some(hash) => Box::new(FixedCommit(hash)),
        None => Box::new(GitCommitSource::new(args.repo)),
    };
    let config = Config::from_env();
    let request = ProofRequest::resolve(args.private_key, args.instructor_key, &config);

    match proof::run(&request, source.as_ref()) {
        Ok(proof) => {
            print!("{}", proof::render(&proof));
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("ERROR: {failure}");
            if failure.stage == ProofStage::Encryption {
                eprintln!(
                    "       the instructor key must be larger than the signing key to hold the signature"
                );
            }
            ExitCode::from(failure.exit_code() as u8)
        }
    }
}

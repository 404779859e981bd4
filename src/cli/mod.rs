//! CLI module for the Hackzilla check-in service
//!
//! Subcommands:
//! - `serve`: run the HTTP API
//! - `login` / `logout` / `whoami`: manage the cached staff session

pub mod serve;
pub mod session;

use clap::{Parser, Subcommand};

/// Hackzilla check-in - team registration, QR badges and meal validation
#[derive(Parser)]
#[command(name = "hackzilla-checkin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Sign in and remember the user in the session file
    Login(session::LoginArgs),

    /// Forget the signed-in user
    Logout,

    /// Show the signed-in user
    Whoami,
}

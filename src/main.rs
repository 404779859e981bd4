use clap::Parser;
use hackzilla_checkin::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Login(args) => cli::session::login(args).await,
        Command::Logout => cli::session::logout().await,
        Command::Whoami => cli::session::whoami().await,
    }
}

use clap::Parser;
use user_admin::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve::run().await,
        Command::Dashboard => cli::admin::dashboard(&cli.client).await,
        Command::Users(command) => cli::admin::users(&cli.client, command).await,
        Command::Logout => cli::admin::logout(&cli.client).await,
    }
}

use bazaar_app::{
    auth::{DEFAULT_SESSION_TTL_MINUTES, PgAuthService},
    database::{self, Db},
};
use clap::{Args, Subcommand};

mod create_admin;
mod promote;

#[derive(Debug, Args)]
pub(crate) struct UserCommand {
    #[command(subcommand)]
    command: UserSubcommand,
}

#[derive(Debug, Subcommand)]
enum UserSubcommand {
    /// Create an admin account, or promote an existing one and reset its password
    CreateAdmin(create_admin::CreateAdminArgs),

    /// Grant the admin role to an existing user
    Promote(promote::PromoteArgs),
}

pub(crate) async fn run(command: UserCommand) -> Result<(), String> {
    match command.command {
        UserSubcommand::CreateAdmin(args) => create_admin::run(args).await,
        UserSubcommand::Promote(args) => promote::run(args).await,
    }
}

async fn auth_service(database_url: &str) -> Result<PgAuthService, String> {
    let pool = database::connect(database_url, 1)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    Ok(PgAuthService::new(Db::new(pool), DEFAULT_SESSION_TTL_MINUTES))
}

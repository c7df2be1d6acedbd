use bazaar_app::auth::AuthService;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct PromoteArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Email of the user to promote
    #[arg(long)]
    email: String,
}

pub(crate) async fn run(args: PromoteArgs) -> Result<(), String> {
    let service = super::auth_service(&args.database_url).await?;

    let user = service
        .promote_to_admin(&args.email)
        .await
        .map_err(|error| format!("failed to promote user: {error}"))?;

    println!("user_uuid: {}", user.uuid);
    println!("email: {}", user.email);
    println!("role: {}", user.role);

    Ok(())
}

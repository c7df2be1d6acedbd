use bazaar_app::auth::AuthService;
use clap::Args;

#[derive(Debug, Args)]
pub(crate) struct CreateAdminArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Admin email address
    #[arg(long, default_value = "admin@example.com")]
    email: String,

    /// Admin password
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    password: String,
}

pub(crate) async fn run(args: CreateAdminArgs) -> Result<(), String> {
    let service = super::auth_service(&args.database_url).await?;

    let admin = service
        .create_admin(&args.email, &args.password)
        .await
        .map_err(|error| format!("failed to save admin: {error}"))?;

    println!("user_uuid: {}", admin.uuid);
    println!("email: {}", admin.email);
    println!("role: {}", admin.role);

    Ok(())
}

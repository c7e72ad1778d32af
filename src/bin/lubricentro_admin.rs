use anyhow::{bail, Result};
use lubricentro_api::auth::password::{generate_token, hash_password};
use lubricentro_api::repositories::{AccessTokenRepository, ApplicationRepository, UserRepository};
use lubricentro_api::{AppConfig, Database};

const USAGE: &str = "usage:
  lubricentro-admin create-user <email> <password>
  lubricentro-admin activate-user <email>
  lubricentro-admin deactivate-user <email>
  lubricentro-admin create-application <name> [redirect_uri]
  lubricentro-admin list-applications
  lubricentro-admin purge-tokens";

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!("{}", USAGE);
    };

    let config = AppConfig::new()?;
    let database = Database::new(&config.database.url, 1).await?;
    let pool = database.pool().clone();

    match (command.as_str(), &args[1..]) {
        ("create-user", [email, password]) => {
            let hash = hash_password(password)?;
            let user = UserRepository::new(pool).create_user(email, &hash).await?;
            println!("Created user {} ({})", user.email, user.id);
        }
        ("activate-user" | "deactivate-user", [email]) => {
            let active = command == "activate-user";
            let user_repo = UserRepository::new(pool);
            let Some(user) = user_repo.find_by_email(email).await? else {
                bail!("No user with email {}", email);
            };
            user_repo.update_user_status(user.id, active).await?;
            println!("User {} is now {}", user.email, if active { "active" } else { "inactive" });
        }
        ("create-application", [name, rest @ ..]) if rest.len() <= 1 => {
            let uid = generate_token(32);
            let secret = generate_token(48);
            let secret_hash = hash_password(&secret)?;
            let application = ApplicationRepository::new(pool)
                .create_application(name, &uid, &secret_hash, rest.first().map(String::as_str))
                .await?;

            println!("Created application {} ({})", application.name, application.id);
            println!("client_id:     {}", application.uid);
            println!("client_secret: {}", secret);
            println!("The secret is not stored and cannot be shown again.");
        }
        ("list-applications", []) => {
            for application in ApplicationRepository::new(pool).list_applications().await? {
                println!("{}\t{}\t{}", application.uid, application.name, application.created_at);
            }
        }
        ("purge-tokens", []) => {
            let removed = AccessTokenRepository::new(pool)
                .delete_expired(chrono::Utc::now())
                .await?;
            println!("Removed {} expired access tokens", removed);
        }
        _ => bail!("{}", USAGE),
    }

    Ok(())
}

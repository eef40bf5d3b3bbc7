use std::sync::Arc;

use anyhow::Context;

use backoffice_api::{app, config::ApiConfig};
use backoffice_auth::RoleRepository;
use backoffice_infra::{InMemoryRoleRepository, PostgresRoleRepository, RoleSeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env()?;
    backoffice_observability::init(config.log_format);

    let repository = role_repository(&config)?;
    let app = app::build_app(app::auth_state(&config, repository));

    let address = config.socket_address();
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

fn role_repository(config: &ApiConfig) -> anyhow::Result<Arc<dyn RoleRepository>> {
    if let Some(url) = &config.database_url {
        tracing::info!("using postgres role directory");
        return Ok(Arc::new(PostgresRoleRepository::connect_lazy(url)?));
    }

    let repository = match &config.role_seed_file {
        Some(path) => {
            let seed = RoleSeed::from_file(path)?;
            tracing::info!(path = %path.display(), "loaded role seed");
            InMemoryRoleRepository::from_seed(seed)?
        }
        None => {
            tracing::warn!("no DATABASE_URL or ROLE_SEED_FILE; role directory is empty");
            InMemoryRoleRepository::new()
        }
    };
    Ok(Arc::new(repository))
}

use clap::Parser;
use ghost_api::{ClientConfig, ClientId, ClientSecret, GhostClient, Password};
use serde_json::json;

#[derive(Debug, Parser)]
struct Opts {
    /// The blog's base URL
    #[arg(short, long, env = "GHOST_URL")]
    url: String,

    /// The email address of a staff user
    #[arg(short = 'e', long, env = "GHOST_USERNAME")]
    username: String,

    /// The staff user's password
    #[arg(short, long, env = "GHOST_PASSWORD", hide_env_values = true)]
    password: Password,

    /// The client ID registered with the blog
    #[arg(short, long, env = "GHOST_CLIENT_ID")]
    client_id: ClientId,

    /// The secret paired with the client ID
    #[arg(short = 's', long, env = "GHOST_CLIENT_SECRET", hide_env_values = true)]
    client_secret: ClientSecret,

    /// The title of the draft to create
    #[arg(short, long, default_value = "Hello from ghost_api")]
    title: String,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .pretty()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();

    let config = ClientConfig::new(
        opts.url,
        opts.username,
        opts.password,
        opts.client_id,
        opts.client_secret,
    );
    if let Err(err) = config.validate() {
        color_eyre::eyre::bail!("{err}: {}", err.describe());
    }

    let client = GhostClient::new(config);

    let created = client
        .posts()
        .create(&json!({ "posts": [{ "title": opts.title, "status": "draft" }] }))
        .await
        .map_err(|err| color_eyre::eyre::eyre!("{err}: {}", err.describe()))?;

    let post = &created["posts"][0];
    tracing::info!(id = %post["id"], slug = %post["slug"], "created draft");

    if let Some(id) = post["id"].as_str() {
        let read = client.posts().read(&json!({ "id": id })).await?;
        tracing::info!(title = %read["posts"][0]["title"], "read it back");
    }

    client.destruct().await?;
    tracing::info!("tokens revoked");

    Ok(())
}

use std::{collections::HashSet, error::Error, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use guest_alias_for_warp::{
    build_api_route_filter, handle_guest_alias_errors, with_guest_alias, Alias, AliasRegistry,
    GuestAlias, GuestAliasConfig,
};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use warp::{path, Filter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let registry = Arc::new(InMemoryProfiles::new(["admin", "postmaster"]));

    let config = GuestAliasConfig::from_env();
    info!(?config, "starting guest alias demo");

    let guest = GuestAlias::with_registry(config, registry)?;

    let guest_routes = build_api_route_filter(&guest);

    let homepage = warp::path::end().then(|| async move { warp::reply::html("hello, world!") });

    let inbox = path!("inbox")
        .and(with_guest_alias(&guest))
        .then(|alias: Option<Alias>| async move {
            warp::reply::json(&json!({ "alias": alias, "messages": [] }))
        });

    let all_routes = homepage
        .or(inbox)
        .or(guest_routes)
        .recover(handle_guest_alias_errors)
        .with(warp::trace::request());

    let addr: SocketAddr = "127.0.0.1:4000".parse()?;
    info!("listening on {addr}");
    warp::serve(all_routes).run(addr).await;

    Ok(())
}

/// Stand-in for the profiles table of registered users.
struct InMemoryProfiles {
    aliases: HashSet<String>,
}

impl InMemoryProfiles {
    pub fn new<'a>(aliases: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            aliases: aliases.into_iter().map(str::to_string).collect(),
        }
    }
}

#[async_trait]
impl AliasRegistry for InMemoryProfiles {
    async fn is_alias_taken(&self, alias: &Alias) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(self.aliases.contains(alias.as_str()))
    }
}

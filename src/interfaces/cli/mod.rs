//! CLI interface module
//!
//! Runs one parsed command against an initialised [`AppContext`].

pub mod handlers;

use crate::cli::Commands;
use crate::errors::Result;
use crate::services::LinkPatch;
use crate::storage::{LinkQuery, LinkSortField, SortOrder};
use crate::system::AppContext;
use crate::utils::parse_expire_time;

/// Run a link command; `Commands::Config` is handled before backends start
pub async fn run_cli_command(ctx: &AppContext, owner: &str, json: bool, cmd: Commands) -> Result<()> {
    let links = &ctx.links;

    match cmd {
        Commands::Create {
            content,
            private,
            expires,
        } => handlers::create(links, owner, content, private, expires, json).await,

        Commands::Get { short_code } => handlers::get(links, &short_code, json).await,

        Commands::Show { id } => handlers::show(links, &id, json).await,

        Commands::Update {
            id,
            content,
            visible,
            expires,
        } => {
            let expires_at = expires.as_deref().map(parse_expire_time).transpose()?;
            let patch = LinkPatch {
                content,
                visibility: visible,
                expires_at,
            };
            handlers::update(links, owner, &id, patch, json).await
        }

        Commands::Hide { id } => handlers::set_visibility(links, owner, &id, false, json).await,

        Commands::Publish { id } => handlers::set_visibility(links, owner, &id, true, json).await,

        Commands::Expire { id, when } => {
            let at = parse_expire_time(&when)?;
            handlers::expire(links, owner, &id, at, json).await
        }

        Commands::Delete { id } => handlers::delete(links, owner, &id, json).await,

        Commands::List {
            page,
            page_size,
            sort,
            asc,
            all,
        } => {
            let query = LinkQuery {
                owner_id: (!all).then(|| owner.to_string()),
                page,
                page_size,
                sort_by: sort.parse::<LinkSortField>()?,
                order: if asc { SortOrder::Asc } else { SortOrder::Desc },
            };
            handlers::list(links, query, json).await
        }

        Commands::Config => {
            println!("{}", crate::config::StaticConfig::generate_sample_config());
            Ok(())
        }
    }
}

//! Link command handlers

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;

use crate::errors::Result;
use crate::services::{CreateLinkRequest, LinkPatch, LinkService, LinkView};
use crate::storage::{LinkPage, LinkQuery, SortOrder};
use crate::utils::{format_remaining, parse_expire_time};

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn describe(view: &LinkView) -> String {
    let mut parts = vec![format!("{} {}", view.short_code.cyan(), view.id.dimmed())];

    if !view.visibility {
        parts.push("(hidden)".yellow().to_string());
    }
    if let Some(expires_at) = view.expires_at {
        parts.push(
            format!(
                "(expires: {}, {})",
                expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
                format_remaining(Utc::now(), expires_at)
            )
            .dimmed()
            .yellow()
            .to_string(),
        );
    }
    parts.join(" ")
}

fn print_view(label: &str, view: &LinkView, json: bool) -> Result<()> {
    if json {
        return print_json(view);
    }
    println!("{} {}: {}", "✓".bold().green(), label, describe(view));
    if let Some(ref content) = view.content {
        println!("{}", content);
    }
    Ok(())
}

pub async fn create(
    links: &LinkService,
    owner: &str,
    content: String,
    private: bool,
    expires: Option<String>,
    json: bool,
) -> Result<()> {
    let mut req = CreateLinkRequest::new(content);
    if private {
        req = req.hidden();
    }
    if let Some(ref expires) = expires {
        req = req.expires_at(parse_expire_time(expires)?);
    }

    let view = links.create(owner, req).await?;
    print_view("Created", &view, json)
}

pub async fn get(links: &LinkService, short_code: &str, json: bool) -> Result<()> {
    let view = links.find_by_short_code(short_code).await?;
    if json {
        return print_json(&view);
    }
    if let Some(content) = view.content {
        println!("{}", content);
    }
    Ok(())
}

pub async fn show(links: &LinkService, id: &str, json: bool) -> Result<()> {
    let view = links.find_by_id(id).await?;
    print_view("Link", &view, json)
}

pub async fn update(
    links: &LinkService,
    owner: &str,
    id: &str,
    patch: LinkPatch,
    json: bool,
) -> Result<()> {
    let view = links.update(id, owner, patch).await?;
    print_view("Updated", &view, json)
}

pub async fn set_visibility(
    links: &LinkService,
    owner: &str,
    id: &str,
    visible: bool,
    json: bool,
) -> Result<()> {
    let view = links.update_visibility(id, owner, visible).await?;
    print_view(if visible { "Published" } else { "Hidden" }, &view, json)
}

pub async fn expire(
    links: &LinkService,
    owner: &str,
    id: &str,
    at: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let view = links.update_expiration(id, owner, at).await?;
    print_view("Expiration set", &view, json)
}

pub async fn delete(links: &LinkService, owner: &str, id: &str, json: bool) -> Result<()> {
    links.delete(id, owner).await?;
    if json {
        return print_json(&serde_json::json!({ "deleted": id }));
    }
    println!("{} Deleted link: {}", "✓".bold().green(), id.cyan());
    Ok(())
}

pub async fn list(links: &LinkService, query: LinkQuery, json: bool) -> Result<()> {
    let page: LinkPage<LinkView> = links.list(&query).await?;
    if json {
        return print_json(&page);
    }

    if page.items.is_empty() {
        println!("{} No links found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Link list:".bold().green());
    println!();
    for view in &page.items {
        println!("  {}", describe(view));
        if let Some(ref content) = view.content {
            let preview: String = content.chars().take(60).collect();
            println!("    {}", preview.replace('\n', " ").dimmed());
        }
    }
    println!();
    println!(
        "{} Page {} ({} per page, {} order), total {} links",
        "ℹ".bold().blue(),
        page.page,
        page.page_size,
        match query.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        },
        page.total.to_string().green()
    );
    Ok(())
}

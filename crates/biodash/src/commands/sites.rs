//! Biosite command handlers.

use std::str::FromStr;
use std::sync::Arc;

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use biodash_core::{
    AdminTableSession, AnalyticsSnapshot, Biosite, BiositeId, BusinessCard, DateRange,
    FilterCriteria, Link, SlugFilter, SortKey, SortOrder, StatusFilter, TimeRange,
};

use crate::cli::{GlobalOpts, ListArgs, OutputFormat, SitesArgs, SitesCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Slug")]
    slug: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn site_row(s: &Arc<Biosite>, color: bool) -> SiteRow {
    let status = if color {
        if s.active {
            format!("{}", "active".green())
        } else {
            format!("{}", "inactive".red())
        }
    } else {
        if s.active { "active" } else { "inactive" }.into()
    };
    SiteRow {
        id: s.id.to_string(),
        title: s.title.clone(),
        slug: s.slug.clone().unwrap_or_default(),
        status,
        owner: s.owner_handle.clone().unwrap_or_default(),
        created: s.created_at.format("%Y-%m-%d").to_string(),
    }
}

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "URL")]
    url: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Active")]
    active: bool,
}

impl From<&Link> for LinkRow {
    fn from(l: &Link) -> Self {
        Self {
            title: l.title.clone(),
            url: l.url.clone(),
            platform: l.platform.clone().unwrap_or_default(),
            active: l.active,
        }
    }
}

// ── Detail payloads ──────────────────────────────────────────────────

#[derive(Serialize)]
struct InspectReport {
    site: Biosite,
    links: Option<Vec<Link>>,
    business_card: Option<BusinessCard>,
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(
    session: &mut AdminTableSession,
    args: SitesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SitesCommand::List(list) => handle_list(session, &list, global).await,

        SitesCommand::Inspect { id } => handle_inspect(session, id.into(), global).await,

        SitesCommand::Analytics { id, range } => {
            let range = TimeRange::from_str(&range).map_err(|_| CliError::Validation {
                field: "range".into(),
                reason: format!("expected 'last7', 'last30', or 'lastYear', got '{range}'"),
            })?;
            handle_analytics(session, id.into(), range, global).await
        }

        SitesCommand::Activate { id } => {
            set_active(session, id.into(), true, global).await
        }

        SitesCommand::Deactivate { id } => {
            set_active(session, id.into(), false, global).await
        }

        SitesCommand::Delete { id } => {
            session.start().await?;
            locate(session, id.into()).await?;
            if !util::confirm(
                &format!("Delete biosite {id}? This is destructive."),
                global.yes,
            )? {
                return Ok(());
            }
            session.delete_biosite(id.into()).await?;
            if !global.quiet {
                eprintln!("Biosite deleted");
            }
            Ok(())
        }
    }
}

// ── List ─────────────────────────────────────────────────────────────

async fn handle_list(
    session: &mut AdminTableSession,
    list: &ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    session.start().await?;

    if let Some(size) = list.size {
        session.set_page_size(size).await?;
    }

    let filters = filters_from_args(list)?;
    if filters != FilterCriteria::default() {
        session.set_filters(filters).await?;
    }

    let color = output::should_color(&global.color);

    if list.all_pages {
        let mut rows = session.view().rows;
        while session.next_page().await? {
            rows.extend(session.view().rows);
        }
        let out = output::render_list(
            &global.output,
            &rows,
            |s| site_row(s, color),
            |s| s.id.to_string(),
        );
        output::print_output(&out, global.quiet);
        return Ok(());
    }

    if list.page > 1 {
        session.set_page(list.page).await?;
    }
    let view = session.view();
    let out = output::render_list(
        &global.output,
        &view.rows,
        |s| site_row(s, color),
        |s| s.id.to_string(),
    );
    output::print_output(&out, global.quiet);

    if matches!(global.output, OutputFormat::Table) && !global.quiet {
        println!("{}", view.page_info);
        if view.total_pages > 1 {
            println!(
                "{}",
                output::render_pager(&view.visible_pages, view.current_page)
            );
        }
    }
    Ok(())
}

fn filters_from_args(list: &ListArgs) -> Result<FilterCriteria, CliError> {
    fn parse<T: FromStr>(raw: Option<&str>, field: &str) -> Result<Option<T>, CliError> {
        raw.map(|r| {
            T::from_str(r).map_err(|_| CliError::Validation {
                field: field.into(),
                reason: format!("unrecognized value '{r}'"),
            })
        })
        .transpose()
    }

    Ok(FilterCriteria {
        search: list.search.clone().unwrap_or_default(),
        slug_search: list.slug_search.clone().unwrap_or_default(),
        status: parse::<StatusFilter>(list.status.as_deref(), "status")?.unwrap_or_default(),
        has_slug: parse::<SlugFilter>(list.slug.as_deref(), "slug")?.unwrap_or_default(),
        date_range: parse::<DateRange>(list.date_range.as_deref(), "date-range")?
            .unwrap_or_default(),
        sort_by: parse::<SortKey>(list.sort_by.as_deref(), "sort-by")?.unwrap_or_default(),
        sort_order: parse::<SortOrder>(list.order.as_deref(), "order")?.unwrap_or_default(),
    })
}

// ── Inspect ──────────────────────────────────────────────────────────

async fn handle_inspect(
    session: &mut AdminTableSession,
    id: BiositeId,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    session.start().await?;
    let site = locate(session, id).await?;

    session.toggle_expansion(id).await;

    let report = InspectReport {
        links: session.links(id).and_then(|e| e.value().cloned()),
        business_card: session
            .business_card(site.owner_id)
            .and_then(|e| e.value().cloned()),
        site: (*site).clone(),
    };

    let out = output::render_single(
        &global.output,
        &report,
        render_inspect,
        |r| r.site.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_inspect(report: &InspectReport) -> String {
    let site = &report.site;
    let mut out = String::new();
    out.push_str(&format!("Title:   {}\n", site.title));
    out.push_str(&format!("ID:      {}\n", site.id));
    out.push_str(&format!("Owner:   {}\n", site.owner_id));
    out.push_str(&format!(
        "Slug:    {}\n",
        site.slug.as_deref().unwrap_or("(none)")
    ));
    out.push_str(&format!(
        "Status:  {}\n",
        if site.active { "active" } else { "inactive" }
    ));
    out.push_str(&format!("Created: {}\n", site.created_at.format("%Y-%m-%d %H:%M")));

    match &report.business_card {
        Some(card) => {
            out.push_str("\nBusiness card:\n");
            if let Some(name) = &card.full_name {
                out.push_str(&format!("  Name:  {name}\n"));
            }
            if let Some(email) = &card.email {
                out.push_str(&format!("  Email: {email}\n"));
            }
            if let Some(qr) = &card.qr_url {
                out.push_str(&format!("  QR:    {qr}\n"));
            }
        }
        None => out.push_str("\nBusiness card: unavailable\n"),
    }

    match &report.links {
        Some(links) if !links.is_empty() => {
            out.push_str("\nLinks:\n");
            let rows: Vec<LinkRow> = links.iter().map(LinkRow::from).collect();
            out.push_str(
                &tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string(),
            );
        }
        Some(_) => out.push_str("\nLinks: none\n"),
        None => out.push_str("\nLinks: unavailable\n"),
    }
    out
}

// ── Analytics ────────────────────────────────────────────────────────

async fn handle_analytics(
    session: &mut AdminTableSession,
    id: BiositeId,
    range: TimeRange,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    session.start().await?;
    locate(session, id).await?;

    session.set_time_range(range).await;
    session.toggle_analytics(id).await;

    let snapshot = session
        .analytics(id)
        .and_then(|e| e.value().cloned())
        .ok_or_else(|| CliError::FetchFailed {
            message: format!("analytics for {id} could not be loaded"),
        })?;

    let out = output::render_single(
        &global.output,
        &snapshot,
        |s| render_analytics(s, range),
        |s| format!("{} {}", s.views, s.clicks),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

fn render_analytics(snap: &AnalyticsSnapshot, range: TimeRange) -> String {
    let mut out = String::new();
    out.push_str(&format!("Range:  {range}\n"));
    out.push_str(&format!("Views:  {}\n", snap.views));
    out.push_str(&format!("Clicks: {}\n", snap.clicks));

    if !snap.click_details.is_empty() {
        out.push_str("\nClicks by target:\n");
        for detail in &snap.click_details {
            out.push_str(&format!("  {:<24} {}\n", detail.label, detail.clicks));
        }
    }
    if !snap.daily_activity.is_empty() {
        out.push_str("\nDaily activity:\n");
        for day in &snap.daily_activity {
            out.push_str(&format!(
                "  {}  views {:>6}  clicks {:>6}\n",
                day.day.format("%Y-%m-%d"),
                day.views,
                day.clicks
            ));
        }
    }
    out
}

// ── Mutations ────────────────────────────────────────────────────────

async fn set_active(
    session: &mut AdminTableSession,
    id: BiositeId,
    active: bool,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    session.start().await?;
    locate(session, id).await?;
    session.set_biosite_active(id, active).await?;
    if !global.quiet {
        eprintln!("Biosite {}", if active { "activated" } else { "deactivated" });
    }
    Ok(())
}

// ── Row lookup ───────────────────────────────────────────────────────

/// Walk pages until the row is in the visible buffer. Leaves the session
/// on the page containing the row.
async fn locate(
    session: &mut AdminTableSession,
    id: BiositeId,
) -> Result<Arc<Biosite>, CliError> {
    loop {
        if let Some(site) = session.view().rows.iter().find(|s| s.id == id) {
            return Ok(Arc::clone(site));
        }
        if !session.next_page().await? {
            return Err(CliError::NotFound {
                identifier: id.to_string(),
            });
        }
    }
}

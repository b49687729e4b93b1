use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::client::api::{EnrollmentClient, ReqwestTransport};
use crate::client::filters::FilterDimension;
use crate::client::retry::RetryPolicy;
use crate::client::state::{Action, Applied, ClientState, LocalView};
use crate::client::store::FilterStore;
use crate::config::{default_state_dir, BrowseArgs};
use crate::domain::entities::query::DataQuery;

fn server_query(args: &BrowseArgs) -> DataQuery {
    let mut pairs = vec![("page".to_string(), args.page.to_string())];
    if let Some(size) = args.page_size {
        pairs.push(("page_size".to_string(), size.to_string()));
    }
    if let Some(sort) = &args.sort {
        pairs.push(("sort".to_string(), sort.clone()));
    }
    if let Some(order) = args.order {
        pairs.push(("order".to_string(), order.as_str().to_string()));
    }
    DataQuery::from_pairs(&pairs)
}

fn selection_actions(args: &BrowseArgs) -> Vec<Action> {
    let mut actions = Vec::new();
    if args.clear {
        actions.push(Action::ClearFilters);
    }
    let dimensions = [
        (FilterDimension::Id, &args.select_ids),
        (FilterDimension::Sector, &args.select_sectors),
        (FilterDimension::SchoolType, &args.select_types),
    ];
    for (dimension, values) in dimensions {
        actions.extend(values.iter().map(|value| Action::SetSelected {
            dimension,
            value: value.clone(),
            selected: true,
        }));
    }
    actions
}

pub async fn run(args: BrowseArgs) -> Result<()> {
    let state_dir = match &args.state_dir {
        Some(dir) => dir.clone(),
        None => default_state_dir()?,
    };
    let store = FilterStore::new(&state_dir);
    let mut state = ClientState::new(args.view_page_size);
    state.apply(Action::RestoreFilters(store.load()));
    tracing::debug!(path = %store.path().display(), filters = ?state.filters, "restored filter selection");

    for action in selection_actions(&args) {
        if state.apply(action) == Applied::FiltersChanged {
            store.save(&state.filters)?;
        }
    }

    let transport = ReqwestTransport::new(&args.server)?;
    let client = EnrollmentClient::new(
        transport,
        RetryPolicy::new(args.retries, args.retry_delay()),
    );

    if let Some(ticket) = state.begin_load(server_query(&args)) {
        match client.fetch_page(&ticket.query).await {
            Ok(page) => {
                state.apply(Action::PageLoaded {
                    seq: ticket.seq,
                    page,
                });
            }
            Err(err) => {
                state.apply(Action::LoadFailed {
                    seq: ticket.seq,
                    error: err.to_string(),
                });
                return Err(err).context("failed to load data page");
            }
        }
    }

    if let Some(column) = &args.local_sort {
        state.apply(Action::SetSort {
            column: column.clone(),
            descending: args.local_desc,
        });
    }
    state.apply(Action::SetViewPage(args.view_page));

    let view = state.view();
    write_view(std::io::stdout().lock(), &state, &view)?;
    if let Some(page) = &state.page {
        eprintln!(
            "view page {} of {} ({} rows after local filters; server page {} of {}, {} records)",
            view.page,
            view.total_pages,
            view.visible.len(),
            page.page,
            page.total_pages,
            page.total
        );
    }

    if let Some(path) = &args.chart_out {
        let ids = state.effective_chart_ids();
        let png = client
            .fetch_chart(&ids)
            .await
            .context("failed to load chart")?;
        std::fs::write(path, png)
            .with_context(|| format!("failed to write chart: {}", path.display()))?;
        info!(path = %path.display(), schools = ids.len(), "chart saved");
    }
    Ok(())
}

/// Writes the current view as tab-separated text with a header row.
pub fn write_view<W: Write>(writer: W, state: &ClientState, view: &LocalView) -> Result<()> {
    let Some(page) = &state.page else {
        return Ok(());
    };
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);
    out.write_record(&page.columns)
        .context("failed to write header")?;
    for row in view.page_rows() {
        out.write_record(page.columns.iter().map(|column| row.cell_text(column)))
            .context("failed to write row")?;
    }
    out.flush().context("failed to flush output")?;
    Ok(())
}

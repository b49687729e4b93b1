use std::ops::Range;

use crate::client::api::DataPage;
use crate::client::filters::{apply_filters, sort_rows, ClientFilterState, FilterDimension, PageRow};
use crate::constants::{DEFAULT_VIEW_PAGE_SIZE, MAX_SCHOOLS_PER_GRAPH};
use crate::domain::entities::query::DataQuery;

/// Issued for every page load that was not suppressed. Only the response to
/// the most recent ticket is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub query: DataQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSort {
    pub column: String,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PageLoaded { seq: u64, page: DataPage },
    LoadFailed { seq: u64, error: String },
    RestoreFilters(ClientFilterState),
    SetSelected {
        dimension: FilterDimension,
        value: String,
        selected: bool,
    },
    ClearFilters,
    /// Sorts by `column`; picking the current column again flips direction.
    SortBy(String),
    SetSort { column: String, descending: bool },
    SetViewPage(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Unchanged,
    Updated,
    /// The filter selection changed and should be persisted.
    FiltersChanged,
    /// The response belonged to a superseded load.
    Stale,
}

/// The filtered and sorted rows of the loaded page, with the current view
/// page marked out.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalView {
    pub visible: Vec<PageRow>,
    pub page: usize,
    pub total_pages: usize,
    range: Range<usize>,
}

impl LocalView {
    pub fn page_rows(&self) -> &[PageRow] {
        &self.visible[self.range.clone()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientState {
    pub filters: ClientFilterState,
    pub sort: Option<LocalSort>,
    pub view_page: usize,
    pub view_page_size: usize,
    pub page: Option<DataPage>,
    pub is_loading: bool,
    pub last_error: Option<String>,
    in_flight: Option<DataQuery>,
    latest_seq: u64,
}

impl Default for ClientState {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_PAGE_SIZE)
    }
}

impl ClientState {
    pub fn new(view_page_size: usize) -> Self {
        Self {
            filters: ClientFilterState::default(),
            sort: None,
            view_page: 1,
            view_page_size: view_page_size.max(1),
            page: None,
            is_loading: false,
            last_error: None,
            in_flight: None,
            latest_seq: 0,
        }
    }

    /// Starts a load unless an identical one is already in flight.
    pub fn begin_load(&mut self, query: DataQuery) -> Option<LoadTicket> {
        if self.is_loading && self.in_flight.as_ref() == Some(&query) {
            tracing::debug!(page = query.page, "suppressed duplicate load");
            return None;
        }
        self.latest_seq += 1;
        self.is_loading = true;
        self.in_flight = Some(query.clone());
        Some(LoadTicket {
            seq: self.latest_seq,
            query,
        })
    }

    pub fn apply(&mut self, action: Action) -> Applied {
        match action {
            Action::PageLoaded { seq, page } => {
                if seq != self.latest_seq {
                    tracing::debug!(seq, latest = self.latest_seq, "discarded stale page");
                    return Applied::Stale;
                }
                self.finish_load();
                self.page = Some(page);
                self.last_error = None;
                self.view_page = 1;
                Applied::Updated
            }
            Action::LoadFailed { seq, error } => {
                if seq != self.latest_seq {
                    return Applied::Stale;
                }
                self.finish_load();
                self.last_error = Some(error);
                Applied::Updated
            }
            Action::RestoreFilters(filters) => self.replace_filters(filters),
            Action::SetSelected {
                dimension,
                value,
                selected,
            } => {
                let mut filters = self.filters.clone();
                let values = filters.values_mut(dimension);
                if selected {
                    values.insert(value);
                } else {
                    values.remove(&value);
                }
                self.replace_filters(filters)
            }
            Action::ClearFilters => self.replace_filters(ClientFilterState::default()),
            Action::SortBy(column) => {
                let descending = match &self.sort {
                    Some(current) if current.column == column => !current.descending,
                    _ => false,
                };
                self.sort = Some(LocalSort { column, descending });
                Applied::Updated
            }
            Action::SetSort { column, descending } => {
                self.sort = Some(LocalSort { column, descending });
                Applied::Updated
            }
            Action::SetViewPage(page) => {
                let total_pages = self.visible_rows().len().div_ceil(self.view_page_size);
                let page = page.clamp(1, total_pages.max(1));
                if page == self.view_page {
                    return Applied::Unchanged;
                }
                self.view_page = page;
                Applied::Updated
            }
        }
    }

    fn finish_load(&mut self) {
        self.is_loading = false;
        self.in_flight = None;
    }

    fn replace_filters(&mut self, filters: ClientFilterState) -> Applied {
        if filters == self.filters {
            return Applied::Unchanged;
        }
        self.filters = filters;
        self.view_page = 1;
        Applied::FiltersChanged
    }

    /// Rows of the loaded page after local filters and sort.
    pub fn visible_rows(&self) -> Vec<PageRow> {
        let Some(page) = &self.page else {
            return Vec::new();
        };
        let mut rows = apply_filters(&page.data, &self.filters);
        if let Some(sort) = &self.sort {
            sort_rows(&mut rows, &sort.column, sort.descending);
        }
        rows
    }

    /// Filters and sorts the loaded page once and slices out the current
    /// view page.
    pub fn view(&self) -> LocalView {
        let visible = self.visible_rows();
        let total_pages = visible.len().div_ceil(self.view_page_size);
        let start = (self.view_page - 1).saturating_mul(self.view_page_size);
        let end = start.saturating_add(self.view_page_size).min(visible.len());
        LocalView {
            page: self.view_page,
            total_pages,
            range: start.min(end)..end,
            visible,
        }
    }

    /// Ids to chart: explicit id selection first, then the rows left by a
    /// sector or type filter, otherwise none.
    pub fn effective_chart_ids(&self) -> Vec<String> {
        if !self.filters.ids.is_empty() {
            return self
                .filters
                .ids
                .iter()
                .take(MAX_SCHOOLS_PER_GRAPH)
                .cloned()
                .collect();
        }
        if self.filters.has_category_filter() {
            return self
                .visible_rows()
                .iter()
                .map(PageRow::id)
                .filter(|id| !id.is_empty())
                .take(MAX_SCHOOLS_PER_GRAPH)
                .collect();
        }
        Vec::new()
    }
}

use dioxus::prelude::*;

use crate::constants::{DATA_API_PATH, GRAPH_API_PATH};
use crate::domain::columns::{cell_text, Column};
use crate::domain::entities::enrollment::DatasetSummary;
use crate::domain::entities::query::{DataQuery, QueryResult, SortOrder};
use crate::ui::styles::{
    body_cell_style, body_style, button_style, chart_image_style, control_style,
    header_cell_style, link_style, muted_text_style, panel_style, root_container_style,
    table_container_style, table_style, toolbar_style,
};

const DATA_PAGE_PATH: &str = "/data/";

pub fn render_index_page(summary: &DatasetSummary) -> String {
    let mut dom = VirtualDom::new_with_props(
        IndexView,
        IndexViewProps {
            summary: summary.clone(),
        },
    );
    dom.rebuild_in_place();
    document("School rolls", &dioxus_ssr::render(&dom))
}

pub fn render_data_page(query: &DataQuery, result: &QueryResult) -> String {
    let mut dom = VirtualDom::new_with_props(
        DataView,
        DataViewProps {
            query: query.clone(),
            result: result.clone(),
        },
    );
    dom.rebuild_in_place();
    document("School rolls: data", &dioxus_ssr::render(&dom))
}

fn document(title: &str, body: &str) -> String {
    let body_style = body_style();
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{title}</title></head><body style=\"{body_style}\">{body}</body></html>"
    )
}

/// Link to the data page carrying every parameter of `query`.
pub fn data_href(query: &DataQuery) -> String {
    with_query_string(DATA_PAGE_PATH, &query.to_pairs())
}

/// Chart image URL for the selected ids; no ids yields the placeholder.
pub fn chart_src(ids: &[String]) -> String {
    let pairs: Vec<(&str, &str)> = ids.iter().map(|id| ("ids", id.as_str())).collect();
    with_query_string(GRAPH_API_PATH, &pairs)
}

fn with_query_string<T: serde::Serialize>(path: &str, pairs: &T) -> String {
    match serde_urlencoded::to_string(pairs) {
        Ok(qs) if !qs.is_empty() => format!("{path}?{qs}"),
        Ok(_) => path.to_string(),
        Err(err) => {
            tracing::warn!(%err, path, "failed to encode query string");
            path.to_string()
        }
    }
}

fn is_numeric_column(display_name: &str) -> bool {
    Column::resolve(display_name).is_some_and(Column::is_numeric)
}

#[derive(Props, Clone, PartialEq)]
struct IndexViewProps {
    summary: DatasetSummary,
}

#[allow(non_snake_case)]
fn IndexView(props: IndexViewProps) -> Element {
    let total = props.summary.total_records;
    let last_import = match &props.summary.last_import {
        Some(entry) => format!(
            "Last import: {} ({} rows) at {}",
            entry.source_path, entry.row_count, entry.imported_at
        ),
        None => "No data imported yet. Run `school-rolls import <file>`.".to_string(),
    };
    let root = root_container_style();
    let panel = panel_style();
    let link = link_style();
    let muted = muted_text_style();

    rsx! {
        div {
            style: "{root}",
            h1 { "School rolls" }
            div {
                style: "{panel}",
                p { "{total} schools with enrollment counts from 1996 to 2018." }
                p { style: "{muted}", "{last_import}" }
            }
            ul {
                li {
                    a { href: DATA_PAGE_PATH, style: "{link}", "Browse the data" }
                }
                li {
                    a { href: DATA_API_PATH, style: "{link}", "Data API (JSON)" }
                }
                li {
                    a { href: GRAPH_API_PATH, style: "{link}", "Enrollment chart (PNG)" }
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct DataViewProps {
    query: DataQuery,
    result: QueryResult,
}

struct HeaderLink {
    label: String,
    href: String,
    numeric: bool,
}

fn header_links(query: &DataQuery, columns: &[String]) -> Vec<HeaderLink> {
    columns
        .iter()
        .map(|name| {
            let column = Column::resolve(name);
            let active = column == Some(query.sort);
            let order = match (active, query.order) {
                (true, SortOrder::Asc) => SortOrder::Desc,
                _ => SortOrder::Asc,
            };
            let mut target = query.with_page(1);
            if let Some(column) = column {
                target.sort = column;
            }
            target.order = order;
            let arrow = match (active, query.order) {
                (true, SortOrder::Asc) => " ▲",
                (true, SortOrder::Desc) => " ▼",
                _ => "",
            };
            HeaderLink {
                label: format!("{name}{arrow}"),
                href: data_href(&target),
                numeric: column.is_some_and(Column::is_numeric),
            }
        })
        .collect()
}

#[allow(non_snake_case)]
fn DataView(props: DataViewProps) -> Element {
    let DataViewProps { query, result } = props;

    let sectors: Vec<(String, bool)> = result
        .distinct
        .sectors
        .iter()
        .map(|sector| (sector.clone(), query.sector.as_deref() == Some(sector.as_str())))
        .collect();
    let names: Vec<(String, String, bool)> = result
        .distinct
        .names
        .iter()
        .map(|option| {
            let selected = query.schools.contains(&option.id);
            (option.id.clone(), option.name.clone(), selected)
        })
        .collect();
    let headers = header_links(&query, &result.columns);
    let rows: Vec<Vec<(String, bool)>> = result
        .data
        .iter()
        .map(|row| {
            row.cells()
                .map(|(name, value)| (cell_text(value), is_numeric_column(name)))
                .collect()
        })
        .collect();

    let page = result.page;
    let total = result.total;
    let total_pages = result.total_pages;
    let page_size = query.page_size;
    let sort = query.sort.display_name().into_owned();
    let order = query.order.as_str();
    let has_prev = page > 1;
    let has_next = page < total_pages;
    let prev_href = data_href(&query.with_page(page - 1));
    let next_href = data_href(&query.with_page(page + 1));
    let chart = chart_src(&query.schools);
    let is_empty = rows.is_empty();

    let root = root_container_style();
    let panel = panel_style();
    let toolbar = toolbar_style();
    let control = control_style();
    let button = button_style();
    let link = link_style();
    let muted = muted_text_style();
    let table_container = table_container_style();
    let table = table_style();
    let chart_style = chart_image_style();

    rsx! {
        div {
            style: "{root}",
            div {
                style: "{toolbar}",
                a { href: "/", style: "{link}", "School rolls" }
                span { style: "{muted}", "Page {page} of {total_pages} ({total} records)" }
            }
            form {
                method: "get",
                action: DATA_PAGE_PATH,
                style: "{panel}",
                div {
                    style: "{toolbar}",
                    label {
                        style: "display: flex; flex-direction: column; gap: 4px;",
                        span { style: "{muted}", "Sector" }
                        select {
                            name: "sector",
                            style: "{control}",
                            option { value: "", "All sectors" }
                            {sectors.iter().map(|(sector, selected)| rsx!(
                                option { value: "{sector}", selected: *selected, "{sector}" }
                            ))}
                        }
                    }
                    label {
                        style: "display: flex; flex-direction: column; gap: 4px;",
                        span { style: "{muted}", "Schools" }
                        select {
                            name: "schools",
                            multiple: true,
                            size: "6",
                            style: "{control} min-width: 280px;",
                            {names.iter().map(|(id, name, selected)| rsx!(
                                option { value: "{id}", selected: *selected, "{name}" }
                            ))}
                        }
                    }
                    label {
                        style: "display: flex; flex-direction: column; gap: 4px;",
                        span { style: "{muted}", "Rows per page" }
                        input {
                            r#type: "number",
                            name: "page_size",
                            min: "1",
                            max: "1000",
                            value: "{page_size}",
                            style: "{control}",
                        }
                    }
                    input { r#type: "hidden", name: "sort", value: "{sort}" }
                    input { r#type: "hidden", name: "order", value: "{order}" }
                    button { r#type: "submit", style: "{button}", "Apply" }
                    a { href: DATA_PAGE_PATH, style: "{link}", "Reset" }
                }
            }
            div {
                style: "{panel}",
                img { src: "{chart}", alt: "Enrollment trends", style: "{chart_style}" }
            }
            div {
                style: "{table_container}",
                table {
                    style: "{table}",
                    thead {
                        tr {
                            {headers.iter().map(|HeaderLink { label, href, numeric }| {
                                let cell_style = header_cell_style(*numeric);
                                rsx!(
                                    th {
                                        style: "{cell_style}",
                                        a { href: "{href}", style: "{link}", "{label}" }
                                    }
                                )
                            })}
                        }
                    }
                    tbody {
                        {rows.iter().map(|cells| rsx!(
                            tr {
                                {cells.iter().map(|(text, numeric)| {
                                    let cell_style = body_cell_style(*numeric);
                                    rsx!(td { style: "{cell_style}", "{text}" })
                                })}
                            }
                        ))}
                    }
                }
                if is_empty {
                    p { style: "{muted}", "No records on this page." }
                }
            }
            div {
                style: "{toolbar}",
                if has_prev {
                    a { href: "{prev_href}", style: "{link}", "Previous" }
                }
                if has_next {
                    a { href: "{next_href}", style: "{link}", "Next" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::columns::{display_columns, project_record};
    use crate::domain::entities::enrollment::{EnrollmentRecord, ImportLogEntry, YearlyCounts};
    use crate::domain::entities::query::{DistinctLists, NameOption};

    fn sample_result(query: &DataQuery) -> QueryResult {
        let record = EnrollmentRecord {
            id: "7".to_string(),
            name: "Hillside & Vale Primary".to_string(),
            sector: Some("Primary".to_string()),
            yearly_counts: [(1996, 210)].into_iter().collect::<YearlyCounts>(),
            ..Default::default()
        };
        QueryResult {
            page: query.page,
            page_size: query.page_size,
            total: 1,
            total_pages: 1,
            columns: display_columns(),
            data: vec![project_record(&record)],
            distinct: DistinctLists {
                names: vec![NameOption {
                    id: "7".to_string(),
                    name: record.name.clone(),
                }],
                sectors: vec!["Primary".to_string(), "Secondary".to_string()],
                types: Vec::new(),
            },
        }
    }

    #[test]
    fn data_href_keeps_filters() {
        let query = DataQuery {
            sector: Some("Special School".to_string()),
            schools: vec!["1".to_string(), "2".to_string()],
            ..Default::default()
        };

        let href = data_href(&query.with_page(3));

        assert!(href.starts_with("/data/?page=3&"));
        assert!(href.contains("sector=Special+School"));
        assert!(href.contains("schools=1&schools=2"));
    }

    #[test]
    fn chart_src_without_ids_points_at_placeholder() {
        assert_eq!(chart_src(&[]), GRAPH_API_PATH);
        assert_eq!(
            chart_src(&["4".to_string(), "9".to_string()]),
            format!("{GRAPH_API_PATH}?ids=4&ids=9")
        );
    }

    #[test]
    fn active_sort_header_toggles_order() {
        let query = DataQuery::default();
        let headers = header_links(&query, &display_columns());

        let name = headers
            .iter()
            .find(|h| h.label.starts_with("Name"))
            .expect("name header");
        assert!(name.href.contains("order=desc"));

        let year = headers
            .iter()
            .find(|h| h.label == "1996")
            .expect("year header");
        assert!(year.numeric);
        assert!(year.href.contains("sort=1996"));
        assert!(year.href.contains("order=asc"));
    }

    #[test]
    fn data_page_renders_rows_and_escapes_text() {
        let query = DataQuery {
            schools: vec!["7".to_string()],
            ..Default::default()
        };

        let html = render_data_page(&query, &sample_result(&query));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Hillside &amp; Vale Primary"));
        assert!(html.contains("210"));
        assert!(html.contains("enrollment-graph"));
        assert!(html.contains("?ids=7"));
        assert!(!html.contains("Previous"));
    }

    #[test]
    fn index_page_reports_last_import() {
        let summary = DatasetSummary {
            total_records: 42,
            last_import: Some(ImportLogEntry {
                source_path: "rolls.csv".to_string(),
                row_count: 42,
                imported_at: "2024-01-01 09:30:00".to_string(),
            }),
        };

        let html = render_index_page(&summary);

        assert!(html.contains("42 schools"));
        assert!(html.contains("rolls.csv"));
    }
}

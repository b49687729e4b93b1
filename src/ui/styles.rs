pub const PAGE_BACKGROUND: &str = "#141414";
pub const PANEL_BACKGROUND: &str = "#1e1e1e";
pub const BORDER_COLOR: &str = "#2a2a2a";
pub const TEXT_COLOR: &str = "#f5f5f5";
pub const MUTED_TEXT_COLOR: &str = "#a3a3a3";
pub const ACCENT_COLOR: &str = "#6366f1";

pub fn body_style() -> String {
    format!(
        "margin: 0; font-family: system-ui, sans-serif; background: {PAGE_BACKGROUND}; color: {TEXT_COLOR};"
    )
}

pub fn root_container_style() -> String {
    "display: flex; flex-direction: column; gap: 16px; padding: 16px; min-height: 100vh; box-sizing: border-box;".to_string()
}

pub fn panel_style() -> String {
    format!(
        "background: {PANEL_BACKGROUND}; border: 1px solid {BORDER_COLOR}; border-radius: 8px; padding: 12px;"
    )
}

pub fn toolbar_style() -> String {
    "display: flex; flex-wrap: wrap; gap: 12px; align-items: flex-end;".to_string()
}

pub fn control_style() -> String {
    format!(
        "background: {PAGE_BACKGROUND}; color: {TEXT_COLOR}; border: 1px solid {BORDER_COLOR}; border-radius: 6px; padding: 4px 8px;"
    )
}

pub fn button_style() -> String {
    format!(
        "background: {ACCENT_COLOR}; color: {TEXT_COLOR}; border: none; border-radius: 6px; padding: 6px 14px; cursor: pointer;"
    )
}

pub fn link_style() -> String {
    format!("color: {ACCENT_COLOR}; text-decoration: none;")
}

pub fn muted_text_style() -> String {
    format!("color: {MUTED_TEXT_COLOR}; font-size: 13px;")
}

pub fn table_container_style() -> String {
    "flex: 1; min-height: 0; overflow: auto;".to_string()
}

pub fn table_style() -> String {
    "border-collapse: collapse; width: max-content; min-width: 100%; font-size: 13px;".to_string()
}

/// Year columns are right-aligned so counts line up.
pub fn header_cell_style(numeric: bool) -> String {
    let align = if numeric { "right" } else { "left" };
    format!(
        "position: sticky; top: 0; background: {PANEL_BACKGROUND}; border-bottom: 1px solid {BORDER_COLOR}; padding: 6px 8px; text-align: {align}; white-space: nowrap;"
    )
}

pub fn body_cell_style(numeric: bool) -> String {
    let align = if numeric { "right" } else { "left" };
    format!(
        "border-bottom: 1px solid {BORDER_COLOR}; padding: 4px 8px; text-align: {align}; white-space: nowrap;"
    )
}

pub fn chart_image_style() -> String {
    format!("max-width: 100%; height: auto; border: 1px solid {BORDER_COLOR}; border-radius: 8px;")
}

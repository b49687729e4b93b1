use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use plotters::coord::types::{RangedCoordi32, RangedCoordi64};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::constants::{DATA_END_YEAR, DATA_START_YEAR};
use crate::domain::entities::chart::{
    ChartPlan, ChartSeries, EMPTY_CHART_MESSAGE, EMPTY_CHART_Y_MAX,
};
use crate::infra::chart::fonts;
use crate::infra::chart::theme::{
    palette_color, BACKGROUND, EDGE_COLOR, GRID_COLOR, LEGEND_BACKGROUND, LEGEND_EDGE_COLOR,
    TEXT_COLOR, TICK_COLOR,
};

pub const TRENDS_SIZE: (u32, u32) = (1200, 600);
pub const EMPTY_SIZE: (u32, u32) = (1000, 600);

const FONT: &str = "sans-serif";
const LEGEND_WIDTH: i32 = 260;
const LEGEND_PADDING: i32 = 12;
const LEGEND_LABEL_CHARS: usize = 30;

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type YearChart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordi32, RangedCoordi64>>;

fn draw_error<E: std::fmt::Debug>(err: E) -> anyhow::Error {
    anyhow!("failed to draw chart: {err:?}")
}

#[derive(Debug, Clone, Copy)]
pub struct ChartRenderer {
    text: bool,
}

impl ChartRenderer {
    pub fn new(font_path: Option<&Path>) -> Self {
        Self {
            text: fonts::ensure_registered(font_path),
        }
    }

    /// Renders lines, markers and swatches only.
    #[cfg(test)]
    pub fn without_text() -> Self {
        Self { text: false }
    }

    pub fn draws_text(&self) -> bool {
        self.text
    }

    pub fn render_png(&self, plan: &ChartPlan) -> Result<Vec<u8>> {
        let (width, height) = match plan {
            ChartPlan::Empty => EMPTY_SIZE,
            ChartPlan::Trends { .. } => TRENDS_SIZE,
        };

        let mut buffer = vec![0_u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&BACKGROUND).map_err(draw_error)?;

            match plan {
                ChartPlan::Empty => self.draw_placeholder(&root)?,
                ChartPlan::Trends { series, y_max } => {
                    self.draw_trends(&root, &plan.title(), series, *y_max)?
                }
            }

            root.present().map_err(draw_error)?;
        }

        encode_png(buffer, width, height)
    }

    fn build_chart<'a, 'b>(
        &self,
        area: &'a Area<'b>,
        title: &str,
        y_max: i64,
    ) -> Result<YearChart<'a, 'b>> {
        let mut builder = ChartBuilder::on(area);
        builder
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(72);
        if self.text {
            builder.caption(title, (FONT, 22.0).into_font().color(&TEXT_COLOR));
        }
        let mut chart = builder
            .build_cartesian_2d(DATA_START_YEAR..DATA_END_YEAR, 0_i64..y_max.max(1))
            .map_err(draw_error)?;

        {
            let mut mesh = chart.configure_mesh();
            mesh.bold_line_style(GRID_COLOR.mix(0.6))
                .light_line_style(GRID_COLOR.mix(0.3))
                .axis_style(EDGE_COLOR);
            if self.text {
                mesh.x_desc("Year")
                    .y_desc("Number of Pupils")
                    .axis_desc_style((FONT, 15.0).into_font().color(&TEXT_COLOR))
                    .label_style((FONT, 12.0).into_font().color(&TICK_COLOR));
            } else {
                mesh.x_labels(0).y_labels(0);
            }
            mesh.draw().map_err(draw_error)?;
        }

        Ok(chart)
    }

    fn draw_placeholder(&self, root: &Area<'_>) -> Result<()> {
        let plan = ChartPlan::Empty;
        let mut chart = self.build_chart(root, &plan.title(), EMPTY_CHART_Y_MAX)?;

        if self.text {
            let style = (FONT, 18.0)
                .into_font()
                .color(&TEXT_COLOR)
                .pos(Pos::new(HPos::Center, VPos::Center));
            let center = ((DATA_START_YEAR + DATA_END_YEAR) / 2, EMPTY_CHART_Y_MAX / 2);
            chart
                .draw_series(std::iter::once(Text::new(EMPTY_CHART_MESSAGE, center, style)))
                .map_err(draw_error)?;
        }
        Ok(())
    }

    fn draw_trends(
        &self,
        root: &Area<'_>,
        title: &str,
        series: &[ChartSeries],
        y_max: i64,
    ) -> Result<()> {
        let (width, _) = root.dim_in_pixel();
        let legend_width = if series.is_empty() { 0 } else { LEGEND_WIDTH };
        let (plot_area, legend_area) = root.split_horizontally(width as i32 - legend_width);

        let mut chart = self.build_chart(&plot_area, title, y_max)?;

        for s in series {
            let color = palette_color(s.color_index);
            for segment in s.segments.iter().filter(|segment| segment.len() > 1) {
                chart
                    .draw_series(LineSeries::new(segment.iter().copied(), color.stroke_width(2)))
                    .map_err(draw_error)?;
            }
            chart
                .draw_series(
                    s.segments
                        .iter()
                        .flatten()
                        .map(|&point| Circle::new(point, 3, color.filled())),
                )
                .map_err(draw_error)?;
        }

        if !series.is_empty() {
            self.draw_legend(&legend_area, series)?;
        }
        Ok(())
    }

    fn draw_legend(&self, area: &Area<'_>, series: &[ChartSeries]) -> Result<()> {
        let (width, height) = area.dim_in_pixel();
        let (width, height) = (width as i32, height as i32);
        area.fill(&LEGEND_BACKGROUND).map_err(draw_error)?;
        area.draw(&Rectangle::new(
            [(0, 0), (width - 1, height - 1)],
            LEGEND_EDGE_COLOR.stroke_width(1),
        ))
        .map_err(draw_error)?;

        let rows = series.len().max(1) as i32;
        let row_height = ((height - 2 * LEGEND_PADDING) / rows).clamp(8, 22);
        let font_size = f64::from((row_height - 4).clamp(8, 13));

        for (idx, s) in series.iter().enumerate() {
            let color = palette_color(s.color_index);
            let y = LEGEND_PADDING + idx as i32 * row_height + row_height / 2;
            area.draw(&PathElement::new(
                vec![(LEGEND_PADDING, y), (LEGEND_PADDING + 18, y)],
                color.stroke_width(2),
            ))
            .map_err(draw_error)?;
            area.draw(&Circle::new((LEGEND_PADDING + 9, y), 3, color.filled()))
                .map_err(draw_error)?;

            if self.text {
                let style = (FONT, font_size)
                    .into_font()
                    .color(&TEXT_COLOR)
                    .pos(Pos::new(HPos::Left, VPos::Center));
                area.draw(&Text::new(
                    truncate_label(&s.label, LEGEND_LABEL_CHARS),
                    (LEGEND_PADDING + 26, y),
                    style,
                ))
                .map_err(draw_error)?;
            }
        }
        Ok(())
    }
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut truncated: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let image = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| anyhow!("chart buffer does not match {width}x{height}"))?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .context("failed to encode chart png")?;
    Ok(png.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::enrollment::{EnrollmentRecord, YearlyCounts};

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    fn decoded_size(png: &[u8]) -> (u32, u32) {
        let image = image::load_from_memory(png).expect("output should decode as an image");
        (image.width(), image.height())
    }

    #[test]
    fn placeholder_renders_as_png() {
        let png = ChartRenderer::without_text()
            .render_png(&ChartPlan::Empty)
            .expect("placeholder should render");

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(decoded_size(&png), EMPTY_SIZE);
    }

    #[test]
    fn trends_with_gaps_render_as_png() {
        let mut counts = YearlyCounts::new();
        counts.set(1996, Some(120));
        counts.set(1997, Some(125));
        counts.set(2003, Some(140));
        let records = vec![EnrollmentRecord {
            id: "1".to_string(),
            name: "Hillside Primary".to_string(),
            yearly_counts: counts,
            ..Default::default()
        }];
        let plan = ChartPlan::from_records(&records, 6);

        let png = ChartRenderer::without_text()
            .render_png(&plan)
            .expect("chart should render");

        assert_eq!(decoded_size(&png), TRENDS_SIZE);
    }

    #[test]
    fn trends_without_series_still_render() {
        let plan = ChartPlan::from_records(&[], 6);

        let png = ChartRenderer::without_text()
            .render_png(&plan)
            .expect("empty trends should render");

        assert_eq!(&png[..8], &PNG_SIGNATURE);
    }

    #[test]
    fn long_labels_are_truncated() {
        assert_eq!(truncate_label("Short", 10), "Short");
        assert_eq!(truncate_label("Abcdefghijk", 5), "Abcd…");
    }
}

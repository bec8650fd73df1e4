//! StarChart data table.

use crate::star::{Decoded, StarError, StarResult, StarZone};

/// Highest plausible table version, used to detect inverted byte order.
const MAX_CHART_VERSION: u16 = 0x00FF;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartTitles {
    pub main: String,
    pub sub: String,
    pub x_axis: String,
    pub y_axis: String,
    pub z_axis: String,
}

/// Values of a chart with their titles and labels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemChart {
    pub version: u16,
    pub rows: usize,
    pub columns: usize,
    /// Row-major values
    pub values: Vec<f64>,
    pub data_type: u16,
    pub titles: ChartTitles,
    pub row_labels: Vec<String>,
    pub column_labels: Vec<String>,
    pub row_number_formats: Vec<i32>,
    pub column_number_formats: Vec<i32>,
}

impl MemChart {
    pub fn value(&self, row: usize, column: usize) -> Option<f64> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        self.values.get(row * self.columns + column).copied()
    }

    /// Values of one row.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        let start = row.checked_mul(self.columns)?;
        self.values.get(start..start + self.columns)
    }
}

fn read_text(zone: &mut StarZone, chart: &mut MemChart) -> StarResult<()> {
    chart.data_type = zone.read_u16()?;
    let titles = &mut chart.titles;
    for title in [
        &mut titles.main,
        &mut titles.sub,
        &mut titles.x_axis,
        &mut titles.y_axis,
        &mut titles.z_axis,
    ] {
        *title = zone.read_string()?;
    }
    for _ in 0..chart.rows {
        let label = zone.read_string()?;
        chart.row_labels.push(label);
    }
    for _ in 0..chart.columns {
        let label = zone.read_string()?;
        chart.column_labels.push(label);
    }
    if chart.version >= 2 {
        for _ in 0..chart.rows {
            let format = zone.read_i32()?;
            chart.row_number_formats.push(format);
        }
        for _ in 0..chart.columns {
            let format = zone.read_i32()?;
            chart.column_number_formats.push(format);
        }
    }
    Ok(())
}

fn read_table(zone: &mut StarZone) -> StarResult<MemChart> {
    let version = zone.read_u16()?;
    let columns = usize::from(zone.read_u16()?);
    let rows = usize::from(zone.read_u16()?);
    let offset = zone.position();
    let cells = rows * columns;
    if cells * 8 > zone.remaining() {
        return Err(StarError::Framing {
            offset,
            message: format!(
                "{rows}x{columns} values need {} bytes, {} left",
                cells * 8,
                zone.remaining()
            ),
        });
    }
    let mut chart = MemChart {
        version,
        rows,
        columns,
        values: Vec::with_capacity(cells),
        ..MemChart::default()
    };
    for _ in 0..cells {
        let value = zone.read_f64()?;
        chart.values.push(value);
    }
    if let Err(err) = read_text(zone, &mut chart) {
        zone.note(format!("chart labels: {err}"));
    }
    Ok(chart)
}

/// Decode a chart data table held in a generic record.
///
/// A table whose dimensions do not fit its record is a framing error;
/// missing titles or labels are only noted.
pub fn read_mem_chart(zone: &mut StarZone) -> StarResult<Decoded<MemChart>> {
    let mark = zone.notes().len();
    let version_at = zone.position() + 4;
    zone.probe_inverted_u16(version_at, MAX_CHART_VERSION);
    let chart = zone.with_record(read_table)?;
    Ok(Decoded::new(chart, zone.notes_since(mark)))
}

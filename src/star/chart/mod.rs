//! StarChart decoders: attribute lists and the data table.

mod attributes;
mod mem_chart;

pub use attributes::{
    AttributeType, AttributeValue, ChartAttribute, ChartAttributes, read_chart_attributes,
};
pub use mem_chart::{ChartTitles, MemChart, read_mem_chart};

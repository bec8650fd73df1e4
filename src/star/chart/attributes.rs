//! StarChart attribute lists.

use phf::phf_map;

use crate::star::{Color, Decoded, StarResult, StarZone};

/// Wire type of an attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Bool,
    Integer,
    Double,
    Color,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i32),
    Double(f64),
    Color(Color),
    String(String),
}

/// Known attribute ids.
static CHART_ATTRIBUTES: phf::Map<u16, (&'static str, AttributeType)> = phf_map! {
    1u16 => ("data-description", AttributeType::Integer),
    2u16 => ("show-symbol", AttributeType::Bool),
    3u16 => ("legend-position", AttributeType::Integer),
    4u16 => ("text-degrees", AttributeType::Integer),
    5u16 => ("text-stacked", AttributeType::Bool),
    10u16 => ("y-axis-auto-min", AttributeType::Bool),
    11u16 => ("y-axis-min", AttributeType::Double),
    12u16 => ("y-axis-auto-max", AttributeType::Bool),
    13u16 => ("y-axis-max", AttributeType::Double),
    14u16 => ("y-axis-auto-step", AttributeType::Bool),
    15u16 => ("y-axis-step", AttributeType::Double),
    16u16 => ("y-axis-logarithm", AttributeType::Bool),
    20u16 => ("statistic-average", AttributeType::Bool),
    21u16 => ("statistic-error-kind", AttributeType::Integer),
    22u16 => ("statistic-percent", AttributeType::Double),
    30u16 => ("fill-color", AttributeType::Color),
    31u16 => ("line-color", AttributeType::Color),
    40u16 => ("number-format", AttributeType::Integer),
    41u16 => ("axis-title", AttributeType::String),
    42u16 => ("style-name", AttributeType::String),
};

#[derive(Debug, Clone, PartialEq)]
pub struct ChartAttribute {
    pub which: u16,
    pub version: u16,
    pub name: &'static str,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartAttributes {
    pub items: Vec<ChartAttribute>,
    /// Items with an unknown id
    pub skipped: usize,
}

impl ChartAttributes {
    /// First value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.value)
    }
}

fn read_value(zone: &mut StarZone, kind: AttributeType) -> StarResult<AttributeValue> {
    Ok(match kind {
        AttributeType::Bool => AttributeValue::Bool(zone.read_bool()?),
        AttributeType::Integer => AttributeValue::Integer(zone.read_i32()?),
        AttributeType::Double => AttributeValue::Double(zone.read_f64()?),
        AttributeType::Color => AttributeValue::Color(zone.read_color()?),
        AttributeType::String => AttributeValue::String(zone.read_string()?),
    })
}

fn read_items(zone: &mut StarZone, attributes: &mut ChartAttributes) -> StarResult<()> {
    let count = zone.read_u16()?;
    for _ in 0..count {
        let which = zone.read_u16()?;
        let version = zone.read_u16()?;
        let Some(&(name, kind)) = CHART_ATTRIBUTES.get(&which) else {
            log::debug!("skipping chart attribute {which}");
            zone.with_record(|_| Ok(()))?;
            attributes.skipped += 1;
            continue;
        };
        match zone.with_record(|zone| read_value(zone, kind)) {
            Ok(value) => attributes.items.push(ChartAttribute {
                which,
                version,
                name,
                value,
            }),
            Err(err) => zone.note(format!("chart attribute {name}: {err}")),
        }
    }
    Ok(())
}

/// Decode an attribute list held in a generic record.
///
/// Each item is a `u16` id and version followed by a record with the value,
/// so items with unknown ids are skipped without understanding them.
pub fn read_chart_attributes(zone: &mut StarZone) -> StarResult<Decoded<ChartAttributes>> {
    let mark = zone.notes().len();
    let attributes = zone.with_record(|zone| {
        let mut attributes = ChartAttributes::default();
        if let Err(err) = read_items(zone, &mut attributes) {
            zone.note(format!("chart attribute list: {err}"));
        }
        Ok(attributes)
    })?;
    Ok(Decoded::new(attributes, zone.notes_since(mark)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::star::testing::Builder;

    fn item(which: u16, value: Builder) -> Builder {
        Builder::new().u16(which).u16(0).record(value)
    }

    #[test]
    fn test_known_and_unknown_items() {
        let items = Builder::new()
            .u16(5)
            .raw(&item(2, Builder::new().u8(1)).build())
            .raw(&item(11, Builder::new().f64(-2.5)).build())
            .raw(&item(999, Builder::new().raw(&[1, 2, 3, 4, 5])).build())
            .raw(&item(30, Builder::new().u16(12)).build())
            .raw(&item(41, Builder::new().string("Sales").u32(0)).build());
        let data = Builder::new().record(items).build();
        let mut zone = StarZone::new(data, "attributes");
        let decoded = read_chart_attributes(&mut zone).unwrap();
        assert!(decoded.is_complete());
        let attributes = decoded.value;
        assert_eq!(attributes.items.len(), 4);
        assert_eq!(attributes.skipped, 1);
        assert_eq!(attributes.get("show-symbol"), Some(&AttributeValue::Bool(true)));
        assert_eq!(attributes.get("y-axis-min"), Some(&AttributeValue::Double(-2.5)));
        assert_eq!(
            attributes.get("fill-color"),
            Some(&AttributeValue::Color(Color::new(0xFF, 0, 0)))
        );
        assert_eq!(
            attributes.get("axis-title"),
            Some(&AttributeValue::String("Sales".into()))
        );
        assert!(zone.at_end());
    }

    #[test]
    fn test_short_value_is_noted() {
        let items = Builder::new()
            .u16(2)
            .raw(&item(11, Builder::new().u32(0)).build())
            .raw(&item(4, Builder::new().i32(90)).build());
        let data = Builder::new().record(items).build();
        let mut zone = StarZone::new(data, "attributes");
        let decoded = read_chart_attributes(&mut zone).unwrap();
        assert_eq!(decoded.notes.len(), 1);
        assert_eq!(decoded.value.get("text-degrees"), Some(&AttributeValue::Integer(90)));
    }

    #[test]
    fn test_count_past_record_end() {
        let items = Builder::new().u16(3).raw(&item(2, Builder::new().u8(0)).build());
        let data = Builder::new().record(items).u8(0x55).build();
        let mut zone = StarZone::new(data, "attributes");
        let decoded = read_chart_attributes(&mut zone).unwrap();
        assert_eq!(decoded.value.items.len(), 1);
        assert_eq!(decoded.notes.len(), 1);
        assert_eq!(zone.read_u8().unwrap(), 0x55);
    }
}

//! Drawing objects.

use phf::phf_map;

use crate::star::zone::tag_name;
use crate::star::{StarResult, StarZone};

pub(crate) const OBJECT_MAGIC: &[u8; 4] = b"DrOb";

/// Inventor of the built-in drawing objects.
pub const SDR_INVENTOR: [u8; 4] = *b"SVDr";

/// Kind of a built-in drawing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Group,
    Line,
    Rectangle,
    Circle,
    Sector,
    Arc,
    CircleCut,
    Polygon,
    Polyline,
    PathLine,
    PathFill,
    FreeLine,
    FreeFill,
    SplineLine,
    SplineFill,
    Text,
    TextExtended,
    TitleText,
    OutlineText,
    Graphic,
    Ole,
    Edge,
    Caption,
    PathPolygon,
    PathPolyline,
    Page,
    Measure,
    Frame,
    Uno,
    /// Object of another inventor, body skipped
    Foreign,
    Unknown(u16),
}

static SDR_KINDS: phf::Map<u16, ObjectKind> = phf_map! {
    1u16 => ObjectKind::Group,
    2u16 => ObjectKind::Line,
    3u16 => ObjectKind::Rectangle,
    4u16 => ObjectKind::Circle,
    5u16 => ObjectKind::Sector,
    6u16 => ObjectKind::Arc,
    7u16 => ObjectKind::CircleCut,
    8u16 => ObjectKind::Polygon,
    9u16 => ObjectKind::Polyline,
    10u16 => ObjectKind::PathLine,
    11u16 => ObjectKind::PathFill,
    12u16 => ObjectKind::FreeLine,
    13u16 => ObjectKind::FreeFill,
    14u16 => ObjectKind::SplineLine,
    15u16 => ObjectKind::SplineFill,
    16u16 => ObjectKind::Text,
    17u16 => ObjectKind::TextExtended,
    20u16 => ObjectKind::TitleText,
    21u16 => ObjectKind::OutlineText,
    22u16 => ObjectKind::Graphic,
    23u16 => ObjectKind::Ole,
    24u16 => ObjectKind::Edge,
    25u16 => ObjectKind::Caption,
    26u16 => ObjectKind::PathPolygon,
    27u16 => ObjectKind::PathPolyline,
    28u16 => ObjectKind::Page,
    29u16 => ObjectKind::Measure,
    31u16 => ObjectKind::Frame,
    32u16 => ObjectKind::Uno,
};

impl ObjectKind {
    pub fn from_ids(inventor: [u8; 4], identifier: u16) -> Self {
        if inventor != SDR_INVENTOR {
            return ObjectKind::Foreign;
        }
        SDR_KINDS
            .get(&identifier)
            .copied()
            .unwrap_or(ObjectKind::Unknown(identifier))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i64 {
        i64::from(self.right) - i64::from(self.left)
    }

    pub fn height(&self) -> i64 {
        i64::from(self.bottom) - i64::from(self.top)
    }

    pub(crate) fn read(zone: &mut StarZone) -> StarResult<Self> {
        Ok(Self {
            left: zone.read_i32()?,
            top: zone.read_i32()?,
            right: zone.read_i32()?,
            bottom: zone.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicObject {
    pub inventor: [u8; 4],
    pub identifier: u16,
    pub kind: ObjectKind,
    /// Logic rectangle in model units
    pub bounds: Rect,
    pub layer: u8,
    pub name: String,
    /// Members of a group object
    pub children: Vec<GraphicObject>,
}

impl GraphicObject {
    pub fn is_group(&self) -> bool {
        self.kind == ObjectKind::Group
    }

    /// Number of objects in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(GraphicObject::count).sum::<usize>()
    }
}

/// Read one `DrOb` record.
///
/// The object header (inventor, identifier) is followed by a generic record
/// with the geometry; group objects then hold their members as nested
/// `DrOb` records. A short geometry record is noted and the object kept.
pub(crate) fn read_object(zone: &mut StarZone) -> StarResult<GraphicObject> {
    zone.with_header_record(OBJECT_MAGIC, |zone, version| {
        let bytes = zone.read_bytes(4)?;
        let mut inventor = [0u8; 4];
        inventor.copy_from_slice(&bytes);
        let identifier = zone.read_u16()?;
        let mut object = GraphicObject {
            inventor,
            identifier,
            kind: ObjectKind::from_ids(inventor, identifier),
            bounds: Rect::default(),
            layer: 0,
            name: String::new(),
            children: Vec::new(),
        };

        match object.kind {
            ObjectKind::Foreign => {
                log::debug!(
                    "skipping object {} of inventor {}",
                    identifier,
                    tag_name(&inventor)
                );
                zone.with_record(|_| Ok(()))?;
                return Ok(object);
            },
            ObjectKind::Unknown(id) => zone.note(format!("unknown drawing object kind {id}")),
            _ => {},
        }

        let geometry = zone.with_record(|zone| {
            object.bounds = Rect::read(zone)?;
            object.layer = zone.read_u8()?;
            if version >= 2 {
                object.name = zone.read_string()?;
            }
            Ok(())
        });
        if let Err(err) = geometry {
            zone.note(format!("drawing object {identifier}: {err}"));
        }

        if object.is_group() {
            read_objects(zone, &mut object.children);
        }
        Ok(object)
    })
}

/// Read consecutive `DrOb` records until another tag follows.
///
/// A failing object is noted; reading goes on with the next sibling unless
/// the broken record could not even be opened.
pub(crate) fn read_objects(zone: &mut StarZone, objects: &mut Vec<GraphicObject>) {
    while zone.peek_tag() == Some(*OBJECT_MAGIC) {
        let start = zone.position();
        match read_object(zone) {
            Ok(object) => objects.push(object),
            Err(err) => {
                zone.note(format!("drawing object: {err}"));
                if zone.position() == start {
                    break;
                }
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::star::testing::Builder;

    /// `DrOb` record of a built-in object.
    pub(crate) fn object(identifier: u16, layer: u8, name: &str, children: Builder) -> Builder {
        let body = Builder::new()
            .i32(0)
            .i32(10)
            .i32(100)
            .i32(60)
            .u8(layer)
            .string(name);
        Builder::new().header(
            b"DrOb",
            2,
            Builder::new()
                .raw(&SDR_INVENTOR)
                .u16(identifier)
                .record(body)
                .raw(&children.build()),
        )
    }

    #[test]
    fn test_kind_lookup() {
        assert_eq!(ObjectKind::from_ids(SDR_INVENTOR, 3), ObjectKind::Rectangle);
        assert_eq!(ObjectKind::from_ids(SDR_INVENTOR, 18), ObjectKind::Unknown(18));
        assert_eq!(ObjectKind::from_ids(*b"FM01", 3), ObjectKind::Foreign);
    }

    #[test]
    fn test_plain_object() {
        let mut zone = StarZone::new(object(3, 2, "box", Builder::new()).build(), "object");
        let object = read_object(&mut zone).unwrap();
        assert_eq!(object.kind, ObjectKind::Rectangle);
        assert_eq!(object.bounds.width(), 100);
        assert_eq!(object.bounds.height(), 50);
        assert_eq!((object.layer, object.name.as_str()), (2, "box"));
        assert!(zone.at_end());
    }

    #[test]
    fn test_group_recurses() {
        let members = Builder::new()
            .raw(&object(2, 0, "a", Builder::new()).build())
            .raw(&object(1, 0, "inner", object(4, 0, "b", Builder::new())).build());
        let data = object(1, 0, "outer", members).build();
        let mut zone = StarZone::new(data, "group");
        let group = read_object(&mut zone).unwrap();
        assert_eq!(group.children.len(), 2);
        assert_eq!(group.children[1].children[0].kind, ObjectKind::Circle);
        assert_eq!(group.count(), 4);
        assert!(zone.notes().is_empty());
    }

    #[test]
    fn test_foreign_object_is_skipped() {
        let data = Builder::new()
            .header(
                b"DrOb",
                2,
                Builder::new()
                    .raw(b"FM01")
                    .u16(7)
                    .record(Builder::new().raw(&[0xAA; 9])),
            )
            .u16(0xCAFE)
            .build();
        let mut zone = StarZone::new(data, "foreign");
        let object = read_object(&mut zone).unwrap();
        assert_eq!(object.kind, ObjectKind::Foreign);
        assert_eq!(zone.read_u16().unwrap(), 0xCAFE);
    }

    #[test]
    fn test_short_geometry_keeps_object() {
        let broken = Builder::new().header(
            b"DrOb",
            2,
            Builder::new().raw(&SDR_INVENTOR).u16(3).record(Builder::new().i32(1)),
        );
        let data = broken.raw(&object(2, 1, "line", Builder::new()).build()).build();
        let mut zone = StarZone::new(data, "objects");
        let mut objects = Vec::new();
        read_objects(&mut zone, &mut objects);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].inventor, SDR_INVENTOR);
        assert_eq!(objects[0].identifier, 3);
        assert_eq!(objects[0].kind, ObjectKind::Rectangle);
        assert_eq!(objects[0].bounds, Rect::default());
        assert_eq!(objects[1].name, "line");
        assert_eq!(zone.notes().len(), 1);
        assert!(zone.at_end());
    }

    #[test]
    fn test_short_group_geometry_still_reads_members() {
        let data = Builder::new()
            .header(
                b"DrOb",
                2,
                Builder::new()
                    .raw(&SDR_INVENTOR)
                    .u16(1)
                    .record(Builder::new().i32(0).i32(0).i32(5).i32(5))
                    .raw(&object(4, 0, "dot", Builder::new()).build()),
            )
            .build();
        let mut zone = StarZone::new(data, "group");
        let group = read_object(&mut zone).unwrap();
        assert!(group.is_group());
        assert_eq!(group.bounds.width(), 5);
        assert_eq!(group.children.len(), 1);
        assert_eq!(zone.notes().len(), 1);
    }
}

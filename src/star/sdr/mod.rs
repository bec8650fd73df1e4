//! Drawing model (`DrMd`) decoder.
//!
//! The model is a header record holding, in order: optional info and
//! statistics records, a version-gated list of fixed fields, and a sequence
//! of tagged child records (layers, layer sets, pages, master-page
//! descriptors and loose objects) dispatched by their 4-byte tag.
//!
//! Only a missing or mislabelled `DrMd` record is an error. Everything
//! inside it is decoded on a best-effort basis; problems are reported as
//! notes next to the partially filled [`SdrModel`].

mod layer;
mod object;
mod page;

use bitflags::bitflags;
use phf::phf_map;

use super::zone::tag_name;
use super::{Decoded, StarResult, StarZone};

pub use layer::{Layer, LayerBits, LayerSet};
pub use object::{GraphicObject, ObjectKind, Rect, SDR_INVENTOR};
pub use page::{Borders, MasterPageDescriptor, Page, Size};

const MODEL_MAGIC: &[u8; 4] = b"DrMd";
const INFO_MAGIC: &[u8; 4] = b"DrMI";
const STATS_MAGIC: &[u8; 4] = b"DrMS";

/// Highest plausible model version, used to detect inverted byte order.
const MAX_MODEL_VERSION: u16 = 0x00FF;

bitflags! {
    /// Model flag word (version 9 and later).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ModelFlags: u32 {
        const READ_ONLY = 0x0001;
        /// OLE objects carry a preview image
        const SAVE_OLE_PREVIEW = 0x0002;
        const PASTE_RESIZE = 0x0004;
        const SWAP_GRAPHICS = 0x0008;
        /// Model belongs to a presentation document
        const PRESENTATION = 0x0010;
        const AUTO_CONTROL_FOCUS = 0x0020;
    }
}

/// Scale factor of a measurement unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: i32,
    pub denominator: i32,
}

impl Default for Fraction {
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 1,
        }
    }
}

impl Fraction {
    pub fn to_f64(self) -> Option<f64> {
        (self.denominator != 0).then(|| f64::from(self.numerator) / f64::from(self.denominator))
    }

    fn read(zone: &mut StarZone) -> StarResult<Self> {
        Ok(Self {
            numerator: zone.read_i32()?,
            denominator: zone.read_i32()?,
        })
    }
}

/// Date and time as stored by StarView: `YYYYMMDD` and `HHMMSScc`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub date: u32,
    pub time: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelInfo {
    pub created: Timestamp,
    pub last_written: Timestamp,
    pub last_printed: Timestamp,
    /// Text encoding ids the model was created and last written with
    pub creation_char_set: u16,
    pub last_write_char_set: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub pages: u32,
    pub master_pages: u32,
    pub objects: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SdrModel {
    pub version: u16,
    pub info: Option<ModelInfo>,
    pub stats: Option<ModelStats>,
    /// Map unit id of model coordinates
    pub object_unit: i16,
    pub object_scale: Fraction,
    pub ui_unit: i16,
    pub ui_scale: Fraction,
    pub tab_width: i32,
    pub flags: ModelFlags,
    pub starting_page: u16,
    pub layers: Vec<Layer>,
    pub layer_sets: Vec<LayerSet>,
    pub pages: Vec<Page>,
    pub master_pages: Vec<Page>,
    /// Objects stored outside any page
    pub objects: Vec<GraphicObject>,
    /// Unknown `Dr??` records that were skipped
    pub skipped_zones: usize,
}

impl SdrModel {
    fn new(version: u16) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Total number of objects on all pages, master pages included.
    pub fn object_count(&self) -> usize {
        self.pages
            .iter()
            .chain(&self.master_pages)
            .flat_map(|page| &page.objects)
            .chain(&self.objects)
            .map(GraphicObject::count)
            .sum()
    }
}

type ModelReader = fn(&mut StarZone, &mut SdrModel) -> StarResult<()>;

fn add_layer(zone: &mut StarZone, model: &mut SdrModel) -> StarResult<()> {
    model.layers.push(layer::read_layer(zone)?);
    Ok(())
}

fn add_layer_set(zone: &mut StarZone, model: &mut SdrModel) -> StarResult<()> {
    model.layer_sets.push(layer::read_layer_set(zone)?);
    Ok(())
}

fn add_page(zone: &mut StarZone, model: &mut SdrModel) -> StarResult<()> {
    let page = page::read_page(zone)?;
    if page.is_master {
        model.master_pages.push(page);
    } else {
        model.pages.push(page);
    }
    Ok(())
}

/// A descriptor outside a page belongs to the page read last.
fn add_master_page_descriptor(zone: &mut StarZone, model: &mut SdrModel) -> StarResult<()> {
    let descriptor = page::read_master_page_descriptor(zone)?;
    match model.pages.last_mut() {
        Some(page) => page.master_pages.push(descriptor),
        None => zone.note("master page descriptor without a page"),
    }
    Ok(())
}

fn add_objects(zone: &mut StarZone, model: &mut SdrModel) -> StarResult<()> {
    object::read_objects(zone, &mut model.objects);
    Ok(())
}

static MODEL_READERS: phf::Map<&'static [u8], ModelReader> = phf_map! {
    b"DrLy" => add_layer,
    b"DrLS" => add_layer_set,
    b"DrPg" => add_page,
    b"DrMP" => add_master_page_descriptor,
    b"DrOb" => add_objects,
};

/// Skip a header record of the drawing layer nobody here understands.
///
/// Returns false, consuming nothing, when `tag` is not a `Dr??` tag or the
/// record cannot be opened.
pub(crate) fn skip_zone(zone: &mut StarZone, tag: &[u8; 4]) -> bool {
    if !tag.starts_with(b"Dr") {
        return false;
    }
    match zone.with_header_record(tag, |_, version| Ok(version)) {
        Ok(version) => {
            zone.note(format!("skipped {} record, version {version}", tag_name(tag)));
            true
        },
        Err(err) => {
            zone.note(format!("unreadable {} record: {err}", tag_name(tag)));
            false
        },
    }
}

fn read_info(zone: &mut StarZone) -> StarResult<ModelInfo> {
    let stamp = |zone: &mut StarZone| -> StarResult<Timestamp> {
        Ok(Timestamp {
            date: zone.read_u32()?,
            time: zone.read_u32()?,
        })
    };
    zone.with_header_record(INFO_MAGIC, |zone, _| {
        Ok(ModelInfo {
            created: stamp(zone)?,
            last_written: stamp(zone)?,
            last_printed: stamp(zone)?,
            creation_char_set: zone.read_u16()?,
            last_write_char_set: zone.read_u16()?,
        })
    })
}

fn read_stats(zone: &mut StarZone) -> StarResult<ModelStats> {
    zone.with_header_record(STATS_MAGIC, |zone, _| {
        Ok(ModelStats {
            pages: zone.read_u32()?,
            master_pages: zone.read_u32()?,
            objects: zone.read_u32()?,
        })
    })
}

fn read_fixed_fields(zone: &mut StarZone, model: &mut SdrModel) -> StarResult<()> {
    let version = model.version;
    model.object_unit = zone.read_i16()?;
    model.object_scale = Fraction::read(zone)?;
    if version >= 1 {
        model.ui_unit = zone.read_i16()?;
        model.ui_scale = Fraction::read(zone)?;
    }
    if version >= 5 {
        model.tab_width = zone.read_i32()?;
    }
    if version >= 9 {
        let bits = zone.read_u32()?;
        model.flags = ModelFlags::from_bits_truncate(bits);
        if bits & !ModelFlags::all().bits() != 0 {
            log::debug!("unknown model flags {bits:#x}");
        }
    }
    if version >= 12 {
        model.starting_page = zone.read_u16()?;
    }
    Ok(())
}

fn read_body(zone: &mut StarZone, model: &mut SdrModel) {
    if model.version >= 11 {
        if zone.peek_tag() == Some(*INFO_MAGIC) {
            match read_info(zone) {
                Ok(info) => model.info = Some(info),
                Err(err) => zone.note(format!("model info: {err}")),
            }
        }
        if zone.peek_tag() == Some(*STATS_MAGIC) {
            match read_stats(zone) {
                Ok(stats) => model.stats = Some(stats),
                Err(err) => zone.note(format!("model statistics: {err}")),
            }
        }
    }
    if model.version >= 17 {
        if let Err(err) = zone.with_version_compat_record(|_, _| Ok(())) {
            zone.note(format!("format compatibility record: {err}"));
        }
    }
    if let Err(err) = read_fixed_fields(zone, model) {
        // the child records cannot be located once the fixed fields are short
        zone.note(format!("model fields: {err}"));
        return;
    }

    while let Some(tag) = zone.peek_tag() {
        let start = zone.position();
        if let Some(reader) = MODEL_READERS.get(&tag[..]) {
            if let Err(err) = reader(zone, model) {
                zone.note(format!("{} record: {err}", tag_name(&tag)));
            }
        } else if skip_zone(zone, &tag) {
            model.skipped_zones += 1;
        } else {
            break;
        }
        if zone.position() == start {
            break;
        }
    }
}

/// Decode a drawing model starting at the current position.
///
/// The byte order is detected from the model version. Fails only when no
/// `DrMd` record can be opened there.
pub fn read_model(zone: &mut StarZone) -> StarResult<Decoded<SdrModel>> {
    let mark = zone.notes().len();
    let version_at = zone.position() + 4;
    zone.probe_inverted_u16(version_at, MAX_MODEL_VERSION);
    let model = zone.with_header_record(MODEL_MAGIC, |zone, version| {
        let mut model = SdrModel::new(version);
        read_body(zone, &mut model);
        Ok(model)
    })?;
    log::debug!(
        "{}: drawing model v{} with {} pages, {} master pages, {} objects",
        zone.name(),
        model.version,
        model.pages.len(),
        model.master_pages.len(),
        model.object_count()
    );
    Ok(Decoded::new(model, zone.notes_since(mark)))
}

#[cfg(test)]
mod tests {
    use super::page::tests::page_fields;
    use super::*;
    use crate::star::StarError;
    use crate::star::sdr::object::tests::object;
    use crate::star::testing::Builder;

    fn fixed_fields(version: u16) -> Builder {
        let mut fields = Builder::new().i16(1).i32(1).i32(100);
        if version >= 1 {
            fields = fields.i16(9).i32(1).i32(1);
        }
        if version >= 5 {
            fields = fields.i32(1250);
        }
        if version >= 9 {
            fields = fields.u32(0x0011);
        }
        if version >= 12 {
            fields = fields.u16(1);
        }
        fields
    }

    fn full_model() -> Vec<u8> {
        let info = Builder::new()
            .u32(20240101)
            .u32(12000000)
            .u32(20240202)
            .u32(0)
            .u32(0)
            .u32(0)
            .u16(1)
            .u16(76);
        let body = Builder::new()
            .header(b"DrMI", 0, info)
            .header(b"DrMS", 0, Builder::new().u32(1).u32(1).u32(2))
            .compat(1, Builder::new().u16(0))
            .raw(&fixed_fields(17).build())
            .header(b"DrLy", 1, Builder::new().u8(0).string("layout").u16(1))
            .header(b"DrLS", 0, Builder::new().raw(&[0xFF; 32]).raw(&[0; 32]).string("all"))
            .header(
                b"DrPg",
                0,
                page_fields(true, 0).raw(&object(3, 0, "logo", Builder::new()).build()),
            )
            .header(
                b"DrPg",
                0,
                page_fields(false, 1).raw(&object(16, 0, "title", Builder::new()).build()),
            )
            .header(b"DrMP", 0, Builder::new().u16(0).raw(&[1; 32]))
            .header(b"DrZz", 3, Builder::new().u32(0))
            .raw(b"SVDr");
        Builder::new().header(b"DrMd", 17, body).build()
    }

    #[test]
    fn test_full_model() {
        let mut zone = StarZone::new(full_model(), "model");
        let decoded = read_model(&mut zone).unwrap();
        let model = &decoded.value;
        assert_eq!(model.version, 17);
        assert_eq!(model.info.map(|info| info.created.date), Some(20240101));
        assert_eq!(model.stats.map(|stats| stats.objects), Some(2));
        assert_eq!(model.object_scale.to_f64(), Some(0.01));
        assert_eq!(model.tab_width, 1250);
        assert_eq!(model.flags, ModelFlags::READ_ONLY | ModelFlags::PRESENTATION);
        assert_eq!(model.starting_page, 1);
        assert_eq!(model.layers[0].name, "layout");
        assert_eq!(model.layer_sets[0].members.iter().count(), 256);
        assert_eq!(model.master_pages.len(), 1);
        assert_eq!(model.pages.len(), 1);
        assert_eq!(model.pages[0].master_pages.len(), 1);
        assert_eq!(model.object_count(), 2);
        assert_eq!(model.skipped_zones, 1);
        // only the skipped zone is worth a note
        assert_eq!(decoded.notes.len(), 1);
        assert!(zone.at_end());
    }

    #[test]
    fn test_old_version_has_fewer_fields() {
        let body = fixed_fields(0).header(b"DrLy", 0, Builder::new().u8(1).string("x"));
        let data = Builder::new().header(b"DrMd", 0, body).build();
        let mut zone = StarZone::new(data, "old");
        let decoded = read_model(&mut zone).unwrap();
        assert!(decoded.is_complete());
        assert_eq!(decoded.value.layers.len(), 1);
        assert_eq!(decoded.value.ui_scale, Fraction::default());
    }

    #[test]
    fn test_inverted_model() {
        // big-endian header and fields
        let mut data = b"DrMd".to_vec();
        data.extend_from_slice(&1u16.to_be_bytes());
        data.extend_from_slice(&30u32.to_be_bytes());
        for unit in [2i16, 7] {
            data.extend_from_slice(&unit.to_be_bytes());
            data.extend_from_slice(&1i32.to_be_bytes());
            data.extend_from_slice(&1000i32.to_be_bytes());
        }
        let mut zone = StarZone::new(data, "inverted");
        let decoded = read_model(&mut zone).unwrap();
        assert!(zone.is_inverted());
        assert_eq!(decoded.value.object_unit, 2);
        assert_eq!(decoded.value.object_scale.denominator, 1000);
        assert_eq!(decoded.value.ui_unit, 7);
        assert!(decoded.is_complete());
    }

    #[test]
    fn test_missing_model_is_hard_error() {
        let data = Builder::new().header(b"DrPg", 0, Builder::new()).build();
        let mut zone = StarZone::new(data, "not a model");
        assert!(matches!(read_model(&mut zone), Err(StarError::BadMagic { .. })));
        assert_eq!(zone.position(), 0);
    }

    #[test]
    fn test_truncated_fields_are_soft() {
        let data = Builder::new().header(b"DrMd", 5, Builder::new().i16(1)).build();
        let mut zone = StarZone::new(data, "short");
        let decoded = read_model(&mut zone).unwrap();
        assert_eq!(decoded.value.object_unit, 1);
        assert_eq!(decoded.notes.len(), 1);
        assert!(zone.at_end());
    }

    #[test]
    fn test_broken_child_keeps_later_records() {
        let body = fixed_fields(0)
            .header(b"DrLy", 0, Builder::new().u8(1))
            .header(b"DrLy", 0, Builder::new().u8(2).string("ok"));
        let data = Builder::new().header(b"DrMd", 0, body).build();
        let mut zone = StarZone::new(data, "broken");
        let decoded = read_model(&mut zone).unwrap();
        assert_eq!(decoded.value.layers.len(), 1);
        assert_eq!(decoded.value.layers[0].id, 2);
        assert_eq!(decoded.notes.len(), 1);
    }
}

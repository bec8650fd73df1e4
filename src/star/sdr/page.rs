//! Pages and master-page descriptors.

use super::layer::LayerBits;
use super::object::{GraphicObject, OBJECT_MAGIC, read_objects};
use super::skip_zone;
use crate::star::{Color, StarResult, StarZone};

pub(crate) const PAGE_MAGIC: &[u8; 4] = b"DrPg";
pub(crate) const MASTER_PAGE_MAGIC: &[u8; 4] = b"DrMP";
const BACKGROUND_MAGIC: &[u8; 4] = b"DrBg";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Page margins in model units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Borders {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Reference from a page to the master page it is drawn over.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterPageDescriptor {
    pub page_number: u16,
    /// Layers of the master page shown on the referring page
    pub visible_layers: LayerBits,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub size: Size,
    pub borders: Borders,
    pub is_master: bool,
    pub number: u16,
    pub master_pages: Vec<MasterPageDescriptor>,
    pub objects: Vec<GraphicObject>,
    pub background: Option<Color>,
}

pub(crate) fn read_master_page_descriptor(zone: &mut StarZone) -> StarResult<MasterPageDescriptor> {
    zone.with_header_record(MASTER_PAGE_MAGIC, |zone, _| {
        let page_number = zone.read_u16()?;
        let visible_layers = LayerBits::read(zone)?;
        Ok(MasterPageDescriptor {
            page_number,
            visible_layers,
        })
    })
}

fn read_background(zone: &mut StarZone) -> StarResult<Color> {
    zone.with_header_record(BACKGROUND_MAGIC, |zone, _| zone.read_color())
}

fn read_page_fields(zone: &mut StarZone, page: &mut Page) -> StarResult<()> {
    page.is_master = zone.read_bool()?;
    page.size.width = zone.read_i32()?;
    page.size.height = zone.read_i32()?;
    let borders = &mut page.borders;
    for border in [
        &mut borders.left,
        &mut borders.top,
        &mut borders.right,
        &mut borders.bottom,
    ] {
        *border = zone.read_i32()?;
    }
    page.number = zone.read_u16()?;
    Ok(())
}

/// Read one `DrPg` record. Short fixed fields leave the rest of the page
/// at its defaults.
pub(crate) fn read_page(zone: &mut StarZone) -> StarResult<Page> {
    zone.with_header_record(PAGE_MAGIC, |zone, _| {
        let mut page = Page::default();
        if let Err(err) = read_page_fields(zone, &mut page) {
            zone.note(format!("page fields: {err}"));
            return Ok(page);
        }

        while let Some(tag) = zone.peek_tag() {
            let start = zone.position();
            let result = match &tag {
                MASTER_PAGE_MAGIC => read_master_page_descriptor(zone)
                    .map(|descriptor| page.master_pages.push(descriptor)),
                OBJECT_MAGIC => {
                    read_objects(zone, &mut page.objects);
                    Ok(())
                },
                BACKGROUND_MAGIC => read_background(zone).map(|color| page.background = Some(color)),
                _ if skip_zone(zone, &tag) => Ok(()),
                _ => break,
            };
            if let Err(err) = result {
                zone.note(format!("page {}: {err}", page.number));
            }
            if zone.position() == start {
                break;
            }
        }
        Ok(page)
    })
}

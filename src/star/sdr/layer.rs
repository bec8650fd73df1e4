//! Layers and layer sets of the drawing model.

use crate::star::{StarResult, StarZone};

pub(crate) const LAYER_MAGIC: &[u8; 4] = b"DrLy";
pub(crate) const LAYER_SET_MAGIC: &[u8; 4] = b"DrLS";

/// Set of layer ids, stored as a 256-bit mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerBits([u8; 32]);

impl Default for LayerBits {
    fn default() -> Self {
        Self([0; 32])
    }
}

impl LayerBits {
    pub fn contains(&self, id: u8) -> bool {
        self.0[usize::from(id / 8)] & (1 << (id % 8)) != 0
    }

    pub fn insert(&mut self, id: u8) {
        self.0[usize::from(id / 8)] |= 1 << (id % 8);
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    /// Layer ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&id| self.contains(id))
    }

    pub(crate) fn read(zone: &mut StarZone) -> StarResult<Self> {
        let bytes = zone.read_bytes(32)?;
        let mut bits = [0u8; 32];
        bits.copy_from_slice(&bytes);
        Ok(Self(bits))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    pub id: u8,
    pub name: String,
    /// Layer created by the application rather than the user
    pub standard: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerSet {
    pub name: String,
    pub members: LayerBits,
    pub excluded: LayerBits,
}

pub(crate) fn read_layer(zone: &mut StarZone) -> StarResult<Layer> {
    zone.with_header_record(LAYER_MAGIC, |zone, version| {
        let id = zone.read_u8()?;
        let name = zone.read_string()?;
        let standard = if version >= 1 {
            zone.read_u16()? != 0
        } else {
            false
        };
        Ok(Layer { id, name, standard })
    })
}

pub(crate) fn read_layer_set(zone: &mut StarZone) -> StarResult<LayerSet> {
    zone.with_header_record(LAYER_SET_MAGIC, |zone, _| {
        let members = LayerBits::read(zone)?;
        let excluded = LayerBits::read(zone)?;
        let name = zone.read_string()?;
        Ok(LayerSet {
            name,
            members,
            excluded,
        })
    })
}

//! Frame diff encoder: turns the tag stream of a timeline into PAM frame
//! records (removes, adds, moves, label, stop and commands per frame).

use crate::actions::{ActionTable, MAIN_TIMELINE};
use crate::document::{Matrix, PlaceObject, Tag};
use crate::error::{PamError, Result};
use crate::fills::verify_supported;
use crate::symbols::SymbolIndex;
use crate::transform::{affine_terms, encode_rotation, is_rotation};
use crate::writer::{PamWriter, u16_field};
use bitflags::bitflags;
use std::collections::HashMap;
use tracing::{debug, warn};

bitflags! {
    /// Sections present in a frame record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FrameFlags: u8 {
        const REMOVES = 1;
        const ADDS = 2;
        const MOVES = 4;
        const FRAME_NAME = 8;
        const STOP = 16;
        const COMMANDS = 32;
    }
}

bitflags! {
    /// High bits of the packed word that starts every move record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MoveFlags: u16 {
        const LONG_COORDS = 0x0800;
        const MATRIX = 0x1000;
        const COLOR = 0x2000;
        const ROTATE = 0x4000;
    }
}

/// Object indices at or above this are written as a separate i32 in removes and adds.
pub const OBJECT_INDEX_ESCAPE: u32 = 2047;
/// Same threshold for the 10-bit index field of move records.
pub const MOVE_INDEX_ESCAPE: u32 = 0x3FF;
/// Bit 15 of an add record: the character is a sprite, not an image.
pub const ADD_SPRITE_BIT: u16 = 0x8000;

/// Which timeline is being encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    Main,
    Sprite(u16),
}

/// Live display list of a timeline between frames.
#[derive(Debug, Default)]
struct FrameState {
    depth_index: HashMap<u16, u32>,
    depth_matrix: HashMap<u16, Matrix>,
}

/// Encodes sprite definitions and the main timeline, numbering sprites in
/// the order they are written so later timelines can reference them.
pub struct TimelineEncoder<'a> {
    symbols: &'a SymbolIndex<'a>,
    shape_images: &'a HashMap<u16, usize>,
    actions: Option<&'a ActionTable>,
    sprite_indices: HashMap<u16, usize>,
    next_sprite_index: usize,
}

impl<'a> TimelineEncoder<'a> {
    pub fn new(
        symbols: &'a SymbolIndex<'a>,
        shape_images: &'a HashMap<u16, usize>,
        actions: Option<&'a ActionTable>,
    ) -> Self {
        Self {
            symbols,
            shape_images,
            actions,
            sprite_indices: HashMap::new(),
            next_sprite_index: 0,
        }
    }

    /// Sprite definition index assigned to an already encoded sprite.
    pub fn sprite_index(&self, sprite_id: u16) -> Option<usize> {
        self.sprite_indices.get(&sprite_id).copied()
    }

    pub fn sprites_encoded(&self) -> usize {
        self.next_sprite_index
    }

    /// Write one sprite header and its frame records. Returns the sprite
    /// definition index assigned to it.
    pub fn encode(
        &mut self,
        w: &mut PamWriter,
        timeline: Timeline,
        frame_rate: f32,
        tags: &[Tag],
    ) -> Result<usize> {
        verify_supported(tags)?;

        let symbols = self.symbols;
        let name = match timeline {
            Timeline::Main => "",
            Timeline::Sprite(id) => symbols.name(id).ok_or_else(|| {
                PamError::FormatRestriction(format!(
                    "sprite {id} has no linkage name; every sprite must be named"
                ))
            })?,
        };
        let action_name = match timeline {
            Timeline::Main => MAIN_TIMELINE,
            Timeline::Sprite(_) => name,
        };

        let frame_count = tags.iter().filter(|t| t.is_show_frame()).count();
        w.write_string(name)?;
        w.write_string("")?;
        w.write_i32(frame_rate.round_ties_even() as i32 * 65536)?;
        w.write_u16(u16_field(frame_count, "frame count")?)?;
        // work area: start, duration
        w.write_u16(0)?;
        w.write_u16(u16_field(frame_count.saturating_sub(1), "frame count")?)?;

        let ranks = placement_ranks(tags);
        let mut state = FrameState::default();
        let mut current_label = String::new();
        let mut frame_index: u32 = 0;
        let mut start = 0;

        for (pos, tag) in tags.iter().enumerate() {
            if !tag.is_show_frame() {
                continue;
            }
            let frame = Frame {
                tags: &tags[start..pos],
                base: start,
                index: frame_index,
            };
            self.encode_frame(w, &frame, &ranks, &mut state, &mut current_label, timeline, action_name)?;
            start = pos + 1;
            frame_index += 1;
        }

        let index = self.next_sprite_index;
        if let Timeline::Sprite(id) = timeline {
            self.sprite_indices.insert(id, index);
        }
        self.next_sprite_index += 1;
        debug!(?timeline, name, frames = frame_count, index, "encoded timeline");
        Ok(index)
    }

    #[allow(clippy::too_many_arguments)]
    fn encode_frame(
        &self,
        w: &mut PamWriter,
        frame: &Frame<'_>,
        ranks: &HashMap<usize, u32>,
        state: &mut FrameState,
        current_label: &mut String,
        timeline: Timeline,
        action_name: &str,
    ) -> Result<()> {
        let flags_pos = w.position();
        w.write_u8(0)?;
        let mut flags = FrameFlags::empty();

        // removes: explicit removals, then replacements of a live depth
        let removes: Vec<u16> = frame
            .tags
            .iter()
            .filter_map(|t| match t {
                Tag::RemoveObject(r) => Some(r.depth),
                _ => None,
            })
            .collect();
        let mut replaces: Vec<u16> = Vec::new();
        for (_, p) in frame.places() {
            if p.has_character()
                && state.depth_index.contains_key(&p.depth)
                && !removes.contains(&p.depth)
                && !replaces.contains(&p.depth)
            {
                replaces.push(p.depth);
            }
        }

        if !removes.is_empty() || !replaces.is_empty() {
            flags |= FrameFlags::REMOVES;
            w.write_escaped_count(removes.len() + replaces.len())?;
            for &depth in &removes {
                let index = state.depth_index.remove(&depth).ok_or_else(|| {
                    PamError::InvalidData(format!(
                        "frame {} removes depth {depth}, which is empty",
                        frame.index
                    ))
                })?;
                state.depth_matrix.remove(&depth);
                write_object_index(w, index)?;
            }
            for &depth in &replaces {
                if let Some(index) = state.depth_index.remove(&depth) {
                    write_object_index(w, index)?;
                }
            }
        }

        let adds: Vec<(usize, &PlaceObject)> =
            frame.places().filter(|(_, p)| p.has_character()).collect();
        if !adds.is_empty() {
            flags |= FrameFlags::ADDS;
            w.write_escaped_count(adds.len())?;
            for (pos, add) in adds {
                let index = ranks.get(&pos).copied().ok_or_else(|| {
                    PamError::InvalidData(format!("placement at depth {} has no object index", add.depth))
                })?;
                state.depth_index.insert(add.depth, index);
                match add.matrix {
                    Some(m) => {
                        state.depth_matrix.insert(add.depth, m);
                    }
                    None => {
                        state.depth_matrix.entry(add.depth).or_insert(Matrix::IDENTITY);
                    }
                }
                self.write_add(w, add, index)?;
            }
        }

        let moves: Vec<&PlaceObject> = frame
            .places()
            .map(|(_, p)| p)
            .filter(|p| p.is_move || p.color_transform.is_some() || p.matrix.is_some())
            .collect();
        if !moves.is_empty() {
            flags |= FrameFlags::MOVES;
            w.write_escaped_count(moves.len())?;
            for mv in moves {
                write_move(w, mv, state, frame.index)?;
            }
        }

        let mut labels = frame.tags.iter().filter_map(|t| match t {
            Tag::FrameLabel(l) => Some(l.name.as_str()),
            _ => None,
        });
        if let Some(label) = labels.next() {
            let extra = labels.count();
            if extra > 0 {
                warn!(frame = frame.index, label, extra, "frame has more than one label; keeping the first");
            }
            flags |= FrameFlags::FRAME_NAME;
            w.write_string(label)?;
            *current_label = label.to_string();
        }

        match self.actions {
            Some(actions) => {
                if actions.is_stop(action_name, frame.index) {
                    flags |= FrameFlags::STOP;
                }
                let commands = actions.commands(action_name, frame.index);
                if !commands.is_empty() {
                    let count = u8::try_from(commands.len()).map_err(|_| {
                        PamError::InvalidData(format!(
                            "frame {} of `{action_name}` has {} commands; at most 255 fit",
                            frame.index,
                            commands.len()
                        ))
                    })?;
                    flags |= FrameFlags::COMMANDS;
                    w.write_u8(count)?;
                    for cmd in commands {
                        w.write_string(&cmd.command)?;
                        w.write_string(&cmd.param)?;
                    }
                }
            }
            None => {
                if timeline == Timeline::Main
                    && self.symbols.label_end_frame(current_label) == Some(frame.index)
                {
                    flags |= FrameFlags::STOP;
                }
            }
        }

        w.patch_u8(flags_pos, flags.bits())
    }

    fn write_add(&self, w: &mut PamWriter, add: &PlaceObject, index: u32) -> Result<()> {
        let character = add.character_id.unwrap_or_default();
        let packed_pos = w.position();
        w.write_u16(0)?;

        let mut packed = index.min(OBJECT_INDEX_ESCAPE) as u16;
        if index >= OBJECT_INDEX_ESCAPE {
            w.write_i32(index as i32)?;
        }

        let resource = if self.symbols.is_sprite(character) {
            packed |= ADD_SPRITE_BIT;
            self.sprite_indices.get(&character).copied().ok_or_else(|| {
                PamError::InvalidData(format!(
                    "sprite {character} is placed before its definition was written"
                ))
            })?
        } else {
            self.shape_images.get(&character).copied().ok_or_else(|| {
                PamError::InvalidData(format!(
                    "character {character} at depth {} is neither a sprite nor a bitmap shape",
                    add.depth
                ))
            })?
        };
        w.write_escaped_count(resource)?;
        w.patch_u16(packed_pos, packed)
    }
}

/// Tags between two frame boundaries; `base` is the position of the first
/// one in the timeline's tag list.
struct Frame<'t> {
    tags: &'t [Tag],
    base: usize,
    index: u32,
}

impl<'t> Frame<'t> {
    fn places(&self) -> impl Iterator<Item = (usize, &'t PlaceObject)> + '_ {
        let base = self.base;
        self.tags.iter().enumerate().filter_map(move |(i, t)| match t {
            Tag::PlaceObject(p) => Some((base + i, p)),
            _ => None,
        })
    }
}

/// Object index of every character placement: its rank among all character
/// placements of the timeline, stable-sorted by depth. Keyed by tag position.
fn placement_ranks(tags: &[Tag]) -> HashMap<usize, u32> {
    let mut places: Vec<(usize, u16)> = tags
        .iter()
        .enumerate()
        .filter_map(|(i, t)| match t {
            Tag::PlaceObject(p) if p.has_character() => Some((i, p.depth)),
            _ => None,
        })
        .collect();
    places.sort_by_key(|&(_, depth)| depth);
    places
        .into_iter()
        .enumerate()
        .map(|(rank, (pos, _))| (pos, rank as u32))
        .collect()
}

fn write_object_index(w: &mut PamWriter, index: u32) -> Result<()> {
    if index >= OBJECT_INDEX_ESCAPE {
        w.write_u16(u16::MAX)?;
        w.write_i32(index as i32)
    } else {
        w.write_u16(index as u16)
    }
}

fn write_move(w: &mut PamWriter, mv: &PlaceObject, state: &mut FrameState, frame: u32) -> Result<()> {
    let index = state.depth_index.get(&mv.depth).copied().ok_or_else(|| {
        PamError::InvalidData(format!(
            "frame {frame} modifies depth {}, which is empty",
            mv.depth
        ))
    })?;

    let packed_pos = w.position();
    w.write_u16(0)?;
    let mut flags = MoveFlags::empty();
    let index_bits = index.min(MOVE_INDEX_ESCAPE) as u16;
    if index >= MOVE_INDEX_ESCAPE {
        w.write_i32(index as i32)?;
    }

    let matrix = match mv.matrix {
        Some(m) => {
            state.depth_matrix.insert(mv.depth, m);
            m
        }
        None => state
            .depth_matrix
            .get(&mv.depth)
            .copied()
            .unwrap_or(Matrix::IDENTITY),
    };

    if is_rotation(&matrix) {
        flags |= MoveFlags::ROTATE;
        w.write_i16(encode_rotation(&matrix))?;
    } else {
        flags |= MoveFlags::MATRIX;
        for term in affine_terms(&matrix) {
            w.write_i32(term)?;
        }
    }

    let (tx, ty) = (matrix.translate_x, matrix.translate_y);
    match (i16::try_from(tx), i16::try_from(ty)) {
        (Ok(x), Ok(y)) => {
            w.write_i16(x)?;
            w.write_i16(y)?;
        }
        _ => {
            flags |= MoveFlags::LONG_COORDS;
            w.write_i32(tx)?;
            w.write_i32(ty)?;
        }
    }

    if let Some(ct) = &mv.color_transform {
        flags |= MoveFlags::COLOR;
        // additive terms are not representable
        let mult = ct.mult.unwrap_or([255; 4]);
        for term in mult {
            w.write_u8(term.clamp(0, 255) as u8)?;
        }
    }

    w.patch_u16(packed_pos, index_bits | flags.bits())
}

#![allow(dead_code)]

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use serde_json::{Value, json};
use std::io::{Cursor, Read, Write};
use swf2pam_core::Document;

/// zlib-compressed pixel data of a `w` x `h` bitmap filled with one ARGB pixel.
pub fn zlib_pixels(w: u32, h: u32, argb: [u8; 4]) -> Vec<u8> {
    let raw: Vec<u8> = (0..w * h).flat_map(|_| argb).collect();
    zlib(&raw)
}

pub fn zlib(raw: &[u8]) -> Vec<u8> {
    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    enc.write_all(raw).expect("compress");
    enc.finish().expect("finish zlib")
}

pub fn lossless2(id: u16, w: u16, h: u16) -> Value {
    json!({
        "type": "define_bits_lossless2",
        "id": id,
        "width": w,
        "height": h,
        "data": zlib_pixels(w as u32, h as u32, [255, 200, 100, 50]),
    })
}

/// A DefineShape with a single bitmap fill at 20 twips per pixel.
pub fn bitmap_shape(id: u16, bitmap_id: u16) -> Value {
    json!({
        "type": "define_shape",
        "id": id,
        "fill_styles": [
            { "kind": "bitmap", "bitmap_id": bitmap_id, "matrix": { "scale_x": 20.0, "scale_y": 20.0 } }
        ],
        "records": [ { "kind": "straight_edge" } ],
    })
}

pub fn place(depth: u16, character: u16) -> Value {
    json!({ "type": "place_object", "depth": depth, "character_id": character })
}

pub fn show_frame() -> Value {
    json!({ "type": "show_frame" })
}

pub fn symbols(links: &[(u16, &str)]) -> Value {
    let symbols: Vec<Value> = links
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect();
    json!({ "type": "symbol_class", "symbols": symbols })
}

pub fn sprite(id: u16, tags: Vec<Value>) -> Value {
    let frames = tags.iter().filter(|t| t["type"] == "show_frame").count();
    json!({ "type": "define_sprite", "id": id, "frame_count": frames, "tags": tags })
}

pub fn document(frame_count: u16, tags: Vec<Value>) -> Document {
    serde_json::from_value(json!({
        "header": { "frame_rate": 30.0, "frame_count": frame_count },
        "tags": tags,
    }))
    .expect("document json")
}

#[derive(Debug, Clone)]
pub struct ImageRec {
    pub id: String,
    pub width: i16,
    pub height: i16,
    pub matrix: [i32; 4],
    pub tx: i16,
    pub ty: i16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddRec {
    pub index: u32,
    pub sprite: bool,
    pub resource: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveRec {
    pub packed: u16,
    pub index: u32,
    pub rotation: Option<i16>,
    pub matrix: Option<[i32; 4]>,
    pub tx: i32,
    pub ty: i32,
    pub color: Option<[u8; 4]>,
}

#[derive(Debug, Clone, Default)]
pub struct FrameRec {
    pub flags: u8,
    pub removes: Vec<u32>,
    pub adds: Vec<AddRec>,
    pub moves: Vec<MoveRec>,
    pub label: Option<String>,
    pub commands: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct SpriteRec {
    pub name: String,
    pub frame_rate: i32,
    pub frame_count: u16,
    pub work_area: (u16, u16),
    pub frames: Vec<FrameRec>,
}

#[derive(Debug, Clone)]
pub struct PamFile {
    pub frame_rate: u8,
    pub rect: [i16; 4],
    pub images: Vec<ImageRec>,
    pub sprites: Vec<SpriteRec>,
    pub main: Option<SpriteRec>,
}

/// Reads back a PAM stream.
pub struct PamReader {
    cur: Cursor<Vec<u8>>,
}

impl PamReader {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { cur: Cursor::new(bytes) }
    }

    pub fn u8(&mut self) -> u8 {
        self.cur.read_u8().expect("u8")
    }
    pub fn u16(&mut self) -> u16 {
        self.cur.read_u16::<LittleEndian>().expect("u16")
    }
    pub fn i16(&mut self) -> i16 {
        self.cur.read_i16::<LittleEndian>().expect("i16")
    }
    pub fn u32(&mut self) -> u32 {
        self.cur.read_u32::<LittleEndian>().expect("u32")
    }
    pub fn i32(&mut self) -> i32 {
        self.cur.read_i32::<LittleEndian>().expect("i32")
    }
    /// ASCII strings only: the length prefix counts UTF-16 units.
    pub fn string(&mut self) -> String {
        let len = self.u16() as usize;
        let mut buf = vec![0u8; len];
        self.cur.read_exact(&mut buf).expect("string bytes");
        String::from_utf8(buf).expect("utf8")
    }
    pub fn count(&mut self) -> usize {
        let c = self.u8();
        if c == 0xFF { self.u16() as usize } else { c as usize }
    }
    pub fn at_end(&self) -> bool {
        self.cur.position() as usize == self.cur.get_ref().len()
    }

    pub fn read_file(bytes: Vec<u8>) -> PamFile {
        let mut r = Self::new(bytes);
        assert_eq!(r.u32(), 0xBAF0_1954, "magic");
        assert_eq!(r.i32(), 6, "version");
        let frame_rate = r.u8();
        let rect = [r.i16(), r.i16(), r.i16(), r.i16()];
        let image_count = r.u16();
        let images = (0..image_count).map(|_| r.image()).collect();
        let sprite_count = r.u16();
        let sprites = (0..sprite_count).map(|_| r.sprite()).collect();
        let main = if r.u8() != 0 { Some(r.sprite()) } else { None };
        assert!(r.at_end(), "trailing bytes after main timeline");
        PamFile {
            frame_rate,
            rect,
            images,
            sprites,
            main,
        }
    }

    pub fn image(&mut self) -> ImageRec {
        ImageRec {
            id: self.string(),
            width: self.i16(),
            height: self.i16(),
            matrix: [self.i32(), self.i32(), self.i32(), self.i32()],
            tx: self.i16(),
            ty: self.i16(),
        }
    }

    pub fn sprite(&mut self) -> SpriteRec {
        let name = self.string();
        assert_eq!(self.string(), "");
        let frame_rate = self.i32();
        let frame_count = self.u16();
        let work_area = (self.u16(), self.u16());
        let frames = (0..frame_count).map(|_| self.frame()).collect();
        SpriteRec {
            name,
            frame_rate,
            frame_count,
            work_area,
            frames,
        }
    }

    pub fn frame(&mut self) -> FrameRec {
        let mut f = FrameRec {
            flags: self.u8(),
            ..Default::default()
        };
        if f.flags & 1 != 0 {
            let n = self.count();
            for _ in 0..n {
                let v = self.u16();
                f.removes.push(if v == 0xFFFF { self.i32() as u32 } else { v as u32 });
            }
        }
        if f.flags & 2 != 0 {
            let n = self.count();
            for _ in 0..n {
                let packed = self.u16();
                let mut index = (packed & 0x7FF) as u32;
                if index == 2047 {
                    index = self.i32() as u32;
                }
                let resource = self.count() as u16;
                f.adds.push(AddRec {
                    index,
                    sprite: packed & 0x8000 != 0,
                    resource,
                });
            }
        }
        if f.flags & 4 != 0 {
            let n = self.count();
            for _ in 0..n {
                let packed = self.u16();
                let mut index = (packed & 0x3FF) as u32;
                if index == 0x3FF {
                    index = self.i32() as u32;
                }
                let (rotation, matrix) = if packed & 0x4000 != 0 {
                    (Some(self.i16()), None)
                } else {
                    assert!(packed & 0x1000 != 0, "move without rotation or matrix");
                    (None, Some([self.i32(), self.i32(), self.i32(), self.i32()]))
                };
                let (tx, ty) = if packed & 0x800 != 0 {
                    (self.i32(), self.i32())
                } else {
                    (self.i16() as i32, self.i16() as i32)
                };
                let color = (packed & 0x2000 != 0).then(|| [self.u8(), self.u8(), self.u8(), self.u8()]);
                f.moves.push(MoveRec {
                    packed,
                    index,
                    rotation,
                    matrix,
                    tx,
                    ty,
                    color,
                });
            }
        }
        if f.flags & 8 != 0 {
            f.label = Some(self.string());
        }
        if f.flags & 32 != 0 {
            let n = self.u8();
            for _ in 0..n {
                let cmd = self.string();
                let param = self.string();
                f.commands.push((cmd, param));
            }
        }
        f
    }
}

//! Parser and writer for the `.fbxskel.7` skeleton container.
//!
//! A skeleton file is a header, a table of fixed-width bone records, a hash
//! index keyed by bone name, and a string region holding the names. Bone
//! records reference their parents by position in the table, so the table
//! order is significant and survives a round trip unchanged.

use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom, Write};

use byteorder::{ReadBytesExt, WriteBytesExt, LE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    io_ext::{ReadFormatsExt, WriteFormatsExt},
    murmur::murmur3_32,
};

pub const MAGIC: u32 = u32::from_le_bytes(*b"skln");
pub const VERSION: u32 = 7;

/// Seed applied to every bone name hash.
const NAME_HASH_SEED: u32 = 0xffff_ffff;

#[derive(Debug, Error)]
pub enum FbxskelError {
    #[error("could not read bytes: {0}")]
    Io(io::Error),

    #[error("not a fbxskel file (magic = {magic}, version = {version})")]
    Format { version: u32, magic: u32 },

    #[error("input ended inside a required field")]
    Truncated,

    #[error("bone {bone} references parent {parent} outside of the table")]
    ParentOutOfBounds { bone: usize, parent: i16 },
}

impl From<io::Error> for FbxskelError {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            ErrorKind::UnexpectedEof => Self::Truncated,
            _ => Self::Io(error),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    fn from_reader(r: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            x: r.read_f32::<LE>()?,
            y: r.read_f32::<LE>()?,
            z: r.read_f32::<LE>()?,
        })
    }

    fn write(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_f32::<LE>(self.x)?;
        w.write_f32::<LE>(self.y)?;
        w.write_f32::<LE>(self.z)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    fn from_reader(r: &mut impl Read) -> io::Result<Self> {
        Ok(Self {
            x: r.read_f32::<LE>()?,
            y: r.read_f32::<LE>()?,
            z: r.read_f32::<LE>()?,
            w: r.read_f32::<LE>()?,
        })
    }

    fn write(&self, w: &mut impl Write) -> io::Result<()> {
        w.write_f32::<LE>(self.x)?;
        w.write_f32::<LE>(self.y)?;
        w.write_f32::<LE>(self.z)?;
        w.write_f32::<LE>(self.w)
    }
}

/// One joint of a skeleton: identity, hierarchy link, and local transform
/// relative to the parent bone's space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,

    /// External identifier, carried through the file verbatim.
    pub id: u16,

    /// Position of the parent in the bone table, or -1 for a root.
    pub parent_index: i16,

    pub rotation: Quaternion,
    pub translation: Vector3,
    pub scale: Vector3,
}

impl Bone {
    pub fn parent(&self) -> Option<usize> {
        (self.parent_index >= 0).then_some(self.parent_index as usize)
    }
}

/// An ordered skeleton as stored in a `.fbxskel.7` file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Fbxskel {
    pub bones: Vec<Bone>,
}

impl Fbxskel {
    pub fn parse(bytes: &[u8]) -> Result<Self, FbxskelError> {
        Self::from_reader(&mut Cursor::new(bytes))
    }

    pub fn from_reader(r: &mut (impl Read + Seek)) -> Result<Self, FbxskelError> {
        let version = r.read_u32::<LE>()?;
        let magic = r.read_u32::<LE>()?;
        if magic != MAGIC || version != VERSION {
            return Err(FbxskelError::Format { version, magic });
        }

        r.read_padding(8)?;
        let bone_table_offset = r.read_u64::<LE>()?;

        // The header also records where the hash index lives, but the bone
        // records carry everything a load needs.
        let _hash_table_offset = r.read_u64::<LE>()?;

        let bone_count = r.read_u16::<LE>()?;

        r.seek(SeekFrom::Start(bone_table_offset))?;

        let mut records = Vec::with_capacity(usize::from(bone_count));
        for _ in 0..bone_count {
            let name_offset = r.read_u64::<LE>()?;
            let _name_hash = r.read_u32::<LE>()?;
            let parent_index = r.read_i16::<LE>()?;
            let id = r.read_u16::<LE>()?;
            let rotation = Quaternion::from_reader(r)?;
            let translation = Vector3::from_reader(r)?;
            let scale = Vector3::from_reader(r)?;
            r.read_padding(8)?;

            records.push((name_offset, parent_index, id, rotation, translation, scale));
        }

        let mut bones = Vec::with_capacity(records.len());
        for (name_offset, parent_index, id, rotation, translation, scale) in records {
            r.seek(SeekFrom::Start(name_offset))?;
            let name = r.read_utf16()?;

            bones.push(Bone {
                name,
                id,
                parent_index,
                rotation,
                translation,
                scale,
            });
        }

        check_parent_links(&bones)?;

        Ok(Self { bones })
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, FbxskelError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    pub fn write<W: Write + Seek>(&self, w: &mut W) -> Result<(), FbxskelError> {
        check_parent_links(&self.bones)?;

        let hashes = self
            .bones
            .iter()
            .map(|bone| name_hash(&bone.name))
            .collect::<Vec<_>>();

        w.write_u32::<LE>(VERSION)?;
        w.write_u32::<LE>(MAGIC)?;
        w.write_u64::<LE>(0)?;

        let bone_table_slot = w.stream_position()?;
        w.write_u64::<LE>(0)?;
        let hash_table_slot = w.stream_position()?;
        w.write_u64::<LE>(0)?;

        // The count goes out as eight bytes even though loaders only read
        // the low two; the rest lands in reserved space.
        w.write_u64::<LE>(self.bones.len() as u64)?;
        w.write_u64::<LE>(0)?;

        let table_start = w.stream_position()?;
        w.write_u64_at(bone_table_slot, table_start)?;

        let mut name_slots = Vec::with_capacity(self.bones.len());
        for (bone, hash) in self.bones.iter().zip(&hashes) {
            name_slots.push(w.stream_position()?);
            w.write_u64::<LE>(0)?;
            w.write_u32::<LE>(*hash)?;
            w.write_i16::<LE>(bone.parent_index)?;
            w.write_u16::<LE>(bone.id)?;
            bone.rotation.write(w)?;
            bone.translation.write(w)?;
            bone.scale.write(w)?;
            w.write_u64::<LE>(0)?;
        }

        let index_start = w.stream_position()?;
        w.write_u64_at(hash_table_slot, index_start)?;

        let mut index = hashes.iter().copied().zip(0u32..).collect::<Vec<_>>();
        // Stable, so equal hashes keep their table order.
        index.sort_by_key(|&(hash, _)| hash);
        for (hash, bone_index) in index {
            w.write_u32::<LE>(hash)?;
            w.write_u32::<LE>(bone_index)?;
        }

        for (bone, slot) in self.bones.iter().zip(name_slots) {
            let name_offset = w.stream_position()?;
            w.write_u64_at(slot, name_offset)?;
            w.write_utf16(&bone.name)?;
        }

        Ok(())
    }
}

/// Hash of a bone name as it is keyed in the file's hash index.
pub fn name_hash(name: &str) -> u32 {
    let bytes = name
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect::<Vec<_>>();

    murmur3_32(&bytes, NAME_HASH_SEED)
}

// Bounds check on parent links. The original tooling trusted its input here;
// rejecting dangling parents is an addition.
fn check_parent_links(bones: &[Bone]) -> Result<(), FbxskelError> {
    for (index, bone) in bones.iter().enumerate() {
        if bone.parent_index == -1 {
            continue;
        }

        if bone.parent_index < 0 || bone.parent_index as usize >= bones.len() {
            return Err(FbxskelError::ParentOutOfBounds {
                bone: index,
                parent: bone.parent_index,
            });
        }
    }

    Ok(())
}

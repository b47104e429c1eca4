//! Byte-level fixture container shared by the integration tests
//!
//! Layout (big-endian):
//!
//! ```text
//! "TEST" | version u32 | flags u8 | count u32
//! count × [ tag u32 | id i32 | length u32 | bytes ]
//! ```
//!
//! `Lscr`/`Lsc2` chunks are scripts for the `Internal`/`Shared` casts: the
//! first byte is the script kind, the rest is source text.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};
use rays::container::ContainerError;
use rays::{
    Cast, CastMember, ChunkEntry, Container, Endianness, FourCC, MemberKind, ReadStream, Script,
    ScriptKind, WriteStream,
};

pub const MAGIC: &[u8; 4] = b"TEST";
pub const FLAG_CAST: u8 = 0x01;
pub const FLAG_DOT_SYNTAX: u8 = 0x02;
pub const FLAG_PROTECTED: u8 = 0x04;

pub const KIND_SCORE: u8 = 1;
pub const KIND_MOVIE: u8 = 3;
pub const KIND_PARENT: u8 = 7;
pub const KIND_NON_SCRIPT: u8 = 0xff;

pub const RESTORED_SUFFIX: &[u8] = b"\n-- restored";

pub fn tag(s: &str) -> FourCC {
    s.parse().unwrap()
}

/// Encode a fixture file
pub fn build(version: u32, flags: u8, chunks: &[(&str, i32, &[u8])]) -> Vec<u8> {
    let mut out = MAGIC.to_vec();
    out.extend_from_slice(&version.to_be_bytes());
    out.push(flags);
    out.extend_from_slice(&(chunks.len() as u32).to_be_bytes());
    for (name, id, data) in chunks {
        out.extend_from_slice(&tag(name).value().to_be_bytes());
        out.extend_from_slice(&id.to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
    }
    out
}

/// Script chunk payload
pub fn script_chunk(kind: u8, source: &str) -> Vec<u8> {
    let mut data = vec![kind];
    data.extend_from_slice(source.as_bytes());
    data
}

pub struct FixtureScript {
    member: CastMember,
    source: String,
}

impl Script for FixtureScript {
    fn member(&self) -> Option<&CastMember> {
        Some(&self.member)
    }

    fn source_text(&self, line_ending: &str, dot_syntax: bool) -> Result<String, ContainerError> {
        let mut text = self.source.lines().collect::<Vec<_>>().join(line_ending);
        if dot_syntax {
            text.push_str(" -- dot");
        }
        Ok(text)
    }

    fn bytecode_text(&self, line_ending: &str, _dot_syntax: bool) -> Result<String, ContainerError> {
        Ok(format!("pushcons {}{}ret", self.member.id, line_ending))
    }
}

pub struct FixtureCast {
    name: String,
    scripts: Option<BTreeMap<i32, FixtureScript>>,
}

impl Cast for FixtureCast {
    fn name(&self) -> &str {
        &self.name
    }

    fn scripts(&self) -> Option<Vec<(i32, &dyn Script)>> {
        self.scripts.as_ref().map(|table| {
            table
                .iter()
                .map(|(id, script)| (*id, script as &dyn Script))
                .collect()
        })
    }
}

pub struct Fixture {
    pub version: u32,
    pub flags: u8,
    pub chunks: Vec<(FourCC, i32, Vec<u8>)>,
    estimate: usize,
    casts: Vec<FixtureCast>,
}

impl Fixture {
    fn cast_for(script_tag: FourCC) -> Option<&'static str> {
        match &script_tag.bytes() {
            b"Lscr" => Some("Internal"),
            b"Lsc2" => Some("Shared"),
            _ => None,
        }
    }

    fn find(&self, tag: FourCC, id: i32) -> Option<&[u8]> {
        self.chunks
            .iter()
            .find(|(t, i, _)| *t == tag && *i == id)
            .map(|(_, _, data)| data.as_slice())
    }
}

fn member_kind(code: u8) -> MemberKind {
    match code {
        KIND_SCORE => MemberKind::Script(ScriptKind::Score),
        KIND_MOVIE => MemberKind::Script(ScriptKind::Movie),
        KIND_PARENT => MemberKind::Script(ScriptKind::Parent),
        KIND_NON_SCRIPT => MemberKind::Other(1),
        other => MemberKind::Script(ScriptKind::Unknown(other as u16)),
    }
}

/// C-style escaping, as a structural renderer would produce it
fn c_escape(bytes: &[u8]) -> String {
    let mut out = String::new();
    for &b in bytes {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            0x0b => out.push_str("\\v"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02X}", b)),
        }
    }
    out
}

impl Container for Fixture {
    fn read(stream: &mut ReadStream<'_>) -> Result<Self, ContainerError> {
        let mut magic = [0u8; 4];
        stream.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ContainerError::Rejected(format!("bad magic {:?}", magic)));
        }

        let version = stream.read_u32::<BigEndian>()?;
        let flags = stream.read_u8()?;
        let count = stream.read_u32::<BigEndian>()?;

        let mut chunks = Vec::new();
        for _ in 0..count {
            let tag = FourCC(stream.read_u32::<BigEndian>()?);
            let id = stream.read_i32::<BigEndian>()?;
            let len = stream.read_u32::<BigEndian>()? as usize;
            let mut data = vec![0u8; len];
            stream.read_exact(&mut data)?;
            chunks.push((tag, id, data));
        }

        let casts = ["Internal", "Shared", "External"]
            .iter()
            .map(|name| FixtureCast {
                name: name.to_string(),
                scripts: None,
            })
            .collect();

        Ok(Self {
            version,
            flags,
            chunks,
            estimate: stream.position() as usize,
            casts,
        })
    }

    fn directory(&self) -> Vec<ChunkEntry> {
        self.chunks
            .iter()
            .map(|(tag, id, _)| ChunkEntry::new(*tag, *id))
            .collect()
    }

    fn chunk_exists(&self, tag: FourCC, id: i32) -> bool {
        self.find(tag, id).is_some()
    }

    fn chunk_data(&self, tag: FourCC, id: i32) -> Option<&[u8]> {
        self.find(tag, id)
    }

    fn render_chunk(&self, tag: FourCC, id: i32) -> Result<Option<String>, ContainerError> {
        let Some(data) = self.find(tag, id) else {
            return Ok(None);
        };
        match &tag.bytes() {
            b"CASt" => Ok(Some(format!("{{\"length\":{}}}", data.len()))),
            b"STXT" => Ok(Some(format!("{{\"text\":\"{}\"}}", c_escape(data)))),
            b"BAD!" => Err(ContainerError::Other("unsupported chunk".into())),
            b"BOOM" => panic!("renderer crashed"),
            _ => Ok(None),
        }
    }

    fn is_cast(&self) -> bool {
        self.flags & FLAG_CAST != 0
    }

    fn version(&self) -> u32 {
        self.version
    }

    fn dot_syntax(&self) -> bool {
        self.flags & FLAG_DOT_SYNTAX != 0
    }

    fn endianness(&self) -> Endianness {
        Endianness::Big
    }

    fn estimated_size(&self) -> usize {
        self.estimate
    }

    fn casts(&self) -> Vec<&dyn Cast> {
        self.casts.iter().map(|cast| cast as &dyn Cast).collect()
    }

    fn unprotect(&mut self) {
        self.flags &= !FLAG_PROTECTED;
    }

    fn parse_scripts(&mut self) -> Result<(), ContainerError> {
        for cast in &mut self.casts {
            if cast.name == "External" {
                continue;
            }
            let mut table = BTreeMap::new();
            for (tag, id, data) in &self.chunks {
                if Self::cast_for(*tag) != Some(cast.name.as_str()) || data.is_empty() {
                    continue;
                }
                let member = CastMember {
                    id: id + 100,
                    name: format!("member{}", id),
                    kind: member_kind(data[0]),
                };
                let source = String::from_utf8_lossy(&data[1..]).into_owned();
                table.insert(*id, FixtureScript { member, source });
            }
            cast.scripts = Some(table);
        }
        Ok(())
    }

    fn restore_script_text(&mut self) -> Result<(), ContainerError> {
        for (tag, _, data) in &mut self.chunks {
            if Self::cast_for(*tag).is_some() {
                data.extend_from_slice(RESTORED_SUFFIX);
            }
        }
        Ok(())
    }

    fn prepare_write(&mut self) -> Result<(), ContainerError> {
        Ok(())
    }

    fn write(&self, stream: &mut WriteStream<'_>) -> Result<(), ContainerError> {
        stream.write_bytes(MAGIC)?;
        stream.write_u32(self.version)?;
        stream.write_u8(self.flags)?;
        stream.write_u32(self.chunks.len() as u32)?;
        for (tag, id, data) in &self.chunks {
            stream.write_u32(tag.value())?;
            stream.write_i32(*id)?;
            stream.write_u32(data.len() as u32)?;
            stream.write_bytes(data)?;
        }
        Ok(())
    }
}

//! Parsed container handles
//!
//! A [`Handle`] owns a parsed container together with the input bytes it was
//! read from and the read position the parser stopped at. It only exists
//! once a parse has succeeded, so every method can rely on a live container.

use crate::config::Config;
use crate::container::Container;
use crate::export;
use crate::fourcc::FourCC;
use crate::scripts::{self, ScriptDetail, ScriptDump};
use crate::stream::ReadStream;
use crate::writer::write_with_growth;
use crate::{Error, Result};

pub struct Handle<C: Container> {
    container: C,
    input: Vec<u8>,
    position: u64,
}

impl<C: Container> Handle<C> {
    /// Copy `bytes` and parse a container from them
    pub fn read(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::InvalidInput("empty input"));
        }

        let mut input = Vec::new();
        input.try_reserve_exact(bytes.len())?;
        input.extend_from_slice(bytes);

        let mut stream = ReadStream::new(input.as_slice());
        let container = C::read(&mut stream).map_err(Error::Parse)?;
        let position = stream.position();

        tracing::debug!(input = input.len(), consumed = position, "container parsed");
        Ok(Self {
            container,
            input,
            position,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_container(container: C) -> Self {
        Self {
            container,
            input: Vec::new(),
            position: 0,
        }
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    /// The bytes the container was parsed from
    pub fn input(&self) -> &[u8] {
        &self.input
    }

    /// Read position the parser stopped at
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn chunk_exists(&self, tag: FourCC, id: i32) -> bool {
        self.container.chunk_exists(tag, id)
    }

    pub fn is_cast(&self) -> bool {
        self.container.is_cast()
    }

    pub fn estimated_size(&self) -> usize {
        self.container.estimated_size()
    }

    /// Raw chunk bytes; `None` if absent, `Some(&[])` for an empty chunk
    pub fn chunk_payload(&self, tag: FourCC, id: i32) -> Option<&[u8]> {
        self.container.chunk_data(tag, id)
    }

    /// Look up one script, resolving script tables first
    pub fn script(&mut self, id: i32, config: &Config) -> Result<Option<ScriptDetail>> {
        self.resolve_scripts()?;
        scripts::find_script(&self.container, id, config)
    }

    pub fn dump_scripts(&mut self, config: &Config) -> Result<ScriptDump> {
        self.resolve_scripts()?;
        scripts::dump_scripts(&self.container, config)
    }

    /// Structured-record JSON for every exported chunk
    pub fn dump_json(&self) -> Result<Vec<u8>> {
        export::dump_json(&self.container)
    }

    /// Compact binary dump of every exported chunk
    pub fn dump_chunks(&self) -> Result<Vec<u8>> {
        export::dump_chunks(&self.container)
    }

    /// Lift protection, stage decompiled text back in, then re-serialize
    pub fn write_to_buffer(&mut self, config: &Config) -> Result<Vec<u8>> {
        self.resolve_scripts()?;
        self.container.restore_script_text()?;
        write_with_growth(&mut self.container, config.growth_attempts)
    }

    fn resolve_scripts(&mut self) -> Result<()> {
        self.container.unprotect();
        self.container.parse_scripts()?;
        Ok(())
    }
}

/// Parse, rewrite and drop a container in one call
pub fn decompile<C: Container>(bytes: &[u8], config: &Config) -> Result<Vec<u8>> {
    let mut handle = Handle::<C>::read(bytes)?;
    handle.write_to_buffer(config)
}

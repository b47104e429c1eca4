//! Script extraction and assembly
//!
//! Scripts live in the per-cast script tables. Each one is reported with its
//! owning member, a classification derived from the member's declared type,
//! and the decompiler's source and bytecode text.

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::container::{Container, MemberKind, Script, ScriptKind};
use crate::fault;
use crate::Result;

/// Container version from which score scripts are reported as behaviors
pub const BEHAVIOR_VERSION: u32 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptType {
    BehaviorScript,
    ScoreScript,
    MovieScript,
    ParentScript,
    CastScript,
    UnknownScript,
}

impl ScriptType {
    /// Classify a script by its owning member's declared type
    pub fn classify(kind: MemberKind, version: u32) -> Self {
        match kind {
            MemberKind::Script(ScriptKind::Score) if version >= BEHAVIOR_VERSION => {
                Self::BehaviorScript
            }
            MemberKind::Script(ScriptKind::Score) => Self::ScoreScript,
            MemberKind::Script(ScriptKind::Movie) => Self::MovieScript,
            MemberKind::Script(ScriptKind::Parent) => Self::ParentScript,
            MemberKind::Script(ScriptKind::Unknown(_)) => Self::UnknownScript,
            MemberKind::Other(_) => Self::CastScript,
        }
    }
}

/// One script inside a bulk dump
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptEntry {
    pub script_id: i32,
    pub member_id: i32,
    pub member_name: String,
    pub script_type: ScriptType,
    pub lingo: String,
    pub bytecode: String,
}

/// A single script looked up by id, with its cast name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDetail {
    pub script_id: i32,
    pub member_id: i32,
    pub member_name: String,
    pub script_type: ScriptType,
    pub cast_name: String,
    pub lingo: String,
    pub bytecode: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastScripts {
    pub name: String,
    pub scripts: Vec<ScriptEntry>,
}

/// Every resolved script, grouped by cast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptDump {
    /// 1 for a cast library, 0 for a movie
    pub is_cast: u8,
    pub version: u32,
    pub casts: Vec<CastScripts>,
}

/// Look up a script by id across all casts.
///
/// Casts are searched in container order and the first table holding the id
/// wins. Returns `None` when no cast resolves the id to a script with an
/// owning member.
pub fn find_script<C: Container>(
    container: &C,
    id: i32,
    config: &Config,
) -> Result<Option<ScriptDetail>> {
    for cast in container.casts() {
        let Some(script) = cast.script(id) else {
            continue;
        };
        let Some(entry) = build_entry(container, id, script, config)? else {
            continue;
        };

        return Ok(Some(ScriptDetail {
            script_id: entry.script_id,
            member_id: entry.member_id,
            member_name: entry.member_name,
            script_type: entry.script_type,
            cast_name: cast.name().to_string(),
            lingo: entry.lingo,
            bytecode: entry.bytecode,
        }));
    }

    Ok(None)
}

/// Collect every resolved script of every cast.
///
/// Casts without a script context are left out. A script whose text cannot
/// be produced is skipped and logged.
pub fn dump_scripts<C: Container>(container: &C, config: &Config) -> Result<ScriptDump> {
    let mut casts = Vec::new();

    for cast in container.casts() {
        let Some(table) = cast.scripts() else {
            continue;
        };

        let mut scripts = Vec::with_capacity(table.len());
        for (id, script) in table {
            match fault::catch(|| build_entry(container, id, script, config)) {
                Ok(Some(entry)) => scripts.push(entry),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping script {} in {:?}: {}", id, cast.name(), e),
            }
        }

        casts.push(CastScripts {
            name: cast.name().to_string(),
            scripts,
        });
    }

    Ok(ScriptDump {
        is_cast: u8::from(container.is_cast()),
        version: container.version(),
        casts,
    })
}

fn build_entry<C: Container>(
    container: &C,
    id: i32,
    script: &dyn Script,
    config: &Config,
) -> Result<Option<ScriptEntry>> {
    let Some(member) = script.member() else {
        return Ok(None);
    };

    let dot_syntax = config.dot_syntax_for(container.dot_syntax());
    let lingo = script.source_text(&config.line_ending, dot_syntax)?;
    let bytecode = script.bytecode_text(&config.line_ending, dot_syntax)?;

    Ok(Some(ScriptEntry {
        script_id: id,
        member_id: member.id,
        member_name: member.name.clone(),
        script_type: ScriptType::classify(member.kind, container.version()),
        lingo,
        bytecode,
    }))
}

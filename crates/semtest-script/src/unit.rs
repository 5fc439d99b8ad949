//! Scripted unit files
//!
//! A unit is a TOML document:
//!
//! ```toml
//! [[member]]
//! name = "addition"
//! meta = "`test"
//! result = true
//! root = "main"
//!
//! [[frame]]
//! id = "main"
//! graph = "addition"
//! entry = "(`Member, `addition)"
//! unknown = 0
//! calls = { "1:lhs" = "helper" }
//! ```

use semtest_core::{LoadError, MemberMetadata, MetaValue};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Prefix marking a metadata string as a symbol
pub const SYMBOL_PREFIX: char = '`';

/// What invoking a member is scripted to do
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedOutcome {
    /// Evaluate to a value; boolean `true` passes
    Result(toml::Value),
    /// Raise a runtime exception with this text
    Raise(String),
    /// Fail the runtime itself
    Fault(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptMember {
    pub name: String,
    pub meta: Option<MemberMetadata>,
    pub outcome: ScriptedOutcome,
    /// Declared frame the reasoning engine starts from
    pub root: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDecl {
    pub graph: String,
    pub entry: String,
    pub unknown: usize,
    /// Call site -> frame id, ordered by call site
    pub calls: BTreeMap<String, String>,
}

/// A loaded unit file
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptUnit {
    path: PathBuf,
    members: Vec<ScriptMember>,
    frames: BTreeMap<String, FrameDecl>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUnit {
    #[serde(default)]
    member: Vec<RawMember>,
    #[serde(default)]
    frame: Vec<RawFrame>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMember {
    name: String,
    meta: Option<toml::Value>,
    result: Option<toml::Value>,
    raise: Option<String>,
    fault: Option<String>,
    root: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFrame {
    id: String,
    graph: String,
    #[serde(default)]
    entry: String,
    #[serde(default)]
    unknown: usize,
    #[serde(default)]
    calls: BTreeMap<String, String>,
}

impl ScriptUnit {
    /// Parse unit source text; `path` identifies the unit in errors
    pub fn parse(path: &Path, source: &str) -> Result<Self, LoadError> {
        let raw: RawUnit =
            toml::from_str(source).map_err(|e| LoadError::new(path, describe_syntax_error(source, &e)))?;

        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(raw.member.len());
        for member in raw.member {
            if !seen.insert(member.name.clone()) {
                return Err(LoadError::new(
                    path,
                    format!("duplicate member '{}'", member.name),
                ));
            }
            members.push(convert_member(path, member)?);
        }

        let mut frames = BTreeMap::new();
        for frame in raw.frame {
            let decl = FrameDecl {
                graph: frame.graph,
                entry: frame.entry,
                unknown: frame.unknown,
                calls: frame.calls,
            };
            if frames.insert(frame.id.clone(), decl).is_some() {
                return Err(LoadError::new(path, format!("duplicate frame '{}'", frame.id)));
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            members,
            frames,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used in messages
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn members(&self) -> &[ScriptMember] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&ScriptMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn frame(&self, id: &str) -> Option<&FrameDecl> {
        self.frames.get(id)
    }
}

/// `line L, column C: message` on a single line
fn describe_syntax_error(source: &str, error: &toml::de::Error) -> String {
    let message = error.message().split_whitespace().collect::<Vec<_>>().join(" ");
    match error.span() {
        Some(span) => {
            let (line, column) = line_column(source, span.start);
            format!("line {}, column {}: {}", line, column, message)
        }
        None => message,
    }
}

/// 1-based line and column of a byte offset
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let column = before
        .rsplit('\n')
        .next()
        .map_or(0, |last| last.chars().count())
        + 1;
    (line, column)
}

fn convert_member(path: &Path, raw: RawMember) -> Result<ScriptMember, LoadError> {
    let mut outcomes = Vec::new();
    if let Some(value) = raw.result {
        outcomes.push(ScriptedOutcome::Result(value));
    }
    if let Some(text) = raw.raise {
        outcomes.push(ScriptedOutcome::Raise(text));
    }
    if let Some(text) = raw.fault {
        outcomes.push(ScriptedOutcome::Fault(text));
    }

    if outcomes.len() != 1 {
        return Err(LoadError::new(
            path,
            format!(
                "member '{}' must have exactly one of result, raise or fault",
                raw.name
            ),
        ));
    }
    let outcome = outcomes.remove(0);

    let meta = raw
        .meta
        .map(convert_metadata)
        .transpose()
        .map_err(|reason| LoadError::new(path, format!("member '{}': {}", raw.name, reason)))?;

    Ok(ScriptMember {
        name: raw.name,
        meta,
        outcome,
        root: raw.root,
    })
}

/// A table is the full record; any other value is the `outer` annotation
pub fn convert_metadata(value: toml::Value) -> Result<MemberMetadata, String> {
    match value {
        toml::Value::Table(table) => table
            .into_iter()
            .try_fold(MemberMetadata::new(), |meta, (name, value)| {
                Ok(meta.with_field(name, convert_value(value)?))
            }),
        other => Ok(MemberMetadata::annotated(convert_value(other)?)),
    }
}

pub fn convert_value(value: toml::Value) -> Result<MetaValue, String> {
    match value {
        toml::Value::String(s) => Ok(match s.strip_prefix(SYMBOL_PREFIX) {
            Some(symbol) => MetaValue::symbol(symbol),
            None => MetaValue::String(s),
        }),
        toml::Value::Integer(n) => Ok(MetaValue::Integer(n)),
        toml::Value::Boolean(b) => Ok(MetaValue::Boolean(b)),
        toml::Value::Array(items) => items
            .into_iter()
            .map(convert_value)
            .collect::<Result<Vec<_>, _>>()
            .map(MetaValue::Tuple),
        other => Err(format!("unsupported metadata value {}", other)),
    }
}

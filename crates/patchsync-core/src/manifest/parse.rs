//! Manifest document decoding.
//!
//! The wire format is a JSON document whose nesting mirrors the
//! installation tree. Decoding flattens it into the arena used by
//! [`Manifest`](super::Manifest), so parent links always point at the
//! enclosing entry.

use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

use super::errors::ManifestError;
use super::model::{Manifest, ManifestBuilder, ManifestMeta, NodeId};

#[derive(Debug, Deserialize)]
struct RawDocument {
    meta: RawMeta,
    program: RawProgram,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMeta {
    update_time: String,
    update_version: f64,
    force_redownload: bool,
    only_allow_listed_files: bool,
    allow_custom_directories: bool,
}

#[derive(Debug, Deserialize)]
struct RawProgram {
    #[serde(default)]
    entries: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawEntry {
    Directory {
        name: String,
        #[serde(rename = "allowUnlisted")]
        allow_unlisted: bool,
        #[serde(default)]
        entries: Vec<RawEntry>,
    },
    File {
        name: String,
        required: bool,
        source: String,
        checksum: RawChecksum,
    },
}

#[derive(Debug, Deserialize)]
struct RawChecksum {
    required: bool,
    #[serde(default)]
    value: String,
}

/// Decode a manifest document.
///
/// Missing meta fields, an unparsable `updateTime`, or a file that demands
/// a digest without supplying one are all reported as malformed.
pub fn parse_manifest(raw: &str) -> Result<Manifest, ManifestError> {
    let doc: RawDocument = serde_json::from_str(raw)?;

    let meta = ManifestMeta {
        update_time: parse_timestamp(&doc.meta.update_time)?,
        update_version: doc.meta.update_version,
        force_redownload: doc.meta.force_redownload,
        only_allow_listed_files: doc.meta.only_allow_listed_files,
        allow_custom_directories: doc.meta.allow_custom_directories,
    };

    let mut builder = ManifestBuilder::new(meta);
    let mut pending: Vec<(NodeId, RawEntry)> = doc
        .program
        .entries
        .into_iter()
        .rev()
        .map(|entry| (NodeId::ROOT, entry))
        .collect();

    // Explicit stack keeps document order (pre-order) without recursion.
    while let Some((parent, entry)) = pending.pop() {
        match entry {
            RawEntry::Directory {
                name,
                allow_unlisted,
                entries,
            } => {
                let id = builder.directory(parent, name, allow_unlisted);
                pending.extend(entries.into_iter().rev().map(|child| (id, child)));
            }
            RawEntry::File {
                name,
                required,
                source,
                checksum,
            } => {
                if checksum.required && checksum.value.trim().is_empty() {
                    return Err(ManifestError::malformed(format!(
                        "file '{name}' requires a checksum but declares none"
                    )));
                }
                let digest = checksum.required.then_some(checksum.value.trim());
                builder.file(parent, name, required, source, digest);
            }
        }
    }

    let manifest = builder.build();

    // Surface bad names before any caller starts touching the disk.
    for (id, _) in manifest.files() {
        manifest.relative_path(id)?;
    }
    for (id, _) in manifest.directories() {
        manifest.relative_path(id)?;
    }

    Ok(manifest)
}

/// Accepts RFC 3339 (offset folded into UTC) or a bare local timestamp.
fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ManifestError> {
    let value = value.trim();
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(value) {
        return Ok(with_offset.naive_utc());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .ok_or_else(|| ManifestError::parse(format!("invalid updateTime '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestNode;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{
        "meta": {
            "updateTime": "2024-03-01T12:00:00",
            "updateVersion": 1.2,
            "forceRedownload": false,
            "onlyAllowListedFiles": true,
            "allowCustomDirectories": false
        },
        "program": {
            "entries": [
                { "type": "directory", "name": "a", "allowUnlisted": false, "entries": [
                    { "type": "file", "name": "b.txt", "required": true,
                      "source": "https://cdn.example/a/b.txt",
                      "checksum": { "required": true, "value": "D41D8CD98F00B204E9800998ECF8427E" } },
                    { "type": "directory", "name": "config", "allowUnlisted": true }
                ] },
                { "type": "file", "name": "readme.md", "required": false,
                  "source": "https://cdn.example/readme.md",
                  "checksum": { "required": false } }
            ]
        }
    }"#;

    #[test]
    fn parses_meta_flags() {
        let manifest = parse_manifest(SAMPLE).unwrap();
        let meta = manifest.meta();

        assert_eq!(meta.update_time.to_string(), "2024-03-01 12:00:00");
        assert!((meta.update_version - 1.2).abs() < f64::EPSILON);
        assert!(!meta.force_redownload);
        assert!(meta.only_allow_listed_files);
        assert!(!meta.allow_custom_directories);
    }

    #[test]
    fn flattens_tree_in_document_order() {
        let manifest = parse_manifest(SAMPLE).unwrap();

        let paths: Vec<PathBuf> = manifest
            .files()
            .map(|(id, _)| manifest.relative_path(id).unwrap())
            .collect();
        assert_eq!(
            paths,
            vec![PathBuf::from("a/b.txt"), PathBuf::from("readme.md")]
        );

        let dirs: Vec<PathBuf> = manifest
            .directories()
            .map(|(id, _)| manifest.relative_path(id).unwrap())
            .collect();
        assert_eq!(dirs, vec![PathBuf::from("a"), PathBuf::from("a/config")]);
    }

    #[test]
    fn keeps_checksum_and_policy_fields() {
        let manifest = parse_manifest(SAMPLE).unwrap();
        let (_, file) = manifest.files().next().unwrap();
        assert!(file.required);
        assert!(file.digest_required);
        assert_eq!(file.digest, "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(file.source_url, "https://cdn.example/a/b.txt");

        let config = manifest
            .directories()
            .find(|(_, d)| d.name == "config")
            .map(|(id, _)| manifest.node(id).cloned());
        assert!(matches!(
            config,
            Some(Some(ManifestNode::Directory(ref d))) if d.allow_unlisted
        ));
    }

    #[test]
    fn missing_meta_field_is_malformed() {
        let raw = r#"{
            "meta": { "updateTime": "2024-03-01T12:00:00", "updateVersion": 1.0 },
            "program": { "entries": [] }
        }"#;
        assert!(matches!(parse_manifest(raw), Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let raw = SAMPLE.replace("2024-03-01T12:00:00", "yesterday");
        assert!(matches!(parse_manifest(&raw), Err(ManifestError::Parse { .. })));
    }

    #[test]
    fn rfc3339_timestamp_is_folded_to_utc() {
        let raw = SAMPLE.replace("2024-03-01T12:00:00", "2024-03-01T14:00:00+02:00");
        let manifest = parse_manifest(&raw).unwrap();
        assert_eq!(manifest.meta().update_time.to_string(), "2024-03-01 12:00:00");
    }

    #[test]
    fn required_checksum_without_value_is_malformed() {
        let raw = SAMPLE.replace(r#""value": "D41D8CD98F00B204E9800998ECF8427E""#, r#""value": """#);
        assert!(matches!(
            parse_manifest(&raw),
            Err(ManifestError::Malformed { .. })
        ));
    }

    #[test]
    fn traversal_name_is_rejected_at_parse_time() {
        let raw = SAMPLE.replace(r#""name": "readme.md""#, r#""name": "../escape.md""#);
        assert!(matches!(
            parse_manifest(&raw),
            Err(ManifestError::InvalidName { .. })
        ));
    }

    #[test]
    fn unknown_entry_type_is_malformed() {
        let raw = SAMPLE.replace(r#""type": "file", "name": "readme.md""#, r#""type": "link", "name": "readme.md""#);
        assert!(parse_manifest(&raw).is_err());
    }
}

use anyhow::Result;
use ignore::WalkBuilder;
use memmap2::Mmap;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

use crate::error::CliError;
use crate::launcher::FLAMINGOCK_CLI_ENTRY_POINT;

const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
const SPRING_BOOT_LOADER_PREFIX: &str = "org.springframework.boot.loader";
const BOOT_INF_PREFIX: &str = "BOOT-INF/";

/// How the target application has to be launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JarType {
    /// Spring Boot executable jar, started with `-jar`.
    SpringBoot,
    /// Flat jar bundling Flamingock, started with `-cp` and the CLI entry point.
    PlainUber,
}

impl fmt::Display for JarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JarType::SpringBoot => f.write_str("Spring Boot"),
            JarType::PlainUber => f.write_str("plain uber"),
        }
    }
}

/// Resolves `--jar` to a single jar file.
///
/// A directory is searched one level deep, skipping the side artifacts build
/// tools drop next to the executable jar.
pub fn resolve_jar_path(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(CliError::JarNotFound(path.to_path_buf()).into());
    }
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let mut candidates: Vec<PathBuf> = WalkBuilder::new(path)
        .max_depth(Some(1))
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .filter(|p| p.is_file() && is_launchable_jar_name(p))
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(CliError::NoJarInDirectory(path.to_path_buf()).into()),
        1 => {
            let jar = candidates.remove(0);
            debug!(jar = %jar.display(), dir = %path.display(), "resolved jar from directory");
            Ok(jar)
        }
        _ => Err(CliError::AmbiguousJar {
            dir: path.to_path_buf(),
            candidates,
        }
        .into()),
    }
}

fn is_launchable_jar_name(path: &Path) -> bool {
    if !path.extension().is_some_and(|e| e.eq_ignore_ascii_case("jar")) {
        return false;
    }
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    let skipped_suffixes = ["-plain", "-sources", "-javadoc", "-tests"];
    !stem.starts_with("original-") && !skipped_suffixes.iter().any(|s| stem.ends_with(s))
}

/// Classifies a jar by layout and manifest.
pub fn detect_jar_type(jar_path: &Path) -> Result<JarType> {
    let invalid = |reason: String| CliError::InvalidJar {
        path: jar_path.to_path_buf(),
        reason,
    };
    let file = File::open(jar_path).map_err(|e| invalid(format!("cannot open file: {e}")))?;
    let mmap = unsafe { Mmap::map(&file).map_err(|e| invalid(format!("cannot map file: {e}")))? };
    let mut archive = ZipArchive::new(Cursor::new(&mmap[..]))
        .map_err(|e| invalid(format!("not a zip archive: {e}")))?;

    let manifest =
        read_manifest(&mut archive).map_err(|e| invalid(format!("unreadable manifest: {e:#}")))?;
    if let Some(manifest) = &manifest
        && is_spring_boot_manifest(manifest)
    {
        return Ok(JarType::SpringBoot);
    }

    let entry_class = format!("{}.class", FLAMINGOCK_CLI_ENTRY_POINT.replace('.', "/"));
    let mut has_boot_inf = false;
    let mut has_entry_point = false;
    for name in archive.file_names() {
        if name.starts_with(BOOT_INF_PREFIX) {
            has_boot_inf = true;
            break;
        }
        if name == entry_class {
            has_entry_point = true;
        }
    }

    if has_boot_inf {
        Ok(JarType::SpringBoot)
    } else if has_entry_point {
        Ok(JarType::PlainUber)
    } else {
        Err(CliError::UnsupportedJar {
            path: jar_path.to_path_buf(),
            entry_point: FLAMINGOCK_CLI_ENTRY_POINT,
        }
        .into())
    }
}

fn read_manifest<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<Option<BTreeMap<String, String>>> {
    let mut entry = match archive.by_name(MANIFEST_PATH) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut raw = Vec::new();
    entry.read_to_end(&mut raw)?;
    Ok(Some(parse_manifest(&String::from_utf8_lossy(&raw))))
}

fn is_spring_boot_manifest(manifest: &BTreeMap<String, String>) -> bool {
    manifest.contains_key("Spring-Boot-Version")
        || manifest
            .get("Main-Class")
            .is_some_and(|main| main.starts_with(SPRING_BOOT_LOADER_PREFIX))
}

/// Parses `META-INF/MANIFEST.MF` main attributes.
///
/// Lines starting with a single space continue the previous value (72-byte
/// line wrapping). Parsing stops at the first blank line, where per-entry
/// sections begin.
pub fn parse_manifest(content: &str) -> BTreeMap<String, String> {
    let mut attrs = BTreeMap::new();
    let mut current: Option<(String, String)> = None;

    for line in content.replace("\r\n", "\n").split('\n') {
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some((_, value)) = current.as_mut() {
                value.push_str(continuation);
            }
            continue;
        }

        if let Some((key, value)) = current.take() {
            attrs.insert(key, value);
        }

        if line.is_empty() {
            if attrs.is_empty() {
                continue;
            }
            break;
        }

        if let Some((key, value)) = line.split_once(':') {
            current = Some((key.trim().to_string(), value.trim_start().to_string()));
        }
    }

    if let Some((key, value)) = current {
        attrs.insert(key, value);
    }
    attrs
}

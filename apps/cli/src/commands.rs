//! Command implementations.

use crate::args::SyncArgs;
use anyhow::{Context, Result};
use cardsync_core::{AnyStore, Card, CardId, CardStore, Settings, StoreKind, SyncReport, WikiDocument};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read settings from a JSON file, or use the defaults.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let settings = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid settings in {}", path.display()))?;
    debug!(path = %path.display(), "loaded settings");
    Ok(settings)
}

/// Load a card file, picking the format from its extension.
pub fn load_store(path: &Path, settings: &Settings) -> Result<AnyStore> {
    let kind = StoreKind::from_path(path)?;
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    let store = AnyStore::load_from(kind, BufReader::new(file), settings)
        .with_context(|| format!("could not load {}", path.display()))?;
    info!(path = %path.display(), cards = store.cards().len(), "loaded");
    Ok(store)
}

/// `<path>.bak`
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Move every file aside, then write the new contents in their places.
///
/// No file is written until all renames succeed. If a rename fails, the
/// files already moved are put back.
fn save_with_backups(files: &[(&Path, &str)]) -> Result<()> {
    let mut moved: Vec<(&Path, PathBuf)> = Vec::with_capacity(files.len());
    for &(path, _) in files {
        let backup = backup_path(path);
        if let Err(err) = fs::rename(path, &backup) {
            for (done, done_backup) in moved.iter().rev() {
                if let Err(undo) = fs::rename(done_backup, done) {
                    warn!(path = %done.display(), error = %undo, "could not restore from backup");
                }
            }
            return Err(err).with_context(|| format!("could not rename {} to backup", path.display()));
        }
        moved.push((path, backup));
    }

    for (&(path, content), (_, backup)) in files.iter().zip(&moved) {
        fs::write(path, content).with_context(|| format!("could not write {}", path.display()))?;
        info!(path = %path.display(), backup = %backup.display(), "saved");
    }
    Ok(())
}

/// Sync one file into another and save both unless read only.
pub fn sync(args: &SyncArgs, settings: &Settings) -> Result<SyncReport> {
    let mut from = load_store(&args.from, settings)?;
    let mut to = load_store(&args.to, settings)?;

    info!("updating from {} to {}", args.from.display(), args.to.display());
    let report = args.plan().run(&mut from, &mut to)?;

    if args.read_only {
        info!("read only, nothing saved");
        return Ok(report);
    }

    let from_content = from
        .encode()
        .with_context(|| format!("could not encode {}", args.from.display()))?;
    let to_content = to
        .encode()
        .with_context(|| format!("could not encode {}", args.to.display()))?;
    save_with_backups(&[
        (args.from.as_path(), from_content.as_str()),
        (args.to.as_path(), to_content.as_str()),
    ])?;
    Ok(report)
}

/// Print a simple card as JSON.
pub fn card<W: Write>(text: &str, id: Option<CardId>, mut out: W) -> Result<()> {
    let card = Card::simple(text, id);
    serde_json::to_writer_pretty(&mut out, &card)?;
    writeln!(out)?;
    Ok(())
}

/// Echo a wiki page, optionally adding a new card to it first.
pub fn wiki<R: Read, W: Write>(input: R, add: Option<&str>, settings: &Settings, out: W) -> Result<()> {
    let mut doc = WikiDocument::load_from(input, &settings.markup).context("could not read wiki page")?;
    if let Some(text) = add {
        doc.add_card(Card::simple(text, None))?;
    }
    doc.save_to(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backup_appends_extension() {
        assert_eq!(backup_path(Path::new("dir/deck.txt")), PathBuf::from("dir/deck.txt.bak"));
    }

    #[test]
    fn card_prints_fields_and_id() {
        let mut out = Vec::new();
        card("front:back", Some(3), &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["id"], 3);
        assert_eq!(value["fields"]["Text 1"], "front");
        assert_eq!(value["fields"]["Text 2"], "back");
    }

    #[test]
    fn card_without_id_omits_it() {
        let mut out = Vec::new();
        card("front", None, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert!(value.get("id").is_none());
    }
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use spaced_compiler::{fingerprint, parse_bundle};

use crate::config;
use crate::error::Result;

pub fn run(bundle_path: &Path, skip_duplicates: bool) -> Result<()> {
    let bytes = fs::read(bundle_path)?;
    let bundle = parse_bundle(&bytes)?;

    let media_dir = config::media_dir()?;
    fs::create_dir_all(&media_dir)?;

    // Extract every asset entry once; placeholders are bundle-global, so
    // one replacement map serves all cards.
    let mut replacements: HashMap<String, String> = HashMap::new();
    let mut extracted = 0usize;
    for card in &bundle.manifest.cards {
        for asset in &card.assets {
            if replacements.contains_key(&asset.placeholder) {
                continue;
            }

            let data = bundle.asset_bytes(card, &asset.file)?;
            let file_name = asset.file.strip_prefix("assets/").unwrap_or(&asset.file);
            let target = media_dir.join(file_name);
            if !target.exists() {
                fs::write(&target, data)?;
                extracted += 1;
            }
            replacements.insert(asset.placeholder.clone(), target.display().to_string());
        }
    }

    let mut client = super::open_client()?;

    let mut seen: HashSet<String> = HashSet::new();
    if skip_duplicates {
        for card in client.projection().cards().iter() {
            seen.insert(fingerprint(&card.front, &card.back));
        }
    }

    let mut created = 0usize;
    let mut skipped = 0usize;
    for card in &bundle.manifest.cards {
        let (front, back) = spaced_compiler::replace_placeholder_links(card, &replacements)?;

        if skip_duplicates {
            let print = fingerprint(&front, &back);
            if !seen.insert(print) {
                skipped += 1;
                continue;
            }
        }

        client.create_card(&front, &back, &[], None)?;
        created += 1;
    }

    println!("Imported {created} cards ({skipped} duplicates skipped)");
    println!("Assets extracted: {extracted}");
    if !bundle.manifest.warnings.is_empty() {
        println!("Bundle warnings: {}", bundle.manifest.warnings.len());
    }

    Ok(())
}

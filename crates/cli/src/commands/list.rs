// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;

pub fn run(decks: bool, json: bool) -> Result<()> {
    let client = super::open_client()?;
    let projection = client.projection();

    if decks {
        let decks = projection.decks();
        if json {
            println!("{}", serde_json::to_string_pretty(&*decks)?);
            return Ok(());
        }

        for deck in decks.iter() {
            if deck.description.is_empty() {
                println!("{}  {}", deck.id, deck.name);
            } else {
                println!("{}  {}  ({})", deck.id, deck.name, deck.description);
            }
        }
        println!("{} decks", decks.len());
        return Ok(());
    }

    let cards = projection.cards();
    if json {
        println!("{}", serde_json::to_string_pretty(&*cards)?);
        return Ok(());
    }

    for card in cards.iter() {
        let front = first_line(&card.front, 60);
        println!(
            "{}  {:<10}  due {}  {}",
            card.id,
            card.scheduling.state,
            card.scheduling.due.format("%Y-%m-%d"),
            front
        );
    }
    println!("{} cards", cards.len());

    Ok(())
}

/// First line of a card's text, truncated for table display.
fn first_line(text: &str, max_chars: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= max_chars {
        return line.to_string();
    }
    let truncated: String = line.chars().take(max_chars).collect();
    format!("{truncated}…")
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;

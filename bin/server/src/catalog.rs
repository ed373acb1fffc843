//! Static minigame catalogue shown on the parlour landing page.

use axum::Json;
use serde::Serialize;

/// A minigame listed in the parlour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Game {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub tagline: &'static str,
    pub players: &'static str,
}

/// Every game in the parlour, in landing-page order.
pub const GAMES: &[Game] = &[
    Game {
        id: "big-blast",
        name: "Big Blast",
        emoji: "💣",
        tagline: "Detonate or dodge in a high-stakes bomb party.",
        players: "2-4 players",
    },
    Game {
        id: "blackcat",
        name: "Blackcat",
        emoji: "🃏",
        tagline: "Outsmart the house with playful blackjack flair.",
        players: "vs House",
    },
    Game {
        id: "connect4tress",
        name: "Connect4tress",
        emoji: "🔴",
        tagline: "Stack power pieces and trigger candy cascades.",
        players: "Strategic",
    },
    Game {
        id: "coinflip",
        name: "Coinflip",
        emoji: "🪙",
        tagline: "Double-or-nothing coin theatrics.",
        players: "Quick play",
    },
];

/// Lists the catalogue.
pub async fn games() -> Json<&'static [Game]> {
    Json(GAMES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn game_ids_are_unique() {
        let ids: HashSet<&str> = GAMES.iter().map(|g| g.id).collect();
        assert_eq!(ids.len(), GAMES.len());
    }

    #[test]
    fn catalogue_serializes_all_fields() {
        let json = serde_json::to_value(GAMES[0]).expect("serialize");
        assert_eq!(json["id"], "big-blast");
        assert_eq!(json["players"], "2-4 players");
    }
}

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Match, PlayerId};

/// Win rate assumed for a pair that has never met
pub const UNINFORMED_WIN_RATE: f64 = 0.5;

/// Pair key whose orientation is fixed by the first match between the two players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairKey {
    pub first: PlayerId,
    pub second: PlayerId,
}

impl PairKey {
    pub fn new(first: PlayerId, second: PlayerId) -> Self {
        Self { first, second }
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.second, self.first)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadToHeadStats {
    /// Wins of the key's first player
    pub wins1: u32,
    /// Wins of the key's second player
    pub wins2: u32,
    pub total: u32,
}

/// Pairwise meeting statistics, looked up independently of player order
#[derive(Debug, Clone, Default)]
pub struct HeadToHeadTable {
    entries: HashMap<PairKey, HeadToHeadStats>,
}

impl HeadToHeadTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates head-to-head statistics over a match history
    pub fn aggregate<'a, I>(matches: I) -> Self
    where
        I: IntoIterator<Item = &'a Match>,
    {
        let mut table = Self::new();
        for game in matches {
            table.record(game);
        }
        table
    }

    pub fn record(&mut self, game: &Match) {
        let key = self
            .key(game.player1_id, game.player2_id)
            .unwrap_or_else(|| PairKey::new(game.player1_id, game.player2_id));

        let stats = self.entries.entry(key).or_default();
        stats.total += 1;
        if game.winner_id == key.first {
            stats.wins1 += 1;
        } else {
            stats.wins2 += 1;
        }
    }

    /// Stored key for the pair, in whichever orientation it was created
    pub fn key(&self, a: PlayerId, b: PlayerId) -> Option<PairKey> {
        let forward = PairKey::new(a, b);
        if self.entries.contains_key(&forward) {
            return Some(forward);
        }
        let reverse = forward.reversed();
        self.entries.contains_key(&reverse).then_some(reverse)
    }

    /// Statistics for the pair; `(a, b)` and `(b, a)` resolve to the same entry
    pub fn get(&self, a: PlayerId, b: PlayerId) -> Option<&HeadToHeadStats> {
        self.key(a, b).and_then(|key| self.entries.get(&key))
    }

    /// Share of meetings won by the first player of the stored key.
    ///
    /// The orientation is the key's, not the query's, so `(a, b)` and `(b, a)`
    /// give the same value. Persisted model weights were learned on this value.
    pub fn win_rate(&self, a: PlayerId, b: PlayerId) -> f64 {
        match self.get(a, b) {
            Some(stats) if stats.total > 0 => f64::from(stats.wins1) / f64::from(stats.total),
            _ => UNINFORMED_WIN_RATE,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PairKey, &HeadToHeadStats)> {
        self.entries.iter()
    }
}

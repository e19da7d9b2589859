//! Memory-match board and transitions.
//!
//! Every transition takes `&self` and returns the next state. Moves that
//! violate a precondition return `None` instead of failing, so racy or
//! replayed UI events can never break a session.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::{Difficulty, DifficultyConfig};
use super::scoring::calculate_score;

/// A card slot on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u32,
    /// Face symbol. Every value appears on exactly two cards.
    pub value: String,
    pub is_flipped: bool,
    pub is_matched: bool,
    /// Fixed slot index; never changes after dealing.
    pub position: usize,
}

/// Full game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub difficulty: Difficulty,
    pub cards: Vec<Card>,
    /// Face-up cards awaiting resolution, at most two.
    pub flipped_cards: Vec<u32>,
    pub matched_pairs: u32,
    pub total_pairs: u32,
    pub moves: u32,
    /// Seconds, as last reported by the caller.
    pub time_elapsed: u32,
    pub score: u32,
    pub is_complete: bool,
    pub is_paused: bool,
}

/// Deal a new game with the thread-local RNG.
pub fn initialize_game(config: &DifficultyConfig) -> GameState {
    GameState::new(config, &mut rand::thread_rng())
}

impl GameState {
    /// Deal two cards per symbol and shuffle their values in place.
    ///
    /// Card ids and positions keep their pre-shuffle order; only the values
    /// move, so the rendered layout is stable.
    pub fn new<R: Rng + ?Sized>(config: &DifficultyConfig, rng: &mut R) -> Self {
        let mut values: Vec<String> = config
            .symbols
            .iter()
            .flat_map(|s| [s.clone(), s.clone()])
            .collect();
        values.shuffle(rng);

        let cards = values
            .into_iter()
            .enumerate()
            .map(|(position, value)| Card {
                id: position as u32,
                value,
                is_flipped: false,
                is_matched: false,
                position,
            })
            .collect();

        Self {
            difficulty: config.difficulty,
            cards,
            flipped_cards: Vec::with_capacity(2),
            matched_pairs: 0,
            total_pairs: config.pairs() as u32,
            moves: 0,
            time_elapsed: 0,
            score: 0,
            is_complete: false,
            is_paused: false,
        }
    }

    pub fn card(&self, card_id: u32) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    fn card_index(&self, card_id: u32) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }

    /// Turn a card face up.
    ///
    /// Ignored while paused or complete, for unknown, face-up, or matched
    /// cards, and when two cards are already pending.
    pub fn flip_card(&self, card_id: u32) -> Option<GameState> {
        if self.is_paused || self.is_complete || self.flipped_cards.len() >= 2 {
            tracing::debug!(card_id, "flip ignored: board not accepting flips");
            return None;
        }
        let index = self.card_index(card_id)?;
        let card = &self.cards[index];
        if card.is_flipped || card.is_matched {
            tracing::debug!(card_id, "flip ignored: card already face up");
            return None;
        }

        let mut next = self.clone();
        next.cards[index].is_flipped = true;
        next.flipped_cards.push(card_id);
        Some(next)
    }

    /// Resolve the two pending cards. Counts as one move either way.
    ///
    /// A mismatch leaves both cards face up until [`reset_flipped`] is
    /// called, so the presentation layer decides how long they stay visible.
    ///
    /// [`reset_flipped`]: GameState::reset_flipped
    pub fn check_match(&self) -> Option<GameState> {
        let &[first, second] = self.flipped_cards.as_slice() else {
            return None;
        };
        let a = self.card_index(first)?;
        let b = self.card_index(second)?;

        let mut next = self.clone();
        next.moves += 1;
        if next.cards[a].value == next.cards[b].value {
            next.cards[a].is_matched = true;
            next.cards[b].is_matched = true;
            next.flipped_cards.clear();
            next.matched_pairs += 1;
            next.is_complete = next.is_complete || next.matched_pairs == next.total_pairs;
        }
        Some(next)
    }

    /// Turn every unmatched face-up card back down.
    pub fn reset_flipped(&self) -> GameState {
        let mut next = self.clone();
        for card in next.cards.iter_mut().filter(|c| c.is_flipped && !c.is_matched) {
            card.is_flipped = false;
        }
        next.flipped_cards.clear();
        next
    }

    /// Record the caller's clock reading.
    pub fn update_time(&self, seconds: u32) -> GameState {
        GameState {
            time_elapsed: seconds,
            ..self.clone()
        }
    }

    pub fn toggle_pause(&self) -> GameState {
        GameState {
            is_paused: !self.is_paused,
            ..self.clone()
        }
    }

    /// Store the final score once the board is cleared.
    pub fn with_final_score(&self, config: &DifficultyConfig) -> GameState {
        GameState {
            score: calculate_score(self, config),
            ..self.clone()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn seeded(config: &DifficultyConfig, seed: u64) -> GameState {
        GameState::new(config, &mut StdRng::seed_from_u64(seed))
    }

    /// Card id pairs sharing a value, in board order of the first card.
    pub(crate) fn pairs_of(state: &GameState) -> Vec<(u32, u32)> {
        let mut by_value: HashMap<&str, Vec<u32>> = HashMap::new();
        for card in &state.cards {
            by_value.entry(card.value.as_str()).or_default().push(card.id);
        }
        let mut pairs: Vec<(u32, u32)> = by_value.values().map(|ids| (ids[0], ids[1])).collect();
        pairs.sort();
        pairs
    }

    /// Clear the board in exactly `total_pairs` moves.
    pub(crate) fn play_perfect(mut state: GameState) -> GameState {
        for (a, b) in pairs_of(&state) {
            state = state.flip_card(a).unwrap();
            state = state.flip_card(b).unwrap();
            state = state.check_match().unwrap();
        }
        state
    }

    /// Two ids with different values.
    fn mismatched(state: &GameState) -> (u32, u32) {
        let first = &state.cards[0];
        let other = state.cards.iter().find(|c| c.value != first.value).unwrap();
        (first.id, other.id)
    }

    #[test]
    fn every_tier_deals_perfect_pairs() {
        for tier in Difficulty::ALL {
            let config = DifficultyConfig::for_tier(tier);
            let state = initialize_game(&config);
            assert_eq!(state.cards.len(), 2 * config.pairs());
            assert_eq!(state.total_pairs as usize, config.pairs());

            let mut counts: HashMap<&str, usize> = HashMap::new();
            for card in &state.cards {
                *counts.entry(card.value.as_str()).or_default() += 1;
            }
            assert_eq!(counts.len(), config.pairs());
            assert!(counts.values().all(|&n| n == 2), "{tier}: {counts:?}");
        }
    }

    #[test]
    fn positions_are_stable_and_state_starts_clean() {
        let config = DifficultyConfig::for_tier(Difficulty::Medium);
        let state = seeded(&config, 7);
        for (i, card) in state.cards.iter().enumerate() {
            assert_eq!(card.position, i);
            assert_eq!(card.id, i as u32);
            assert!(!card.is_flipped && !card.is_matched);
        }
        assert_eq!(state.moves, 0);
        assert_eq!(state.matched_pairs, 0);
        assert_eq!(state.score, 0);
        assert!(!state.is_complete && !state.is_paused);
        assert!(state.flipped_cards.is_empty());
    }

    #[test]
    fn seeded_shuffle_is_reproducible() {
        let config = DifficultyConfig::for_tier(Difficulty::Hard);
        assert_eq!(seeded(&config, 42), seeded(&config, 42));
    }

    #[test]
    fn shuffle_permutes_values() {
        let config = DifficultyConfig::for_tier(Difficulty::Expert);
        let dealt_in_order: Vec<String> = config
            .symbols
            .iter()
            .flat_map(|s| [s.clone(), s.clone()])
            .collect();

        let layouts: Vec<Vec<String>> = (0..8)
            .map(|seed| {
                seeded(&config, seed)
                    .cards
                    .into_iter()
                    .map(|c| c.value)
                    .collect()
            })
            .collect();

        assert!(layouts.iter().all(|l| l != &dealt_in_order));
        assert!(layouts.windows(2).any(|w| w[0] != w[1]));
        for layout in &layouts {
            let mut sorted = layout.clone();
            sorted.sort();
            let mut expected = dealt_in_order.clone();
            expected.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn flip_guards() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 1);

        assert!(state.flip_card(999).is_none());

        let one = state.flip_card(0).unwrap();
        assert_eq!(one.flipped_cards, vec![0]);
        assert!(one.card(0).unwrap().is_flipped);
        assert!(one.flip_card(0).is_none(), "already face up");

        let paused = state.toggle_pause();
        assert!(paused.flip_card(0).is_none());
        assert!(paused.toggle_pause().flip_card(0).is_some());
    }

    #[test]
    fn flip_rejected_with_two_pending() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 3);
        let (a, b) = mismatched(&state);
        let two = state.flip_card(a).unwrap().flip_card(b).unwrap();
        for card in &two.cards {
            assert!(two.flip_card(card.id).is_none());
        }

        // A matched card stays ineligible too.
        let (x, y) = pairs_of(&state)[0];
        let matched = state
            .flip_card(x)
            .unwrap()
            .flip_card(y)
            .unwrap()
            .check_match()
            .unwrap();
        assert!(matched.flip_card(x).is_none());
        assert!(matched.reset_flipped().flip_card(y).is_none());
    }

    #[test]
    fn check_match_needs_two_cards() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 5);
        assert!(state.check_match().is_none());
        assert!(state.flip_card(0).unwrap().check_match().is_none());
    }

    #[test]
    fn matching_pair_resolves() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 9);
        let (a, b) = pairs_of(&state)[0];
        let next = state
            .flip_card(a)
            .unwrap()
            .flip_card(b)
            .unwrap()
            .check_match()
            .unwrap();
        assert!(next.card(a).unwrap().is_matched);
        assert!(next.card(b).unwrap().is_matched);
        assert_eq!(next.matched_pairs, 1);
        assert_eq!(next.moves, 1);
        assert!(next.flipped_cards.is_empty());
        assert!(!next.is_complete);
    }

    #[test]
    fn mismatch_keeps_cards_up_until_reset() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 11);
        let (a, b) = mismatched(&state);
        let next = state
            .flip_card(a)
            .unwrap()
            .flip_card(b)
            .unwrap()
            .check_match()
            .unwrap();
        assert_eq!(next.moves, 1);
        assert_eq!(next.matched_pairs, 0);
        assert_eq!(next.flipped_cards, vec![a, b]);
        assert!(next.card(a).unwrap().is_flipped);
        assert!(next.card(b).unwrap().is_flipped);

        let reset = next.reset_flipped();
        assert!(reset.flipped_cards.is_empty());
        assert!(reset.cards.iter().all(|c| !c.is_flipped));
        assert_eq!(reset.reset_flipped(), reset, "reset is idempotent");
    }

    #[test]
    fn completion_is_monotonic() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let done = play_perfect(seeded(&config, 13));
        assert!(done.is_complete);
        assert_eq!(done.matched_pairs, done.total_pairs);
        assert_eq!(done.moves, done.total_pairs);

        assert!(done.flip_card(0).is_none());
        assert!(done.reset_flipped().is_complete);
        assert!(done.toggle_pause().toggle_pause().is_complete);
        assert!(done.update_time(500).is_complete);
    }

    #[test]
    fn update_time_overwrites() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 17).update_time(40).update_time(12);
        assert_eq!(state.time_elapsed, 12);
    }

    #[test]
    fn final_score_only_once_complete() {
        let config = DifficultyConfig::for_tier(Difficulty::Easy);
        let state = seeded(&config, 19);
        assert_eq!(state.with_final_score(&config).score, 0);

        let done = play_perfect(state).update_time(60).with_final_score(&config);
        assert_eq!(done.score, 1500);
    }
}

//! Server-held game sessions.
//!
//! Each session owns an independent [`GameState`]; nothing is shared between
//! games. Idle sessions expire after a TTL measured against caller-supplied
//! instants.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use rand::Rng;
use uuid::Uuid;

use super::difficulty::{Difficulty, DifficultyConfig};
use super::state::GameState;

/// One live game.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub config: DifficultyConfig,
    pub state: GameState,
    last_touched: Instant,
}

impl GameSession {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_touched) > ttl
    }
}

/// Arena of game sessions keyed by id.
#[derive(Debug)]
pub struct GameSessions {
    ttl: Duration,
    sessions: HashMap<Uuid, GameSession>,
}

impl GameSessions {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: HashMap::new(),
        }
    }

    /// Deal a new game and return its session id.
    pub fn create<R: Rng + ?Sized>(
        &mut self,
        difficulty: Difficulty,
        rng: &mut R,
        now: Instant,
    ) -> Uuid {
        let config = DifficultyConfig::for_tier(difficulty);
        let state = GameState::new(&config, rng);
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            GameSession {
                config,
                state,
                last_touched: now,
            },
        );
        tracing::debug!(session = %id, %difficulty, "game session created");
        id
    }

    pub fn get(&self, id: &Uuid) -> Option<&GameSession> {
        self.sessions.get(id)
    }

    /// Run a transition against a session's state.
    ///
    /// Returns `None` for unknown or expired sessions, otherwise whether the
    /// transition was accepted. Either way a live session is touched.
    pub fn apply<F>(&mut self, id: &Uuid, now: Instant, transition: F) -> Option<bool>
    where
        F: FnOnce(&GameState, &DifficultyConfig) -> Option<GameState>,
    {
        if self.sessions.get(id)?.is_expired(now, self.ttl) {
            self.sessions.remove(id);
            return None;
        }
        let session = self.sessions.get_mut(id)?;
        session.last_touched = now;
        match transition(&session.state, &session.config) {
            Some(next) => {
                session.state = next;
                Some(true)
            }
            None => Some(false),
        }
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<GameSession> {
        self.sessions.remove(id)
    }

    /// Drop every session idle for longer than the TTL.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let before = self.sessions.len();
        let ttl = self.ttl;
        self.sessions.retain(|_, s| !s.is_expired(now, ttl));
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "expired game sessions evicted");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

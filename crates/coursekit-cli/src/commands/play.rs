//! The `coursekit play` command.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use coursekit_core::game::{
    get_game_stats, Difficulty, DifficultyConfig, GameSessions, GameState,
};
use coursekit_store::config::load_config_from;

pub fn execute(
    difficulty: Option<String>,
    seed: Option<u64>,
    auto: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let difficulty = match difficulty {
        Some(d) => d
            .parse::<Difficulty>()
            .map_err(|e: String| anyhow::anyhow!("{}", e))?,
        None => config.default_difficulty,
    };

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut table = Table::open(difficulty, config.session_ttl(), &mut rng)?;
    tracing::debug!(%difficulty, ?seed, session = %table.id, "dealt board");

    let game_config = table.config.clone();
    println!(
        "Memory match: {difficulty} ({} pairs on a {} grid, {}s)",
        game_config.pairs(),
        game_config.grid,
        game_config.time_limit
    );

    let clock = Instant::now();
    if auto {
        play_auto(&mut table, &clock);
    } else {
        play_interactive(&mut table, &clock)?;
    }

    print_summary(&table.last, &game_config);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Accepted,
    Ignored,
    Expired,
}

/// A single game session and the last state seen from it.
struct Table {
    sessions: GameSessions,
    id: Uuid,
    ttl: Duration,
    config: DifficultyConfig,
    last: GameState,
}

impl Table {
    fn open(difficulty: Difficulty, ttl: Duration, rng: &mut StdRng) -> Result<Self> {
        let mut sessions = GameSessions::new(ttl);
        let id = sessions.create(difficulty, rng, Instant::now());
        let session = sessions
            .get(&id)
            .context("game session vanished after creation")?;
        let (config, last) = (session.config.clone(), session.state.clone());
        Ok(Self {
            sessions,
            id,
            ttl,
            config,
            last,
        })
    }

    fn apply<F>(&mut self, transition: F) -> Step
    where
        F: FnOnce(&GameState) -> Option<GameState>,
    {
        match self
            .sessions
            .apply(&self.id, Instant::now(), |state, _| transition(state))
        {
            None => Step::Expired,
            Some(false) => Step::Ignored,
            Some(true) => {
                if let Some(session) = self.sessions.get(&self.id) {
                    self.last = session.state.clone();
                }
                Step::Accepted
            }
        }
    }
}

fn elapsed_secs(clock: &Instant) -> u32 {
    u32::try_from(clock.elapsed().as_secs()).unwrap_or(u32::MAX)
}

/// Clear the board in the minimum number of moves.
fn play_auto(table: &mut Table, clock: &Instant) {
    let mut by_value: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for card in &table.last.cards {
        by_value.entry(card.value.clone()).or_default().push(card.id);
    }

    for ids in by_value.values() {
        let &[a, b] = ids.as_slice() else {
            continue;
        };
        let step = table.apply(|s| {
            s.flip_card(a)
                .and_then(|s| s.flip_card(b))
                .and_then(|s| s.check_match())
        });
        if step == Step::Expired {
            return;
        }
    }

    let secs = elapsed_secs(clock);
    table.apply(|s| Some(s.update_time(secs)));
}

fn play_interactive(table: &mut Table, clock: &Instant) -> Result<()> {
    println!("Enter a card number to flip it, 'p' to pause, 'q' to quit.");
    render(&table.last, &table.config);

    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let secs = elapsed_secs(clock);
        if table.apply(|s| Some(s.update_time(secs))) == Step::Expired {
            println!("Session expired after {}s idle.", table.ttl.as_secs());
            break;
        }

        let input = line.trim();
        match input {
            "" => continue,
            "q" | "quit" => break,
            "p" | "pause" => {
                table.apply(|s| Some(s.toggle_pause()));
                println!("{}", if table.last.is_paused { "Paused." } else { "Resumed." });
                continue;
            }
            _ => {}
        }

        let Ok(card_id) = input.parse::<u32>() else {
            println!("Enter a card number, 'p' to pause or 'q' to quit.");
            continue;
        };
        if table.apply(|s| s.flip_card(card_id)) != Step::Accepted {
            println!("Card {card_id} can't be flipped right now.");
            continue;
        }

        if table.apply(|s| s.check_match()) == Step::Accepted {
            render(&table.last, &table.config);
            if table.last.flipped_cards.is_empty() {
                println!("Match!");
            } else {
                println!("No match.");
                table.apply(|s| Some(s.reset_flipped()));
            }
            if table.last.is_complete {
                break;
            }
        } else {
            render(&table.last, &table.config);
        }
    }

    Ok(())
}

fn render(state: &GameState, config: &DifficultyConfig) {
    let mut cards: Vec<_> = state.cards.iter().collect();
    cards.sort_by_key(|c| c.position);
    for row in cards.chunks(config.grid.cols) {
        let cells: Vec<String> = row
            .iter()
            .map(|c| {
                if c.is_flipped || c.is_matched {
                    format!("[{:^4}]", c.value)
                } else {
                    format!("[{:^4}]", c.id)
                }
            })
            .collect();
        println!("{}", cells.join(" "));
    }
}

fn print_summary(state: &GameState, config: &DifficultyConfig) {
    let state = state.with_final_score(config);
    let stats = get_game_stats(&state, config);

    println!();
    println!("Moves: {}", stats.moves);
    println!(
        "Time: {}s ({}s remaining)",
        stats.time_elapsed, stats.time_remaining
    );
    println!("Accuracy: {}%", stats.accuracy);
    if state.is_complete {
        println!("Cleared {}! Score: {}", stats.difficulty, state.score);
    } else {
        println!(
            "Game abandoned after {} of {} pairs.",
            stats.matched_pairs, stats.total_pairs
        );
    }
}

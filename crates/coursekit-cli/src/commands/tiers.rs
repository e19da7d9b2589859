//! The `coursekit tiers` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use coursekit_core::game::{Difficulty, DifficultyConfig};

pub fn execute() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Tier", "Pairs", "Grid", "Time limit", "Multiplier"]);

    for tier in Difficulty::ALL {
        let config = DifficultyConfig::for_tier(tier);
        table.add_row(vec![
            Cell::new(tier),
            Cell::new(config.pairs()),
            Cell::new(config.grid),
            Cell::new(format!("{}s", config.time_limit)),
            Cell::new(format!("x{}", tier.multiplier())),
        ]);
    }

    println!("{table}");
    Ok(())
}

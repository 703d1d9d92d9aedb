//! Prints the leaderboard's unverified runs as a table.

use anyhow::Context;
use clap::Parser;
use mmrta_core::{MmrtaClient, Run, DEFAULT_BASE_URL};
use prettytable::{row, Table};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API base address
    #[arg(long, env = "MMRTA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Don't ask the API to inline game and user details
    #[arg(long)]
    collapsed: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let client = MmrtaClient::with_base_url(&args.base_url)
        .context("Can't create new client")?;
    tracing::debug!(
        base_url = %client.base_url(),
        expanded = !args.collapsed,
        "fetching unverified runs"
    );
    let runs = client
        .get_unverified_runs(!args.collapsed)
        .context("Can't get runs")?;

    println!("{}", runs_table(&runs));
    Ok(())
}

fn runs_table(runs: &[Run]) -> Table {
    let mut table = Table::new();
    table.set_titles(row!["Run Id", "Game", "Category", "User"]);
    for run in runs {
        table.add_row(row![run.id, game_cell(run), run.category, user_cell(run)]);
    }
    table
}

/// Game name when expanded, otherwise the bare id.
fn game_cell(run: &Run) -> String {
    match (&run.game, run.game_id) {
        (Some(game), _) => game.name.clone(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => "-".to_string(),
    }
}

fn user_cell(run: &Run) -> String {
    match (run.display_name(), run.user_id) {
        (Some(name), _) => name.to_string(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use mmrta_core::{Game, User};

    use super::*;

    fn expanded_run() -> Run {
        Run {
            id: 11,
            user_id: Some(3),
            game_id: Some(2),
            game: Some(Game {
                id: 2,
                name: "Mega Man 2".to_string(),
                ..Default::default()
            }),
            user: Some(User {
                id: 3,
                name: "Alice".to_string(),
                ..Default::default()
            }),
            category: "Mega Man 2 Any%".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn cells_use_expanded_details() {
        let run = expanded_run();
        assert_eq!(game_cell(&run), "Mega Man 2");
        assert_eq!(user_cell(&run), "Alice");
    }

    #[test]
    fn cells_fall_back_to_ids_and_runner() {
        let registered = Run {
            user_id: Some(3),
            game_id: Some(2),
            ..Default::default()
        };
        assert_eq!(game_cell(&registered), "#2");
        assert_eq!(user_cell(&registered), "#3");

        let guest = Run {
            runner: Some("Bob".to_string()),
            ..Default::default()
        };
        assert_eq!(game_cell(&guest), "-");
        assert_eq!(user_cell(&guest), "Bob");
    }

    #[test]
    fn table_has_header_and_one_row_per_run() {
        let table = runs_table(&[expanded_run(), Run::default()]);
        // Titles are not counted.
        assert_eq!(table.len(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("Run Id"));
        assert!(rendered.contains("Mega Man 2 Any%"));
        assert!(rendered.contains("Alice"));
    }

    #[test]
    fn args_default_to_expanded_public_api() {
        let args = Args::try_parse_from(["mmrta"]).unwrap();
        assert!(!args.collapsed);
        // The env var may be set on a developer machine.
        if std::env::var_os("MMRTA_BASE_URL").is_none() {
            assert_eq!(args.base_url, DEFAULT_BASE_URL);
        }

        let args =
            Args::try_parse_from(["mmrta", "--collapsed", "--base-url", "http://x/api/"]).unwrap();
        assert!(args.collapsed);
        assert_eq!(args.base_url, "http://x/api/");
    }
}

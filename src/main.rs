//! Command-line front end for the board-game catalog.
//!
//! Every subcommand opens the catalog, performs one operation and exits;
//! the long-running side lives in `meeplebox-daemon`, which shares the
//! same database file and delivers the queued reminder alerts.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use meeplebox::catalog::{DURATION_BUCKETS, PLAYER_BUCKETS};
use meeplebox::export::{self, ExportFormat};
use meeplebox::notify::{self, Permission};
use meeplebox::{
    Catalog, Config, Difficulty, Game, GameDraft, GameFilter, LeadTime, PlayerDraft, Reminder,
    ReminderDraft, ReminderPeriod,
};

#[derive(Parser)]
#[command(
    name = "meeplebox",
    version = env!("CARGO_PKG_VERSION"),
    about = "Board-game shelf: library, player records and game-night reminders",
    long_about = None
)]
struct Cli {
    /// Use an alternate configuration file
    #[arg(global = true, long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the game library
    Games {
        #[command(subcommand)]
        command: GamesCommand,
    },

    /// Manage the player roster and win records
    Players {
        #[command(subcommand)]
        command: PlayersCommand,
    },

    /// Manage game-night reminders
    Reminders {
        #[command(subcommand)]
        command: RemindersCommand,
    },

    /// Inspect or toggle desktop notification delivery
    Notifications {
        #[command(subcommand)]
        command: NotificationsCommand,
    },

    /// Export a collection to CSV or JSON
    Export {
        /// Collection to export: games, players or reminders
        #[arg(default_value = "games")]
        collection: String,

        /// Export format: csv, json
        #[arg(long, value_name = "FORMAT", default_value = "csv")]
        format: String,

        /// Output file path (default: meeplebox-<collection>.<format>)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Delete every game, player, reminder and stored photo
    Wipe {
        /// Confirm the wipe; without this flag nothing is touched
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum GamesCommand {
    /// Add a game to the library
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        genre: String,

        /// Player-count descriptor, e.g. "2-4" or "3+"
        #[arg(long)]
        players: String,

        /// Playtime descriptor, e.g. "45min" or "1-2 hours"
        #[arg(long)]
        playtime: String,

        /// Easy, Medium or Hard
        #[arg(long, default_value = "Medium")]
        difficulty: String,

        /// Star rating from 0 to 5
        #[arg(long, default_value_t = 0)]
        rating: u8,

        #[arg(long)]
        description: String,

        #[arg(long, default_value = "")]
        comments: String,

        /// Photo to attach; repeat the flag for several
        #[arg(long = "photo", value_name = "FILE")]
        photos: Vec<PathBuf>,
    },

    /// List games, optionally narrowed by search text and filters
    List {
        /// Match against title, genre and description
        #[arg(long)]
        search: Option<String>,

        /// Genre substring (case sensitive)
        #[arg(long)]
        genre: Option<String>,

        /// Player-count bucket: 1-2, 2-4, 3-6, 4+ or 6+
        #[arg(long)]
        players: Option<String>,

        /// Duration bucket: "< 15 min", "15-30 min", "30-60 min", "1-2 hours" or "2+ hours"
        #[arg(long)]
        duration: Option<String>,

        /// Easy, Medium or Hard
        #[arg(long)]
        difficulty: Option<String>,
    },

    /// Remove a game and its stored photos
    Delete { id: Uuid },

    /// Pick a random game for tonight
    Random,

    /// List every genre present in the library
    Genres,
}

#[derive(Subcommand)]
enum PlayersCommand {
    /// Add a player to the roster
    Add {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        description: String,

        /// Portrait photo
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,
    },

    /// List players with their win records
    List,

    /// Update a player; omitted flags keep the current values
    Edit {
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Replace the portrait photo
        #[arg(long, value_name = "FILE")]
        photo: Option<PathBuf>,

        /// Set the games-played counter
        #[arg(long)]
        played: Option<u32>,

        /// Set the games-won counter (never raised above played)
        #[arg(long)]
        won: Option<u32>,
    },

    /// Remove a player and their portrait
    Delete { id: Uuid },

    /// Record a finished game for a player
    Record {
        id: Uuid,

        /// The player won this one
        #[arg(long)]
        won: bool,
    },
}

#[derive(Subcommand)]
enum RemindersCommand {
    /// Schedule a game night
    Add {
        /// Title of the game being played
        #[arg(long)]
        game: String,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Start time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        start: NaiveTime,

        /// End time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        end: NaiveTime,

        /// Expected number of players
        #[arg(long, default_value_t = 2)]
        players: u32,

        /// Alert lead time: 1day or 3hours
        #[arg(long, default_value = "1day")]
        notify: String,
    },

    /// List reminders grouped by day
    List {
        /// all, week or month
        #[arg(long, default_value = "all")]
        period: String,
    },

    /// Cancel a reminder and its queued alert
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum NotificationsCommand {
    /// Show the permission state and the queued alerts
    Status,

    /// Grant permission and resume queueing alerts
    Enable,

    /// Revoke permission and drop every queued alert
    Disable,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    meeplebox::logging::init(None)?;

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut catalog = Catalog::open(&config)?;

    match cli.command {
        Commands::Games { command } => handle_games(&mut catalog, command),
        Commands::Players { command } => handle_players(&mut catalog, command),
        Commands::Reminders { command } => handle_reminders(&mut catalog, command),
        Commands::Notifications { command } => handle_notifications(&catalog, command),
        Commands::Export {
            collection,
            format,
            output,
        } => handle_export(&catalog, &collection, &format, output),
        Commands::Wipe { yes } => handle_wipe(&mut catalog, yes),
    }
}

fn handle_games(catalog: &mut Catalog, command: GamesCommand) -> Result<()> {
    match command {
        GamesCommand::Add {
            title,
            genre,
            players,
            playtime,
            difficulty,
            rating,
            description,
            comments,
            photos,
        } => {
            require_field(&title, "title")?;
            require_field(&genre, "genre")?;
            require_field(&players, "players")?;
            require_field(&playtime, "playtime")?;
            require_field(&description, "description")?;
            if rating > 5 {
                bail!("rating must be between 0 and 5");
            }
            let difficulty = parse_difficulty(&difficulty)?;

            let draft = GameDraft {
                title,
                genre,
                players,
                playtime,
                difficulty,
                rating,
                description,
                comments,
            };
            let game = catalog.add_game(draft, &photos);
            println!("Added \"{}\" ({})", game.title, game.id);
            if !photos.is_empty() {
                println!(
                    "Attached {} of {} photo(s)",
                    game.photo_filenames.len(),
                    photos.len()
                );
            }
            Ok(())
        }

        GamesCommand::List {
            search,
            genre,
            players,
            duration,
            difficulty,
        } => {
            if let Some(bucket) = &players {
                if !PLAYER_BUCKETS.contains(&bucket.as_str()) {
                    bail!(
                        "unknown players bucket '{}' (expected one of: {})",
                        bucket,
                        PLAYER_BUCKETS.join(", ")
                    );
                }
            }
            if let Some(bucket) = &duration {
                if !DURATION_BUCKETS.contains(&bucket.as_str()) {
                    bail!(
                        "unknown duration bucket '{}' (expected one of: {})",
                        bucket,
                        DURATION_BUCKETS.join(", ")
                    );
                }
            }
            let filter = GameFilter {
                search,
                genre,
                players,
                duration,
                difficulty: difficulty.as_deref().map(parse_difficulty).transpose()?,
            };

            let games = catalog.filter_games(&filter);
            if games.is_empty() {
                println!("No games match.");
                return Ok(());
            }
            print_games(&games);
            Ok(())
        }

        GamesCommand::Delete { id } => {
            catalog.delete_game(id)?;
            println!("Deleted game {id}");
            Ok(())
        }

        GamesCommand::Random => {
            match catalog.random_game() {
                Some(game) => {
                    println!("Tonight's pick: {}", game.title);
                    println!("  genre:      {}", game.genre);
                    println!("  players:    {}", game.players);
                    println!("  playtime:   {}", game.playtime);
                    println!("  difficulty: {}", game.difficulty.as_str());
                }
                None => println!("The library is empty."),
            }
            Ok(())
        }

        GamesCommand::Genres => {
            let genres = catalog.all_genres();
            if genres.is_empty() {
                println!("No genres yet.");
            }
            for genre in genres {
                println!("{genre}");
            }
            Ok(())
        }
    }
}

fn handle_players(catalog: &mut Catalog, command: PlayersCommand) -> Result<()> {
    match command {
        PlayersCommand::Add {
            name,
            description,
            photo,
        } => {
            require_field(&name, "name")?;
            let had_photo = photo.is_some();
            let player = catalog.add_player(PlayerDraft {
                name,
                description,
                photo,
                games_played: 0,
                games_won: 0,
            });
            println!("Added player \"{}\" ({})", player.name, player.id);
            if had_photo && player.photo_filename.is_none() {
                println!("The portrait could not be read; the player was saved without one.");
            }
            Ok(())
        }

        PlayersCommand::List => {
            let players = catalog.players();
            if players.is_empty() {
                println!("No players yet.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<20} {:>7} {:>5} {:>5}",
                "ID", "NAME", "PLAYED", "WON", "WIN%"
            );
            for player in players {
                println!(
                    "{:<36}  {:<20} {:>7} {:>5} {:>4}%",
                    player.id,
                    player.name,
                    player.games_played,
                    player.games_won,
                    player.win_rate()
                );
            }
            println!("\n{} player(s)", players.len());
            Ok(())
        }

        PlayersCommand::Edit {
            id,
            name,
            description,
            photo,
            played,
            won,
        } => {
            if let Some(name) = &name {
                require_field(name, "name")?;
            }
            let current = catalog
                .players()
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| anyhow!("no player with id {id}"))?;

            let games_played = played.unwrap_or(current.games_played);
            let games_won = won.unwrap_or(current.games_won).min(games_played);
            catalog.update_player(
                id,
                PlayerDraft {
                    name: name.unwrap_or(current.name),
                    description: description.unwrap_or(current.description),
                    photo,
                    games_played,
                    games_won,
                },
            )?;
            println!("Updated player {id}");
            Ok(())
        }

        PlayersCommand::Delete { id } => {
            catalog.delete_player(id)?;
            println!("Deleted player {id}");
            Ok(())
        }

        PlayersCommand::Record { id, won } => {
            if !catalog.players().iter().any(|p| p.id == id) {
                bail!("no player with id {id}");
            }
            catalog.increment_games_played(id);
            if won {
                catalog.increment_games_won(id);
            }
            if let Some(player) = catalog.players().iter().find(|p| p.id == id) {
                println!(
                    "{}: {} played, {} won, {}% win rate",
                    player.name,
                    player.games_played,
                    player.games_won,
                    player.win_rate()
                );
            }
            Ok(())
        }
    }
}

fn handle_reminders(catalog: &mut Catalog, command: RemindersCommand) -> Result<()> {
    match command {
        RemindersCommand::Add {
            game,
            date,
            start,
            end,
            players,
            notify,
        } => {
            require_field(&game, "game")?;
            if players == 0 {
                bail!("players must be at least 1");
            }
            let notify_before = LeadTime::from_str(&notify)
                .ok_or_else(|| anyhow!("unknown lead time '{notify}' (expected 1day or 3hours)"))?;

            let reminder = catalog.add_reminder(ReminderDraft {
                game_title: game,
                date,
                start_time: start,
                end_time: end,
                players_count: players,
                notify_before,
            });
            println!(
                "Reminder set: {} on {} at {}",
                reminder.game_title,
                reminder.date,
                reminder.start_time.format("%H:%M")
            );
            match catalog.notification_permission()? {
                Permission::Granted => println!(
                    "Alert queued for {}",
                    notify::fire_time(&reminder).format("%Y-%m-%d %H:%M")
                ),
                _ => println!("Notifications are off; no alert was queued."),
            }
            Ok(())
        }

        RemindersCommand::List { period } => {
            let period = parse_period(&period)?;
            let reminders = catalog.filter_reminders(period);
            if reminders.is_empty() {
                println!("No reminders.");
                return Ok(());
            }

            let mut grouped: BTreeMap<NaiveDate, Vec<&Reminder>> = BTreeMap::new();
            for reminder in &reminders {
                grouped.entry(reminder.date).or_default().push(reminder);
            }

            let today = Local::now().date_naive();
            for (date, day) in &grouped {
                println!("{}", date_header(*date, today));
                for reminder in day {
                    println!(
                        "  {} - {}  {}  ({} players, {})  {}",
                        reminder.start_time.format("%H:%M"),
                        reminder.end_time.format("%H:%M"),
                        reminder.game_title,
                        reminder.players_count,
                        reminder.notify_before.as_str(),
                        reminder.id
                    );
                }
                println!();
            }
            Ok(())
        }

        RemindersCommand::Delete { id } => {
            catalog.delete_reminder(id)?;
            println!("Deleted reminder {id}");
            Ok(())
        }
    }
}

fn handle_notifications(catalog: &Catalog, command: NotificationsCommand) -> Result<()> {
    match command {
        NotificationsCommand::Status => {
            let permission = catalog.notification_permission()?;
            let pending = catalog.pending_notifications()?;
            println!("Permission: {}", permission.as_str());
            println!("Queued alerts: {}", pending.len());
            for alert in &pending {
                println!("  {}  {}", alert.fire_at, alert.title);
            }
            Ok(())
        }

        NotificationsCommand::Enable => {
            catalog.set_notifications_enabled(true)?;
            println!("Notifications enabled.");
            Ok(())
        }

        NotificationsCommand::Disable => {
            let queued = catalog.pending_notifications()?.len();
            catalog.set_notifications_enabled(false)?;
            if queued > 0 {
                println!("Notifications disabled; dropped {queued} queued alert(s).");
            } else {
                println!("Notifications disabled.");
            }
            Ok(())
        }
    }
}

fn handle_export(
    catalog: &Catalog,
    collection: &str,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let format = match format {
        "csv" => ExportFormat::Csv,
        "json" => ExportFormat::Json,
        other => bail!("unknown format '{other}' (expected csv or json)"),
    };
    let output = output.unwrap_or_else(|| {
        PathBuf::from(format!("meeplebox-{}.{}", collection, format.extension()))
    });
    let written = match collection {
        "games" => export::export_games(catalog.games(), &output, format)?,
        "players" => export::export_players(catalog.players(), &output, format)?,
        "reminders" => export::export_reminders(&catalog.sorted_reminders(), &output, format)?,
        other => bail!("unknown collection '{other}' (expected games, players or reminders)"),
    };
    println!(
        "Exported {} record(s) to {} as {}",
        written,
        output.display(),
        format.name()
    );
    Ok(())
}

fn handle_wipe(catalog: &mut Catalog, yes: bool) -> Result<()> {
    if !yes {
        bail!("refusing to wipe without --yes");
    }
    let games = catalog.games().len();
    let players = catalog.players().len();
    let reminders = catalog.reminders().len();
    catalog.wipe();
    println!("Removed {games} game(s), {players} player(s), {reminders} reminder(s).");
    Ok(())
}

fn print_games(games: &[&Game]) {
    println!(
        "{:<36}  {:<24} {:<14} {:<12} {:<12} {:<7} {}",
        "ID", "TITLE", "GENRE", "PLAYERS", "PLAYTIME", "RATING", "DIFFICULTY"
    );
    for game in games {
        println!(
            "{:<36}  {:<24} {:<14} {:<12} {:<12} {:<7} {}",
            game.id,
            game.title,
            game.genre,
            game.players,
            game.playtime,
            format!("{}/5", game.rating),
            game.difficulty.as_str()
        );
    }
    println!("\n{} game(s)", games.len());
}

/// The original entry form refuses blank required fields; the CLI does
/// the same before touching the catalog.
fn require_field(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} must not be empty");
    }
    Ok(())
}

fn parse_difficulty(s: &str) -> Result<Difficulty> {
    Difficulty::from_str(s)
        .ok_or_else(|| anyhow!("unknown difficulty '{s}' (expected Easy, Medium or Hard)"))
}

fn parse_period(s: &str) -> Result<ReminderPeriod> {
    match s {
        "all" => Ok(ReminderPeriod::All),
        "week" => Ok(ReminderPeriod::ThisWeek),
        "month" => Ok(ReminderPeriod::ThisMonth),
        other => bail!("unknown period '{other}' (expected all, week or month)"),
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| format!("invalid time '{s}' (expected HH:MM)"))
}

/// Headers read TODAY / TOMORROW for the next two days, then the plain
/// date, all uppercased like "AUG 25, 2026".
fn date_header(date: NaiveDate, today: NaiveDate) -> String {
    let formatted = date.format("%b %d, %Y").to_string();
    let header = if date == today {
        format!("TODAY - {formatted}")
    } else if Some(date) == today.succ_opt() {
        format!("TOMORROW - {formatted}")
    } else {
        formatted
    };
    header.to_uppercase()
}

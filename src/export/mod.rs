use anyhow::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::{Game, Player, Reminder};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }
}

/// Flattened game row for export
#[derive(Debug, Serialize)]
pub struct ExportedGame {
    pub id: String,
    pub title: String,
    pub genre: String,
    pub players: String,
    pub playtime: String,
    pub difficulty: String,
    pub rating: u8,
    pub description: String,
    pub comments: String,
    pub photos: String,
    pub date_added: String,
}

#[derive(Debug, Serialize)]
pub struct ExportedPlayer {
    pub id: String,
    pub name: String,
    pub description: String,
    pub games_played: u32,
    pub games_won: u32,
    pub win_rate: u32,
    pub photo: String,
}

#[derive(Debug, Serialize)]
pub struct ExportedReminder {
    pub id: String,
    pub game_title: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub players_count: u32,
    pub notify_before: String,
}

/// Export the games collection to a file. Returns the row count.
pub fn export_games(games: &[Game], output_path: &Path, format: ExportFormat) -> Result<usize> {
    let rows: Vec<ExportedGame> = games
        .iter()
        .map(|g| ExportedGame {
            id: g.id.to_string(),
            title: g.title.clone(),
            genre: g.genre.clone(),
            players: g.players.clone(),
            playtime: g.playtime.clone(),
            difficulty: g.difficulty.as_str().to_string(),
            rating: g.rating,
            description: g.description.clone(),
            comments: g.comments.clone(),
            photos: g.photo_filenames.join(";"),
            date_added: g.date_added.to_rfc3339(),
        })
        .collect();

    match format {
        ExportFormat::Json => export_json(&rows, output_path)?,
        ExportFormat::Csv => games_csv(&rows, output_path)?,
    }
    Ok(rows.len())
}

pub fn export_players(
    players: &[Player],
    output_path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let rows: Vec<ExportedPlayer> = players
        .iter()
        .map(|p| ExportedPlayer {
            id: p.id.to_string(),
            name: p.name.clone(),
            description: p.description.clone(),
            games_played: p.games_played,
            games_won: p.games_won,
            win_rate: p.win_rate(),
            photo: p.photo_filename.clone().unwrap_or_default(),
        })
        .collect();

    match format {
        ExportFormat::Json => export_json(&rows, output_path)?,
        ExportFormat::Csv => players_csv(&rows, output_path)?,
    }
    Ok(rows.len())
}

pub fn export_reminders(
    reminders: &[Reminder],
    output_path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let rows: Vec<ExportedReminder> = reminders
        .iter()
        .map(|r| ExportedReminder {
            id: r.id.to_string(),
            game_title: r.game_title.clone(),
            date: r.date.to_string(),
            start_time: r.start_time.format("%H:%M").to_string(),
            end_time: r.end_time.format("%H:%M").to_string(),
            players_count: r.players_count,
            notify_before: r.notify_before.as_str().to_string(),
        })
        .collect();

    match format {
        ExportFormat::Json => export_json(&rows, output_path)?,
        ExportFormat::Csv => reminders_csv(&rows, output_path)?,
    }
    Ok(rows.len())
}

fn export_json<T: Serialize>(rows: &[T], output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}

fn games_csv(rows: &[ExportedGame], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "id",
        "title",
        "genre",
        "players",
        "playtime",
        "difficulty",
        "rating",
        "description",
        "comments",
        "photos",
        "date_added",
    ])?;

    for row in rows {
        wtr.write_record([
            &row.id,
            &row.title,
            &row.genre,
            &row.players,
            &row.playtime,
            &row.difficulty,
            &row.rating.to_string(),
            &row.description,
            &row.comments,
            &row.photos,
            &row.date_added,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn players_csv(rows: &[ExportedPlayer], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "id",
        "name",
        "description",
        "games_played",
        "games_won",
        "win_rate",
        "photo",
    ])?;

    for row in rows {
        wtr.write_record([
            &row.id,
            &row.name,
            &row.description,
            &row.games_played.to_string(),
            &row.games_won.to_string(),
            &row.win_rate.to_string(),
            &row.photo,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

fn reminders_csv(rows: &[ExportedReminder], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "id",
        "game_title",
        "date",
        "start_time",
        "end_time",
        "players_count",
        "notify_before",
    ])?;

    for row in rows {
        wtr.write_record([
            &row.id,
            &row.game_title,
            &row.date,
            &row.start_time,
            &row.end_time,
            &row.players_count.to_string(),
            &row.notify_before,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

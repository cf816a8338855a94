use crate::api::CollectionKind;
use crate::models::{CollectionEntry, Credential, Notification, Recommendations, Severity};
use colored::*;
use serde_json::Value;

/// Print queued notifications, newest first, coloured by severity
pub fn display_notifications(notifications: &[Notification]) {
    for notification in notifications {
        let tag = format!("[{}]", notification.severity);
        let tag = match notification.severity {
            Severity::Success => tag.green(),
            Severity::Info => tag.cyan(),
            Severity::Warning => tag.yellow(),
            Severity::Error => tag.red(),
        };
        eprintln!("{} {}", tag, notification.message);
    }
}

pub fn display_collection(kind: CollectionKind, entries: &[CollectionEntry]) {
    if entries.is_empty() {
        println!("{}", format!("Your {} is empty.", kind).dimmed());
        return;
    }
    println!("{}", format!("{} ({})", kind, entries.len()).bold());
    for entry in entries {
        let year = entry
            .movie
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .map(|y| format!(" ({})", y))
            .unwrap_or_default();
        println!(
            "  {:>8}  {}{}  {}",
            entry.movie_id.to_string().cyan(),
            entry.movie.title,
            year,
            format!("added {}", entry.added_at.format("%Y-%m-%d")).dimmed()
        );
    }
}

pub fn display_recommendations(recommendations: &Recommendations) {
    if recommendations.is_empty() {
        println!("{}", "No recommendations yet. Rate a few movies first.".dimmed());
        return;
    }
    if !recommendations.recommendations.is_empty() {
        println!("{}", "Recommended for you".bold());
        for movie in &recommendations.recommendations {
            println!("  {:>8}  {}", movie.id.to_string().cyan(), movie.title);
        }
    }
    if !recommendations.rated_movies.is_empty() {
        println!("{}", "Your ratings".bold());
        for rated in &recommendations.rated_movies {
            println!(
                "  {:>8}  {}  {}",
                rated.movie.id.to_string().cyan(),
                rated.movie.title,
                format!("{}/10", rated.rating).yellow()
            );
        }
    }
}

pub fn display_user(credential: &Credential) {
    let user = &credential.user;
    println!("{} {}", "Logged in as".green(), user.username.bold());
    if let Some(email) = &user.email {
        println!("  {}", email.dimmed());
    }
    println!(
        "  {}",
        format!("access token expires {}", credential.expiry.format("%Y-%m-%d %H:%M UTC")).dimmed()
    );
}

pub fn display_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{}", pretty),
        Err(_) => println!("{}", value),
    }
}

pub fn display_error(message: &str) {
    eprintln!("{} {}", "Error:".red(), message);
}

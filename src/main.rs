use anyhow::{anyhow, Result};
use clap::Parser;
use colored::*;
use std::process;

use cinesync::api::{CollectionKind, Registration};
use cinesync::cli::{Args, CollectionAction, Command};
use cinesync::config::Config;
use cinesync::logging::init_tracing;
use cinesync::ui::{
    display_collection, display_error, display_json, display_notifications,
    display_recommendations, display_user,
};
use cinesync::MovieClient;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            display_error(&e);
            process::exit(1);
        }
    };
    init_tracing(config.verbose);

    let client = match MovieClient::from_config(&config) {
        Ok(client) => client,
        Err(e) => {
            display_error(&e.to_string());
            process::exit(1);
        }
    };

    let outcome = run(&client, args.command).await;
    display_notifications(&client.notifications().list());

    if let Err(e) = outcome {
        display_error(&format!("{:#}", e));
        process::exit(1);
    }
}

async fn run(client: &MovieClient, command: Command) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            let user = client.login(&username, &password).await?;
            println!("{} {}", "Welcome back,".green(), user.username.bold());
        }
        Command::Logout => {
            client.session().restore();
            client.logout();
            println!("{}", "Logged out.".green());
        }
        Command::Register {
            username,
            email,
            firstname,
            lastname,
            password,
            confirm_password,
        } => {
            let form = Registration {
                username,
                email,
                firstname,
                lastname,
                password,
                confirm_password,
            };
            client.register(&form).await?;
            println!("{}", "Account created. Log in with `cinesync login`.".green());
        }
        Command::Whoami => {
            client.bootstrap().await;
            match client.session().credential() {
                Some(credential) => display_user(&credential),
                None => println!("{}", "Not logged in.".dimmed()),
            }
        }
        Command::Favorites { action } => {
            client.bootstrap().await;
            run_collection(client, CollectionKind::Favorites, action).await?;
        }
        Command::Watchlist { action } => {
            client.bootstrap().await;
            run_collection(client, CollectionKind::Watchlist, action).await?;
        }
        Command::Movie { id } => {
            let movie = client.movie(id).await?;
            display_json(&movie);
        }
        Command::Search { department, query } => {
            let results = client
                .search(&query.join(" "), Some(department.as_str()))
                .await?;
            display_json(&results);
        }
        Command::Recommendations => {
            if client.bootstrap().await.is_none() {
                return Err(anyhow!("log in to see recommendations"));
            }
            display_recommendations(&client.recommendations().current());
        }
        Command::Rate {
            id,
            rating,
            feedback,
        } => {
            if client.bootstrap().await.is_none() {
                return Err(anyhow!("log in to rate movies"));
            }
            client.recommendations().rate(id, rating, feedback).await?;
            println!("{}", format!("Rated movie {} {}/10.", id, rating).green());
        }
        Command::ClearCache => {
            client.catalog().cache().clear();
            println!("{}", "Cache cleared.".green());
        }
    }
    Ok(())
}

async fn run_collection(
    client: &MovieClient,
    kind: CollectionKind,
    action: CollectionAction,
) -> Result<()> {
    let collection = client.collection(kind);
    match action {
        CollectionAction::List => {
            if !client.session().is_authenticated() {
                return Err(anyhow!("log in to see your {}", kind));
            }
        }
        CollectionAction::Add { id } => {
            collection.add(id).await?;
        }
        CollectionAction::Remove { id } => {
            collection.remove(id).await?;
        }
    }
    display_collection(kind, &collection.entries());
    Ok(())
}

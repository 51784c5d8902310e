use std::fs::{self, File};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use footprints::Backend;
use footprints::core::action::Action;
use footprints::core::config::{self, ResolvedConfig};
use footprints::core::dataset::CountryDataset;
use footprints::core::state::App;
use footprints::store::{self, Color, UserId};
use simplelog::{ConfigBuilder, WriteLogger};

#[derive(Parser)]
#[command(name = "footprints", about = "Track the countries your family has visited")]
struct Args {
    /// Storage backend to use (overrides config and FOOTPRINTS_BACKEND)
    #[arg(short, long, value_enum)]
    backend: Option<Backend>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the current user's map data and stats (default)
    Status,
    /// Mark a country as visited for the current user
    Add { country: String },
    /// Remove a country from the current user's list
    Remove { country: String },
    /// List family members
    Users,
    /// Make another family member current
    Switch { id: i64 },
    /// Add a family member and make them current
    AddUser {
        name: String,
        #[arg(short, long, value_enum, default_value_t)]
        color: Color,
    },
    /// Delete a family member and all of their visits
    DeleteUser { id: i64 },
    /// List reference countries, optionally filtered by name
    Countries { filter: Option<String> },
}

fn init_logging(config: &ResolvedConfig) {
    // Initialize file logger - writes to footprints.log in the app directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    let dir = config::app_dir();
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    if let Ok(log_file) = File::create(dir.join("footprints.log")) {
        let _ = WriteLogger::init(config.log_level, log_config, log_file);
    }
}

fn render_users(app: &App) {
    if app.snapshot.users.is_empty() {
        println!("No family members yet. Add one with `footprints add-user <name>`.");
        return;
    }
    for user in &app.snapshot.users {
        let marker = if Some(user.id) == app.snapshot.current_user_id { "*" } else { " " };
        println!("{marker} {:>3}  {:<20} {}", user.id, user.name, user.color);
    }
}

fn render_status(app: &App) {
    match app.snapshot.current_user() {
        Some(user) => println!("Traveler: {} ({})", user.name, user.color),
        None => println!("Traveler: none selected"),
    }

    let stats = &app.stats;
    println!(
        "Countries: {} | Continents: {} / {} | Explored: {}% | Top traveler: {} ({})",
        app.snapshot.countries.len(),
        stats.continents_count,
        stats.continents_total,
        stats.percent_label(),
        stats.top_traveler.name,
        stats.top_traveler.count,
    );

    for code in &app.snapshot.countries {
        match app.dataset.get(code) {
            Some(country) => println!("  {}  {} ({})", code, country.name, country.continent.label()),
            None => println!("  {}", code),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(&file_config, args.backend);
    init_logging(&resolved);

    log::info!("Footprints starting up with backend: {:?}", resolved.backend);

    let dataset = match CountryDataset::load(resolved.dataset_path.as_deref()) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let command = args.command.unwrap_or(Command::Status);

    if let Command::Countries { filter } = &command {
        let filter = filter.as_deref().unwrap_or("");
        for country in dataset.search(filter) {
            println!("{}  {:<36} {}", country.code, country.name, country.continent.label());
        }
        return ExitCode::SUCCESS;
    }

    let store = match store::build_store(&resolved, dataset.clone()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut app = App::new(store, dataset);

    let show_users = matches!(
        command,
        Command::Users | Command::Switch { .. } | Command::AddUser { .. } | Command::DeleteUser { .. }
    );
    let action = match command {
        Command::Status | Command::Users | Command::Countries { .. } => Action::Refresh,
        Command::Add { country } => Action::AddCountry(country),
        Command::Remove { country } => Action::DeleteCountry(country),
        Command::Switch { id } => Action::SwitchUser(UserId(id)),
        Command::AddUser { name, color } => Action::AddUser { name, color },
        Command::DeleteUser { id } => Action::DeleteUser(UserId(id)),
    };
    let mutating = action.is_mutation();

    let result = app.dispatch(action).await;

    if let Some(err) = &app.error {
        eprintln!("Error: {err}");
    } else if let Some(notice) = &app.load_error {
        eprintln!("{notice}");
    } else if mutating {
        println!("{}", app.status_message);
    }

    if result.is_ok() {
        if show_users {
            render_users(&app);
        } else {
            render_status(&app);
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

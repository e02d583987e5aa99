use anyhow::{bail, Context, Result};
use remind_calendar::CalendarState;
use remind_catalog::{CatalogError, CatalogService, SqliteSearchCache};
use remind_core::{AppError, Config};
use tokio_util::sync::CancellationToken;

const USAGE: &str = "usage: remind [calendar <year> <month> | movie <query> | book <query>]";
const WEEKDAY_HEADER: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];

enum Command {
    Calendar(Option<(i32, u32)>),
    Movie(String),
    Book(String),
}

fn parse_args(args: &[String]) -> Result<Command> {
    match args {
        [] => Ok(Command::Calendar(None)),
        [cmd, year, month] if cmd == "calendar" => {
            let year = year.parse().context("year must be a number")?;
            let month = month.parse().context("month must be a number")?;
            Ok(Command::Calendar(Some((year, month))))
        }
        [cmd, rest @ ..] if (cmd == "movie" || cmd == "book") && !rest.is_empty() => {
            let query = rest.join(" ");
            if cmd == "movie" {
                Ok(Command::Movie(query))
            } else {
                Ok(Command::Book(query))
            }
        }
        _ => bail!(USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize core
    remind_core::init()?;

    let (config, _) = Config::load_validated()?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match parse_args(&args)? {
        Command::Calendar(month) => print_calendar(&config, month),
        Command::Movie(query) => search(&config, SearchKind::Movie, &query).await,
        Command::Book(query) => search(&config, SearchKind::Book, &query).await,
    }
}

fn print_calendar(config: &Config, month: Option<(i32, u32)>) -> Result<()> {
    let range = config.calendar.year_range().map_err(AppError::from)?;
    let mut state = CalendarState::today(range).map_err(AppError::from)?;

    if let Some((year, month)) = month {
        if let Err(e) = state.jump(year, month) {
            bail!(AppError::from(e).user_message());
        }
    }

    println!("{}", state.displayed_month().label());
    println!(" {}", WEEKDAY_HEADER.join("  "));
    for week in remind_calendar::weeks(&state.grid()) {
        let line: Vec<String> = week
            .iter()
            .map(|cell| {
                if !cell.in_current_month {
                    "   ".to_string()
                } else if cell.is_selected {
                    format!("{:>3}", format!("*{}", cell.date.day()))
                } else {
                    format!("{:>3}", cell.date.day())
                }
            })
            .collect();
        println!("{}", line.join(""));
    }

    tracing::debug!(
        month = %state.displayed_month(),
        selected = %state.selected_date(),
        "calendar printed"
    );
    Ok(())
}

#[derive(Clone, Copy)]
enum SearchKind {
    Movie,
    Book,
}

async fn search(config: &Config, kind: SearchKind, query: &str) -> Result<()> {
    let db_path = config.cache_db_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    let store = SqliteSearchCache::new(&db_path).map_err(AppError::from)?;
    let service = CatalogService::from_config(&config.catalog, store).map_err(AppError::from)?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    let printed = match kind {
        SearchKind::Movie => service.search_movies(query, &cancel).await.map(|movies| {
            for movie in &movies {
                println!(
                    "{} ({}) [{}]",
                    movie.title,
                    movie.release_date,
                    movie.genre_names()
                );
            }
            movies.len()
        }),
        SearchKind::Book => service.search_books(query, &cancel).await.map(|books| {
            for book in &books {
                println!(
                    "{} / {} / {} {}",
                    book.title,
                    book.author_line(),
                    book.publisher,
                    book.publish_date().unwrap_or("")
                );
            }
            books.len()
        }),
    };

    match printed {
        Ok(0) => {
            println!("No results for \"{}\"", query);
            Ok(())
        }
        Ok(count) => {
            tracing::info!(count, "search finished");
            Ok(())
        }
        Err(CatalogError::Cancelled) => {
            println!("Search cancelled.");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Search failed: {}", e);
            bail!(AppError::from(e).user_message())
        }
    }
}

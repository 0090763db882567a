use std::fmt;

use lwh_core::model::{CourseId, LessonId};
use services::{AppServices, CheckoutError, ClientConfig, Clock, CurrencyResolver};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { command: &'static str, what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidId { raw: String },
    InvalidAmount { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { command, what } => {
                write!(f, "{command} requires {what}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid id: {raw}"),
            ArgsError::InvalidAmount { raw } => write!(f, "invalid amount: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn require_arg(
    args: &mut impl Iterator<Item = String>,
    command: &'static str,
    what: &'static str,
) -> Result<String, ArgsError> {
    args.next()
        .ok_or(ArgsError::MissingArgument { command, what })
}

fn parse_id<T: std::str::FromStr>(raw: String) -> Result<T, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidId { raw })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  learning                       enrolled courses with progress");
    eprintln!("  dashboard                      headline learning stats");
    eprintln!("  course <id>                    course detail and enrollment state");
    eprintln!("  enroll <id>                    enroll in a single course");
    eprintln!("  lesson <id> [--course <id>]    open a lesson");
    eprintln!("  cart [list|add <id>|remove <id>|checkout]");
    eprintln!("  bookmark [list|toggle <lesson_id>]");
    eprintln!("  note get <lesson_id> | note set <lesson_id> <text>");
    eprintln!("  price <usd_amount>             format a price for the current locale");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  LWH_API_BASE_URL, LWH_SERVICE_NAME, LWH_API_TOKEN, LWH_RATES_URL,");
    eprintln!("  LWH_LOCALE, LWH_DB_URL, RUST_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Learning,
    Dashboard,
    Course(CourseId),
    Enroll(CourseId),
    Lesson {
        lesson_id: LessonId,
        course: Option<CourseId>,
    },
    CartList,
    CartAdd(CourseId),
    CartRemove(CourseId),
    Checkout,
    BookmarkList,
    BookmarkToggle(LessonId),
    NoteGet(LessonId),
    NoteSet(LessonId, String),
    Price(u64),
}

struct Args {
    db_url: Option<String>,
    command: Command,
}

impl Args {
    fn parse(argv: Vec<String>) -> Result<Option<Self>, ArgsError> {
        let mut db_url = None;
        let mut rest = Vec::new();
        let mut iter = argv.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut iter, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = Some(normalize_sqlite_url(value));
                }
                "--help" | "-h" => return Ok(None),
                _ => rest.push(arg),
            }
        }

        let mut args = rest.into_iter();
        let Some(name) = args.next() else {
            return Ok(None);
        };
        let command = Self::parse_command(&name, &mut args)?;
        if let Some(extra) = args.next() {
            return Err(ArgsError::UnknownArg(extra));
        }
        Ok(Some(Self { db_url, command }))
    }

    fn parse_command(
        name: &str,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Command, ArgsError> {
        let command = match name {
            "learning" => Command::Learning,
            "dashboard" => Command::Dashboard,
            "course" => Command::Course(parse_id(require_arg(args, "course", "a course id")?)?),
            "enroll" => Command::Enroll(parse_id(require_arg(args, "enroll", "a course id")?)?),
            "lesson" => {
                let lesson_id = parse_id(require_arg(args, "lesson", "a lesson id")?)?;
                let course = match args.next() {
                    Some(flag) if flag == "--course" => {
                        Some(parse_id(require_value(args, "--course")?)?)
                    }
                    Some(other) => return Err(ArgsError::UnknownArg(other)),
                    None => None,
                };
                Command::Lesson { lesson_id, course }
            }
            "cart" => match args.next().as_deref() {
                None | Some("list") => Command::CartList,
                Some("add") => Command::CartAdd(parse_id(require_arg(args, "cart add", "a course id")?)?),
                Some("remove") => {
                    Command::CartRemove(parse_id(require_arg(args, "cart remove", "a course id")?)?)
                }
                Some("checkout") => Command::Checkout,
                Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            },
            "bookmark" => match args.next().as_deref() {
                None | Some("list") => Command::BookmarkList,
                Some("toggle") => Command::BookmarkToggle(parse_id(require_arg(
                    args,
                    "bookmark toggle",
                    "a lesson id",
                )?)?),
                Some(other) => return Err(ArgsError::UnknownArg(other.to_string())),
            },
            "note" => match args.next().as_deref() {
                Some("get") => Command::NoteGet(parse_id(require_arg(args, "note get", "a lesson id")?)?),
                Some("set") => {
                    let lesson_id = parse_id(require_arg(args, "note set", "a lesson id")?)?;
                    let text: Vec<String> = args.collect();
                    Command::NoteSet(lesson_id, text.join(" "))
                }
                _ => {
                    return Err(ArgsError::MissingArgument {
                        command: "note",
                        what: "get or set",
                    });
                }
            },
            "price" => {
                let raw = require_arg(args, "price", "an amount")?;
                let amount = raw.parse().map_err(|_| ArgsError::InvalidAmount { raw })?;
                Command::Price(amount)
            }
            other => return Err(ArgsError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    let default_filter = format!(
        "{}=info,services=info,storage=info,reqwest=warn,sqlx=warn",
        env!("CARGO_PKG_NAME")
    );
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let parsed = match Args::parse(argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    let mut config = ClientConfig::from_env()?;
    if let Some(db_url) = parsed.db_url {
        config.db_url = db_url;
    }
    tracing::debug!(base = %config.api_base_url, locale = %config.locale, "client configured");

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let app = AppServices::new_sqlite(&config, Clock::system()).await?;

    dispatch(&app, parsed.command).await
}

async fn dispatch(app: &AppServices, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Learning => {
            let aggregator = app.aggregator();
            aggregator.refresh().await;
            let celebrations = app.celebrations();
            for entry in aggregator.enrolled_courses() {
                println!(
                    "{:>5}  {:<40} {:>3}/{:<3} {:>3}%",
                    entry.course.id.value(),
                    entry.course.title(),
                    entry.lessons_completed,
                    entry.lessons_total,
                    entry.progress_percent
                );
                if celebrations
                    .should_celebrate(entry.course.id, entry.progress_percent)
                    .await
                {
                    println!("       course complete, certificate available");
                }
            }
        }
        Command::Dashboard => {
            let aggregator = app.aggregator();
            aggregator.refresh().await;
            let snapshot = aggregator.snapshot();
            let stats = snapshot.stats();
            println!("enrolled courses:  {}", stats.enrolled);
            println!("completed courses: {}", stats.completed_courses);
            println!("lessons done:      {}", stats.lessons_done);
            println!("overall progress:  {}%", stats.overall_percent);
            println!("in progress:       {}", snapshot.in_progress().count());
        }
        Command::Course(course_id) => {
            let page = app.courses().load_course_page(course_id).await?;
            let Some(course) = page.course else {
                println!("course {course_id} not found");
                return Ok(());
            };
            let currency = app.currency().await;
            println!("{}  ({})", course.title(), currency.display_price(course.course_price));
            for lesson in &page.lessons {
                println!("  - {}", lesson.lesson_title.as_deref().unwrap_or_default());
            }
            println!("enrolled: {}", if page.enrolled { "yes" } else { "no" });
        }
        Command::Enroll(course_id) => {
            app.courses().enroll(course_id).await?;
            println!("enrolled in course {course_id}");
        }
        Command::Lesson { lesson_id, course } => {
            let viewer = app.lesson_viewer();
            viewer.open_lesson(lesson_id, course).await;
            print_lesson(app, &viewer.view()).await;
        }
        Command::CartList => {
            let cart = app.cart().await;
            print_cart(&cart, &app.currency().await);
        }
        Command::CartAdd(course_id) => {
            let Some(course) = app.api().find_course(course_id).await? else {
                println!("course {course_id} not found");
                return Ok(());
            };
            let mut cart = app.cart().await;
            let added = cart
                .add_to_cart(course.id, course.title(), course.course_price.unwrap_or(0))
                .await?;
            if !added {
                println!("already in cart");
            }
            print_cart(&cart, &app.currency().await);
        }
        Command::CartRemove(course_id) => {
            let mut cart = app.cart().await;
            cart.remove_from_cart(course_id).await?;
            print_cart(&cart, &app.currency().await);
        }
        Command::Checkout => {
            let checkout = app.checkout();
            let contact = checkout.prefill_contact().await;
            if !contact.email.is_empty() {
                println!("billing: {} {} <{}>", contact.first_name, contact.last_name, contact.email);
            }
            let mut cart = app.cart().await;
            match checkout.place_order(&mut cart).await {
                Ok(order) => {
                    println!("enrolled in {} course(s)", order.courses.len());
                }
                Err(CheckoutError::EmptyCart) => println!("cart is empty"),
                Err(err) => return Err(err.into()),
            }
        }
        Command::BookmarkList => {
            for id in app.bookmarks().await.bookmarked_ids() {
                println!("{id}");
            }
        }
        Command::BookmarkToggle(lesson_id) => {
            let mut bookmarks = app.bookmarks().await;
            let now = bookmarks.toggle(lesson_id).await?;
            println!(
                "lesson {lesson_id} {}",
                if now { "bookmarked" } else { "unbookmarked" }
            );
        }
        Command::NoteGet(lesson_id) => {
            println!("{}", app.notes().load_note(lesson_id).await);
        }
        Command::NoteSet(lesson_id, text) => {
            app.notes().save_note(lesson_id, &text).await?;
        }
        Command::Price(amount) => {
            println!("{}", app.currency().await.display_price(Some(amount)));
        }
    }
    Ok(())
}

fn print_cart(cart: &services::CartStore, currency: &CurrencyResolver) {
    for item in cart.cart_items() {
        println!(
            "{:>5}  {:<40} {}",
            item.course_id.value(),
            item.course_title,
            currency.display_price(Some(item.course_price))
        );
    }
    println!(
        "{} item(s), total {}",
        cart.cart_count(),
        currency.display_price(Some(cart.cart_total()))
    );
}

async fn print_lesson(app: &AppServices, view: &services::LessonView) {
    let Some(lesson) = &view.lesson else {
        println!("lesson not found");
        return;
    };
    let bookmarks = app.bookmarks().await;
    println!(
        "{}{}",
        lesson.lesson_title.as_deref().unwrap_or_default(),
        if view.is_bookmarked(&bookmarks) { "  [bookmarked]" } else { "" }
    );
    println!("reading time: {} min", view.reading_time_minutes());
    if let Some(course) = &view.course {
        println!("course: {} ({:.0}% visited)", course.title(), view.progress_percent());
    }
    if let Some(url) = &view.video_embed_url {
        println!("video: {url}");
    }
    for resource in view.additional_resources() {
        println!("  - {}", resource.resource_name.as_deref().unwrap_or_default());
    }
    match (view.previous_lesson(), view.next_lesson()) {
        (None, None) => {}
        (prev, next) => println!(
            "prev: {}  next: {}",
            prev.map_or_else(|| "-".to_string(), |id| id.to_string()),
            next.map_or_else(|| "-".to_string(), |id| id.to_string())
        ),
    }
    if !view.note.is_empty() {
        println!("note: {}", view.note);
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, ArgsError> {
        Args::parse(args.iter().map(|s| (*s).to_string()).collect())
    }

    #[test]
    fn no_command_prints_usage() {
        assert!(parse(&[]).unwrap().is_none());
        assert!(parse(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn db_flag_is_accepted_anywhere() {
        let args = parse(&["cart", "add", "3", "--db", "sqlite::memory:"]).unwrap().unwrap();
        assert_eq!(args.db_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(args.command, Command::CartAdd(CourseId::new(3)));
    }

    #[test]
    fn lesson_takes_optional_course() {
        let args = parse(&["lesson", "4", "--course", "2"]).unwrap().unwrap();
        assert_eq!(
            args.command,
            Command::Lesson {
                lesson_id: LessonId::new(4),
                course: Some(CourseId::new(2)),
            }
        );
    }

    #[test]
    fn note_set_joins_remaining_words() {
        let args = parse(&["note", "set", "9", "lifetimes", "are", "regions"]).unwrap().unwrap();
        assert_eq!(
            args.command,
            Command::NoteSet(LessonId::new(9), "lifetimes are regions".into())
        );
    }

    #[test]
    fn rejects_bad_ids_and_unknown_commands() {
        assert!(matches!(parse(&["enroll", "x"]), Err(ArgsError::InvalidId { .. })));
        assert!(matches!(parse(&["teleport"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["cart", "add"]), Err(ArgsError::MissingArgument { .. })));
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::EnvFilter;

use library_desk::api::ListParams;
use library_desk::api::types::{
    AcceptBookDraft, AssignmentDraft, BookCopyDraft, BookDraft, ReaderDraft, ReadingRoomDraft, UpdateMe,
};
use library_desk::{
    ApiError, AuthSession, ClientConfig, ConfigError, FileTokenStore, HttpClient, LibraryApi, Navigation, NetError,
    RouteGuard,
};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Net(#[from] NetError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{path} redirected to {location}")]
    Redirected { path: String, location: String },
    #[error("no page at {0}")]
    NotFound(String),
    #[error("invalid filter `{0}`; expected key=value")]
    InvalidFilter(String),
}

#[derive(Parser, Debug)]
#[command(name = "library-desk", about = "Library management desk client")]
struct Cli {
    #[arg(long, env = "LIBRARY_API_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "LIBRARY_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Register {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
    },
    Whoami,
    Profile(ProfileCommand),
    /// Run the route guard for a page path and print the decision.
    Open {
        path: String,
    },
    Rooms(RoomsCommand),
    Readers(ReadersCommand),
    Books(BooksCommand),
    Copies(CopiesCommand),
    Assignments(AssignmentsCommand),
    Librarian(LibrarianCommand),
    Queries(QueriesCommand),
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, requires = "new_password")]
        current_password: Option<String>,
        #[arg(long, requires = "current_password")]
        new_password: Option<String>,
        #[arg(long, requires = "new_password")]
        confirm_new_password: Option<String>,
    },
}

#[derive(Args, Debug, Default)]
struct ListArgs {
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    ordering: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    /// Extra query filter, repeatable.
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    filters: Vec<String>,
}

#[derive(Args, Debug)]
struct RoomsCommand {
    #[command(subcommand)]
    command: RoomsSubcommand,
}

#[derive(Subcommand, Debug)]
enum RoomsSubcommand {
    List(ListArgs),
    Get {
        id: u64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: u64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct ReadersCommand {
    #[command(subcommand)]
    command: ReadersSubcommand,
}

#[derive(Subcommand, Debug)]
enum ReadersSubcommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        active: Option<bool>,
    },
    Get {
        id: u64,
    },
    /// Books currently on loan to a reader.
    Books {
        id: u64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: u64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct BooksCommand {
    #[command(subcommand)]
    command: BooksSubcommand,
}

#[derive(Subcommand, Debug)]
enum BooksSubcommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        active: Option<bool>,
    },
    Get {
        id: u64,
    },
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: u64,
        #[arg(long)]
        data: String,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct CopiesCommand {
    #[command(subcommand)]
    command: CopiesSubcommand,
}

#[derive(Subcommand, Debug)]
enum CopiesSubcommand {
    List(ListArgs),
    Create {
        #[arg(long)]
        data: String,
    },
    Update {
        id: u64,
        #[arg(long)]
        data: String,
    },
}

#[derive(Args, Debug)]
struct AssignmentsCommand {
    #[command(subcommand)]
    command: AssignmentsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AssignmentsSubcommand {
    List {
        #[command(flatten)]
        list: ListArgs,
        #[arg(long)]
        returned: Option<bool>,
    },
    Get {
        id: u64,
    },
    Create {
        #[arg(long)]
        book: u64,
        #[arg(long)]
        reader: u64,
    },
    Return {
        id: u64,
    },
    Delete {
        id: u64,
    },
}

#[derive(Args, Debug)]
struct LibrarianCommand {
    #[command(subcommand)]
    command: LibrarianSubcommand,
}

#[derive(Subcommand, Debug)]
enum LibrarianSubcommand {
    RegisterReader {
        #[arg(long)]
        data: String,
    },
    /// Unregister readers with no activity for over a year.
    UnregisterOld,
    WriteOff {
        book_id: u64,
    },
    AcceptBook {
        #[arg(long)]
        data: String,
    },
    MonthlyReport {
        #[arg(long)]
        month: u32,
        #[arg(long)]
        year: i32,
    },
}

#[derive(Args, Debug)]
struct QueriesCommand {
    #[command(subcommand)]
    command: QueriesSubcommand,
}

#[derive(Subcommand, Debug)]
enum QueriesSubcommand {
    OldAssignments,
    RareBooks,
    YoungReaders,
    EducationStats,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config = ClientConfig::new(base_url, config.token_file.clone()).with_timeouts(config.timeouts);
    }
    if let Some(token_file) = cli.token_file {
        config.token_file = token_file;
    }

    let tokens = Arc::new(FileTokenStore::new(config.token_file.clone()));
    let http = HttpClient::from_config(&config, tokens)?;
    let mut session = AuthSession::new(http);

    match cli.command {
        Command::Login { username, password } => {
            enter(&mut session, "/login").await?;
            session.login(&username, &password).await?;
            print_json(&session.user())
        }
        Command::Logout => run_logout(&mut session).await,
        Command::Register { username, password, confirm_password } => {
            enter(&mut session, "/register").await?;
            let user = session.register(&username, &password, &confirm_password).await?;
            print_json(&user)
        }
        Command::Whoami => {
            enter(&mut session, "/profile").await?;
            print_json(&session.user())
        }
        Command::Profile(profile) => run_profile(&mut session, profile).await,
        Command::Open { path } => {
            match RouteGuard::new().before_each(&mut session, &path).await {
                Navigation::Proceed => println!("proceed"),
                Navigation::Redirect(redirect) => println!("redirect {}", redirect.location()),
                Navigation::NotFound => println!("not found"),
            }
            Ok(())
        }
        Command::Rooms(rooms) => run_rooms(&mut session, rooms).await,
        Command::Readers(readers) => run_readers(&mut session, readers).await,
        Command::Books(books) => run_books(&mut session, books).await,
        Command::Copies(copies) => run_copies(&mut session, copies).await,
        Command::Assignments(assignments) => run_assignments(&mut session, assignments).await,
        Command::Librarian(librarian) => run_librarian(&mut session, librarian).await,
        Command::Queries(queries) => run_queries(&mut session, queries).await,
    }
}

/// Pass the route guard for `page` or turn its decision into an error.
async fn enter(session: &mut AuthSession, page: &str) -> Result<LibraryApi, CliError> {
    match RouteGuard::new().before_each(session, page).await {
        Navigation::Proceed => Ok(LibraryApi::new(session.http().clone())),
        Navigation::Redirect(redirect) => {
            Err(CliError::Redirected { path: page.to_owned(), location: redirect.location() })
        }
        Navigation::NotFound => Err(CliError::NotFound(page.to_owned())),
    }
}

async fn run_logout(session: &mut AuthSession) -> Result<(), CliError> {
    match session.logout().await {
        Ok(()) => {}
        Err(e @ ApiError::Store(_)) => return Err(e.into()),
        Err(e) => eprintln!("server logout failed ({e}); local session cleared"),
    }
    println!("logged out");
    Ok(())
}

async fn run_profile(session: &mut AuthSession, profile: ProfileCommand) -> Result<(), CliError> {
    enter(session, "/profile").await?;
    match profile.command {
        ProfileSubcommand::Update { username, email, current_password, new_password, confirm_new_password } => {
            let changes = UpdateMe {
                username,
                email,
                current_password,
                new_password,
                re_new_password: confirm_new_password,
            };
            let user = session.update_profile(&changes).await?;
            print_json(user)
        }
    }
}

async fn run_rooms(session: &mut AuthSession, rooms: RoomsCommand) -> Result<(), CliError> {
    let api = enter(session, "/reading-rooms").await?;
    let rooms_api = api.reading_rooms();
    match rooms.command {
        RoomsSubcommand::List(list) => print_json(&rooms_api.list(&list_params(list)?).await?),
        RoomsSubcommand::Get { id } => print_json(&rooms_api.get(id).await?),
        RoomsSubcommand::Create { data } => {
            print_json(&rooms_api.create(&parse_data::<ReadingRoomDraft>(&data)?).await?)
        }
        RoomsSubcommand::Update { id, data } => {
            print_json(&rooms_api.update(id, &parse_data::<ReadingRoomDraft>(&data)?).await?)
        }
        RoomsSubcommand::Delete { id } => {
            rooms_api.delete(id).await?;
            println!("deleted reading room {id}");
            Ok(())
        }
    }
}

async fn run_readers(session: &mut AuthSession, readers: ReadersCommand) -> Result<(), CliError> {
    let api = enter(session, "/readers").await?;
    let readers_api = api.readers();
    match readers.command {
        ReadersSubcommand::List { list, active } => {
            let mut params = list_params(list)?;
            params.is_active = active;
            print_json(&readers_api.list(&params).await?)
        }
        ReadersSubcommand::Get { id } => print_json(&readers_api.get(id).await?),
        ReadersSubcommand::Books { id } => print_json(&readers_api.books(id).await?),
        ReadersSubcommand::Create { data } => {
            print_json(&readers_api.create(&parse_data::<ReaderDraft>(&data)?).await?)
        }
        ReadersSubcommand::Update { id, data } => {
            print_json(&readers_api.update(id, &parse_data::<ReaderDraft>(&data)?).await?)
        }
        ReadersSubcommand::Delete { id } => {
            readers_api.delete(id).await?;
            println!("deleted reader {id}");
            Ok(())
        }
    }
}

async fn run_books(session: &mut AuthSession, books: BooksCommand) -> Result<(), CliError> {
    let api = enter(session, "/books").await?;
    let books_api = api.books();
    match books.command {
        BooksSubcommand::List { list, active } => {
            let mut params = list_params(list)?;
            params.is_active = active;
            print_json(&books_api.list(&params).await?)
        }
        BooksSubcommand::Get { id } => print_json(&books_api.get(id).await?),
        BooksSubcommand::Create { data } => print_json(&books_api.create(&parse_data::<BookDraft>(&data)?).await?),
        BooksSubcommand::Update { id, data } => {
            print_json(&books_api.update(id, &parse_data::<BookDraft>(&data)?).await?)
        }
        BooksSubcommand::Delete { id } => {
            books_api.delete(id).await?;
            println!("deleted book {id}");
            Ok(())
        }
    }
}

async fn run_copies(session: &mut AuthSession, copies: CopiesCommand) -> Result<(), CliError> {
    let api = enter(session, "/books").await?;
    let copies_api = api.book_copies();
    match copies.command {
        CopiesSubcommand::List(list) => print_json(&copies_api.list(&list_params(list)?).await?),
        CopiesSubcommand::Create { data } => {
            print_json(&copies_api.create(&parse_data::<BookCopyDraft>(&data)?).await?)
        }
        CopiesSubcommand::Update { id, data } => {
            print_json(&copies_api.update(id, &parse_data::<BookCopyDraft>(&data)?).await?)
        }
    }
}

async fn run_assignments(session: &mut AuthSession, assignments: AssignmentsCommand) -> Result<(), CliError> {
    let api = enter(session, "/assignments").await?;
    let assignments_api = api.assignments();
    match assignments.command {
        AssignmentsSubcommand::List { list, returned } => {
            let mut params = list_params(list)?;
            params.is_returned = returned;
            print_json(&assignments_api.list(&params).await?)
        }
        AssignmentsSubcommand::Get { id } => print_json(&assignments_api.get(id).await?),
        AssignmentsSubcommand::Create { book, reader } => {
            print_json(&assignments_api.create(AssignmentDraft { book, reader }).await?)
        }
        AssignmentsSubcommand::Return { id } => print_json(&assignments_api.return_book(id).await?),
        AssignmentsSubcommand::Delete { id } => {
            assignments_api.delete(id).await?;
            println!("deleted assignment {id}");
            Ok(())
        }
    }
}

async fn run_librarian(session: &mut AuthSession, librarian: LibrarianCommand) -> Result<(), CliError> {
    let api = enter(session, "/librarian").await?;
    let librarian_api = api.librarian();
    match librarian.command {
        LibrarianSubcommand::RegisterReader { data } => {
            print_json(&librarian_api.register_reader(&parse_data::<ReaderDraft>(&data)?).await?)
        }
        LibrarianSubcommand::UnregisterOld => print_json(&librarian_api.unregister_old_readers().await?),
        LibrarianSubcommand::WriteOff { book_id } => print_json(&librarian_api.write_off_book(book_id).await?),
        LibrarianSubcommand::AcceptBook { data } => {
            print_json(&librarian_api.accept_book(&parse_data::<AcceptBookDraft>(&data)?).await?)
        }
        LibrarianSubcommand::MonthlyReport { month, year } => {
            print_json(&librarian_api.monthly_report(month, year).await?)
        }
    }
}

async fn run_queries(session: &mut AuthSession, queries: QueriesCommand) -> Result<(), CliError> {
    let api = enter(session, "/queries").await?;
    let readers_api = api.readers();
    match queries.command {
        QueriesSubcommand::OldAssignments => print_json(&readers_api.old_assignments().await?),
        QueriesSubcommand::RareBooks => print_json(&readers_api.with_rare_books().await?),
        QueriesSubcommand::YoungReaders => print_json(&readers_api.young_readers().await?),
        QueriesSubcommand::EducationStats => print_json(&readers_api.education_stats().await?),
    }
}

fn list_params(args: ListArgs) -> Result<ListParams, CliError> {
    let mut params = ListParams { search: args.search, ordering: args.ordering, page: args.page, ..ListParams::default() };
    for filter in args.filters {
        let Some((key, value)) = filter.split_once('=') else {
            return Err(CliError::InvalidFilter(filter));
        };
        params = params.filter(key, value);
    }
    Ok(params)
}

fn parse_data<T: DeserializeOwned>(data: &str) -> Result<T, CliError> {
    Ok(serde_json::from_str(data)?)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

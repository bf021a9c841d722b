//! Terminal frontend of the gallery.
//!
//! Reads one command per line from stdin and renders the gallery state as
//! text. The overlay is a `HeadlessModal`; closing it with `close` behaves
//! like the user dismissing a dialog.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pokedex_gallery::bio::HttpBioClient;
use pokedex_gallery::mcp_interface::{display_detail, display_evolutions, display_list};
use pokedex_gallery::{
    event_channel, AppConfig, DetailPanel, EvolutionDetail, EvolutionResolver, GalleryApp,
    GalleryServices, HeadlessModal, HistoryNavigator, HttpCatalog, JsonFileStore, LineageLoader,
    ModalRouteState, Navigator, RenderHook, StateChange, TimedAnimation,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "pokedex-gallery", about = "Browse the Pokemon catalog")]
struct Args {
    /// Initial URL path, e.g. /pokemon/pikachu
    #[arg(default_value = "/")]
    path: String,

    /// RON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

/// Collects change notifications; the loop renders them after each step.
#[derive(Clone, Default)]
struct TerminalRender {
    pending: Rc<RefCell<Vec<StateChange>>>,
}

impl TerminalRender {
    fn take(&self) -> Vec<StateChange> {
        let mut changes = std::mem::take(&mut *self.pending.borrow_mut());
        changes.dedup();
        changes
    }
}

impl RenderHook for TerminalRender {
    fn state_changed(&mut self, change: StateChange) {
        self.pending.borrow_mut().push(change);
    }
}

struct Frontend {
    app: GalleryApp,
    nav: HistoryNavigator,
    modal: HeadlessModal,
    render: TerminalRender,
    lineage: LineageLoader,
    /// Lineage of the open record once resolved
    evolutions: Option<(String, Vec<EvolutionDetail>)>,
    bio: HttpBioClient,
}

const HELP: &str = "Commands:
  list                 show the gallery
  search <text>        live search (empty text clears)
  open <name>          open a card (plays the pokeball animation)
  go <path>            navigate to a URL path
  back | forward       move through history
  close                dismiss the open overlay
  fav [id]             toggle a favorite (defaults to the open record)
  favs                 list favorite ids
  evo                  evolution line of the open record
  bio                  generate a biography for the open record
  quit";

impl Frontend {
    fn render(&mut self) {
        for change in self.render.take() {
            match change {
                StateChange::List | StateChange::Search => self.print_list(),
                StateChange::Modal => {
                    self.print_modal();
                    self.sync_lineage();
                }
                StateChange::Favorites => self.print_favorites(),
                StateChange::Animation => {
                    if self.app.show_animation() {
                        println!("(the pokeball shakes... and opens)");
                    }
                }
            }
        }
    }

    fn print_list(&self) {
        if self.app.is_loading() {
            println!("Loading...");
        } else if self.app.search().loading {
            println!("Searching for '{}'...", self.app.search().query);
        } else {
            println!(
                "{}",
                display_list(self.app.displayed(), |id| self.app.is_favorite(id))
            );
        }
    }

    fn print_modal(&self) {
        match self.app.modal().state() {
            ModalRouteState::Open(record) => {
                println!("{}", display_detail(&DetailPanel::new(record.clone())))
            }
            ModalRouteState::Resolving(name) => println!("Loading {}...", name),
            ModalRouteState::Closed => println!("At {}", self.nav.current()),
        }
    }

    /// Resolve the lineage of whatever record is open, in the background.
    fn sync_lineage(&mut self) {
        match self.app.modal().open_record() {
            Some(record) => {
                if self.lineage.request(&record.name) {
                    self.evolutions = None;
                }
            }
            None => {
                self.lineage.cancel();
                self.evolutions = None;
            }
        }
    }

    fn show_lineage(&mut self, name: String, evolutions: Vec<EvolutionDetail>) {
        println!("Evolutions: {}", display_evolutions(&evolutions));
        self.evolutions = Some((name, evolutions));
    }

    fn print_favorites(&self) {
        let ids = self.app.favorites().ids();
        if ids.is_empty() {
            println!("No favorites yet.");
        } else {
            let ids: Vec<String> = ids.iter().map(|id| format!("#{}", id)).collect();
            println!("Favorites: {}", ids.join(", "));
        }
    }

    fn open_panel(&self) -> Option<DetailPanel> {
        let panel = self.app.modal().open_record().cloned().map(DetailPanel::new);
        if panel.is_none() {
            println!("Open a Pokemon first.");
        }
        panel
    }

    /// Returns false when the user asked to quit.
    async fn execute(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command.to_lowercase().as_str() {
            "" => {}
            "list" => self.print_list(),
            "search" | "s" => self.app.search_input(rest),
            "open" | "o" if !rest.is_empty() => self.app.go_to_details(rest),
            "go" => self.nav.navigate_path(rest),
            "back" => {
                if !self.nav.back() {
                    println!("Nothing to go back to.");
                }
            }
            "forward" => {
                if !self.nav.forward() {
                    println!("Nothing to go forward to.");
                }
            }
            "close" => {
                if !self.modal.dismiss() {
                    println!("No overlay is open.");
                }
            }
            "fav" => {
                let id = match rest.parse::<u32>() {
                    Ok(id) => Some(id),
                    Err(_) => self.app.modal().open_record().map(|r| r.id),
                };
                match id {
                    Some(id) => {
                        let state = if self.app.toggle_favorite(id) {
                            "added to"
                        } else {
                            "removed from"
                        };
                        println!("#{} {} favorites", id, state);
                    }
                    None => println!("Usage: fav <id>, or open a Pokemon first."),
                }
            }
            "favs" => self.print_favorites(),
            "evo" => {
                if let Some(panel) = self.open_panel() {
                    match &self.evolutions {
                        Some((name, evolutions)) if *name == panel.record().name => {
                            println!("{}", display_evolutions(evolutions))
                        }
                        _ => println!("Resolving the evolution line of {}...", panel.display_name()),
                    }
                }
            }
            "bio" => {
                if let Some(mut panel) = self.open_panel() {
                    println!("Writing a biography for {}...", panel.display_name());
                    panel.generate_bio(&self.bio).await;
                    println!("{}", panel.bio);
                }
            }
            "help" | "?" => println!("{}", HELP),
            "quit" | "exit" | "q" => return false,
            other => println!("Unknown command '{}'. Type 'help'.", other),
        }
        true
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref()).context("loading configuration")?;

    let client = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let catalog = Arc::new(HttpCatalog::with_client(
        client.clone(),
        config.catalog_url.clone(),
        config.catalog_limit,
    ));

    let (tx, mut rx) = event_channel();
    let nav = HistoryNavigator::from_path(&args.path, tx.clone());
    let modal = HeadlessModal::new();
    let render = TerminalRender::default();

    let services = GalleryServices {
        catalog: catalog.clone(),
        navigator: Arc::new(nav.clone()),
        modal: Box::new(modal.clone()),
        favorites: Box::new(JsonFileStore::new(&config.favorites_path)),
        gate: Arc::new(TimedAnimation::from_settings(&config.animation)),
        render: Box::new(render.clone()),
    };
    let app = GalleryApp::new(services, tx, &config);

    let mut frontend = Frontend {
        app,
        nav,
        modal,
        render,
        lineage: LineageLoader::new(EvolutionResolver::new(catalog)),
        evolutions: None,
        bio: HttpBioClient::new(client, config.bio.clone()),
    };

    println!("{}", HELP);
    frontend.app.start();
    frontend.render();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = rx.recv() => frontend.app.handle(event),
            (name, evolutions) = frontend.lineage.next() => frontend.show_lineage(name, evolutions),
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !frontend.execute(&line).await {
                        break;
                    }
                }
                None => break,
            },
        }
        frontend.render();
    }

    frontend.app.shutdown();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    runtime.block_on(run(args))
}

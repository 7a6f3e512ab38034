mod catalog;
mod config;
mod debounce;
mod error;
mod executor;
mod frontend;
mod matcher;
mod model;
mod recency;
mod sources;
mod state;

use anyhow::Result;
use calloop::EventLoop;
use calloop::channel::{Channel, Event, Sender};
use clap::Parser;
use log::{error, warn};
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use crate::config::{load_config, Config};
use crate::debounce::{flush, update_query, Debouncer, SearchHost};
use crate::executor::CommandLauncher;
use crate::frontend::{parse_line, render_view, InputEvent};
use crate::model::CatalogEntry;
use crate::recency::{MemoryStore, RecencyStore, RecencyTracker};
use crate::sources::CatalogSupplier;
use crate::sources::history::JsonHistoryStore;
use crate::state::QueryPipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Launch group to use
    #[arg(short, long, default_value = "default")]
    group: String,

    /// Print the ranked matches for a query and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Print the recently launched entries and exit
    #[arg(long)]
    recent: bool,
}

struct App {
    pipeline: QueryPipeline,
    debouncer: Debouncer<App>,
    supplier: Arc<CatalogSupplier>,
    tx_entries: Sender<Vec<CatalogEntry>>,
    should_exit: bool,
}

impl SearchHost for App {
    fn pipeline(&mut self) -> &mut QueryPipeline {
        &mut self.pipeline
    }

    fn debouncer(&mut self) -> &mut Debouncer<App> {
        &mut self.debouncer
    }
}

impl App {
    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::Query(text) => {
                if let Err(e) = update_query(self, &text) {
                    error!("Could not schedule search: {}", e);
                }
            }
            InputEvent::Confirm => {
                // Enter right after typing acts on the latest text
                flush(self);
                if !self.pipeline.confirm() {
                    println!("  (nothing to launch)");
                }
            }
            InputEvent::Select(n) => {
                // Positions refer to the results for the latest text
                flush(self);
                let id = self.pipeline.current_results().visible().get(n - 1).map(|e| e.id.clone());
                match id {
                    Some(id) => {
                        self.pipeline.select(&id);
                    }
                    None => println!("  (no entry {n})"),
                }
            }
            InputEvent::MoveSelection(delta) => {
                flush(self);
                self.pipeline.move_selection(delta);
                print!("{}", render_view(self.pipeline.current_results(), self.pipeline.selected_index()));
            }
            InputEvent::Refresh => self.supplier.spawn_refresh(&self.tx_entries),
            InputEvent::Quit => self.should_exit = true,
        }
    }
}

fn recency_store() -> Box<dyn RecencyStore> {
    match JsonHistoryStore::default_location() {
        Some(store) => Box::new(store),
        None => {
            warn!("No data directory, recent entries will not be kept");
            Box::new(MemoryStore::default())
        }
    }
}

fn spawn_stdin_reader(tx: Sender<String>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
        // Dropping tx closes the channel, which ends the session
    });
}

fn print_once(config: &Config, group_name: &str, query: Option<&str>) -> Result<()> {
    let (_, group) = config.resolve_group(group_name);
    let supplier = CatalogSupplier::for_group(&group);
    let tracker = RecencyTracker::new(recency_store(), config.general.recent_limit);
    let mut pipeline = QueryPipeline::new(tracker, Box::new(CommandLauncher::new(config, &group)));
    pipeline.set_entries(supplier.refresh());

    if let Some(query) = query {
        if let Some(generation) = pipeline.set_query(query) {
            pipeline.run_search(generation);
        }
        print!("{}", render_view(pipeline.current_results(), usize::MAX));
    } else if let state::View::Idle { recent, .. } = pipeline.current_results() {
        for entry in recent {
            println!("{}\t{}", entry.name, entry.id);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let config = load_config()?;

    if args.query.is_some() || args.recent {
        return print_once(&config, &args.group, args.query.as_deref());
    }

    let (group_name, group_config) = config.resolve_group(&args.group);
    log::info!("Using launch group {:?}", group_name);

    // 2. Setup Event Loop
    let mut event_loop: EventLoop<App> = EventLoop::try_new()?;

    // 3. Init State
    let tracker = RecencyTracker::new(recency_store(), config.general.recent_limit);
    let launcher = CommandLauncher::new(&config, &group_config);
    let mut pipeline = QueryPipeline::new(tracker, Box::new(launcher));
    pipeline.on_results_changed(|view| {
        print!("{}", render_view(view, 0));
    });

    let (tx_entries, rx_entries): (Sender<Vec<CatalogEntry>>, Channel<Vec<CatalogEntry>>) =
        calloop::channel::channel();
    let supplier = Arc::new(CatalogSupplier::for_group(&group_config));

    let mut app = App {
        pipeline,
        debouncer: Debouncer::new(event_loop.handle(), config.general.debounce()),
        supplier: Arc::clone(&supplier),
        tx_entries: tx_entries.clone(),
        should_exit: false,
    };

    // 4. Spawn Source Loader
    supplier.spawn_refresh(&tx_entries);

    // Entry loader handler
    event_loop.handle().insert_source(rx_entries, |event, _, app: &mut App| {
        if let Event::Msg(entries) = event {
            app.pipeline.set_entries(entries);
        }
    }).map_err(|e| e.error)?;

    // Input handler
    let (tx_lines, rx_lines) = calloop::channel::channel::<String>();
    spawn_stdin_reader(tx_lines);
    event_loop.handle().insert_source(rx_lines, |event, _, app: &mut App| {
        match event {
            Event::Msg(line) => match parse_line(&line) {
                Ok(input) => app.handle_input(input),
                Err(e) => println!("  ({e})"),
            },
            Event::Closed => app.should_exit = true,
        }
    }).map_err(|e| e.error)?;

    // 5. Run Loop
    loop {
        if app.should_exit {
            break;
        }
        event_loop.dispatch(None, &mut app)?;
    }

    Ok(())
}

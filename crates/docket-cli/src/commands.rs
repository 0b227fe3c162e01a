use anyhow::Context;
use colored::Colorize;
use serde_json::{json, Map, Value};

use docket_server::{DocketServer, ServerConfig};
use docket_store::{Document, FileStore, GuardedStore};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::List(args) => cmd_list(&open_store(&config), args),
        Command::Add(args) => cmd_add(&open_store(&config), args),
        Command::Done(args) => cmd_set_completed(&open_store(&config), &args.id, true),
        Command::Undone(args) => cmd_set_completed(&open_store(&config), &args.id, false),
        Command::Edit(args) => cmd_edit(&open_store(&config), args),
        Command::Remove(args) => cmd_remove(&open_store(&config), args),
        Command::Clear => cmd_clear(&open_store(&config)),
    }
}

/// Config file, then `--data`.
fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.data_file = data.clone();
    }
    Ok(config)
}

fn open_store(config: &ServerConfig) -> GuardedStore<FileStore> {
    GuardedStore::new(FileStore::new(&config.data_file))
}

/// Layer `PORT` and the serve flags over the resolved config.
fn serve_config(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<ServerConfig> {
    config.apply_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if args.static_dir.is_some() {
        config.static_dir = args.static_dir;
    }
    if args.no_cors {
        config.cors = false;
    }
    Ok(config)
}

fn cmd_serve(config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(config, args)?;
    tracing::debug!(?config, "resolved server config");
    println!(
        "Docket server on {} (data: {})",
        config.bind_addr.to_string().bold(),
        config.data_file.display()
    );
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(DocketServer::new(config).serve())?;
    Ok(())
}

/// Case-insensitive substring match on `text`; no query matches everything.
fn matches_search(doc: &Document, query: Option<&str>) -> bool {
    match query {
        None => true,
        Some(q) => doc
            .text()
            .is_some_and(|t| t.to_lowercase().contains(&q.to_lowercase())),
    }
}

fn render(doc: &Document) -> String {
    let mark = if doc.completed() { "[x]".green() } else { "[ ]".normal() };
    let text = doc.text().unwrap_or_default();
    let text = if doc.completed() { text.dimmed() } else { text.normal() };
    format!("{} {}  {}", mark, text, doc.id().unwrap_or_default().yellow())
}

fn cmd_list(store: &GuardedStore<FileStore>, args: ListArgs) -> anyhow::Result<()> {
    let docs = store.list()?;
    let shown: Vec<&Document> = docs
        .iter()
        .filter(|d| matches_search(d, args.search.as_deref()))
        .collect();
    if shown.is_empty() {
        println!("No todos.");
        return Ok(());
    }
    for doc in &shown {
        println!("{}", render(doc));
    }
    let done = shown.iter().filter(|d| d.completed()).count();
    println!("\n{} of {} done", done.to_string().bold(), shown.len().to_string().bold());
    Ok(())
}

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn cmd_add(store: &GuardedStore<FileStore>, args: AddArgs) -> anyhow::Result<()> {
    let doc = store.create(fields(json!({ "text": args.text })))?;
    println!("{} Added {}", "✓".green().bold(), render(&doc));
    Ok(())
}

fn cmd_set_completed(store: &GuardedStore<FileStore>, id: &str, completed: bool) -> anyhow::Result<()> {
    let doc = store.update(id, fields(json!({ "completed": completed })))?;
    println!("{} {}", "✓".green().bold(), render(&doc));
    Ok(())
}

fn cmd_edit(store: &GuardedStore<FileStore>, args: EditArgs) -> anyhow::Result<()> {
    let doc = store.update(&args.id, fields(json!({ "text": args.text })))?;
    println!("{} {}", "✓".green().bold(), render(&doc));
    Ok(())
}

fn cmd_remove(store: &GuardedStore<FileStore>, args: IdArgs) -> anyhow::Result<()> {
    store.delete(&args.id)?;
    println!("{} Removed {}", "✓".green().bold(), args.id.yellow());
    Ok(())
}

fn cmd_clear(store: &GuardedStore<FileStore>) -> anyhow::Result<()> {
    match store.clear_completed()? {
        0 => println!("Nothing to clear."),
        1 => println!("{} Cleared 1 completed todo", "✓".green().bold()),
        n => println!("{} Cleared {} completed todos", "✓".green().bold(), n),
    }
    Ok(())
}

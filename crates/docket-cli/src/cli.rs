use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "docket",
    about = "Docket: a todo list kept in a single JSON file",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// JSON file holding the todos (overrides the config file)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List todos
    List(ListArgs),
    /// Add a todo
    Add(AddArgs),
    /// Mark a todo as completed
    Done(IdArgs),
    /// Mark a todo as not completed
    Undone(IdArgs),
    /// Replace a todo's text
    Edit(EditArgs),
    /// Delete a todo
    Remove(IdArgs),
    /// Remove all completed todos
    Clear,
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Directory of client assets to serve
    #[arg(long)]
    pub static_dir: Option<PathBuf>,
    #[arg(long)]
    pub no_cors: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show todos whose text contains this (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct AddArgs {
    pub text: String,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["docket", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.bind.is_none());
            assert!(!args.no_cors);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from([
            "docket", "serve", "--bind", "0.0.0.0:8080", "--static-dir", "public", "--no-cors",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert_eq!(args.static_dir, Some(PathBuf::from("public")));
            assert!(args.no_cors);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_bad_bind_fails() {
        assert!(Cli::try_parse_from(["docket", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_list_search() {
        let cli = Cli::try_parse_from(["docket", "list", "-s", "milk"]).unwrap();
        if let Command::List(args) = cli.command {
            assert_eq!(args.search, Some("milk".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_add() {
        let cli = Cli::try_parse_from(["docket", "add", "buy milk"]).unwrap();
        if let Command::Add(args) = cli.command {
            assert_eq!(args.text, "buy milk");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_edit() {
        let cli = Cli::try_parse_from(["docket", "edit", "17", "new text"]).unwrap();
        if let Command::Edit(args) = cli.command {
            assert_eq!(args.id, "17");
            assert_eq!(args.text, "new text");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_done_and_remove() {
        let cli = Cli::try_parse_from(["docket", "done", "1"]).unwrap();
        assert!(matches!(cli.command, Command::Done(_)));
        let cli = Cli::try_parse_from(["docket", "remove", "1"]).unwrap();
        assert!(matches!(cli.command, Command::Remove(_)));
        let cli = Cli::try_parse_from(["docket", "clear"]).unwrap();
        assert!(matches!(cli.command, Command::Clear));
    }

    #[test]
    fn config_is_global() {
        let cli = Cli::try_parse_from(["docket", "serve", "--config", "docket.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("docket.toml")));
        let cli = Cli::try_parse_from(["docket", "-c", "docket.toml", "list"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("docket.toml")));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from(["docket", "list", "--verbose", "--data", "/tmp/t.json"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/t.json")));
    }
}

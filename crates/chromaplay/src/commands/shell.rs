//! `shell`: interactive session driving an [`AppStore`].
//!
//! A line-oriented prompt. Bare method ids (or `call <id>`) open the
//! parameter editor seeded with the method's example; the rest are session
//! commands (`use`, `connect`, `collections`, ...).

use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dialoguer::{Input, Password, Select};
use owo_colors::OwoColorize;
use secrecy::SecretString;
use serde_json::Value;
use tracing::warn;

use chromaplay_core::{ApiClient, ApiMethod, AppStore, ConnectionUpdate, registry};

use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;
use crate::output;

const HELP: &str = "\
Commands:
  <method>                  call a method by id (e.g. query, createCollection)
  call [method]             call a method, picking from a menu if omitted
  methods                   list every method
  collections               refresh and list collections
  use <name>                select a collection
  connect [--token] [[tenant] database]
                            (re)connect; one name selects a database, two a
                            tenant and database; --token asks for a bearer token
  disconnect                drop the connection
  status                    show connection details
  help                      show this help
  quit                      leave the shell";

// ── Line parsing ────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum ShellCommand {
    Call(Option<&'static ApiMethod>),
    Methods,
    Collections,
    Use(String),
    Connect {
        tenant: Option<String>,
        database: Option<String>,
        ask_token: bool,
    },
    Disconnect,
    Status,
    Help,
    Quit,
    Empty,
}

fn parse_line(line: &str) -> Result<ShellCommand, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(ShellCommand::Empty);
    };
    let mut rest: Vec<&str> = words.collect();
    let ask_token = head == "connect" && {
        let before = rest.len();
        rest.retain(|w| *w != "--token");
        rest.len() != before
    };

    let cmd = match (head, rest.as_slice()) {
        ("call", []) => ShellCommand::Call(None),
        ("call", [id]) => ShellCommand::Call(Some(lookup(id)?)),
        ("methods", []) => ShellCommand::Methods,
        ("collections" | "ls", []) => ShellCommand::Collections,
        ("use", [name]) => ShellCommand::Use((*name).to_owned()),
        ("use", _) => return Err("usage: use <collection>".into()),
        ("connect", [tenant @ .., database]) if tenant.len() <= 1 => ShellCommand::Connect {
            tenant: tenant.first().map(|t| (*t).to_owned()),
            database: Some((*database).to_owned()),
            ask_token,
        },
        ("connect", []) => ShellCommand::Connect {
            tenant: None,
            database: None,
            ask_token,
        },
        ("connect", _) => return Err("usage: connect [--token] [[tenant] database]".into()),
        ("disconnect", []) => ShellCommand::Disconnect,
        ("status", []) => ShellCommand::Status,
        ("help" | "?", _) => ShellCommand::Help,
        ("quit" | "exit" | "q", []) => ShellCommand::Quit,
        (id, []) => ShellCommand::Call(Some(lookup(id)?)),
        (other, _) => return Err(format!("unexpected arguments to '{other}' (try 'help')")),
    };
    Ok(cmd)
}

fn lookup(id: &str) -> Result<&'static ApiMethod, String> {
    registry::by_id(id).ok_or_else(|| format!("Unknown method: {id} (try 'methods')"))
}

// ── Session ─────────────────────────────────────────────────────────

struct Shell<'a> {
    store: AppStore,
    profile_name: &'a str,
    global: &'a GlobalOpts,
    color: bool,
}

pub async fn run(
    client: ApiClient,
    update: ConnectionUpdate,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "shell".into(),
            reason: "the interactive shell needs a terminal; use `chromaplay call` in scripts"
                .into(),
        });
    }

    let shell = Shell {
        store: AppStore::new(client),
        profile_name,
        global,
        color: output::should_color(global.color_mode()),
    };

    let was_connected = Arc::new(AtomicBool::new(false));
    let color = shell.color;
    let _status = shell.store.subscribe(move |state| {
        if was_connected.swap(state.is_connected, Ordering::SeqCst) != state.is_connected {
            eprintln!("{}", connectivity_label(state.is_connected, color));
        }
    });

    eprintln!("chromaplay shell. Type 'help' for commands.");
    shell.connect(update).await;
    shell.repl().await;
    Ok(())
}

fn connectivity_label(connected: bool, color: bool) -> String {
    match (connected, color) {
        (true, true) => format!("{}", "● connected".green()),
        (false, true) => format!("{}", "○ disconnected".yellow()),
        (true, false) => "● connected".into(),
        (false, false) => "○ disconnected".into(),
    }
}

impl Shell<'_> {
    fn prompt(&self) -> String {
        let state = self.store.state();
        let config = self.store.client().config();
        let scope = match state.current_collection_name {
            Some(ref name) => format!("{}/{}:{name}", config.tenant(), config.database()),
            None => format!("{}/{}", config.tenant(), config.database()),
        };
        format!("chromaplay [{scope}]")
    }

    async fn repl(&self) {
        loop {
            let line: String = match Input::new()
                .with_prompt(self.prompt())
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => line,
                // Ctrl-C / closed terminal
                Err(_) => break,
            };

            match parse_line(&line) {
                Ok(ShellCommand::Quit) => break,
                Ok(cmd) => self.handle(cmd).await,
                Err(message) => eprintln!("{message}"),
            }
        }
    }

    async fn handle(&self, cmd: ShellCommand) {
        match cmd {
            ShellCommand::Call(Some(method)) => self.call(method).await,
            ShellCommand::Call(None) => {
                if let Some(method) = pick_method() {
                    self.call(method).await;
                }
            }
            ShellCommand::Methods => {
                for m in registry::all() {
                    let scope = if m.requires_collection { " *" } else { "" };
                    println!("{:<24} {}{scope}", m.id.as_str(), m.description);
                }
                println!("\n* requires a selected collection");
            }
            ShellCommand::Collections => {
                self.store.refresh_collections().await;
                self.print_collections();
            }
            ShellCommand::Use(name) => self.select(&name).await,
            ShellCommand::Connect {
                tenant,
                database,
                ask_token,
            } => {
                let auth_token = if ask_token {
                    match prompt_token() {
                        Some(token) => Some(token),
                        None => return,
                    }
                } else {
                    None
                };
                self.connect(ConnectionUpdate {
                    tenant,
                    database,
                    auth_token,
                })
                .await;
            }
            ShellCommand::Disconnect => self.store.client().disconnect(),
            ShellCommand::Status => self.print_status(),
            ShellCommand::Help => println!("{HELP}"),
            ShellCommand::Quit | ShellCommand::Empty => {}
        }
    }

    // ── Actions ──────────────────────────────────────────────────────

    async fn connect(&self, update: ConnectionUpdate) {
        let client = self.store.client();
        let result = client.connect(update).await;
        if !result.success {
            eprintln!(
                "{} {}",
                output::status_line(&result, self.color),
                result.error.as_deref().unwrap_or_default()
            );
            return;
        }
        self.remember_namespace();
    }

    /// Persist the tenant/database just connected to under the active
    /// profile so the next session starts there.
    fn remember_namespace(&self) {
        let current = self.store.client().config();
        let mut cfg = config::load_config_or_default();
        if config::remember_last_used(
            &mut cfg,
            self.profile_name,
            current.tenant(),
            current.database(),
        ) {
            if let Err(e) = config::save_config(&cfg) {
                warn!(error = %e, "could not remember last used tenant/database");
            }
        }
    }

    async fn select(&self, name: &str) {
        let result = self.store.client().select_collection(name).await;
        if result.success {
            self.store
                .set_current_collection(self.store.client().current_collection_name());
            eprintln!("{}", output::status_line(&result, self.color));
        } else {
            eprintln!(
                "{} {}",
                output::status_line(&result, self.color),
                result.error.as_deref().unwrap_or_default()
            );
        }
    }

    async fn call(&self, method: &'static ApiMethod) {
        if self.store.state().is_executing {
            eprintln!("A call is already running.");
            return;
        }

        self.store.select_method(method);
        if !method.parameters.is_empty() {
            println!("{}", method.example_json());
            match edit_parameters(&self.store.state().parameter_json) {
                Some(text) => self.store.set_parameter_json(text),
                None => return,
            }
        }

        let params: Value = match serde_json::from_str(&self.store.state().parameter_json) {
            Ok(value) => value,
            Err(e) => {
                eprintln!("Invalid JSON: {e}");
                return;
            }
        };

        self.store.set_executing(true);
        let pb = super::util::spinner(self.global, &format!("Calling {}...", method.id));
        let result = self.store.client().execute_method(method.id.as_str(), params).await;
        pb.finish_and_clear();

        let succeeded = result.success;
        println!(
            "{}",
            output::render_result(self.global.format(), &result, self.color)
        );
        self.store.set_result(result);

        if succeeded && method.refreshes_collections() {
            self.store.refresh_collections().await;
        } else {
            self.store
                .set_current_collection(self.store.client().current_collection_name());
        }
    }

    // ── Views ────────────────────────────────────────────────────────

    fn print_collections(&self) {
        let state = self.store.state();
        if state.collections.is_empty() {
            println!("(no collections)");
            return;
        }
        for name in &state.collections {
            let marker = if state.current_collection_name.as_ref() == Some(name) {
                "*"
            } else {
                " "
            };
            println!("{marker} {name}");
        }
    }

    fn print_status(&self) {
        let client = self.store.client();
        let cfg = client.config();
        let state = self.store.state();
        println!("Server:     {}", client.options().url);
        println!("Profile:    {}", self.profile_name);
        println!("Tenant:     {}", cfg.tenant());
        println!("Database:   {}", cfg.database());
        println!("Auth:       {}", if cfg.auth_token.is_some() { "bearer token" } else { "none" });
        println!("{}", connectivity_label(state.is_connected, self.color));
        println!(
            "Collection: {}",
            state.current_collection_name.as_deref().unwrap_or("(none)")
        );
        if let Some(ref last) = state.last_result {
            println!("Last call:  {}", output::status_line(last, self.color));
        }
    }
}

// ── Prompts ─────────────────────────────────────────────────────────

fn pick_method() -> Option<&'static ApiMethod> {
    let methods = registry::all();
    let labels: Vec<String> = methods
        .iter()
        .map(|m| format!("{:<22} {}", m.category.title(), m.id))
        .collect();
    let index = Select::new()
        .with_prompt("Method")
        .items(&labels)
        .default(0)
        .interact_opt()
        .ok()
        .flatten()?;
    methods.get(index)
}

/// Bearer token for the next connect. A blank answer clears the stored
/// token; `None` when the operator cancels.
fn prompt_token() -> Option<SecretString> {
    Password::new()
        .with_prompt("Bearer token (blank for none)")
        .allow_empty_password(true)
        .interact()
        .ok()
        .map(SecretString::from)
}

/// Single-line JSON editor seeded with `current`, compacted. Rejects
/// text that does not parse. `None` when the operator cancels.
fn edit_parameters(current: &str) -> Option<String> {
    let initial = serde_json::from_str::<Value>(current)
        .map(|v| output::render_json_compact(&v))
        .unwrap_or_else(|_| current.to_owned());

    Input::<String>::new()
        .with_prompt("params")
        .with_initial_text(initial)
        .validate_with(|text: &String| {
            serde_json::from_str::<Value>(text)
                .map(|_| ())
                .map_err(|e| format!("invalid JSON: {e}"))
        })
        .interact_text()
        .ok()
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Notemap-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Notemap and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Notemap CLI entrypoint.
//!
//! Works against a folder store (`--store`, `NOTEMAP_STORE`, default `./.notemap`).

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use notemap::codec::{decode, Snapshot};
use notemap::config::Config;
use notemap::model::{BlockDocument, CanvasDocument, DocumentId, DocumentKind, ShareId};
use notemap::render::render_snapshot;
use notemap::session::SessionController;
use notemap::store::{convert_and_create, FolderGateway, PersistenceGateway, WriteDurability};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--store <dir>] [--durable-writes] [--log <filter>] <command>\n\nCommands:\n  list                        list stored documents\n  new-map <title>             create an empty concept map\n  new-note <title>            create an empty note\n  import <snapshot.json>      store a snapshot file as a new document\n  show <id>                   render a stored document to stdout\n  convert <note-id>           convert a note into a new concept map\n  share <id> [--regenerate]   issue (or re-issue) a shared view\n  shared <share-id>           print a shared view\n  delete <id>                 soft-delete a document\n\nThe store defaults to $NOTEMAP_STORE or ./.notemap; the log filter to $NOTEMAP_LOG or `info`.\n--durable-writes (or NOTEMAP_DURABLE_WRITES=1) fsyncs every write."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    NewMap { title: String },
    NewNote { title: String },
    Import { path: PathBuf },
    Show { id: String },
    Convert { note_id: String },
    Share { id: String, regenerate: bool },
    Shared { share_id: String },
    Delete { id: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store_dir: Option<String>,
    durable_writes: bool,
    log_filter: Option<String>,
    command: Option<Command>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                options.store_dir = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--log" => {
                if options.log_filter.is_some() {
                    return Err(());
                }
                options.log_filter = Some(args.next().ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                options.command = Some(parse_command(&arg, args.by_ref().collect())?);
                break;
            }
        }
    }

    if options.command.is_none() {
        return Err(());
    }
    Ok(options)
}

fn parse_command(name: &str, rest: Vec<String>) -> Result<Command, ()> {
    let single = |rest: Vec<String>| -> Result<String, ()> {
        match <[String; 1]>::try_from(rest) {
            Ok([value]) if !value.starts_with('-') => Ok(value),
            _ => Err(()),
        }
    };
    let title = |rest: Vec<String>| -> Result<String, ()> {
        if rest.is_empty() || rest.iter().any(|word| word.starts_with("--")) {
            return Err(());
        }
        Ok(rest.join(" "))
    };

    match name {
        "list" if rest.is_empty() => Ok(Command::List),
        "new-map" => Ok(Command::NewMap { title: title(rest)? }),
        "new-note" => Ok(Command::NewNote { title: title(rest)? }),
        "import" => Ok(Command::Import {
            path: PathBuf::from(single(rest)?),
        }),
        "show" => Ok(Command::Show { id: single(rest)? }),
        "convert" => Ok(Command::Convert {
            note_id: single(rest)?,
        }),
        "share" => {
            let regenerate = rest.iter().any(|arg| arg == "--regenerate");
            let rest = rest
                .into_iter()
                .filter(|arg| arg != "--regenerate")
                .collect::<Vec<_>>();
            Ok(Command::Share {
                id: single(rest)?,
                regenerate,
            })
        }
        "shared" => Ok(Command::Shared {
            share_id: single(rest)?,
        }),
        "delete" => Ok(Command::Delete { id: single(rest)? }),
        _ => Err(()),
    }
}

fn config_for(options: &CliOptions) -> Config {
    let mut config = Config::from_env();
    if let Some(dir) = &options.store_dir {
        config.store_dir = PathBuf::from(dir);
    }
    if options.durable_writes {
        config.durability = WriteDurability::Durable;
    }
    if let Some(filter) = &options.log_filter {
        config.log_filter = filter.clone();
    }
    config
}

async fn run(command: Command, gateway: Arc<FolderGateway>) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List => {
            for row in gateway.list().await? {
                println!("{}\t{}\t{}\t{}", row.id, row.kind, row.revision, row.title);
            }
        }
        Command::NewMap { title } => {
            let session = SessionController::<CanvasDocument, _>::new(gateway);
            println!("{}", session.create(&title).await?);
        }
        Command::NewNote { title } => {
            let session = SessionController::<BlockDocument, _>::new(gateway);
            println!("{}", session.create(&title).await?);
        }
        Command::Import { path } => {
            let bytes = std::fs::read(&path)?;
            let Some(snapshot) = Snapshot::from_bytes(&bytes)? else {
                return Err(format!("{} is empty", path.display()).into());
            };
            let Some(id) = snapshot.document_id() else {
                return Err(format!("{} carries no document id", path.display()).into());
            };
            match snapshot.kind {
                DocumentKind::Canvas => {
                    decode::<CanvasDocument>(&id, Some(&snapshot))?;
                }
                DocumentKind::Block => {
                    decode::<BlockDocument>(&id, Some(&snapshot))?;
                }
            }
            println!("{}", gateway.create(snapshot).await?);
        }
        Command::Show { id } => {
            let id = DocumentId::new(id)?;
            let Some(snapshot) = gateway.load(&id).await? else {
                println!("{id} has never been saved");
                return Ok(());
            };
            let (_, artifact) = render_snapshot(&id, Some(&snapshot), snapshot.kind)?;
            if let Some(markup) = artifact.markup() {
                print!("{markup}");
            }
        }
        Command::Convert { note_id } => {
            let note_id = DocumentId::new(note_id)?;
            let session = SessionController::<BlockDocument, _>::new(Arc::clone(&gateway));
            session.open_read_only(&note_id).await?;
            let note = session
                .view()
                .ok_or_else(|| format!("{note_id} did not load"))?;
            session.close();
            println!("{}", convert_and_create(&*gateway, &note).await?);
        }
        Command::Share { id, regenerate } => {
            let id = DocumentId::new(id)?;
            println!("{}", gateway.publish(&id, regenerate).await?);
        }
        Command::Shared { share_id } => {
            let share_id = ShareId::new(share_id)?;
            let view = gateway.get_shared(&share_id).await?;
            eprintln!("{}", view.title());
            if let Some(markup) = view.artifact().markup() {
                print!("{markup}");
            }
        }
        Command::Delete { id } => {
            gateway.delete(&DocumentId::new(id)?).await?;
        }
    }
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "notemap".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let config = config_for(&options);
        notemap::logging::init_tracing(&config.log_filter);

        let Some(command) = options.command else {
            print_usage(&program);
            std::process::exit(2);
        };
        let gateway = Arc::new(config.gateway());

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        runtime.block_on(run(command, gateway))
    })();

    if let Err(err) = result {
        eprintln!("notemap: {err}");
        if let Some(err) = err.downcast_ref::<notemap::Error>() {
            eprintln!("notemap: {}", err.user_message());
        }
        std::process::exit(1);
    }
}

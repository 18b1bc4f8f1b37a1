//! # Info Command Implementation
//!
//! This module implements the `info` subcommand, which displays the store
//! listing of a single app: its descriptive fields, the services it is made
//! of and the container settings each service documents.

use anyhow::Result;
use clap::Args;

use appstore_catalog::compose::{ComposeApp, ContainerHint, DEFAULT_LOCALE};
use appstore_catalog::suggestions;

use super::{load_catalog, CatalogArgs, StoreArgs};

/// Show the store listing of one app
#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Store app id of the app to show.
    #[arg(value_name = "APP_ID")]
    pub app_id: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Print the store listing, including per-service info, as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `info` command.
pub fn execute(args: InfoArgs) -> Result<()> {
    let mut store = args.store.open(args.catalog.timeout)?;
    let report = load_catalog(&mut store, &args.catalog)?;

    let Some(app) = report.catalog.get(&args.app_id) else {
        return Err(suggestions::app_not_found(
            &args.app_id,
            report.catalog.keys().map(String::as_str),
        ));
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&app.store_info(true))?);
    } else {
        display_info(app);
    }

    Ok(())
}

fn display_info(app: &ComposeApp) {
    let info = app.store_info(true);

    println!(
        "{} ({})",
        info.title_for(DEFAULT_LOCALE).unwrap_or(app.store_app_id()),
        app.store_app_id()
    );
    if let Some(tagline) = info.tagline_for(DEFAULT_LOCALE) {
        println!("{}", tagline);
    }
    println!();

    let fields = [
        ("Category", info.category.as_deref()),
        ("Author", info.author.as_deref()),
        ("Developer", info.developer.as_deref()),
        ("Main service", app.main_app().map(|service| service.name.as_str())),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("{:<14} {}", format!("{}:", label), value);
        }
    }
    if !info.architectures.is_empty() {
        println!("{:<14} {}", "Architectures:", info.architectures.join(", "));
    }

    if let Some(description) = info.description.get(DEFAULT_LOCALE) {
        println!();
        println!("{}", description.trim_end());
    }

    println!();
    println!("Services:");
    for service in app.services() {
        println!(
            "  {} ({})",
            service.name,
            service.image.as_deref().unwrap_or("no image")
        );
        let Some(hints) = &service.store_info else {
            continue;
        };
        print_hints("env", &hints.envs);
        print_hints("port", &hints.ports);
        print_hints("volume", &hints.volumes);
        print_hints("device", &hints.devices);
    }
}

fn print_hints(kind: &str, hints: &[ContainerHint]) {
    for hint in hints {
        let description = hint
            .description
            .get(DEFAULT_LOCALE)
            .map(String::as_str)
            .unwrap_or_default();
        println!("    {:<7} {:<24} {}", kind, hint.container, description);
    }
}

use clap::Parser;

mod cli;
mod commands;
mod domain;
mod services;

use cli::{Cli, Commands, LibraryCommands, ManifestCommands};
use domain::models::Manifest;
use services::manifest::ManifestStore;
use services::output::print_error;

fn main() {
    let cli = Cli::parse();
    init_logger(cli.debug);
    if let Err(e) = run(&cli) {
        print_error(cli.json, "run_failed", &format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_logger(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // Commands that work without an active manifest.
    match &cli.command {
        Commands::Ports => return commands::verify::handle_ports(cli),
        Commands::Manifest {
            command: ManifestCommands::Validate { file },
        } => return commands::admin::handle_manifest_validate(cli, file),
        _ => {}
    }

    let mut store = bootstrap_manifest(cli)?;

    match &cli.command {
        Commands::Verify {
            port,
            no_reset,
            params_only,
        } => {
            let manifest = active(&store)?;
            commands::verify::handle_verify(cli, &manifest, port, *no_reset, *params_only)
        }
        Commands::Params { port, no_reset } => {
            let manifest = active(&store)?;
            commands::verify::handle_params(cli, &manifest, port, *no_reset)
        }
        Commands::Image {
            port,
            firmware,
            no_reset,
        } => {
            let manifest = active(&store)?;
            commands::verify::handle_image(cli, &manifest, port, firmware.as_deref(), *no_reset)
        }
        Commands::Manifest { command } => commands::admin::handle_manifest(cli, command, &mut store),
        Commands::Library {
            command: LibraryCommands::Sync,
        } => {
            let manifest = active(&store)?;
            commands::admin::handle_library_sync(cli, &manifest)
        }
        Commands::Ports => unreachable!("handled before manifest bootstrap"),
    }
}

fn active(store: &ManifestStore) -> anyhow::Result<Manifest> {
    store
        .active()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no manifest is active"))
}

fn status(cli: &Cli, msg: &str) {
    if !cli.json {
        println!("{}", msg);
    }
}

/// Obtain an active manifest or fail the run: prefer the local copy, fall
/// back to the remote one when online, and adopt a newer remote manifest
/// automatically. Adoption is always a whole-manifest swap.
fn bootstrap_manifest(cli: &Cli) -> anyhow::Result<ManifestStore> {
    let mut store = ManifestStore::new(&cli.lib_dir);

    let local_ok = match store.load_local() {
        Ok(()) => true,
        Err(e) => {
            log::debug!("local manifest unavailable: {}", e);
            false
        }
    };

    let mut adopted_remote = false;
    if local_ok {
        store.use_local();
    } else if cli.offline {
        anyhow::bail!("could not load any manifest");
    } else {
        status(cli, "Loading remote manifest...");
        store
            .load_remote(&cli.manifest_url)
            .map_err(|e| anyhow::anyhow!("could not load any manifest: {}", e))?;
        if let Err(e) = store.save_remote_to_local() {
            log::warn!("could not write the local manifest copy: {}", e);
        }
        store.use_remote();
        adopted_remote = true;
    }

    if !cli.offline && !adopted_remote {
        match store.load_remote(&cli.manifest_url) {
            Ok(()) if store.is_remote_newer() => {
                status(cli, "A newer manifest is available; adopting it.");
                if let Err(e) = store.save_remote_to_local() {
                    log::warn!("could not write the local manifest copy: {}", e);
                }
                store.use_remote();
            }
            Ok(()) => {}
            Err(e) => log::debug!("remote manifest unavailable: {}", e),
        }
    }

    Ok(store)
}

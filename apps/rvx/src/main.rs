//! rvx - patch Android application packages
//!
//! This is the CLI application that drives bundle loading, catalog queries
//! and patch runs through the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use rvx_config::{constants, Config};
use rvx_engine::ProcessEngine;
use rvx_events::{EventReceiver, EventSender};
use rvx_ops::{OperationResult, OpsContextBuilder, OpsCtx, PatcherRequest};
use rvx_signing::MinisignSigner;
use rvx_types::{ColorChoice, VersionPolicy};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    // Precedence: file (or defaults), then environment, then CLI flags
    let mut config = Config::load_or_default(&cli.global.config).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);

    logging::init_tracing(cli.global.json, cli.global.debug, &config.log_dir());
    info!("Starting rvx v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = rvx_events::channel();
    let ops_ctx = build_ops_context(event_sender, config.clone())?;

    let renderer = OutputRenderer::new(cli.global.json, config.general.color);
    let colors_enabled = match config.general.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, cli.global.json);

    let mut bundles = config.paths.bundles.clone();
    bundles.extend(cli.global.bundles.iter().cloned());

    let result = execute_command_with_events(
        cli.command,
        bundles,
        ops_ctx,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    if let OperationResult::RunReport(report) = &result {
        if let Some(abort) = &report.aborted {
            return Err(CliError::RunAborted(format!(
                "{} stage failed",
                abort.stage
            )));
        }
    }

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    bundles: Vec<PathBuf>,
    ops_ctx: OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, bundles, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    bundles: Vec<PathBuf>,
    ctx: OpsCtx,
) -> Result<OperationResult, CliError> {
    if command.needs_catalog() {
        load_bundles(&ctx, &bundles).await?;
    }

    match command {
        Commands::Packages => {
            let packages = rvx_ops::compatible_packages(&ctx).await?;
            Ok(OperationResult::PackageList(packages))
        }
        Commands::Patches {
            package,
            version,
            ignore_version,
            ..
        } => {
            let ignore = ignore_version || ctx.config.patcher.ignore_version;
            let patches = rvx_ops::filtered_patches(&ctx, &package, &version, ignore).await?;
            Ok(OperationResult::PatchList(patches))
        }
        Commands::NeedsResources { package, patches } => {
            let needed = rvx_ops::needs_resource_patching(&ctx, &patches, &package).await?;
            Ok(OperationResult::ResourcePatching(needed))
        }
        Commands::Patch {
            original,
            output,
            integrations,
            keystore,
            password,
            cache_dir,
            patches,
        } => {
            let keystore = keystore
                .or_else(|| ctx.config.signing.keystore.clone())
                .ok_or_else(|| {
                    CliError::InvalidArguments(
                        "--keystore is required unless signing.keystore is configured".to_string(),
                    )
                })?;
            let work_dir = cache_dir.unwrap_or_else(|| ctx.config.cache_dir());
            let request = PatcherRequest {
                original,
                input: work_dir.join(constants::WORKING_INPUT),
                patched: work_dir.join(constants::PATCHED_OUTPUT),
                output,
                integrations,
                selected_patches: patches,
                cache_dir: work_dir.join(constants::PATCH_CACHE),
                keystore,
                keystore_password: password.or_else(|| ctx.config.signing.keystore_password.clone()),
            };
            let report = rvx_ops::run_patcher(&ctx, request).await?;
            Ok(OperationResult::RunReport(report))
        }
        Commands::Keygen {
            secret,
            public,
            password,
        } => {
            let public_key = rvx_ops::generate_signing_key(&ctx, &secret, &public, password).await?;
            Ok(OperationResult::Success(format!(
                "Wrote {} and {}\nPublic key: {public_key}",
                secret.display(),
                public.display()
            )))
        }
    }
}

/// Load every configured and requested bundle into the catalog
async fn load_bundles(ctx: &OpsCtx, bundles: &[PathBuf]) -> Result<usize, CliError> {
    let work_root = ctx.config.bundle_work_dir();
    let mut loaded = 0;
    for (index, bundle) in bundles.iter().enumerate() {
        let stem = bundle
            .file_stem()
            .map_or_else(|| "bundle".into(), |s| s.to_string_lossy());
        let work_dir = work_root.join(format!("{index}-{stem}"));
        loaded += rvx_ops::load_patches(ctx, bundle, &work_dir).await?;
    }
    Ok(loaded)
}

/// Build operations context with all required components
fn build_ops_context(event_sender: EventSender, config: Config) -> Result<OpsCtx, CliError> {
    let engine = ProcessEngine::new(config.engine_command());
    let signer = MinisignSigner::new(config.signing.signer_name.clone());

    let ctx = OpsContextBuilder::new()
        .with_engine(Arc::new(engine))
        .with_signer(Arc::new(signer))
        .with_event_sender(event_sender)
        .with_config(config)
        .build()?;

    Ok(ctx)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Commands::Patches {
        legacy_versions: true,
        ..
    } = command
    {
        config.patcher.version_policy = VersionPolicy::Legacy;
    }
}

// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Scenepad CLI entrypoint.
//!
//! By default this runs the interactive TUI and serves MCP over streamable HTTP at
//! `http://127.0.0.1:<port>/mcp`.
//!
//! Use `--mcp` to run the MCP server over stdio instead (intended for tool integrations).

use std::error::Error;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use scenepad::config::{EditorConfig, SessionConfig};
use scenepad::model::{ContextId, ScenePayload};
use scenepad::store::{SceneFolder, WriteDurability};

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;
const DEFAULT_CONTEXT: &str = "default";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<scenes-dir>] [--context <id>] [--durable-writes] [--no-autosave | --autosave-ms <n>] [--mcp-http-port <port>] [--log-file <path>]\n  {program} [--scenes <dir>] [--context <id>] [--durable-writes] [--no-autosave | --autosave-ms <n>] [--mcp-http-port <port>] [--log-file <path>]\n  {program} --demo [--mcp-http-port <port>] [--log-file <path>]\n  {program} [<scenes-dir>] [--context <id>] [--durable-writes] --mcp [--log-file <path>]\n  {program} --demo --mcp\n\nTUI mode (default) serves MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp`.\n--mcp-http-port selects the port (0 = ephemeral; default {DEFAULT_MCP_HTTP_PORT}).\n\nIf scenes-dir/--scenes is omitted, the current working directory is used.\n--context scopes listed and saved scenes (default `{DEFAULT_CONTEXT}`).\n--demo uses a temporary folder seeded with a demo scene and cannot be combined with scenes-dir/--scenes.\n\n--autosave-ms sets the quiet period before an autosave (default 2000); --no-autosave disables it.\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n\nLogs go to stderr in --mcp mode and to --log-file when given (RUST_LOG overrides the `info` level)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    mcp: bool,
    demo: bool,
    scenes_dir: Option<String>,
    context: Option<String>,
    mcp_http_port: Option<u16>,
    durable_writes: bool,
    no_autosave: bool,
    autosave_ms: Option<u64>,
    log_file: Option<String>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mcp" => {
                if options.mcp {
                    return Err(());
                }
                options.mcp = true;
            }
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--scenes" => {
                if options.scenes_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.scenes_dir = Some(dir);
            }
            "--context" => {
                if options.context.is_some() {
                    return Err(());
                }
                let context = args.next().ok_or(())?;
                options.context = Some(context);
            }
            "--mcp-http-port" => {
                if options.mcp_http_port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.mcp_http_port = Some(port);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--no-autosave" => {
                if options.no_autosave {
                    return Err(());
                }
                options.no_autosave = true;
            }
            "--autosave-ms" => {
                if options.autosave_ms.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let millis: u64 = raw.parse().map_err(|_| ())?;
                options.autosave_ms = Some(millis);
            }
            "--log-file" => {
                if options.log_file.is_some() {
                    return Err(());
                }
                let path = args.next().ok_or(())?;
                options.log_file = Some(path);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.scenes_dir.is_some() {
                    return Err(());
                }
                options.scenes_dir = Some(arg);
            }
        }
    }

    if options.demo && options.scenes_dir.is_some() {
        return Err(());
    }

    if options.mcp && options.mcp_http_port.is_some() {
        return Err(());
    }

    if options.no_autosave && options.autosave_ms.is_some() {
        return Err(());
    }

    Ok(options)
}

fn session_config(options: &CliOptions) -> SessionConfig {
    let mut config = SessionConfig::default();
    if options.no_autosave {
        config.autosave = false;
    }
    if let Some(millis) = options.autosave_ms {
        config.autosave_quiet_period = Duration::from_millis(millis);
    }
    config
}

fn init_logging(options: &CliOptions) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if let Some(path) = &options.log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .try_init()?;
    } else if options.mcp {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

fn open_folder(
    options: &CliOptions,
    context_id: &ContextId,
) -> Result<SceneFolder, Box<dyn Error>> {
    let dir = if options.demo {
        let now_millis = scenepad::model::unix_millis();
        std::env::temp_dir()
            .join(format!("scenepad-demo-{}-{now_millis}", std::process::id()))
            .to_string_lossy()
            .into_owned()
    } else {
        options.scenes_dir.clone().unwrap_or_else(|| ".".to_owned())
    };

    let folder = if options.durable_writes {
        SceneFolder::new(dir).with_durability(WriteDurability::Durable)
    } else {
        SceneFolder::new(dir)
    };

    if options.demo {
        let payload = ScenePayload::new(scenepad::model::demo_scene(), "scenepad");
        let scene_id = folder.save_scene(context_id, None, &payload)?;
        tracing::info!(scene_id = %scene_id, root = %folder.root().display(), "demo scene seeded");
    }
    Ok(folder)
}

/// Runs the TUI on its own current-thread runtime; the workbench is not `Send`.
fn run_tui(
    folder: SceneFolder,
    context_id: ContextId,
    config: SessionConfig,
) -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let local = tokio::task::LocalSet::new();
    local.block_on(&runtime, async move {
        let chrome = scenepad::tui::Chrome::new();
        let editor =
            scenepad::canvas::CanvasEditor::new(EditorConfig::default(), Box::new(chrome.clone()));
        let gateway = scenepad::gateway::FolderGateway::new(folder);
        let session = scenepad::session::EditSession::new(gateway, context_id, config);
        let bench = scenepad::workbench::Workbench::new(session, editor);
        scenepad::tui::run(bench, chrome).await
    })
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "scenepad".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging(&options)?;
        let context_id =
            ContextId::new(options.context.clone().unwrap_or_else(|| DEFAULT_CONTEXT.to_owned()))?;
        let folder = open_folder(&options, &context_id)?;

        if options.mcp {
            let mcp = scenepad::mcp::ScenepadMcp::new(folder, context_id);
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

            runtime.block_on(mcp.serve_stdio())?;
            return Ok(());
        }

        let mcp_http_port = options.mcp_http_port.unwrap_or(DEFAULT_MCP_HTTP_PORT);
        let session_config = session_config(&options);
        let mcp = scenepad::mcp::ScenepadMcp::new(folder.clone(), context_id.clone());

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", mcp_http_port)).await?;
            tracing::info!(addr = %listener.local_addr()?, "serving MCP over streamable HTTP");

            let config = StreamableHttpServerConfig {
                stateful_mode: true,
                ..StreamableHttpServerConfig::default()
            };
            let shutdown_token = config.cancellation_token.clone();
            let server_shutdown = shutdown_token.clone();

            let session_manager = Arc::new(LocalSessionManager::default());
            let mcp_service = {
                let mcp = mcp.clone();
                StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config)
            };

            let router = Router::new().nest_service("/mcp", mcp_service);
            let server_handle = tokio::spawn(async move {
                let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                    server_shutdown.cancelled().await;
                });
                if let Err(err) = serve.await {
                    tracing::error!(error = %err, "MCP HTTP server failed");
                    eprintln!("scenepad: MCP HTTP server error: {err}");
                }
            });

            let tui_join = tokio::task::spawn_blocking(move || {
                run_tui(folder, context_id, session_config).map_err(|err| err.to_string())
            })
            .await;

            shutdown_token.cancel();
            let _ = server_handle.await;

            let tui_result = tui_join.map_err(|err| -> Box<dyn Error> { Box::new(err) })?;
            tui_result.map_err(|err| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, err)) as Box<dyn Error>
            })?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("scenepad: {err}");
        std::process::exit(1);
    }
}

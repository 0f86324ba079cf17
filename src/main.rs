use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use shutterpost::camera::{list_devices, CameraSession, CameraSettings, Resolution};
use shutterpost::config::Config;
use shutterpost::render::gallery_listing;
use shutterpost::session::{CaptureSession, SessionError};
use shutterpost::webhook::{WebhookClient, WEBHOOK_URL_ENV};

/// Parse and validate JPEG quality (1-100)
fn parse_quality(s: &str) -> Result<u8, String> {
    let quality: u8 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid quality", s))?;
    if !(1..=100).contains(&quality) {
        return Err(format!("Quality must be between 1 and 100, got {}", quality));
    }
    Ok(quality)
}

/// Parse and validate the photo cap (1-100)
fn parse_max_photos(s: &str) -> Result<usize, String> {
    let max: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid photo count", s))?;
    if !(1..=100).contains(&max) {
        return Err(format!("Max photos must be between 1 and 100, got {}", max));
    }
    Ok(max)
}

/// Parse and validate resolution (WIDTHxHEIGHT format)
fn parse_resolution(s: &str) -> Result<(u32, u32), String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 1280x720)",
            s
        ));
    }
    let width: u32 = parts[0]
        .parse()
        .map_err(|_| format!("Invalid width '{}' in resolution", parts[0]))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| format!("Invalid height '{}' in resolution", parts[1]))?;
    if width == 0 || height == 0 {
        return Err("Resolution width and height must be greater than 0".to_string());
    }
    if width > 7680 || height > 4320 {
        return Err("Resolution exceeds maximum supported (7680x4320)".to_string());
    }
    Ok((width, height))
}

/// Parse and validate framerate (1-120 fps)
fn parse_fps(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !(1..=120).contains(&fps) {
        return Err(format!(
            "Framerate must be between 1 and 120 fps, got {}",
            fps
        ));
    }
    Ok(fps)
}

/// Endpoint precedence: CLI flag, then environment, then config file.
///
/// The environment must beat the config file so a deployed binary can be
/// pointed at a different flow without editing config.
fn resolve_endpoint(
    cli: Option<String>,
    env: Option<String>,
    config: Option<String>,
) -> Option<String> {
    cli.or(env).or(config)
}

/// shutterpost: camera still capture with webhook relay
#[derive(Parser)]
#[command(name = "shutterpost")]
#[command(version, about = "Capture camera stills and relay them to a webhook")]
#[command(long_about = "Capture still frames from a camera into an in-memory gallery, \
    curate them, and submit the whole gallery as one JSON request to a \
    preconfigured webhook endpoint.")]
#[command(after_help = "EXAMPLES:
    # Start a capture session against the configured webhook
    shutterpost start

    # Explicit endpoint and user
    shutterpost start --webhook-url https://flow.example/hook --user alice

    # Second camera, no selfie mirroring, smaller cap
    shutterpost start --camera 1 --no-mirror --max-photos 5

    # List available cameras
    shutterpost list-cameras

ENVIRONMENT:
    SHUTTERPOST_WEBHOOK_URL    Webhook endpoint; overrides the config file.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available camera devices
    ListCameras,

    /// Open the camera and run an interactive capture session
    #[command(after_help = "SESSION COMMANDS:
    snap            Capture a still from the live stream (or just press Enter)
    del <index>     Delete the staged photo at that position
    send [user]     Submit the gallery (user defaults to the configured id,
                    then to \"anonymous\")
    quit            End the session (also Ctrl+C)")]
    Start {
        /// Webhook endpoint URL (overrides env and config)
        #[arg(long)]
        webhook_url: Option<String>,

        /// Default user identifier for submissions
        #[arg(long, short = 'u')]
        user: Option<String>,

        /// Camera device index (default: 0, or from config)
        #[arg(long, short = 'c')]
        camera: Option<u32>,

        /// Disable selfie-mode mirroring
        #[arg(long)]
        no_mirror: bool,

        /// Maximum photos per submission (1-100, default: 10)
        #[arg(long, value_parser = parse_max_photos)]
        max_photos: Option<usize>,

        /// JPEG quality (1-100, default: 80)
        #[arg(long, short = 'q', value_parser = parse_quality)]
        quality: Option<u8>,

        /// Capture resolution (WIDTHxHEIGHT, e.g., 1280x720)
        #[arg(long, short = 'r', value_parser = parse_resolution)]
        resolution: Option<(u32, u32)>,

        /// Capture framerate (1-120 fps, default: 30)
        #[arg(long, value_parser = parse_fps)]
        fps: Option<u32>,

        /// Custom config file path (default: ~/.config/shutterpost/config.toml)
        #[arg(long)]
        config: Option<String>,
    },
}

/// Commands accepted during an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    /// Capture a still from the live stream.
    Snap,
    /// Delete the staged photo at the given position.
    Delete(usize),
    /// Submit the gallery, optionally as a specific user.
    Send(Option<String>),
    /// End the session.
    Quit,
}

/// Parse a line of session input.
///
/// An empty line is the `snap` shorthand: just hitting Enter captures a
/// still, which is the fastest way to take a burst. Unknown commands
/// return `None` with a usage hint printed.
fn parse_command(input: &str) -> Option<SessionCommand> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(SessionCommand::Snap);
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    match parts[0].to_lowercase().as_str() {
        "snap" | "s" => Some(SessionCommand::Snap),
        "del" | "d" => {
            if parts.len() < 2 {
                println!("Usage: del <index>");
                return None;
            }
            match parts[1].parse::<usize>() {
                Ok(index) => Some(SessionCommand::Delete(index)),
                Err(_) => {
                    println!("Invalid index '{}'. Usage: del <index>", parts[1]);
                    None
                }
            }
        }
        "send" => Some(SessionCommand::Send(parts.get(1).map(|s| s.to_string()))),
        "quit" | "q" | "exit" => Some(SessionCommand::Quit),
        other => {
            println!("Unknown command: {}", other);
            println!("Available commands: snap, del <index>, send [user], quit");
            None
        }
    }
}

/// Print the input prompt.
fn print_prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

/// Display formatted startup status showing current settings
fn print_startup_status(
    endpoint: &str,
    camera_index: u32,
    resolution: Resolution,
    fps: u32,
    mirror: bool,
    max_photos: usize,
    quality: u8,
    user: Option<&str>,
) {
    println!();
    println!("shutterpost v{}", env!("CARGO_PKG_VERSION"));
    println!("  Webhook:    {}", endpoint);
    println!(
        "  Camera:     index {} ({}x{} @ {} fps{})",
        camera_index,
        resolution.width,
        resolution.height,
        fps,
        if mirror { ", mirrored" } else { "" }
    );
    println!("  Gallery:    up to {} photo(s), jpeg quality {}", max_photos, quality);
    println!("  User:       {}", user.unwrap_or("anonymous"));
    println!();
    println!("Type 'snap' to capture, 'send' to submit, 'quit' to exit.");
    println!();
}

/// Run the list-cameras command.
fn run_list_cameras() -> Result<(), String> {
    let devices = list_devices().map_err(|e| e.to_string())?;

    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    for device in &devices {
        println!("  {}", device);
    }
    Ok(())
}

/// Run an interactive capture session.
#[allow(clippy::too_many_arguments)] // Direct mapping from CLI args
fn run_start(
    webhook_url: Option<String>,
    user: Option<String>,
    camera_index: u32,
    mirror: bool,
    max_photos: usize,
    quality: u8,
    resolution: (u32, u32),
    fps: u32,
) -> Result<(), String> {
    // Endpoint is fully resolved by the caller
    let endpoint = webhook_url
        .ok_or_else(|| {
            format!(
                "No webhook endpoint configured.\n\nSet it in the config file:\n    [webhook]\n    url = \"https://...\"\n\nOr via the environment:\n    export {}=\"https://...\"",
                WEBHOOK_URL_ENV
            )
        })?;

    let client = WebhookClient::new(endpoint).map_err(|e| e.to_string())?;
    let endpoint_display = client.endpoint().to_string();
    let mut session = CaptureSession::new(client, max_photos, quality);

    // Open the camera stream; permission and device errors are fatal to
    // the capture feature, so they end the session here.
    let settings = CameraSettings {
        device_index: camera_index,
        resolution: Resolution {
            width: resolution.0,
            height: resolution.1,
        },
        fps,
        mirror,
    };
    let mut camera = CameraSession::open(settings).map_err(|e| e.to_string())?;
    camera.start().map_err(|e| e.to_string())?;

    let actual = camera.actual_resolution().unwrap_or(Resolution {
        width: resolution.0,
        height: resolution.1,
    });
    let actual_fps = camera.actual_fps().unwrap_or(fps);
    print_startup_status(
        &endpoint_display,
        camera_index,
        actual,
        actual_fps,
        mirror,
        max_photos,
        quality,
        user.as_deref(),
    );

    // Submissions are async; everything else is a synchronous event loop
    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to create async runtime: {}", e))?;

    // Ctrl+C ends the session; the camera is released on drop
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        }) {
            eprintln!("Warning: Could not set up Ctrl+C handler: {}", e);
        }
    }

    let stdin = io::stdin();
    print_prompt();
    for line in stdin.lock().lines() {
        if interrupted.load(Ordering::SeqCst) {
            break;
        }
        let line = match line {
            Ok(l) => l,
            Err(_) => break, // EOF or read error
        };

        match parse_command(&line) {
            Some(SessionCommand::Snap) => match camera.latest_frame() {
                Some(frame) => match session.capture(&frame) {
                    Ok(count) => {
                        println!("Captured photo {} of {}.", count, max_photos);
                        println!("{}", gallery_listing(session.gallery()));
                    }
                    Err(e) => println!("Error: {}", e),
                },
                None => println!("No frame from the camera yet, try again."),
            },
            Some(SessionCommand::Delete(index)) => match session.delete_at(index) {
                Ok(()) => println!("{}", gallery_listing(session.gallery())),
                Err(e) => println!("Error: {}", e),
            },
            Some(SessionCommand::Send(send_user)) => {
                let submit_as = send_user.or_else(|| user.clone());
                match rt.block_on(session.submit(submit_as.as_deref())) {
                    Ok(receipt) => {
                        println!(
                            "Sent {} photo(s) as '{}' at {}.",
                            receipt.image_count, receipt.user_id, receipt.timestamp
                        );
                        println!("{}", gallery_listing(session.gallery()));
                    }
                    Err(SessionError::EmptyGallery) => {
                        println!("Nothing to send, capture a photo first.");
                    }
                    Err(e) => {
                        // Gallery is kept; the user can fix the problem and resend
                        println!("Error: {}", e);
                        println!("Your {} photo(s) are still staged, 'send' to retry.", session.gallery().len());
                    }
                }
            }
            Some(SessionCommand::Quit) => break,
            None => {}
        }

        if interrupted.load(Ordering::SeqCst) {
            break;
        }
        print_prompt();
    }

    println!("\nSession ended.");
    Ok(())
}

/// Load .env so SHUTTERPOST_WEBHOOK_URL can come from a local file.
/// Does not override variables already set in the environment.
fn load_env() {
    let _ = dotenv::dotenv();
}

fn main() {
    load_env();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::ListCameras) => {
            if let Err(e) = run_list_cameras() {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Start {
            webhook_url,
            user,
            camera,
            no_mirror,
            max_photos,
            quality,
            resolution,
            fps,
            config: config_path,
        }) => {
            // Load config; --config requires the file to parse, the
            // default path falls back to defaults on error
            let cfg = match Config::load(config_path.as_deref().map(std::path::Path::new)) {
                Ok(c) => c,
                Err(e) => {
                    if config_path.is_some() {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                    eprintln!("Warning: {}", e);
                    eprintln!("Using default settings.\n");
                    Config::default()
                }
            };

            // Merge settings: CLI args > environment > config file >
            // built-in defaults (only the endpoint has an env source)
            let webhook_url = resolve_endpoint(
                webhook_url,
                std::env::var(WEBHOOK_URL_ENV).ok(),
                cfg.webhook.url,
            );
            let user = user.or(cfg.submission.user_id);
            let camera = camera.unwrap_or(cfg.camera.device);
            let mirror = !no_mirror && cfg.camera.mirror;
            let max_photos = max_photos.unwrap_or(cfg.submission.max_photos);
            let quality = quality.unwrap_or(cfg.submission.jpeg_quality);
            let resolution = resolution.unwrap_or((cfg.camera.width, cfg.camera.height));
            let fps = fps.unwrap_or(cfg.camera.fps);

            if let Err(e) = run_start(
                webhook_url,
                user,
                camera,
                mirror,
                max_photos,
                quality,
                resolution,
                fps,
            ) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("shutterpost {}", env!("CARGO_PKG_VERSION"));
            println!("Capture camera stills and relay them to a webhook\n");
            println!("USAGE:");
            println!("    shutterpost <COMMAND>\n");
            println!("COMMANDS:");
            println!("    start         Open the camera and run a capture session");
            println!("    list-cameras  List available camera devices");
            println!("    help          Print this message or the help of a subcommand\n");
            println!("Run 'shutterpost --help' for more details and examples.");
        }
    }
}

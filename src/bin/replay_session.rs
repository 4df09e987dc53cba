//! Headless session replay
//!
//! Drives an editor from a JSON script of timestamped input events and
//! prints the resulting blocks.
//!
//! Usage:
//!     replay_session [OPTIONS] <SCRIPT>
//!
//! Options:
//!     -c, --config <FILE>     Editor config JSON (default: built-in defaults)
//!     --fps <N>               Frame rate used by "run" events (default: 60)
//!     -h, --help              Show this help message
//!
//! Script format:
//!     { "events": [
//!         { "at_ms": 0, "type": "pointer_down", "button": "primary",
//!           "ray": { "origin": [0.5, 10, 0.5], "direction": [0, -1, 0] } },
//!         { "at_ms": 500, "type": "pointer_up", "button": "primary" },
//!         { "at_ms": 500, "type": "run", "until_ms": 2000 }
//!     ] }

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use glam::Vec3;
use serde::Deserialize;

use voxedit::core::input::PointerButton;
use voxedit::core::{Error, Result};
use voxedit::editor::{Editor, EditorConfig, Rgb};
use voxedit::math::Ray;

fn print_help() {
    eprintln!("replay_session - Replay an editing session headlessly");
    eprintln!();
    eprintln!("Usage: replay_session [OPTIONS] <SCRIPT>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    -c, --config <FILE>     Editor config JSON (default: built-in defaults)");
    eprintln!("    --fps <N>               Frame rate used by \"run\" events (default: 60)");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    replay_session --config editor.json session.json");
}

#[derive(Debug)]
struct Args {
    script: PathBuf,
    config: Option<PathBuf>,
    fps: u32,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut script: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;
    let mut fps: u32 = 60;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --config".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--fps" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --fps".to_string());
                }
                fps = args[i]
                    .parse()
                    .map_err(|_| format!("Invalid fps: {}", args[i]))?;
                if fps == 0 {
                    return Err("--fps must be positive".to_string());
                }
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                if script.is_some() {
                    return Err(format!("Unexpected argument: {}", arg));
                }
                script = Some(PathBuf::from(arg));
            }
        }
        i += 1;
    }

    Ok(Args {
        script: script.ok_or_else(|| "Missing script path".to_string())?,
        config,
        fps,
    })
}

#[derive(Debug, Deserialize)]
struct RaySpec {
    origin: Vec3,
    direction: Vec3,
}

impl RaySpec {
    fn to_ray(&self) -> Result<Ray> {
        let direction = self.direction.try_normalize()
            .ok_or_else(|| Error::Script("ray direction must be non-zero".to_string()))?;
        Ok(Ray::new(self.origin, direction))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Action {
    PointerDown {
        button: PointerButton,
        #[serde(default)]
        shift: bool,
        ray: RaySpec,
    },
    PointerMove { ray: RaySpec },
    PointerUp { button: PointerButton },
    PointerLeave,
    CaptureLost,
    ModifierPressed,
    ModifierReleased,
    SetGridSize { value: f32 },
    SetBlockGap { value: f32 },
    SetBuildDistance { value: f32 },
    SetBuildRate { value: f32 },
    SetActiveColor { value: Rgb },
    SetInputSuppressed { value: bool },
    /// A single frame
    Tick,
    /// Frames at the configured rate until `until_ms`
    Run { until_ms: u64 },
}

#[derive(Debug, Deserialize)]
struct ScriptEvent {
    #[serde(default)]
    at_ms: u64,
    #[serde(flatten)]
    action: Action,
}

#[derive(Debug, Deserialize)]
struct Script {
    events: Vec<ScriptEvent>,
}

fn replay(editor: &mut Editor, script: &Script, fps: u32) -> Result<usize> {
    let frame = Duration::from_secs_f64(1.0 / fps as f64);
    let mut clock = Duration::ZERO;
    let mut evicted = 0;

    for event in &script.events {
        let at = Duration::from_millis(event.at_ms);
        if at < clock {
            return Err(Error::Script(format!("event at {} ms is out of order", event.at_ms)));
        }
        clock = at;

        match &event.action {
            Action::PointerDown { button, shift, ray } => {
                editor.pointer_down(*button, *shift, ray.to_ray()?, clock)
            }
            Action::PointerMove { ray } => editor.pointer_move(ray.to_ray()?, clock),
            Action::PointerUp { button } => editor.pointer_up(*button),
            Action::PointerLeave => editor.pointer_leave(),
            Action::CaptureLost => editor.capture_lost(),
            Action::ModifierPressed => editor.modifier_pressed(),
            Action::ModifierReleased => editor.modifier_released(),
            Action::SetGridSize { value } => editor.set_grid_size(*value),
            Action::SetBlockGap { value } => editor.set_block_gap(*value),
            Action::SetBuildDistance { value } => editor.set_build_distance(*value),
            Action::SetBuildRate { value } => editor.set_build_rate(*value),
            Action::SetActiveColor { value } => editor.set_active_color(*value),
            Action::SetInputSuppressed { value } => editor.set_input_suppressed(*value),
            Action::Tick => evicted += editor.tick(clock).len(),
            Action::Run { until_ms } => {
                let until = Duration::from_millis(*until_ms);
                while clock + frame <= until {
                    clock += frame;
                    evicted += editor.tick(clock).len();
                }
            }
        }
    }

    Ok(evicted)
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let script: Script = serde_json::from_str(&std::fs::read_to_string(&args.script)?)?;
    log::info!("Replaying {} events from {}", script.events.len(), args.script.display());

    let mut editor = Editor::new(&config);
    let evicted = replay(&mut editor, &script, args.fps)?;

    let mut blocks: Vec<_> = editor.store().iter().collect();
    blocks.sort_by_key(|record| record.key());

    println!("{} blocks ({} evicted during replay)", blocks.len(), evicted);
    for record in blocks {
        let position = record.position();
        println!(
            "  {:<14} pos ({:>7.2}, {:>7.2}, {:>7.2})  scale {:.3}  color {}{}",
            record.key().to_string(),
            position.x,
            position.y,
            position.z,
            record.scale(),
            record.color(),
            if record.is_removing() { "  [removing]" } else { "" },
        );
    }
    Ok(())
}

fn main() {
    voxedit::core::logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

//! Scripted scene demo
//!
//! Replays a JSON drawing script through the script bridge and prints the
//! draw calls a backend receives.
//!
//! Run with:
//! `cargo run -p easel_canvas --example scripted_scene [script.json] [easel.toml]`
//!
//! A script is an array of steps, either `{"call": "fillRect", "args": [..]}`
//! or `{"set": "fillStyle", "value": "red"}`.

use std::path::Path;
use std::rc::Rc;

use anyhow::Context as _;
use easel_canvas::bridge;
use easel_canvas::headless::{HeadlessHost, RecordingBackend};
use easel_canvas::{CanvasConfig, DrawingSurface, Size};
use serde::Deserialize;
use serde_json::Value;

const DEFAULT_SCRIPT: &str = r##"[
    {"set": "fillStyle", "value": "#1e1e2e"},
    {"call": "fillRect", "args": [0, 0, 320, 200]},

    {"call": "save"},
    {"call": "translate", "args": [160, 100]},
    {"set": "globalAlpha", "value": 0.8},
    {"set": "strokeStyle", "value": "rgb(137, 180, 250)"},
    {"set": "lineWidth", "value": 6},
    {"set": "lineCap", "value": "round"},
    {"call": "beginPath"},
    {"call": "arc", "args": [0, 0, 60, 0, 3.14159, false]},
    {"call": "stroke"},
    {"call": "restore"},

    {"set": "fillStyle", "value": "salmon"},
    {"call": "beginPath"},
    {"call": "moveTo", "args": [40, 40]},
    {"call": "lineTo", "args": [90, 40]},
    {"call": "quadraticCurveTo", "args": [110, 70, 65, 90]},
    {"call": "closePath"},
    {"call": "fill"},

    {"set": "font", "value": "bold 16px serif"},
    {"set": "textAlign", "value": "center"},
    {"set": "fillStyle", "value": "white"},
    {"call": "fillText", "args": ["easel", 160, 180]},

    {"call": "clearRect", "args": [30, 30, 100, 70]},
    {"call": "notAMethod", "args": [1, 2, 3]}
]"##;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Call {
        call: String,
        #[serde(default)]
        args: Vec<Value>,
    },
    Set {
        set: String,
        value: Value,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut args = std::env::args().skip(1);
    let script = match args.next() {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read script {}", path))?,
        None => DEFAULT_SCRIPT.to_string(),
    };
    let config = match args.next() {
        Some(path) => CanvasConfig::load(Path::new(&path))?,
        None => CanvasConfig::default(),
    };

    let steps: Vec<Step> = serde_json::from_str(&script).context("script is not valid JSON")?;

    let host = Rc::new(HeadlessHost::new(Size::new(320.0, 200.0)));
    let mut surface = DrawingSurface::with_config(host.clone(), config)?;

    let mut ctx = surface.context();
    for step in &steps {
        match step {
            Step::Call { call, args } => {
                let result = bridge::invoke(&mut ctx, call, args);
                if !result.is_null() {
                    println!("{} -> {}", call, result);
                }
            }
            Step::Set { set, value } => bridge::set_property(&mut ctx, set, value),
        }
    }

    println!(
        "{} steps, {} commands recorded, {} redraw requests",
        steps.len(),
        surface.commands().len(),
        host.invalidations()
    );
    for command in surface.commands() {
        println!("  {} at {:?}", command_name(command), command.bounds());
    }

    let mut backend = RecordingBackend::new();
    let drawn = surface.render(&mut backend);
    println!("rendered {} commands:", drawn);
    for op in backend.ops() {
        println!("  {:?}", op);
    }

    Ok(())
}

fn command_name(command: &easel_canvas::Command) -> &'static str {
    use easel_canvas::Command;
    match command {
        Command::FillRect { .. } => "fillRect",
        Command::StrokeRect { .. } => "strokeRect",
        Command::FillPath { .. } => "fill",
        Command::StrokePath { .. } => "stroke",
        Command::FillText { .. } => "fillText",
    }
}

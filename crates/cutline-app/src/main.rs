//! Cutline - headless timeline inspector
//!
//! Loads a timeline snapshot and prints its resolved layout or checks it
//! against the timeline invariants.
//!
//! Usage: `cutline <layout|render|validate> <snapshot.json> [policy.json]`

use anyhow::{bail, Context, Result};
use cutline_timeline::{render, EditPolicy, RenderTrack, TimelineEditor, TimelineSnapshot};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

enum Command {
    Layout,
    Render,
    Validate,
}

impl Command {
    fn parse(arg: &str) -> Result<Self> {
        match arg {
            "layout" => Ok(Self::Layout),
            "render" => Ok(Self::Render),
            "validate" => Ok(Self::Validate),
            other => bail!("Unknown command '{}' (expected layout, render or validate)", other),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(command), Some(snapshot_path)) = (args.next(), args.next()) else {
        bail!("Usage: cutline <layout|render|validate> <snapshot.json> [policy.json]");
    };
    let command = Command::parse(&command)?;
    let snapshot_path = PathBuf::from(snapshot_path);

    let policy = match args.next().map(PathBuf::from) {
        Some(path) => EditPolicy::load(&path)
            .with_context(|| format!("Failed to load policy {}", path.display()))?,
        None => EditPolicy::default(),
    };

    let snapshot = TimelineSnapshot::load_from_file(&snapshot_path)
        .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?;
    info!(
        path = %snapshot_path.display(),
        version = snapshot.version,
        elements = snapshot.elements.len(),
        "Snapshot loaded"
    );

    let editor = TimelineEditor::new(snapshot.into_model()?, policy);

    match command {
        Command::Layout => print_layout(&editor),
        Command::Render => {
            let tracks = render::resolve(editor.model(), editor.policy());
            println!("{}", serde_json::to_string_pretty(&tracks)?);
        }
        Command::Validate => {
            let problems = editor.invariant_violations();
            if !problems.is_empty() {
                for problem in &problems {
                    println!("{}", problem);
                }
                bail!("{} invariant violation(s)", problems.len());
            }
            println!("OK: {} elements", editor.model().len());
        }
    }

    Ok(())
}

fn print_layout(editor: &TimelineEditor) {
    let model = editor.model();
    let rate = model.frame_rate();
    println!(
        "{} fps, duration {}, cursor {}",
        rate,
        rate.timecode(model.duration()),
        rate.timecode(model.cursor_time())
    );

    let tracks: Vec<RenderTrack> = render::resolve(model, editor.policy());
    for track in &tracks {
        println!("{} ({} lane(s))", track.kind, track.lane_count);
        for el in &track.elements {
            let lane = el.lane.map(|l| format!(" lane {}", l)).unwrap_or_default();
            println!(
                "  {} {} - {}{}{}",
                el.id,
                rate.timecode(el.start),
                rate.timecode(el.end),
                lane,
                el.asset
                    .as_deref()
                    .map(|a| format!(" [{}]", a))
                    .unwrap_or_default()
            );
        }
    }
}

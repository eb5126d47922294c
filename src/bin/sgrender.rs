use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use scenegraph::{NodeId, NullHost, RecordingSurface, SceneDoc, SceneGraph};

#[derive(Parser, Debug)]
#[command(name = "sgrender", version)]
struct Cli {
    /// Log render and layout decisions.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render frames of a scene and print what they produced as JSON.
    Frames(FramesArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Dump {
    /// Draw commands issued by each frame.
    Commands,
    /// Bounding rectangles of every node after each frame.
    Bounds,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of frames to render.
    #[arg(long, default_value_t = 1)]
    frames: u32,

    /// What to print for each frame.
    #[arg(long, value_enum, default_value_t = Dump::Commands)]
    dump: Dump,

    /// Bitmap the surface can resolve, as `uri=WIDTHxHEIGHT`. Repeatable.
    #[arg(long = "bitmap", value_parser = parse_bitmap)]
    bitmaps: Vec<(String, f64, f64)>,

    /// Keys to route after the first frame, as `key` (press and release) in order.
    #[arg(long = "key")]
    keys: Vec<String>,
}

fn parse_bitmap(s: &str) -> Result<(String, f64, f64), String> {
    let (uri, size) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected uri=WIDTHxHEIGHT, got '{s}'"))?;
    let (w, h) = size
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{size}'"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("bitmap width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("bitmap height: {e}"))?;
    Ok((uri.to_owned(), w, h))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    match cli.cmd {
        Command::Frames(args) => cmd_frames(args),
    }
}

#[tracing::instrument(level = "debug", skip(args), fields(input = %args.in_path.display(), frames = args.frames))]
fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let doc = SceneDoc::from_path(&args.in_path)?;
    let mut host = NullHost;
    let (mut graph, root) = doc
        .build(&mut host)
        .with_context(|| format!("build scene '{}'", args.in_path.display()))?;

    let mut surface = RecordingSurface::new();
    for (uri, w, h) in &args.bitmaps {
        surface.insert_bitmap(uri.clone(), *w, *h);
    }

    let mut out = Vec::with_capacity(args.frames as usize);
    for frame in 0..args.frames {
        if frame == 1 {
            for key in &args.keys {
                graph.route_key(key, true, &mut host)?;
                graph.route_key(key, false, &mut host)?;
            }
        }
        graph
            .render(root, &mut surface, &mut host)
            .with_context(|| format!("render frame {frame}"))?;
        let payload = match args.dump {
            Dump::Commands => serde_json::to_value(surface.take_commands())?,
            Dump::Bounds => {
                surface.take_commands();
                bounds_json(&graph)?
            }
        };
        let mut entry = serde_json::Map::new();
        entry.insert("frame".to_owned(), frame.into());
        entry.insert(args.dump.key().to_owned(), payload);
        out.push(serde_json::Value::Object(entry));
    }

    let stats = graph.stats();
    tracing::info!(
        frames = args.frames,
        nodes = graph.len(),
        callbacks = stats.callbacks_invoked,
        "render finished"
    );
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

impl Dump {
    fn key(self) -> &'static str {
        match self {
            Self::Commands => "commands",
            Self::Bounds => "bounds",
        }
    }
}

fn bounds_json(graph: &SceneGraph) -> anyhow::Result<serde_json::Value> {
    let mut nodes = serde_json::Map::new();
    for id in graph.node_ids() {
        nodes.insert(id.to_string(), node_bounds(graph, id)?);
    }
    Ok(serde_json::Value::Object(nodes))
}

fn node_bounds(graph: &SceneGraph, id: NodeId) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::json!({
        "kind": graph.kind(id)?.name(),
        "rects": serde_json::to_value(graph.rects(id)?)?,
    }))
}

//! Runs an overlay on two files of polygons and draws the result as SVG.
//!
//! Each non-empty line of an input file is a polygon's exterior ring, written
//! as whitespace-separated `x,y` pairs. Turns are drawn as dots: red if the
//! overlay could leave them, grey otherwise.

use std::{fs::File, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Context};
use clap::Parser;
use ordered_float::NotNan;
use overlay::{
    turn::{Turn, TurnPhase},
    Geometry, MultiPolygon, Overlay, OverlayConfig, OverlayKind, OverlayVisitor, Point, Polygon,
    Ring,
};
use svg::node::element::{path::Data, Circle, Path};

type Float = NotNan<f64>;

#[derive(Copy, Clone, Debug)]
struct Op(OverlayKind);

impl FromStr for Op {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "union" => Ok(Op(OverlayKind::Union)),
            "intersection" => Ok(Op(OverlayKind::Intersection)),
            "xor" => Ok(Op(OverlayKind::SymDifference)),
            "difference" => Ok(Op(OverlayKind::Difference)),
            "dissolve" => Ok(Op(OverlayKind::Dissolve)),
            _ => Err(format!("unknown op {s}")),
        }
    }
}

#[derive(Parser)]
struct Args {
    a: PathBuf,
    b: Option<PathBuf>,

    #[arg(long)]
    #[clap(default_value = "union")]
    op: Op,

    /// Log every turn (at trace level) as the overlay runs.
    #[arg(long)]
    trace: bool,

    #[arg(long)]
    #[clap(default_value_t = 0.05)]
    radius: f64,

    #[arg(long, short)]
    output: PathBuf,
}

#[derive(Default)]
struct TurnCollector {
    turns: Vec<(Point<Float>, bool)>,
}

impl OverlayVisitor<Float> for TurnCollector {
    fn visit_turns(&mut self, phase: TurnPhase, turns: &[Turn<Float>]) {
        if phase == TurnPhase::Enriched {
            self.turns = turns
                .iter()
                .filter(|t| !t.discarded)
                .map(|t| (t.point.clone(), t.is_traversable))
                .collect();
        }
    }
}

fn parse_polygons(path: &PathBuf) -> anyhow::Result<Geometry<Float>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
    let mut polys = Vec::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let mut points = Vec::new();
        for pair in line.split_whitespace() {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| anyhow!("expected x,y, got {pair:?}"))?;
            let x: f64 = x.parse()?;
            let y: f64 = y.parse()?;
            points.push(Point::try_from((x, y))?);
        }
        polys.push(Polygon::new(Ring::new(points), Vec::new()));
    }
    Ok(MultiPolygon(polys).into())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let a = parse_polygons(&args.a)?;
    let b = match &args.b {
        Some(path) => parse_polygons(path)?,
        None => MultiPolygon::default().into(),
    };

    let config = OverlayConfig {
        trace_turns: args.trace,
        ..OverlayConfig::default()
    };
    let mut collector = TurnCollector::default();
    let out = Overlay::new(config).apply(args.op.0, &a, &b, &mut collector)?;
    eprintln!(
        "{} polygons, {} holes, area {}",
        out.len(),
        out.num_interiors(),
        out.area()
    );

    let doc = overlay_svg(&out, &collector.turns, args.radius);
    let out_file = File::create(args.output)?;
    svg::write(out_file, &doc)?;
    Ok(())
}

fn overlay_svg(out: &MultiPolygon<Float>, turns: &[(Point<Float>, bool)], r: f64) -> svg::Document {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut data = Data::new();
    for ring in out.iter().flat_map(|p| p.rings()) {
        let Some((first, rest)) = ring.points.split_first() else {
            continue;
        };
        data = data.move_to((first.x.into_inner(), first.y.into_inner()));
        for p in rest {
            min_x = min_x.min(p.x.into_inner());
            max_x = max_x.max(p.x.into_inner());
            min_y = min_y.min(p.y.into_inner());
            max_y = max_y.max(p.y.into_inner());
            data = data.line_to((p.x.into_inner(), p.y.into_inner()));
        }
        data = data.close();
    }
    if min_x > max_x {
        (min_x, max_x, min_y, max_y) = (0.0, 1.0, 0.0, 1.0);
    }

    let mut document = svg::Document::new()
        .set(
            "viewBox",
            (
                min_x - 2.0 * r,
                min_y - 2.0 * r,
                max_x - min_x + 4.0 * r,
                max_y - min_y + 4.0 * r,
            ),
        )
        .add(
            Path::new()
                .set("fill", "blue")
                .set("fill-rule", "evenodd")
                .set("stroke", "green")
                .set("stroke-width", r / 2.0)
                .set("d", data),
        );
    for (p, traversable) in turns {
        document = document.add(
            Circle::new()
                .set("cx", p.x.into_inner())
                .set("cy", p.y.into_inner())
                .set("r", r)
                .set("fill", if *traversable { "red" } else { "grey" }),
        );
    }
    document
}

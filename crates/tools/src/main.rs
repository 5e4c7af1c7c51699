use std::env;
use std::fs;
use std::path::PathBuf;

use editor::Document;
use foundation::time::Year;
use formats::dataset::Dataset;
use formats::digest::dataset_digest;
use scene::feature::FeatureKind;

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "inspect" => cmd_inspect(args),
        "at-year" => cmd_at_year(args),
        "roundtrip" => cmd_roundtrip(args),
        _ => Err(usage()),
    }
}

fn cmd_inspect(args: Vec<String>) -> Result<(), String> {
    // chronomap inspect <dataset.json>
    if args.len() != 1 {
        return Err(usage());
    }
    let dataset = load_dataset(&PathBuf::from(&args[0]))?;

    println!("world:       {}", display_name(&dataset.metadata.world_name));
    println!(
        "slider:      {}..{}",
        dataset.metadata.slider.min, dataset.metadata.slider.max
    );
    println!("points:      {}", dataset.points.len());
    println!("lines:       {}", dataset.lines.len());
    println!("polygons:    {}", dataset.polygons.len());

    let mut doc = Document::new();
    doc.load_dataset(dataset.clone());
    println!("vertices:    {}", doc.vertex_count());
    let invalid = doc.invalid_features();
    if !invalid.is_empty() {
        println!("invalid:     {}", invalid.len());
        for (kind, id) in &invalid {
            println!("  {} {}", kind.label(), id);
        }
    }
    for notice in doc.drain_notices() {
        eprintln!("{:?}: {}", notice.severity, notice.message);
    }

    println!("digest:      {}", dataset_digest(&dataset));
    Ok(())
}

fn cmd_at_year(args: Vec<String>) -> Result<(), String> {
    // chronomap at-year <dataset.json> <year>
    if args.len() != 2 {
        return Err(usage());
    }
    let year = Year(args[1]
        .parse::<i32>()
        .map_err(|e| format!("invalid year {:?}: {e}", args[1]))?);

    let mut doc = Document::new();
    doc.load_dataset(load_dataset(&PathBuf::from(&args[0]))?);

    for kind in [FeatureKind::Point, FeatureKind::Line, FeatureKind::Polygon] {
        for feature in doc.get_for_year(kind, year) {
            println!(
                "{} {} ({} vertices) as of {}: {}",
                kind.label(),
                feature.id,
                feature.points.len(),
                feature.year,
                display_name(&feature.name),
            );
        }
    }
    Ok(())
}

fn cmd_roundtrip(args: Vec<String>) -> Result<(), String> {
    // chronomap roundtrip <in.json> [out.json]
    // Re-encodes a dataset in the current shape, synthesizing vertex ids
    // for legacy records, and verifies the re-encoded payload parses back
    // to the same dataset.
    if args.is_empty() || args.len() > 2 {
        return Err(usage());
    }
    let in_path = PathBuf::from(&args[0]);

    let mut doc = Document::new();
    doc.load_dataset(load_dataset(&in_path)?);
    for notice in doc.drain_notices() {
        eprintln!("{:?}: {}", notice.severity, notice.message);
    }

    let normalized = doc.to_dataset();
    let payload = normalized
        .to_json_string_pretty()
        .map_err(|e| format!("json: {e}"))?;
    let reparsed =
        Dataset::from_json_str(&payload).map_err(|e| format!("re-parse failed: {e}"))?;
    if reparsed != normalized {
        return Err(format!("round-trip mismatch for {in_path:?}"));
    }

    if let Some(out) = args.get(1) {
        let out_path = PathBuf::from(out);
        fs::write(&out_path, payload).map_err(|e| format!("write {out_path:?}: {e}"))?;
        println!("wrote {out_path:?}");
    } else {
        println!("round-trip ok");
    }
    println!("digest: {}", dataset_digest(&normalized));
    Ok(())
}

fn load_dataset(path: &PathBuf) -> Result<Dataset, String> {
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    Dataset::from_json_str(&payload).map_err(|e| format!("parse {path:?}: {e}"))
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "(unnamed)" } else { name }
}

fn usage() -> String {
    r#"chronomap <command>

commands:
  inspect   <dataset.json>            print section counts, digest and invalid features
  at-year   <dataset.json> <year>     list features visible at the given year
  roundtrip <in.json> [out.json]      normalize a dataset and verify it re-parses identically
"#
    .to_string()
}

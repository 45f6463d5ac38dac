//! Offline semantic query against a scan's instance embeddings.
use anyhow::{Context, Result};
use embedding_query::{
    InstanceId, QueryEngine, QueryStatus, Selection, parse_embedding_response, parse_scan,
};
use std::fs;
use std::path::Path;
use tracing::info;

/// Width of the widest histogram bar in the text plot.
const BAR_WIDTH: usize = 40;

pub struct QueryRequest<'a> {
    pub scan_path: &'a Path,
    pub embedding_path: &'a Path,
    pub text: Option<&'a str>,
    pub selection: Selection,
    pub histogram_bins: usize,
}

/// Runs one query and returns the selected instance ids.
pub fn run_query(request: &QueryRequest) -> Result<Vec<InstanceId>> {
    let scan_text = fs::read_to_string(request.scan_path)
        .with_context(|| format!("reading scan {}", request.scan_path.display()))?;
    let scan = parse_scan(&scan_text)
        .with_context(|| format!("parsing scan {}", request.scan_path.display()))?;

    let engine = QueryEngine::new();
    let loaded = engine.load_scan(scan);
    println!("Loaded {} instance embeddings", loaded);

    if let Some(text) = request.text {
        if engine.begin_query(text) == QueryStatus::NeedsVector {
            info!("Query '{}' awaiting embedding", text);
        }
    }

    let reply = fs::read_to_string(request.embedding_path)
        .with_context(|| format!("reading embedding {}", request.embedding_path.display()))?;
    let vector = parse_embedding_response(&reply)
        .with_context(|| format!("parsing embedding {}", request.embedding_path.display()))?;

    let outcome = engine.set_query(vector);
    println!("Scored {} instances", outcome.scored);
    if outcome.mismatched > 0 {
        println!(
            "  Skipped {} instances with a different embedding dimension",
            outcome.mismatched
        );
    }

    if request.histogram_bins > 0 {
        print!("{}", render_histogram(&engine.histogram(request.histogram_bins)));
    }

    let selected = engine.select(request.selection);
    print_selection(&engine, request.selection, &selected);
    Ok(selected)
}

/// One line per bin: the bin's lower edge followed by a bar scaled to the fullest bin.
fn render_histogram(bins: &[f32]) -> String {
    let mut out = String::new();
    for (i, height) in bins.iter().enumerate() {
        let lower = i as f32 / bins.len() as f32;
        let bar = "#".repeat((height * BAR_WIDTH as f32).round() as usize);
        out.push_str(&format!("  {:.2} |{}\n", lower, bar));
    }
    out
}

fn print_selection(engine: &QueryEngine, selection: Selection, selected: &[InstanceId]) {
    match selection {
        Selection::Threshold(t) => println!("Instances with similarity >= {:.3}:", t),
        Selection::TopFraction(f) => println!("Instances in the top {:.0}%:", (1.0 - f) * 100.0),
    }
    for id in selected {
        if let Some(similarity) = engine.similarity(*id) {
            println!("  {:>6}  {:.4}", id, similarity);
        }
    }
    println!("Selected {} of {} instances", selected.len(), engine.instance_count());
}

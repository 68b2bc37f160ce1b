use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use protocol_risk::{
    decode_document, prepare_document, ArtifactStore, ClassifyOptions, ResultTable,
    RiskAggregator, SortBy, TranslationMap, DEFAULT_THRESHOLD,
};

const NOTICE: &str = "Demo model: trained on a small, imbalanced dataset. \
                      Predictions are illustrative only and not for real regulatory use.";

#[derive(Parser)]
#[command(author, version, about = "Classify clinical protocol text against the registered risk categories", long_about = None)]
struct Args {
    /// Protocol text to classify
    #[arg(short, long)]
    text: Option<String>,

    /// Plain-text file to classify; takes precedence over --text
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory holding models.json and risks.json
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Probability at or above which a risk is reported present
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f32,

    /// Row order: registry or probability
    #[arg(long, default_value_t = SortBy::Registry)]
    sort: SortBy,

    /// Show raw category identifiers instead of translated names
    #[arg(long)]
    raw_names: bool,

    /// JSON file of display names replacing the built-in translation table
    #[arg(long, conflicts_with = "raw_names")]
    translations: Option<PathBuf>,

    /// Print the result table as JSON
    #[arg(long)]
    json: bool,
}

fn read_document(args: &Args) -> Result<Option<String>> {
    let raw = match (&args.file, &args.text) {
        (Some(path), _) => {
            let bytes = fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            decode_document(&bytes)
        }
        (None, Some(text)) => text.clone(),
        (None, None) => return Ok(None),
    };
    Ok(prepare_document(&raw).map(str::to_string))
}

fn translation(args: &Args) -> Result<Option<TranslationMap>> {
    if args.raw_names {
        return Ok(None);
    }
    match &args.translations {
        Some(path) => TranslationMap::from_file(path)
            .map(Some)
            .with_context(|| format!("Failed to read translations from {}", path.display())),
        None => Ok(Some(TranslationMap::builtin())),
    }
}

fn format_probability(probability: f32) -> String {
    format!("{:.1}%", probability * 100.0)
}

fn render_table(table: &ResultTable) -> String {
    let rows: Vec<(&str, String, &str)> = table
        .iter()
        .map(|row| {
            (
                row.label(),
                format_probability(row.probability),
                if row.present { "Yes" } else { "No" },
            )
        })
        .collect();

    let risk_width = rows
        .iter()
        .map(|(label, _, _)| label.chars().count())
        .chain(std::iter::once("Risk".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<risk_width$}  {:>11}  {}\n", "Risk", "Probability", "Present");
    for (label, probability, present) in rows {
        out.push_str(&format!("{:<risk_width$}  {:>11}  {}\n", label, probability, present));
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let Some(document) = read_document(&args)? else {
        eprintln!("Provide text with --text or upload a .txt file with --file.");
        process::exit(2);
    };

    let store = match &args.artifacts {
        Some(dir) => ArtifactStore::new(dir),
        None => ArtifactStore::new_default(),
    };
    info!("Loading artifacts from {:?}", store.artifacts_dir());
    let registry = store
        .load()
        .with_context(|| format!("Failed to load artifacts from {}", store.artifacts_dir().display()))?;

    let mut options = ClassifyOptions::default()
        .with_threshold(args.threshold)
        .sorted_by(args.sort);
    if let Some(names) = translation(&args)? {
        options = options.with_translation(names);
    }

    let start = Instant::now();
    let table = RiskAggregator::new(registry)
        .with_options(options)
        .classify(&document)?;
    info!("Classification took {:.2?}", start.elapsed());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("Predictions\n");
        print!("{}", render_table(&table));
        println!("\n{}", NOTICE);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol_risk::{classify, ModelRegistry, PriorModel};

    #[test]
    fn test_format_probability() {
        assert_eq!(format_probability(0.82), "82.0%");
        assert_eq!(format_probability(0.3149), "31.5%");
        assert_eq!(format_probability(1.0), "100.0%");
    }

    #[test]
    fn test_render_table() -> Result<()> {
        let registry = ModelRegistry::builder()
            .add_category("riesgo_biologico", PriorModel::new(0.64)?)?
            .add_category("legal", PriorModel::new(0.2)?)?
            .build()?;
        let options = ClassifyOptions::default().with_translation(TranslationMap::builtin());
        let table = classify("muestras de sangre", &registry, &options)?;

        let rendered = render_table(&table);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Risk"));
        assert!(lines[1].starts_with("Biological Risk"));
        assert!(lines[1].ends_with("64.0%  Yes"));
        assert!(lines[2].starts_with("legal"));
        assert!(lines[2].ends_with("20.0%  No"));
        Ok(())
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["protocol_risk_bin", "--text", "  hello  ", "--sort", "probability"]);
        assert_eq!(args.sort, SortBy::Probability);
        assert_eq!(args.threshold, DEFAULT_THRESHOLD);
        assert_eq!(read_document(&args).unwrap().as_deref(), Some("hello"));

        let empty = Args::parse_from(["protocol_risk_bin", "--text", "   "]);
        assert!(read_document(&empty).unwrap().is_none());

        assert!(Args::try_parse_from(["protocol_risk_bin", "--raw-names", "--translations", "x.json"]).is_err());
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, bail};
use log::info;

use cardio_risk::async_io::{load_cohort_async, write_cohort_parquet_async};
use cardio_risk::{
    CardioConfig, ModelBundle, PredictionPipeline, SubjectInput, evaluate_cohort, generate_summary,
};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const USAGE: &str = "Usage:
  cardio-risk predict [model_dir] [--json] age=.. weight=.. height=.. ap_hi=.. ap_lo=.. cholesterol=.. gluc=..
  cardio-risk describe [dataset]
  cardio-risk evaluate [model_dir] [dataset]
  cardio-risk clean <input> <output.parquet>
  cardio-risk config

Set CARDIO_CONFIG to a JSON configuration file. CARDIO_MODEL_DIR,
CARDIO_DATASET and CARDIO_BATCH_SIZE override its values.";

fn load_config() -> anyhow::Result<CardioConfig> {
    let config = match std::env::var_os("CARDIO_CONFIG") {
        Some(path) => CardioConfig::from_file(Path::new(&path))
            .with_context(|| format!("Failed to load configuration from {}", path.to_string_lossy()))?,
        None => CardioConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;
    Ok(config)
}

async fn load_pipeline(config: &CardioConfig, model_dir: &Path) -> anyhow::Result<PredictionPipeline> {
    let bundle = ModelBundle::load_async(model_dir)
        .await
        .with_context(|| format!("Failed to load model from {}", model_dir.display()))?;
    Ok(PredictionPipeline::new(Arc::new(bundle)).with_thresholds(config.advisories.clone()))
}

fn dataset_arg(arg: Option<&String>, config: &CardioConfig) -> anyhow::Result<PathBuf> {
    arg.map(PathBuf::from)
        .or_else(|| config.dataset.clone())
        .context("No dataset given and CARDIO_DATASET is not set")
}

async fn predict(config: &CardioConfig, args: &[String]) -> anyhow::Result<()> {
    let json = args.iter().any(|a| a == "--json");
    let rest: Vec<&String> = args.iter().filter(|a| *a != "--json").collect();

    let (model_dir, pairs) = match rest.split_first() {
        Some((first, pairs)) if !first.contains('=') => (PathBuf::from(first), pairs.to_vec()),
        _ => (config.model_dir.clone(), rest.clone()),
    };

    let input = SubjectInput::from_pairs(pairs.iter().filter_map(|pair| pair.split_once('=')));
    let subject = input.parse()?;
    let assessment = load_pipeline(config, &model_dir).await?.assess(&subject)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
    } else {
        print!("{}", assessment.render_text());
    }
    Ok(())
}

async fn describe(config: &CardioConfig, args: &[String]) -> anyhow::Result<()> {
    let dataset = dataset_arg(args.first(), config)?;
    let cohort = load_cohort_async(&dataset, config.batch_size, &config.cleaning).await?;
    let summary = tokio::task::spawn_blocking(move || generate_summary(&cohort)).await?;
    print!("{summary}");
    Ok(())
}

async fn evaluate(config: &CardioConfig, args: &[String]) -> anyhow::Result<()> {
    let model_dir = args.first().map_or_else(|| config.model_dir.clone(), PathBuf::from);
    let dataset = dataset_arg(args.get(1), config)?;

    let (pipeline, cohort) = futures::try_join!(
        load_pipeline(config, &model_dir),
        async {
            load_cohort_async(&dataset, config.batch_size, &config.cleaning)
                .await
                .map_err(anyhow::Error::from)
        },
    )?;

    let batch_size = config.batch_size;
    let matrix = tokio::task::spawn_blocking(move || {
        evaluate_cohort(&pipeline, &cohort.records, batch_size)
    })
    .await?;
    println!("{matrix}");
    Ok(())
}

async fn clean(config: &CardioConfig, args: &[String]) -> anyhow::Result<()> {
    let [input, output] = args else {
        bail!("clean expects an input and an output path\n\n{USAGE}");
    };
    let cohort = load_cohort_async(Path::new(input), config.batch_size, &config.cleaning).await?;
    println!("{}", cohort.report);
    let written = write_cohort_parquet_async(Path::new(output), cohort.records).await?;
    println!("Wrote {written} records to {output}");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        return Ok(());
    };

    let config = load_config()?;
    let start = Instant::now();

    match command.as_str() {
        "predict" => predict(&config, rest).await?,
        "describe" => describe(&config, rest).await?,
        "evaluate" => evaluate(&config, rest).await?,
        "clean" => clean(&config, rest).await?,
        "config" => print!("{config}"),
        "help" | "--help" | "-h" => println!("{USAGE}"),
        other => bail!("Unknown command '{other}'\n\n{USAGE}"),
    }

    info!("Finished {command} in {:?}", start.elapsed());
    Ok(())
}

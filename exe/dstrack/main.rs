mod app_config;

use std::{error::Error, path::PathBuf};

use app_config::AppConfig;
use clap::{Parser, Subcommand, ValueEnum};
use dstrack::{
  chart::{LineChart, VennDiagram},
  model::{ClassifierConfig, ForestConfig, LogisticConfig},
  pipeline::ClassificationTask,
  scaffold::DEFAULT_BASE,
  subcommands::{self, DatasetSource, SeriesParams},
  utils,
};
use tracing::debug;

#[derive(Parser)]
#[command(version)]
struct Cli {
  /// YAML file with defaults for seeds, ratios and model hyperparameters
  #[arg(long, global = true, value_name = "PATH")]
  config: Option<PathBuf>,
  #[command(subcommand)]
  command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelKind {
  Logistic,
  Forest,
}

#[derive(Subcommand)]
enum Command {
  /// Train a classifier and report accuracy, confusion matrix and per-class scores
  Classify {
    /// `purchases`, `spam`, or a path to a CSV / whitespace separated table
    #[arg(long, default_value = "purchases")]
    dataset: String,
    /// Label column; built-in datasets know their own
    #[arg(long)]
    target: Option<String>,
    /// Feature columns; all but the target when omitted
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,
    #[arg(long, value_enum, default_value_t = ModelKind::Logistic)]
    model: ModelKind,
    #[arg(long, value_name = "RATIO")]
    test_ratio: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Rows of the synthetic spam dataset
    #[arg(long)]
    samples: Option<usize>,
    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,
  },
  /// Create the curriculum folders and README files
  Scaffold {
    #[arg(long, value_name = "DIR", default_value = DEFAULT_BASE)]
    base: PathBuf,
  },
  /// Draw the highlighted-complement Venn diagram
  Venn {
    #[arg(short, long, value_name = "SVG")]
    output: Option<PathBuf>,
  },
  /// Generate a random daily series and draw it
  Timeseries {
    #[arg(short, long, value_name = "SVG")]
    output: Option<PathBuf>,
    #[arg(long)]
    days: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
  },
}

fn defaults() -> AppConfig {
  AppConfig {
    seed: Some(42),
    test_ratio: Some(0.2),
    samples: Some(1000),
    output_dir: Some(PathBuf::from(".")),
    ..Default::default()
  }
}

fn chart_path(output: Option<PathBuf>, config: &AppConfig, file_name: &str) -> PathBuf {
  output.unwrap_or_else(|| {
    config
      .output_dir
      .clone()
      .unwrap_or_default()
      .join(file_name)
  })
}

fn classifier(kind: ModelKind, config: &AppConfig, seed: u64) -> ClassifierConfig {
  match kind {
    ModelKind::Logistic => {
      let base = LogisticConfig::default();
      ClassifierConfig::LogisticRegression(LogisticConfig {
        max_iterations: config
          .logistic_regression
          .max_iterations
          .unwrap_or(base.max_iterations),
        alpha: config.logistic_regression.alpha.unwrap_or(base.alpha),
      })
    }
    ModelKind::Forest => {
      let base = ForestConfig::default();
      ClassifierConfig::RandomForest(ForestConfig {
        n_estimators: config.random_forest.n_estimators.unwrap_or(base.n_estimators),
        max_depth: config.random_forest.max_depth.or(base.max_depth),
        feature_fraction: config
          .random_forest
          .feature_fraction
          .or(base.feature_fraction),
        seed,
      })
    }
  }
}

fn main() -> Result<(), Box<dyn Error>> {
  utils::init_logging()?;
  let args = Cli::parse();

  let file_config = match &args.config {
    Some(path) => AppConfig::from_file(path)?,
    None => AppConfig::default(),
  };
  let config = defaults().merge(file_config.clone());

  match args.command {
    Command::Classify {
      dataset,
      target,
      features,
      model,
      test_ratio,
      seed,
      samples,
      json,
    } => {
      // the spam exercise holds out 30%
      let dataset_defaults = AppConfig {
        test_ratio: (dataset == "spam").then_some(0.3),
        ..Default::default()
      };
      let flags = AppConfig {
        seed,
        test_ratio,
        samples,
        ..Default::default()
      };
      let config = defaults()
        .merge(dataset_defaults)
        .merge(file_config)
        .merge(flags);
      debug!(?config, "effective configuration");

      let seed = config.seed.unwrap_or_default();
      let source = DatasetSource::parse(&dataset, config.samples.unwrap_or_default(), seed);
      let build = |target: String| ClassificationTask {
        features,
        target,
        test_ratio: config.test_ratio.unwrap_or_default(),
        seed,
        classifier: classifier(model, &config, seed),
      };
      subcommands::Classify::new(source, target, build, json)?.run()?;
    }
    Command::Scaffold { base } => {
      subcommands::Scaffold::new(&base).run()?;
    }
    Command::Venn { output } => {
      let output = chart_path(output, &config, "venn.svg");
      subcommands::Venn::new(VennDiagram::highlighted_complement(), &output).run()?;
    }
    Command::Timeseries { output, days, seed } => {
      let config = config.merge(AppConfig {
        seed,
        ..Default::default()
      });
      let output = chart_path(output, &config, "timeseries.svg");
      let base = SeriesParams::default();
      let params = SeriesParams {
        days: days.unwrap_or(base.days),
        seed: config.seed.unwrap_or(base.seed),
        ..base
      };
      subcommands::Timeseries::new(params, LineChart::default(), &output).run()?;
    }
  }
  Ok(())
}

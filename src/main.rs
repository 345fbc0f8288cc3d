use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::info;

use subpixel::data::{load_csv, LabelMode};
use subpixel::{
    evaluate_model, Dataset, Device, ImageDataset, LossType, LrFinder, Mode, Network, NetworkSpec,
    Result, TrainConfig, Trainer,
};

#[derive(Parser)]
#[command(name = "subpixel", version, about = "Train and evaluate small dense networks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a network described by an architecture file.
    Train(TrainArgs),
    /// Mean loss (and accuracy) of a saved model over an image directory.
    Evaluate(EvaluateArgs),
    /// Run the learning-rate range test and print the suggested rate.
    FindLr(FindLrArgs),
}

#[derive(Args)]
struct DataArgs {
    /// CSV training data.
    #[arg(long)]
    train: PathBuf,
    /// Treat the last column as a class index with this many classes.
    #[arg(long, conflicts_with = "label_cols")]
    n_classes: Option<usize>,
    /// Number of trailing label columns.
    #[arg(long, default_value_t = 1)]
    label_cols: usize,
}

impl DataArgs {
    fn label_mode(&self) -> LabelMode {
        match self.n_classes {
            Some(n_classes) => LabelMode::ClassIndex { n_classes },
            None => LabelMode::Columns { n_label_cols: self.label_cols },
        }
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Architecture JSON (`NetworkSpec`).
    #[arg(long)]
    arch: PathBuf,
    #[command(flatten)]
    data: DataArgs,
    /// CSV validation data, same layout as the training data.
    #[arg(long)]
    val: Option<PathBuf>,
    /// JSON `TrainConfig`; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    epochs: Option<usize>,
    #[arg(long)]
    mode: Option<Mode>,
    /// Loss; defaults to the one named in the architecture file.
    #[arg(long)]
    loss: Option<LossType>,
    #[arg(long)]
    lr: Option<f64>,
    #[arg(long)]
    weight_decay: Option<f64>,
    #[arg(long)]
    save_path: Option<PathBuf>,
    #[arg(long)]
    device: Option<Device>,
    /// Hide progress bars.
    #[arg(long)]
    quiet: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Saved model (`<save_path>/model`).
    #[arg(long)]
    model: PathBuf,
    /// Image directory with a `labels.csv` manifest.
    #[arg(long)]
    data: PathBuf,
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    loss: Option<LossType>,
    #[arg(long)]
    mode: Option<Mode>,
}

#[derive(Args)]
struct FindLrArgs {
    #[arg(long)]
    arch: PathBuf,
    #[command(flatten)]
    data: DataArgs,
    #[arg(long)]
    loss: Option<LossType>,
    #[arg(long, default_value_t = 1e-5)]
    weight_decay: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Train(args) => train(args),
        Command::Evaluate(args) => evaluate(args),
        Command::FindLr(args) => find_lr(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<TrainConfig> {
    match path {
        Some(path) => TrainConfig::load_json(path),
        None => Ok(TrainConfig::default()),
    }
}

fn train(args: TrainArgs) -> Result<()> {
    let spec = NetworkSpec::load_json(&args.arch)?;
    let network = spec.build()?;
    info!("built '{}' with {} parameters", spec.name, network.param_count());

    let label_mode = args.data.label_mode();
    let trainset = load_csv(&args.data.train, label_mode)?;
    let valset = args
        .val
        .as_ref()
        .map(|path| load_csv(path, label_mode))
        .transpose()?;

    let mut config = load_config(args.config.as_ref())?;
    config.loss = args.loss.unwrap_or(spec.loss);
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if args.lr.is_some() {
        config.learning_rate = args.lr;
    }
    if let Some(wd) = args.weight_decay {
        config.weight_decay = wd;
    }
    if let Some(path) = args.save_path {
        config.model_save_path = path;
    }
    if let Some(device) = args.device {
        config.device = device;
    }
    config.progress &= !args.quiet;

    let valset = valset.map(|v| Box::new(v) as Box<dyn Dataset>);
    let mut trainer = Trainer::new(network, Box::new(trainset), valset, None, config)?;
    let history = trainer.fit()?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}

fn evaluate(args: EvaluateArgs) -> Result<()> {
    let mut network = Network::load_json(&args.model)?;
    let mut config = load_config(args.config.as_ref())?;
    if let Some(loss) = args.loss {
        config.loss = loss;
    }
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    config.device.resolve()?;

    let testset = ImageDataset::open(&args.data, config.image)?;
    let evaluation = evaluate_model(&mut network, &testset, &config)?;
    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}

fn find_lr(args: FindLrArgs) -> Result<()> {
    let spec = NetworkSpec::load_json(&args.arch)?;
    let network = spec.build()?;
    let trainset = load_csv(&args.data.train, args.data.label_mode())?;
    let loss = args.loss.unwrap_or(spec.loss);

    let result = LrFinder::default().run(&network, &trainset, loss, args.weight_decay)?;
    for (lr, loss) in result.lrs.iter().zip(&result.losses) {
        info!("lr {lr:e} loss {loss}");
    }
    println!("{:e}", result.suggestion);
    Ok(())
}

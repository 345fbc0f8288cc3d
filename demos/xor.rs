use subpixel::{
    ActivationFunction, InMemoryDataset, LossType, Mode, Model, Network, Sgd, TrainConfig, Trainer,
};

fn main() -> subpixel::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let network = Network::new(vec![
        (4, 2, ActivationFunction::Tanh),
        (1, 4, ActivationFunction::Sigmoid),
    ]);

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];
    let trainset = InMemoryDataset::new(inputs.clone(), expected_outputs)?;

    let config = TrainConfig {
        epochs: 2000,
        mode: Mode::Classification,
        loss: LossType::BinaryCrossEntropy,
        learning_rate: Some(0.5),
        model_save_path: std::env::temp_dir().join("subpixel-xor"),
        progress: false,
        ..TrainConfig::default()
    };

    let mut trainer = Trainer::new(
        network,
        Box::new(trainset),
        None,
        Some(Box::new(Sgd::new(0.5))),
        config,
    )?;
    let history = trainer.fit()?;
    if let Some(acc) = history.accuracy.as_ref().and_then(|a| a.train.last()) {
        println!("final train accuracy: {:.0}%", acc * 100.0);
    }

    let mut network = trainer.into_model();
    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.forward(input)?[0]);
    }
    Ok(())
}

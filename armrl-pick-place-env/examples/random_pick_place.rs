use anyhow::Result;
use armrl_core::{
    record::BufferedRecorder, util::eval_with_recorder, DefaultEvaluator, Env as _, Evaluator as _,
    Policy,
};
use armrl_pick_place_env::{
    ActionEncoding, PickPlaceAct, PickPlaceEnv, PickPlaceEnvConfig, PickPlaceObs,
};
use clap::Parser;
use log::info;

type Env = PickPlaceEnv;

/// Runs the pick-and-place environment with a uniformly random policy.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Use the discrete variant with a grip channel
    #[arg(short, long, default_value_t = false)]
    discrete: bool,

    /// Load the environment configuration from a YAML file
    #[arg(short, long)]
    config: Option<String>,

    /// Number of evaluation episodes
    #[arg(short = 'n', long, default_value_t = 5)]
    episodes: usize,

    /// Random seed
    #[arg(short, long, default_value_t = 42)]
    seed: i64,
}

struct RandomPolicy {
    encoding: ActionEncoding,
    n_channels: usize,
}

impl Policy<Env> for RandomPolicy {
    fn sample(&mut self, _: &PickPlaceObs) -> PickPlaceAct {
        match self.encoding {
            ActionEncoding::Continuous => PickPlaceAct::Continuous(
                (0..self.n_channels)
                    .map(|_| 2.0 * fastrand::f32() - 1.0)
                    .collect(),
            ),
            ActionEncoding::Discrete => PickPlaceAct::Discrete(
                (0..self.n_channels)
                    .map(|_| fastrand::i32(0..3))
                    .chain(std::iter::once(fastrand::i32(0..2)))
                    .collect(),
            ),
        }
    }
}

fn env_config(args: &Args) -> Result<PickPlaceEnvConfig> {
    match &args.config {
        Some(path) => PickPlaceEnvConfig::load(path),
        None if args.discrete => Ok(PickPlaceEnvConfig::discrete_grip()),
        None => Ok(PickPlaceEnvConfig::reach_and_carry()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    fastrand::seed(args.seed as u64);

    let env_config = env_config(&args)?;
    let mut policy = RandomPolicy {
        encoding: env_config.action.encoding,
        n_channels: env_config.action.channels.len(),
    };

    // Per-step reward terms of a single episode
    let mut env = Env::build(&env_config, args.seed)?;
    let mut recorder = BufferedRecorder::new();
    let returns = eval_with_recorder(&mut env, &mut policy, 1, &mut recorder)?;
    info!("{} steps, return = {}", recorder.len(), returns[0]);

    // Averages over episodes
    let record = DefaultEvaluator::<Env>::new(&env_config, args.seed, args.episodes)?
        .evaluate(&mut policy)?;
    info!(
        "Average return = {}, success rate = {}",
        record.get_scalar("Episode return")?,
        record.get_scalar("Success rate")?
    );

    Ok(())
}

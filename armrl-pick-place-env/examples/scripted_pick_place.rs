use anyhow::Result;
use armrl_core::{
    record::{BufferedRecorder, Recorder as _},
    Env as _, Rollout,
};
use armrl_pick_place_env::{
    world::SpawnRegion, Heuristic, ManualInput, PickPlaceEnv, PickPlaceEnvConfig, ScriptedInput,
};
use clap::Parser;
use log::info;

/// Replays a keyboard script that picks the block and places it in the target zone.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Steps spent lowering the arm onto the block
    #[arg(long, default_value_t = 28)]
    lower: usize,

    /// Steps spent turning the base towards the target zone
    #[arg(long, default_value_t = 75)]
    turn: usize,
}

struct Summary {
    steps: usize,
    episode_return: f32,
    terminated: bool,
    placement_bonus: f32,
}

fn env_config() -> PickPlaceEnvConfig {
    let config = PickPlaceEnvConfig::discrete_grip();
    let task = config
        .task
        .clone()
        .randomize_pose(false)
        .spawn(SpawnRegion::Disc { radius: 0.0 });
    config.task(task)
}

fn script(lower: usize, turn: usize) -> ScriptedInput {
    let up = ManualInput {
        up: true,
        ..ManualInput::idle()
    };
    let right = ManualInput {
        right: true,
        ..ManualInput::idle()
    };

    ScriptedInput::new()
        .hold(up, lower)
        .press_grip()
        .hold(right, turn)
        .press_grip()
}

fn run(lower: usize, turn: usize) -> Result<Summary> {
    let env_config = env_config();
    let env = PickPlaceEnv::build(&env_config, 0)?;
    let mut policy = Heuristic::new(script(lower, turn), &env_config.action);
    let mut rollout = Rollout::new(env);
    let mut recorder = BufferedRecorder::new();

    let mut summary = Summary {
        steps: 0,
        episode_return: 0.0,
        terminated: false,
        placement_bonus: 0.0,
    };

    while policy.source().remaining() > 0 {
        let (step, record) = rollout.step(&mut policy)?;
        summary.steps += 1;
        summary.episode_return += step.reward[0];
        summary.placement_bonus += record.get_scalar("placement_bonus")?;
        recorder.write(record);

        if step.is_done() {
            summary.terminated = step.is_terminated();
            break;
        }
    }

    info!(
        "{} steps, return = {}, {} records",
        summary.steps,
        summary.episode_return,
        recorder.len()
    );
    Ok(summary)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let summary = run(args.lower, args.turn)?;
    if summary.terminated {
        info!("Placed the block, placement bonus = {}", summary.placement_bonus);
    } else {
        info!("The block was not placed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run;
    use anyhow::Result;

    #[test]
    fn test_scripted_pick_place() -> Result<()> {
        let summary = run(28, 75)?;
        assert!(summary.terminated);
        assert_eq!(summary.placement_bonus, 5.0);
        assert_eq!(summary.steps, 28 + 2 + 75 + 1);
        Ok(())
    }

    #[test]
    fn test_missed_block_is_not_placed() -> Result<()> {
        let summary = run(5, 75)?;
        assert!(!summary.terminated);
        assert_eq!(summary.placement_bonus, 0.0);
        Ok(())
    }
}

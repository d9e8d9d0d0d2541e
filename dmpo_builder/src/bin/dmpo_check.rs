//! Validate and inspect training configurations.
//!
//! ```bash
//! # Assemble a base file plus an overlay and print a summary
//! cargo run --bin dmpo-check -- check configs/dmpo.yaml configs/small_buffer.yaml
//!
//! # Tweak values from the command line and dump the result as JSON
//! cargo run --bin dmpo-check -- check configs/dmpo.yaml -o replay.batch_size=512 --json
//!
//! # Also initialize the networks on the CPU
//! cargo run --bin dmpo-check -- check configs/dmpo.yaml --observation-size 17 --action-size 6
//!
//! # List every registered discriminator
//! cargo run --bin dmpo-check -- kinds
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use burn::backend::{Autodiff, NdArray};
use burn::module::Module;
use clap::Parser;
use serde::Serialize;
use serde_yaml::Value;

use dmpo_builder::builders::{
    actor_encoders, actor_torsos, actor_updaters, critic_encoders, critic_heads, critic_torsos,
    critic_updaters, observation_normalizers, optimizers, replays,
};
use dmpo_builder::config::loader;
use dmpo_builder::models::Activation;
use dmpo_builder::{
    assemble, ActorUpdater, AgentAssembly, AgentGraph, BufferConfig, BuildError, CpuPlacement,
    CriticUpdater, Slot,
};

type Backend = Autodiff<NdArray<f32>>;

#[derive(Parser, Debug)]
#[command(version, about = "Validate diffusion MPO training configurations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Compose configuration files and run every builder on the result.
    #[command(alias = "c")]
    Check(Check),

    /// Print the registered discriminators of every slot.
    Kinds,
}

#[derive(clap::Args, Debug)]
struct Check {
    /// Configuration files, merged in order (later files win).
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// `dotted.key=value` overrides applied after merging.
    #[arg(short = 'o', long = "override")]
    overrides: Vec<String>,
    /// Print the assembled components as JSON (Hint: redirect stdout)
    #[arg(short, long, default_value_t = false)]
    json: bool,
    /// Observation size used to initialize the networks.
    #[arg(long, requires = "action_size")]
    observation_size: Option<usize>,
    /// Action size used to initialize the networks.
    #[arg(long, requires = "observation_size")]
    action_size: Option<usize>,
}

/// Serializable view of an assembly.
#[derive(Serialize)]
struct Summary<'a> {
    model: &'a AgentGraph,
    actor_updater: &'a ActorUpdater,
    critic_updater: &'a CriticUpdater,
    replay: &'a BufferConfig,
}

impl<'a> From<&'a AgentAssembly> for Summary<'a> {
    fn from(assembly: &'a AgentAssembly) -> Self {
        Self {
            model: &assembly.model,
            actor_updater: &assembly.actor_updater,
            critic_updater: &assembly.critic_updater,
            replay: assembly.replay.config(),
        }
    }
}

impl Check {
    fn run(self) -> Result<(), BuildError> {
        let mut tree: Value = loader::compose(&self.files)?;
        loader::apply_overrides(&mut tree, &self.overrides)?;
        let assembly = assemble(&tree)?;

        if self.json {
            match serde_json::to_string_pretty(&Summary::from(&assembly)) {
                Ok(text) => println!("{}", text),
                Err(err) => log::error!("Cannot serialize assembly: {}", err),
            }
        } else {
            print_summary(&assembly);
        }

        if let (Some(observation_size), Some(action_size)) =
            (self.observation_size, self.action_size)
        {
            let agent = assembly.model.initialize::<Backend, _>(
                observation_size,
                action_size,
                &CpuPlacement,
            )?;
            println!("Initialized networks:");
            println!("  actor parameters:       {}", agent.actor.num_params());
            println!("  critic parameters:      {}", agent.critic.num_params());
            println!("  temperature parameters: {}", agent.temperature.num_params());
        }
        Ok(())
    }
}

fn print_summary(assembly: &AgentAssembly) {
    let model = &assembly.model;
    let ActorUpdater::DiffusionMpo(mpo) = &assembly.actor_updater;
    let CriticUpdater::DiffusionExpectedSarsa(sarsa) = &assembly.critic_updater;
    let replay = assembly.replay.config();

    println!("Model:");
    println!(
        "  actor:    {} / {} / diffusion head ({} steps, hidden {}, {} blocks) on {}",
        model.actor.encoder.name(),
        model.actor.torso.name(),
        model.actor.head.num_diffusion_steps,
        model.actor.head.hidden_dim,
        model.actor.head.n_blocks,
        model.actor.head.device
    );
    println!(
        "  critic:   {} / {:?} / {} on {}",
        model.critic.encoder.name(),
        model.critic.torso,
        model.critic.head.name(),
        model.critic.device
    );
    println!(
        "  normalizer: {}",
        model
            .observation_normalizer
            .as_ref()
            .map_or("none", |normalizer| normalizer.name())
    );
    println!(
        "  squash: {}, action_scale: {}, target_coeff: {}",
        model.actor_squash, model.action_scale, model.target_coeff
    );
    println!("Actor updater: {}", assembly.actor_updater.name());
    println!(
        "  learning_rate: {}, dual_learning_rate: {}, num_samples: {}",
        mpo.actor_optimizer.learning_rate, mpo.dual_optimizer.learning_rate, mpo.num_samples
    );
    println!("Critic updater: {}", assembly.critic_updater.name());
    println!(
        "  learning_rate: {}, num_samples: {}",
        sarsa.optimizer.learning_rate, sarsa.num_samples
    );
    println!("Replay:");
    println!(
        "  size: {}, batch_size: {}, discount: {}, return_steps: {}",
        replay.size, replay.batch_size, replay.discount_factor, replay.return_steps
    );
    println!(
        "  steps_before_batches: {}, steps_between_batches: {}, batch_iterations: {}",
        replay.steps_before_batches, replay.steps_between_batches, replay.batch_iterations
    );
}

fn print_kinds() {
    let slots = [
        (actor_encoders::<Value>().slot(), actor_encoders::<Value>().names()),
        (actor_torsos::<Value>().slot(), actor_torsos::<Value>().names()),
        (critic_encoders::<Value>().slot(), critic_encoders::<Value>().names()),
        (critic_torsos::<Value>().slot(), critic_torsos::<Value>().names()),
        (critic_heads::<Value>().slot(), critic_heads::<Value>().names()),
        (
            observation_normalizers::<Value>().slot(),
            observation_normalizers::<Value>().names(),
        ),
        (optimizers::<Value>().slot(), optimizers::<Value>().names()),
        (actor_updaters::<Value>().slot(), actor_updaters::<Value>().names()),
        (critic_updaters::<Value>().slot(), critic_updaters::<Value>().names()),
        (replays::<Value>().slot(), replays::<Value>().names()),
    ];
    for (slot, names) in slots {
        println!("{:<24} {}", slot.as_str(), names.join(", "));
    }
    let activations: Vec<&str> = Activation::ALL.iter().map(Activation::name).collect();
    println!("{:<24} {}", Slot::Activation.as_str(), activations.join(", "));
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Check(args) => args.run(),
        Command::Kinds => {
            print_kinds();
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is_configuration_error() => {
            eprintln!("Invalid configuration: {}", err);
            if let Some(slot) = err.slot() {
                eprintln!("Run `dmpo-check kinds` to list every registered {}", slot);
            }
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("Cannot load configuration: {}", err);
            ExitCode::FAILURE
        }
    }
}

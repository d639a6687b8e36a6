mod autopilot;

use std::path::PathBuf;

use autopilot::Autopilot;
use clap::Parser;
use supersnake_engine::config::ConfigManager;
use supersnake_engine::snake::{InputAction, ManualClock, SnakeSession, SnakeSessionSettings};
use supersnake_engine::{SessionRng, log, logger};

#[derive(Parser)]
#[command(name = "supersnake_runner")]
struct Args {
    /// YAML settings file. Defaults are used when it does not exist.
    #[arg(long, default_value = "supersnake.yaml")]
    config: PathBuf,

    #[arg(long, default_value_t = 3600)]
    frames: u64,

    #[arg(long, default_value_t = 60)]
    fps: u32,

    #[arg(long)]
    seed: Option<u64>,

    /// Steer the player towards food with the pathfinder instead of wandering.
    #[arg(long)]
    autopilot: bool,

    #[arg(long)]
    use_log_prefix: bool,

    /// Stop after this many finished games.
    #[arg(long, default_value_t = 1)]
    max_games: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Runner".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    if args.fps == 0 {
        return Err("fps must be positive".into());
    }

    let config_manager: ConfigManager<_, SnakeSessionSettings> = ConfigManager::from_yaml_file(&args.config);
    let settings = config_manager.get_config()?;
    log!(
        "Loaded settings from {} ({}x{} field)",
        args.config.display(),
        settings.field_width,
        settings.field_height
    );

    let rng = args.seed.map(SessionRng::new).unwrap_or_else(SessionRng::from_random);
    let seed = rng.seed();
    let clock = ManualClock::new();
    let mut session = SnakeSession::new(settings, clock.clone(), rng);
    let mut autopilot = Autopilot::new(seed, args.autopilot);

    let frame_time = 1.0 / args.fps as f64;
    let summary_every = u64::from(args.fps) * 5;
    let mut games_finished = 0u32;
    let mut best_score = 0u32;

    log!("Running {} frames at {} fps (seed {})", args.frames, args.fps, seed);

    for frame in 1..=args.frames {
        clock.advance_secs_f64(frame_time);

        if session.is_over() {
            let snapshot = session.snapshot();
            games_finished += 1;
            best_score = best_score.max(snapshot.score);
            log!(
                "Game {} finished at frame {}: score {}, length {}, reason {:?}",
                games_finished,
                frame,
                snapshot.score,
                snapshot.player.body.len(),
                snapshot.game_end_reason
            );
            if games_finished >= args.max_games {
                break;
            }
            session.apply_input(InputAction::Confirm);
            continue;
        }

        let action = autopilot.next_action(&session.snapshot());
        session.apply_input(action);
        session.update(frame_time);

        if frame % summary_every == 0 {
            let snapshot = session.snapshot();
            log!(
                "[{:.0}s] score {}, length {}, speed {:.1}x{:.2}, enemies {}, food {}",
                clock.elapsed().as_secs_f64(),
                snapshot.score,
                snapshot.player.body.len(),
                snapshot.base_speed,
                snapshot.player_speed_factor,
                snapshot.enemies.len(),
                snapshot.food.len()
            );
        }
    }

    log!(
        "Done: {} games finished, best score {}, current score {}",
        games_finished,
        best_score.max(session.score()),
        session.score()
    );

    Ok(())
}

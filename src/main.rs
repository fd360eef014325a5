//! Shardstorm headless demo driver
//!
//! Runs the simulation core at the fixed timestep without any presentation
//! layer attached. With `--autoplay` a simple cursor AI sweeps the levels
//! the way the pointer collaborator would.

use clap::Parser;
use glam::DVec2;

use shardstorm::consts::*;
use shardstorm::sim::{EntityId, EntityKind, Session, SimEvent};
use shardstorm::{Difficulty, Settings, levels};

/// Autoplay cursor speed in units per second
const CURSOR_SPEED: f64 = 900.0;

#[derive(Parser, Debug)]
#[command(
    name = "shardstorm",
    about = "Headless demo driver for the Shardstorm simulation core"
)]
struct Args {
    /// Play a single bundled level (1-based) instead of the whole campaign
    #[arg(long)]
    level: Option<usize>,
    /// Difficulty preset: relaxed, standard, frantic
    #[arg(long, default_value = "standard")]
    difficulty: String,
    /// Let the built-in autoplayer drive the cursor
    #[arg(long)]
    autoplay: bool,
    /// Maximum seconds of simulated time to run
    #[arg(long, default_value_t = 120.0)]
    max_secs: f64,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let Some(difficulty) = Difficulty::from_str(&args.difficulty) else {
        eprintln!("unknown difficulty `{}`", args.difficulty);
        std::process::exit(2);
    };
    let settings = Settings::with_difficulty(difficulty);

    let all = levels::builtin_scripts();
    let sources: Vec<&str> = match args.level {
        Some(n) if n >= 1 && n <= all.len() => vec![all[n - 1]],
        Some(n) => {
            eprintln!("no such level {n} (have 1-{})", all.len());
            std::process::exit(2);
        }
        None => all,
    };

    log::info!(
        "Shardstorm starting: {} level(s), difficulty {}",
        sources.len(),
        settings.difficulty.as_str()
    );

    // Scripts are trusted build-time assets
    let mut session = Session::from_sources(&settings, &sources).expect("bundled level script");

    let mut cursor = DVec2::new(SCREEN_W / 2.0, SCREEN_H / 2.0);
    let max_ticks = (args.max_secs / SIM_DT) as u64;

    for _ in 0..max_ticks {
        if args.autoplay {
            autoplay_tick(&mut session, &mut cursor, SIM_DT);
        }
        session.update(SIM_DT);
        for event in session.drain_events() {
            report(&event, &settings);
        }
        if session.is_finished() {
            break;
        }
    }

    println!("total score: {}", session.total_score);
    if let Some(top) = session.scoreboard.top_score() {
        println!("best score:  {top}");
    }
    for achievement in session.achievements.unlocked() {
        println!("achievement: {}", achievement.title());
    }
}

/// Minimal stand-in for the pointer collaborator: chase the nearest
/// interactable shape, fire hover/click bindings when the cursor lands
/// inside it, and trigger power-ups as soon as they are armed
fn autoplay_tick(session: &mut Session, cursor: &mut DVec2, dt: f64) {
    let chase = session
        .level
        .entities
        .iter()
        .filter(|e| {
            e.is_alive() && e.position.y > VISIBLE_Y && e.position.y < SCREEN_H
        })
        .filter(|e| {
            matches!(
                e.kind,
                EntityKind::Target
                    | EntityKind::ConcealedTarget
                    | EntityKind::ArmoredTarget { .. }
                    | EntityKind::PowerUp(_)
            )
        })
        .min_by(|a, b| {
            (a.position - *cursor)
                .length()
                .total_cmp(&(b.position - *cursor).length())
        })
        .map(|e| e.position);

    if let Some(goal) = chase {
        let to_goal = goal - *cursor;
        let step = CURSOR_SPEED * dt;
        if to_goal.length() <= step {
            *cursor = goal;
        } else {
            *cursor += to_goal.normalize() * step;
        }
    }
    session.set_cursor(*cursor);

    // Emulate the per-entity pointer bindings
    let under_cursor: Vec<(EntityId, bool)> = session
        .level
        .entities
        .iter()
        .filter(|e| e.is_alive() && e.contains_point(*cursor))
        .map(|e| (e.id, matches!(e.kind, EntityKind::ArmoredTarget { .. })))
        .collect();
    for (id, armored) in under_cursor {
        session.hover(id);
        if armored {
            session.click(id);
        }
    }

    session.trigger_slowtime();
    session.trigger_intangible();
}

fn report(event: &SimEvent, settings: &Settings) {
    match event {
        SimEvent::Sound(kind) => {
            if settings.sound {
                log::debug!("sfx: {kind:?}");
            }
        }
        SimEvent::ArmoredTierChanged { id, remaining } => {
            log::debug!("armored #{id} down to tier {remaining}");
        }
        SimEvent::ResourceBarShown => log::info!("resource bar shown"),
        SimEvent::ResourceBarHidden => log::info!("resource bar hidden"),
        SimEvent::ResourceDrained => log::info!("resource drained - score wiped"),
        SimEvent::LevelOutcome {
            outcome,
            score,
            threshold,
        } => {
            println!("{} (score {score}, needed {threshold})", outcome.banner_text());
        }
        SimEvent::AchievementUnlocked(achievement) => {
            println!("unlocked: {}", achievement.title());
        }
    }
}

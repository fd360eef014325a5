//! End-to-end flows across the interpreter, level controller, and session

use glam::DVec2;
use shardstorm::consts::*;
use shardstorm::levels;
use shardstorm::sim::{Level, Outcome, Session, SimContext, SimEvent, parse_script};
use shardstorm::{Difficulty, Settings};

fn run_secs(session: &mut Session, secs: f64) {
    let ticks = (secs / SIM_DT).ceil() as u32;
    for _ in 0..ticks {
        session.update(SIM_DT);
    }
}

#[test]
fn threshold_five_net_six_clears() {
    let src = r#"[
        [5],
        ["target", 100.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 200.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 300.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 400.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 500.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 600.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []]
    ]"#;
    let settings = Settings::default();
    let mut session = Session::from_sources(&settings, &[src]).unwrap();

    let ids: Vec<_> = session.level.entities.iter().map(|e| e.id).collect();
    for id in ids {
        session.hover(id);
    }
    run_secs(&mut session, 1.0);

    assert_eq!(session.level.score, 6);
    assert_eq!(session.level.outcome, Some(Outcome::Cleared));
}

#[test]
fn threshold_five_net_four_fails() {
    let src = r#"[
        [5],
        ["target", 100.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 200.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 300.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 400.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 500.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["citizen", 600.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []]
    ]"#;
    let settings = Settings::default();
    let mut session = Session::from_sources(&settings, &[src]).unwrap();

    let ids: Vec<_> = session.level.entities.iter().map(|e| e.id).collect();
    for id in ids {
        session.hover(id);
    }
    run_secs(&mut session, 1.0);

    assert_eq!(session.level.score, 4);
    assert_eq!(session.level.outcome, Some(Outcome::Failed));
}

#[test]
fn reload_does_not_leak_old_animations() {
    // The first script schedules a delayed ramp to vx 300
    let first = parse_script(
        r#"[[1], ["target", 400.0, 100.0, 5.0, 40.0, 0.0,
            [[0.2, 0.5, 300.0, 40.0]], [], [], []]]"#,
    )
    .unwrap();
    // The second spawns the same entity id with no animations at all
    let second = parse_script(
        r#"[[1], ["target", 400.0, 100.0, 5.0, 40.0, 0.0, [], [], [], []]]"#,
    )
    .unwrap();

    let ctx = SimContext::default();
    let mut level = Level::new();
    level.load(&first, &ctx);
    level.load(&second, &ctx);

    // Tick well past the old ramp's delay and duration: if any stale task
    // survived the reload it would have rewritten the new entity's velocity
    for _ in 0..120 {
        level.update(&ctx, SIM_DT);
    }
    assert_eq!(level.entities[0].primary_velocity, DVec2::new(5.0, 40.0));
    assert_eq!(level.tweener.live_tasks(), 0);
}

#[test]
fn slowtime_rebases_inflight_ramps() {
    let src = r#"[
        [0],
        ["chrono", 100.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["target", 400.0, 100.0, 0.0, 0.0, 0.0, [], [[0.0, 1.0, 2.0]], [], []]
    ]"#;
    let settings = Settings::default();
    let mut session = Session::from_sources(&settings, &[src]).unwrap();

    let chrono_id = session.level.entities[0].id;
    session.hover(chrono_id);
    assert!(session.trigger_slowtime());

    // At half rate the one-second ramp is still unfinished after 1.5s
    run_secs(&mut session, 1.5);
    let mid = session.level.entities[0].scale_factor;
    assert!(mid < 2.0, "ramp finished too early: {mid}");

    // Slow-time expires at 4s; the ramp completes at the restored rate
    run_secs(&mut session, 3.0);
    assert_eq!(session.level.entities[0].scale_factor, 2.0);
}

#[test]
fn intangibility_suppresses_everything_but_the_zone() {
    let src = r#"[
        [0],
        ["phase", 100.0, 50.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["zone", 400.0, 300.0, 0.0, 0.0, 0.0, [], [], [], []],
        ["citizen", 600.0, 200.0, 0.0, 0.0, 0.0, [], [], [], []]
    ]"#;
    let settings = Settings::default();
    let mut session = Session::from_sources(&settings, &[src]).unwrap();

    let phase_id = session.level.entities[0].id;
    let citizen_id = session.level.entities[2].id;
    session.hover(phase_id);
    assert!(session.trigger_intangible());

    // Citizen interactions are suppressed while intangible
    session.hover(citizen_id);
    session.click(citizen_id);
    assert_eq!(session.level.score, 0);
    assert!(session.level.entities.iter().any(|e| e.id == citizen_id && e.is_alive()));

    // The resource zone still refills under the hovering cursor
    session.set_cursor(DVec2::new(400.0, 300.0));
    session.update(SIM_DT);
    let fill_before = session.level.resource_fill;
    run_secs(&mut session, 1.0);
    assert!(session.level.resource_fill >= fill_before);
}

#[test]
fn campaign_first_level_clears_and_advances() {
    let settings = Settings::with_difficulty(Difficulty::Standard);
    let sources = levels::builtin_scripts();
    let mut session = Session::from_sources(&settings, &sources).unwrap();

    // Level 1: pop every target, spare the citizen (entity 3)
    let targets: Vec<_> = session
        .level
        .entities
        .iter()
        .filter(|e| {
            matches!(
                e.kind,
                shardstorm::sim::EntityKind::Target | shardstorm::sim::EntityKind::ConcealedTarget
            )
        })
        .map(|e| e.id)
        .collect();
    assert_eq!(targets.len(), 4);
    for id in targets {
        session.hover(id);
    }

    // The spared citizen has to fall off screen before clearance
    run_secs(&mut session, 20.0);
    assert_eq!(session.level_index, 1);
    assert_eq!(session.total_score, 4);

    let outcome_events: Vec<_> = session
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, SimEvent::LevelOutcome { .. }))
        .collect();
    assert_eq!(outcome_events.len(), 1);
}

//! Bundled level scripts
//!
//! Scripts use the tuple wire format of `sim::script`: a JSON array of
//! heterogeneous arrays dispatched by length. These are trusted build-time
//! assets; a parse failure here is a programmer error.

/// Level 1 - plain targets with one citizen weaving through
pub const LEVEL_1: &str = r#"[
    [3],
    ["target", 120.0, -40.0, 10.0, 70.0, 0.8, [], [], [], []],
    ["target", 320.0, -80.0, -5.0, 60.0, -1.2, [[1.0, 2.0, 30.0, 90.0]], [], [], []],
    ["target", 520.0, -60.0, 0.0, 65.0, 1.5, [], [[0.5, 1.5, 1.6]], [], []],
    ["citizen", 400.0, -150.0, 0.0, 55.0, 0.0, [], [], [[0.0, 1.2, 60.0, 0.0]], []],
    ["target", 680.0, -120.0, -15.0, 75.0, 2.0, [], [], [], [40.0, 2.0, 0.0]]
]"#;

/// Level 2 - armored tiers and stealth under a flickering blackout
pub const LEVEL_2: &str = r#"[
    [4],
    ["black", [[2.0, 0.6, 2]]],
    ["armored_2", 200.0, -60.0, 8.0, 55.0, 0.6, [], [], [], []],
    ["armored_3", 420.0, -100.0, -6.0, 50.0, -0.6, [], [], [[0.5, 1.0, 45.0, 0.0]], []],
    ["stealth_target", 300.0, -40.0, 0.0, 80.0, 1.0, [], [], [], []],
    ["stealth_target", 560.0, -90.0, 5.0, 72.0, -1.4, [[0.8, 1.5, -20.0, 110.0]], [], [], []],
    ["target", 100.0, -130.0, 12.0, 68.0, 0.9, [], [[1.0, 2.0, 1.4]], [], []],
    ["wall", [[340.0, -200.0], [420.0, -180.0], [460.0, -120.0], [360.0, -90.0], [300.0, -140.0]], 45.0]
]"#;

/// Level 3 - the resource zone plus every power-up kind
pub const LEVEL_3: &str = r#"[
    [5],
    ["zone", 620.0, -80.0, 0.0, 40.0, 0.0, [], [], [], []],
    ["sweep", 150.0, -60.0, 10.0, 85.0, 2.2, [], [], [], []],
    ["phase", 400.0, -200.0, 0.0, 78.0, -2.0, [], [], [], [30.0, 3.0, 1.57]],
    ["chrono", 700.0, -150.0, -12.0, 80.0, 2.5, [], [], [], []],
    ["citizen", 250.0, -120.0, 0.0, 58.0, 0.0, [], [], [[0.0, 1.4, 70.0, 0.0]], []],
    ["citizen", 500.0, -260.0, 0.0, 62.0, 0.0, [], [], [], []],
    ["target", 340.0, -90.0, 6.0, 74.0, 1.1, [[1.2, 1.8, 40.0, 95.0]], [[0.0, 2.5, 1.5]], [], []],
    ["target", 90.0, -180.0, 14.0, 70.0, -0.9, [], [], [[0.3, 0.9, 55.0, 0.0]], [36.0, 2.4, 0.0]],
    ["armored_1", 560.0, -40.0, -4.0, 66.0, 0.5, [], [], [], []]
]"#;

/// The bundled campaign, in play order
pub fn builtin_scripts() -> Vec<&'static str> {
    vec![LEVEL_1, LEVEL_2, LEVEL_3]
}
